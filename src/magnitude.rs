// Copyright Materialize, Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository, or online at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fixed-width two's-complement integer buffers.
//!
//! A magnitude stores a signed integer as `W` big-endian bytes; the most
//! significant byte lives at index 0. Every primitive here is a total
//! function over the buffer. Overflow and rounding policy belong to the
//! layers above, which judge results against the power-of-ten tables.

use std::cmp::Ordering;

use crate::error::NumericError;
use crate::{LONG_NUMERIC_BUF_SIZE, NUMERIC_BUF_SIZE};

/// A `W`-byte big-endian two's-complement integer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Magnitude<const W: usize>(pub(crate) [u8; W]);

/// The native width used by public values.
pub(crate) type Mag = Magnitude<NUMERIC_BUF_SIZE>;

/// The double-width intermediate used by multiplication and division. Never
/// escapes the crate boundary.
pub(crate) type LongMag = Magnitude<LONG_NUMERIC_BUF_SIZE>;

impl<const W: usize> Magnitude<W> {
    pub(crate) fn zero() -> Magnitude<W> {
        Magnitude([0; W])
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub(crate) fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    /// Adds one, propagating the carry across the buffer.
    pub(crate) fn increase(&mut self) {
        for digit in (0..W).rev() {
            self.0[digit] = self.0[digit].wrapping_add(1);
            if self.0[digit] != 0 {
                break;
            }
        }
    }

    /// Subtracts one, propagating the borrow across the buffer.
    pub(crate) fn decrease(&mut self) {
        for digit in (0..W).rev() {
            self.0[digit] = self.0[digit].wrapping_sub(1);
            if self.0[digit] != 0xff {
                break;
            }
        }
    }

    /// Two's-complement negation: complement all bits, then add one.
    pub(crate) fn negate(&mut self) {
        for digit in 0..W {
            self.0[digit] = !self.0[digit];
        }
        self.increase();
    }

    /// Byte-wise addition with carry. Assumes both operands carry the same
    /// scaling.
    pub(crate) fn add(&self, other: &Magnitude<W>) -> Magnitude<W> {
        let mut answer = Magnitude::zero();
        let mut acc: u16 = 0;
        for digit in (0..W).rev() {
            acc = u16::from(self.0[digit]) + u16::from(other.0[digit]) + (acc >> 8);
            answer.0[digit] = (acc & 0xff) as u8;
        }
        answer
    }

    /// Subtraction as addition of the negated subtrahend.
    pub(crate) fn sub(&self, other: &Magnitude<W>) -> Magnitude<W> {
        let mut neg = *other;
        neg.negate();
        self.add(&neg)
    }

    /// Unsigned byte-wise comparison. Both operands must already be
    /// sign-normalized to non-negative.
    pub(crate) fn compare_pos(&self, other: &Magnitude<W>) -> Ordering {
        for digit in 0..W {
            if self.0[digit] != other.0[digit] {
                return self.0[digit].cmp(&other.0[digit]);
            }
        }
        Ordering::Equal
    }

    /// Sign-aware comparison. Opposite signs short-circuit; equal negative
    /// signs compare magnitudes and reverse.
    pub(crate) fn compare(&self, other: &Magnitude<W>) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.compare_pos(other),
            (true, true) => {
                let mut a = *self;
                let mut b = *other;
                a.negate();
                b.negate();
                a.compare_pos(&b).reverse()
            }
        }
    }

    /// Reports whether the bit at `pos` is set, counting from the most
    /// significant bit of the buffer.
    pub(crate) fn is_bit_set(&self, pos: usize) -> bool {
        self.0[pos / 8] & (0x80 >> (pos % 8)) != 0
    }

    /// Multiplies the value by ten in place.
    ///
    /// Fails when the scaled magnitude no longer fits: the value is
    /// sign-normalized first, so a set sign bit after scaling means the
    /// positive magnitude overflowed the buffer.
    pub(crate) fn scale_by_ten(&mut self) -> Result<(), NumericError> {
        let negative = self.is_negative();
        if negative {
            self.negate();
        }

        let mut acc: u16 = 0;
        for digit in (0..W).rev() {
            acc = 10 * u16::from(self.0[digit]) + (acc >> 8);
            self.0[digit] = (acc & 0xff) as u8;
        }

        if self.0[0] > 0x7f || acc >> 8 != 0 {
            return Err(NumericError::Overflow);
        }

        if negative {
            self.negate();
        }
        Ok(())
    }

    /// Scales the value by `dscale` decimal places via repeated
    /// multiplication by ten.
    pub(crate) fn scale_dec(&mut self, dscale: u32) -> Result<(), NumericError> {
        for _ in 0..dscale {
            self.scale_by_ten()?;
        }
        Ok(())
    }

    /// Reports whether the value fits a 32-bit signed integer: every byte
    /// above the low four must equal the sign-extension pad, and the boundary
    /// byte's sign bit must match the pad's.
    pub(crate) fn fits_in_i32(&self) -> bool {
        self.fits_in_low_bytes(4)
    }

    /// Like [`Magnitude::fits_in_i32`], for 64-bit signed integers.
    pub(crate) fn fits_in_i64(&self) -> bool {
        self.fits_in_low_bytes(8)
    }

    fn fits_in_low_bytes(&self, n: usize) -> bool {
        let pad = self.0[0];
        if pad != 0 && pad != 0xff {
            return false;
        }
        for digit in 1..W - n {
            if self.0[digit] != pad {
                return false;
            }
        }
        self.0[W - n] & 0x80 == pad & 0x80
    }

    pub(crate) fn from_i32(n: i32) -> Magnitude<W> {
        let mut answer = Magnitude([if n < 0 { 0xff } else { 0 }; W]);
        answer.0[W - 4..].copy_from_slice(&n.to_be_bytes());
        answer
    }

    pub(crate) fn from_i64(n: i64) -> Magnitude<W> {
        let mut answer = Magnitude([if n < 0 { 0xff } else { 0 }; W]);
        answer.0[W - 8..].copy_from_slice(&n.to_be_bytes());
        answer
    }

    /// Reads the low four bytes as an `i32`. The caller must have checked
    /// [`Magnitude::fits_in_i32`].
    pub(crate) fn to_i32(&self) -> i32 {
        debug_assert!(self.fits_in_i32());
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.0[W - 4..]);
        i32::from_be_bytes(bytes)
    }

    /// Reads the low eight bytes as an `i64`. The caller must have checked
    /// [`Magnitude::fits_in_i64`].
    pub(crate) fn to_i64(&self) -> i64 {
        debug_assert!(self.fits_in_i64());
        let mut bytes = [0; 8];
        bytes.copy_from_slice(&self.0[W - 8..]);
        i64::from_be_bytes(bytes)
    }
}

impl Magnitude<NUMERIC_BUF_SIZE> {
    /// Sign-extends the value into a double-width buffer.
    pub(crate) fn widen(&self) -> LongMag {
        let pad = if self.is_negative() { 0xff } else { 0 };
        let mut long = Magnitude([pad; LONG_NUMERIC_BUF_SIZE]);
        long.0[NUMERIC_BUF_SIZE..].copy_from_slice(&self.0);
        long
    }
}

impl Magnitude<LONG_NUMERIC_BUF_SIZE> {
    /// Reports whether the value carries significance beyond the low half,
    /// i.e. whether narrowing back to native width would lose bits.
    pub(crate) fn has_long_significance(&self) -> bool {
        let pad = if self.is_negative() { 0xff } else { 0 };
        for digit in 0..NUMERIC_BUF_SIZE {
            if self.0[digit] != pad {
                return true;
            }
        }
        self.0[NUMERIC_BUF_SIZE] & 0x80 != pad & 0x80
    }

    /// The low half of the buffer, discarding the high bytes unchecked.
    pub(crate) fn low_half(&self) -> Mag {
        let mut mag = Mag::zero();
        mag.0.copy_from_slice(&self.0[NUMERIC_BUF_SIZE..]);
        mag
    }

    /// Narrows to native width, failing when the high half is significant.
    pub(crate) fn narrow(&self) -> Result<Mag, NumericError> {
        if self.has_long_significance() {
            return Err(NumericError::Overflow);
        }
        Ok(self.low_half())
    }
}

/// Shifts the concatenation `(remainder, quotient)` left by one bit: the bit
/// shifted out of the quotient's high end flows into the remainder's low end.
/// This is the stepping primitive of bit-serial long division; the quotient
/// may be double width, the remainder is always native width.
pub(crate) fn double_shift_bit_left<const W: usize>(quotient: &mut Magnitude<W>, remainder: &mut Mag) {
    for digit in 0..NUMERIC_BUF_SIZE - 1 {
        remainder.0[digit] = (remainder.0[digit] << 1) | (remainder.0[digit + 1] >> 7);
    }
    remainder.0[NUMERIC_BUF_SIZE - 1] = (remainder.0[NUMERIC_BUF_SIZE - 1] << 1) | (quotient.0[0] >> 7);

    for digit in 0..W - 1 {
        quotient.0[digit] = (quotient.0[digit] << 1) | (quotient.0[digit + 1] >> 7);
    }
    quotient.0[W - 1] <<= 1;
}

/// Shifts a native-width value left by `numbytes` whole bytes into a
/// double-width buffer, zero filling. Used to align partial products during
/// schoolbook multiplication.
pub(crate) fn shift_bytes_long(arg: &Mag, numbytes: usize) -> LongMag {
    let mut answer = LongMag::zero();
    for i in 0..NUMERIC_BUF_SIZE {
        let dst = NUMERIC_BUF_SIZE + i - numbytes;
        answer.0[dst] = arg.0[i];
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_round_trip() {
        let a = Mag::from_i64(123_456_789);
        let b = Mag::from_i64(-987_654);
        assert_eq!(a.add(&b).sub(&b), a);
        assert_eq!(a.add(&b).to_i64(), 123_456_789 - 987_654);
    }

    #[test]
    fn negate_min_value_wraps() {
        // The most-negative value is its own complement; callers detect this
        // by observing that the sign did not flip.
        let mut min = Mag::zero();
        min.0[0] = 0x80;
        let orig = min;
        min.negate();
        assert_eq!(min, orig);
        assert!(min.is_negative());
    }

    #[test]
    fn scale_by_ten_overflow() {
        let mut m = Mag::from_i64(i64::MAX);
        for _ in 0..19 {
            // 2^63 * 10^19 < 2^127, so the first nineteen scalings fit.
            m.scale_by_ten().unwrap();
        }
        assert_eq!(m.scale_by_ten(), Err(NumericError::Overflow));
    }

    #[test]
    fn fits_boundaries() {
        assert!(Mag::from_i32(i32::MIN).fits_in_i32());
        assert!(Mag::from_i64(i64::from(i32::MAX)).fits_in_i32());
        assert!(!Mag::from_i64(i64::from(i32::MAX) + 1).fits_in_i32());
        assert!(Mag::from_i64(i64::MIN).fits_in_i64());
        let mut big = Mag::from_i64(i64::MAX);
        big.increase();
        assert!(!big.fits_in_i64());
    }

    #[test]
    fn widen_narrow() {
        let m = Mag::from_i64(-42);
        assert_eq!(m.widen().narrow().unwrap(), m);
        let mut long = Mag::from_i64(1).widen();
        long.scale_dec(39).unwrap();
        assert!(long.has_long_significance());
        assert_eq!(long.narrow(), Err(NumericError::Overflow));
    }
}
