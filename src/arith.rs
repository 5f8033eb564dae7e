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

//! Arithmetic engines and the checked operations on [`Numeric`].
//!
//! Multiplication is schoolbook byte multiplication into a double-width
//! buffer, projected back to native width under the precision and scale
//! rules of SQL `NUMERIC`. Division takes a native fast path when both
//! operands fit a machine integer and otherwise runs bit-serial long
//! division, one quotient bit per shift/compare/subtract step.

use std::cmp::Ordering;

use crate::coerce::{common_prec_scale, coerce_num_to_num, overflows_precision, prec_scale_when_overflow};
use crate::convert::{dec_str_to_mag, long_to_dec_string, mag_to_dec_string};
use crate::error::{DataStatus, NumericError};
use crate::magnitude::{double_shift_bit_left, shift_bytes_long, LongMag, Mag, Magnitude};
use crate::value::Numeric;
use crate::{DEFAULT_DIVISION_SCALE, LONG_NUMERIC_BUF_SIZE, MAX_PRECISION, NUMERIC_BUF_SIZE, TWICE_MAX_PRECISION};

/// Multiplies two native-width magnitudes into a double-width product.
///
/// Both operands are normalized to non-negative magnitudes first; the
/// returned flag reports whether the signed product is non-negative.
fn mul_magnitudes(a1: &Mag, a2: &Mag) -> (LongMag, bool) {
    let mut answer = LongMag::zero();
    if a1.is_zero() || a2.is_zero() {
        return (answer, true);
    }

    let mut positive = true;
    let mut arg1 = *a1;
    let mut arg2 = *a2;
    if arg1.is_negative() {
        arg1.negate();
        positive = false;
    }
    if arg2.is_negative() {
        arg2.negate();
        positive = !positive;
    }

    // For each non-zero byte of the multiplier, multiply the byte-shifted
    // multiplicand by it and accumulate the partial product.
    for digit2 in (0..NUMERIC_BUF_SIZE).rev() {
        if arg2.0[digit2] == 0 {
            continue;
        }
        let shift = NUMERIC_BUF_SIZE - 1 - digit2;
        let shifted = shift_bytes_long(&arg1, shift);
        let mut term = LongMag::zero();
        let mut acc: u32 = 0;
        for digit1 in (0..LONG_NUMERIC_BUF_SIZE).rev() {
            acc = u32::from(shifted.0[digit1]) * u32::from(arg2.0[digit2]) + (acc >> 8);
            term.0[digit1] = (acc & 0xff) as u8;
        }
        answer = answer.add(&term);
    }
    (answer, positive)
}

/// Projects a non-negative double-width product back to native width under
/// the claimed precision and scale.
///
/// When the claimed precision fits, the low half is the result. When only
/// the pessimistic precision bound overflowed and the high half carries no
/// significance, the precision clamps to the maximum. Otherwise trailing
/// decimal digits are truncated from the scale; if significant digits still
/// exceed the maximum precision the product does not fit any domain.
fn project_long(src: &LongMag, src_prec: u32, src_scale: u32) -> Result<(Mag, u8, u8), NumericError> {
    if src_prec <= u32::from(MAX_PRECISION) {
        return Ok((src.low_half(), src_prec as u8, src_scale as u8));
    }

    if src_scale <= u32::from(MAX_PRECISION) {
        let high_is_pad = src.0[..NUMERIC_BUF_SIZE].iter().all(|&b| b == 0);
        if high_is_pad
            && src.0[NUMERIC_BUF_SIZE] <= 0x7f
            && !overflows_precision(&src.low_half(), MAX_PRECISION)
        {
            return Ok((src.low_half(), MAX_PRECISION, src_scale as u8));
        }
        // The scale must be preserved exactly, so nothing can be truncated.
        return Err(NumericError::Overflow);
    }

    let truncation_diff = src_prec - u32::from(MAX_PRECISION);
    if src_scale < truncation_diff {
        return Err(NumericError::Overflow);
    }
    let dest_scale = src_scale - truncation_diff;

    let mut dec_digits = long_to_dec_string(src);
    dec_digits.truncate(TWICE_MAX_PRECISION - truncation_diff as usize);
    if dec_digits.len() > usize::from(MAX_PRECISION) {
        let extra = dec_digits.len() - usize::from(MAX_PRECISION);
        if dec_digits.as_bytes()[..extra].iter().any(|&b| b != b'0') {
            return Err(NumericError::Overflow);
        }
    }
    Ok((dec_str_to_mag(&dec_digits), MAX_PRECISION, dest_scale as u8))
}

/// Divides two magnitudes, returning the quotient and remainder.
///
/// A zero divisor is a checked precondition. Operands that both fit a
/// native integer divide directly; everything else runs the bit-serial long
/// division.
pub(crate) fn div_magnitudes(arg1: &Mag, arg2: &Mag) -> Result<(Mag, Mag), NumericError> {
    if arg2.is_zero() {
        return Err(NumericError::DivisionByZero);
    }
    if arg1.is_zero() {
        return Ok((Mag::zero(), Mag::zero()));
    }

    if arg1.fits_in_i32() && arg2.fits_in_i32() {
        let a = i64::from(arg1.to_i32());
        let b = i64::from(arg2.to_i32());
        return Ok((Mag::from_i64(a / b), Mag::from_i64(a % b)));
    }

    if arg1.fits_in_i64() && arg2.fits_in_i64() {
        let a = arg1.to_i64();
        let b = arg2.to_i64();
        // i64::MIN / -1 is the one quotient that does not fit back into an
        // i64; it falls through to the general path.
        if let (Some(q), Some(r)) = (a.checked_div(b), a.checked_rem(b)) {
            return Ok((Mag::from_i64(q), Mag::from_i64(r)));
        }
    }

    Ok(long_div(arg1, arg2))
}

/// Bit-serial long division: for every bit of the dividend, shift the
/// quotient/remainder pair left one bit and subtract the divisor from the
/// remainder when it fits, setting the new quotient bit. Only the dividend
/// and quotient may be double width.
fn long_div<const W: usize>(a1: &Magnitude<W>, a2: &Mag) -> (Magnitude<W>, Mag) {
    let mut neg_sign = false;
    let mut neg_remainder = false;

    let mut arg1 = *a1;
    if arg1.is_negative() {
        arg1.negate();
        neg_sign = !neg_sign;
        neg_remainder = true;
    }
    let mut arg2 = *a2;
    if arg2.is_negative() {
        arg2.negate();
        neg_sign = !neg_sign;
    }

    let mut neg_arg2 = arg2;
    neg_arg2.negate();

    let mut remainder = Mag::zero();
    let mut answer = arg1;
    for _ in 0..W * 8 {
        double_shift_bit_left(&mut answer, &mut remainder);
        if remainder.compare_pos(&arg2) != Ordering::Less {
            remainder = remainder.add(&neg_arg2);
            answer.0[W - 1] |= 1;
        }
    }

    if neg_sign {
        answer.negate();
    }
    if neg_remainder {
        remainder.negate();
    }
    (answer, remainder)
}

/// The integral part of a numeric as a magnitude carrying the source's
/// sign.
fn integral_part_mag(num: &Numeric) -> Mag {
    let mut work = *num.mag_ref();
    let negative = work.is_negative();
    if negative {
        work.negate();
    }
    let dec_str = mag_to_dec_string(&work);
    let len = dec_str.len();
    let integral =
        &dec_str[len - usize::from(num.precision())..len - usize::from(num.scale())];
    let mut dest = dec_str_to_mag(integral);
    if negative {
        dest.negate();
    }
    dest
}

/// The fractional part of a numeric as a magnitude of `dst_scale` digits,
/// zero padded on the right, carrying the source's sign.
fn fractional_part_mag(num: &Numeric, dst_scale: u8) -> Mag {
    let mut work = *num.mag_ref();
    let negative = work.is_negative();
    if negative {
        work.negate();
    }
    let dec_str = mag_to_dec_string(&work);
    let len = dec_str.len();
    let mut fraction = dec_str[len - usize::from(num.scale())..].to_owned();
    fraction.push_str(&"0".repeat(usize::from(dst_scale - num.scale())));
    let mut dest = dec_str_to_mag(&fraction);
    if negative {
        dest.negate();
    }
    dest
}

impl Numeric {
    /// Adds two numerics, coercing them to a common scale first.
    ///
    /// The result carries the common precision of the operands, or one more
    /// digit when the sum requires it due to carry. Exceeding the maximum
    /// precision fails with [`NumericError::Overflow`].
    pub fn checked_add(&self, other: &Numeric) -> Result<Numeric, NumericError> {
        let (common1, common2) = match common_prec_scale(self, other) {
            Ok(pair) => pair,
            Err(NumericError::Overflow) => prec_scale_when_overflow(self, other)?,
            Err(e) => return Err(e),
        };

        let temp = common1.mag_ref().add(common2.mag_ref());
        let mut prec = common1.precision();
        if overflows_precision(&temp, prec) {
            if prec < MAX_PRECISION {
                prec += 1;
            } else {
                return Err(NumericError::Overflow);
            }
        }
        Ok(Numeric::from_parts_trusted(temp, prec, common1.scale()))
    }

    /// Subtracts `other` from `self`, coercing them to a common scale first.
    pub fn checked_sub(&self, other: &Numeric) -> Result<Numeric, NumericError> {
        let (common1, common2) = match common_prec_scale(self, other) {
            Ok(pair) => pair,
            Err(NumericError::Overflow) => prec_scale_when_overflow(self, other)?,
            Err(e) => return Err(e),
        };

        let temp = common1.mag_ref().sub(common2.mag_ref());
        let mut prec = common1.precision();
        if overflows_precision(&temp, prec) {
            if prec < MAX_PRECISION {
                prec += 1;
            } else {
                return Err(NumericError::Overflow);
            }
        }
        Ok(Numeric::from_parts_trusted(temp, prec, common1.scale()))
    }

    /// Multiplies two numerics.
    ///
    /// The result scale is the sum of the operand scales and the result
    /// precision grows to hold the full product, up to the maximum; trailing
    /// fractional digits are truncated to make an over-wide product fit, and
    /// a product whose significant digits cannot fit fails with
    /// [`NumericError::Overflow`].
    pub fn checked_mul(&self, other: &Numeric) -> Result<Numeric, NumericError> {
        let (long, positive) = mul_magnitudes(self.mag_ref(), other.mag_ref());
        let prec = u32::from(self.precision()) + u32::from(other.precision()) + 1;
        let scale = u32::from(self.scale()) + u32::from(other.scale());
        let (mut mag, prec, scale) = project_long(&long, prec, scale)?;
        if !positive {
            mag.negate();
        }
        Ok(Numeric::from_parts_trusted(mag, prec.max(1), scale))
    }

    /// Divides `self` by `other`.
    ///
    /// The result scale is the larger of the operand scales, raised to the
    /// default division scale so that integer division still yields a
    /// fractional result. The dividend is widened and pre-scaled to realize
    /// that scale exactly before the division runs; the quotient is rounded
    /// half away from zero by comparing twice the remainder against the
    /// divisor.
    pub fn checked_div(&self, other: &Numeric) -> Result<Numeric, NumericError> {
        if other.mag_ref().is_zero() {
            return Err(NumericError::DivisionByZero);
        }

        // Scale the dividend so its scale exceeds the divisor's by the
        // result scale.
        let mut long_dividend = self.mag_ref().widen();
        let scale1 = i32::from(self.scale());
        let scale2 = i32::from(other.scale());
        let max_scale = scale1.max(scale2);
        let mut scaleup = 0;
        if scale2 > 0 {
            scaleup = (max_scale + scale2) - scale1;
            long_dividend.scale_dec(scaleup as u32)?;
        }

        let mut prec = (i32::from(self.precision()) + scaleup).min(i32::from(MAX_PRECISION));
        let mut scale = max_scale;

        if scale < i32::from(DEFAULT_DIVISION_SCALE) {
            let scale_delta = i32::from(DEFAULT_DIVISION_SCALE) - scale;
            let mut new_scale = scale + scale_delta;
            let mut new_prec = prec + scale_delta;
            if new_prec > i32::from(MAX_PRECISION) {
                new_scale -= new_prec - i32::from(MAX_PRECISION);
                new_prec = i32::from(MAX_PRECISION);
            }
            long_dividend.scale_dec((new_scale - scale) as u32)?;
            scale = new_scale;
            prec = new_prec;
        }

        let (mut quotient, remainder) = if long_dividend.has_long_significance() {
            // Only the dividend and quotient may be double width; the
            // divisor is always native.
            let (long_quotient, remainder) = long_div(&long_dividend, other.mag_ref());
            (long_quotient.narrow()?, remainder)
        } else {
            div_magnitudes(&long_dividend.low_half(), other.mag_ref())?
        };

        // Round half away from zero: 2 * |remainder| >= |divisor| bumps the
        // quotient one unit away from zero.
        let mut rem_abs = remainder;
        if rem_abs.is_negative() {
            rem_abs.negate();
        }
        let mut divisor_abs = *other.mag_ref();
        if divisor_abs.is_negative() {
            divisor_abs.negate();
        }
        let twice_rem = rem_abs.add(&rem_abs);
        if twice_rem.compare(&divisor_abs) != Ordering::Less {
            if quotient.is_negative() {
                quotient.decrease();
            } else {
                quotient.increase();
            }
        }

        if overflows_precision(&quotient, prec as u8) {
            if prec < i32::from(MAX_PRECISION) {
                prec += 1;
            } else {
                return Err(NumericError::Overflow);
            }
        }

        Ok(Numeric::from_parts_trusted(
            quotient,
            prec.max(1) as u8,
            scale as u8,
        ))
    }

    /// Negates the numeric.
    ///
    /// Negating the most-negative representable magnitude has no positive
    /// counterpart and fails with [`NumericError::Overflow`].
    pub fn checked_neg(&self) -> Result<Numeric, NumericError> {
        let mut mag = *self.mag_ref();
        mag.negate();
        if mag.is_negative() && self.mag_ref().is_negative() {
            return Err(NumericError::Overflow);
        }
        Ok(Numeric::from_parts_trusted(mag, self.precision(), self.scale()))
    }

    /// The absolute value of the numeric.
    pub fn abs(&self) -> Numeric {
        if !self.mag_ref().is_negative() {
            return *self;
        }
        let mut mag = *self.mag_ref();
        mag.negate();
        Numeric::from_parts_trusted(mag, self.precision(), self.scale())
    }

    /// Adds one unit in the last place, growing the precision by one digit
    /// when the increment carries past it.
    pub fn increase(&mut self) -> Result<(), NumericError> {
        let mut mag = *self.mag_ref();
        mag.increase();
        let mut prec = self.precision();
        if overflows_precision(&mag, prec) {
            if prec < MAX_PRECISION {
                prec += 1;
            } else {
                return Err(NumericError::Overflow);
            }
        }
        *self = Numeric::from_parts_trusted(mag, prec, self.scale());
        Ok(())
    }

    /// Compares two numerics exactly.
    ///
    /// Operands at the same precision and scale compare their magnitudes
    /// directly. Otherwise they are coerced to a common domain; when that
    /// coercion would overflow, the integral and fractional parts are
    /// compared separately so that no precision is ever lost.
    pub fn compare(&self, other: &Numeric) -> Ordering {
        if self.precision() == other.precision() && self.scale() == other.scale() {
            return self.mag_ref().compare(other.mag_ref());
        }

        match common_prec_scale(self, other) {
            Ok((common1, common2)) => common1.mag_ref().compare(common2.mag_ref()),
            Err(_) => {
                let scale_common = self.scale().max(other.scale());

                let integ1 = integral_part_mag(self);
                let integ2 = integral_part_mag(other);
                match integ1.compare(&integ2) {
                    Ordering::Equal => {
                        let frac1 = fractional_part_mag(self, scale_common);
                        let frac2 = fractional_part_mag(other, scale_common);
                        frac1.compare(&frac2)
                    }
                    ord => ord,
                }
            }
        }
    }

    /// Coerces the numeric to another precision and scale.
    ///
    /// Growing the scale pads with trailing zeros; shrinking it truncates
    /// and rounds half away from zero, reporting [`DataStatus::Truncated`]
    /// when non-zero digits were discarded. Fails with
    /// [`NumericError::Overflow`] when the significant digits do not fit the
    /// destination precision, including when rounding an all-nines value
    /// would carry out of it.
    pub fn coerce_to(
        &self,
        precision: u8,
        scale: u8,
    ) -> Result<(Numeric, DataStatus), NumericError> {
        coerce_num_to_num(self, precision, scale)
    }

    /// Reports whether the fractional part of the numeric is zero.
    pub fn is_fraction_part_zero(&self) -> bool {
        let dec_str = mag_to_dec_string(self.mag_ref());
        let len = dec_str.len();
        dec_str.as_bytes()[len - usize::from(self.scale())..]
            .iter()
            .all(|&b| b == b'0')
    }
}
