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

//! Process-wide power tables.
//!
//! Binary-to-decimal conversion works without native big-integer division by
//! summing precomputed decimal renderings of powers of two, one per set bit.
//! Scaling and overflow checks consult precomputed powers of ten at native
//! width. Both tables are immutable after construction and are built exactly
//! once behind a run-once cell, so concurrent callers observe either a fully
//! built table or block until it is.

use std::sync::OnceLock;

use crate::magnitude::Mag;
use crate::{LONG_NUMERIC_BUF_SIZE, MAX_PRECISION, TWICE_MAX_PRECISION};

/// Number of bits in a long magnitude; one power-of-two entry per bit.
const POW_2_ENTRIES: usize = LONG_NUMERIC_BUF_SIZE * 8;

/// A fixed-width decimal-digit accumulator.
///
/// Holds `TWICE_MAX_PRECISION` digits, most significant first. Digits that
/// have never been touched hold the sentinel `-1`, which addition treats as
/// zero; the sentinel lets addition stop early once it runs out of both
/// significant digits and pending carry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecDigits {
    pub(crate) digits: [i8; TWICE_MAX_PRECISION],
}

impl DecDigits {
    /// A cleared accumulator: all sentinel except a zero in the ones place.
    pub(crate) fn new() -> DecDigits {
        let mut digits = [-1i8; TWICE_MAX_PRECISION];
        digits[TWICE_MAX_PRECISION - 1] = 0;
        DecDigits { digits }
    }

    /// Adds `other` into `self` digit-wise with carry. Both operands must
    /// carry the same scaling.
    pub(crate) fn accumulate(&mut self, other: &DecDigits) {
        let mut acc: u32 = 0;
        for digit in (0..TWICE_MAX_PRECISION).rev() {
            let mut lhs = other.digits[digit];
            if lhs == -1 {
                lhs = 0;
                if acc < 10 {
                    // No significant digits remain in the addend and no carry
                    // is pending; the leftmost digits pass through untouched.
                    break;
                }
            }
            let rhs = if self.digits[digit] == -1 { 0 } else { self.digits[digit] };
            acc = (lhs as u32 + rhs as u32) + u32::from(acc >= 10);
            self.digits[digit] = (acc % 10) as i8;
        }
    }
}

fn pow_2_table() -> &'static Vec<DecDigits> {
    static TABLE: OnceLock<Vec<DecDigits>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = Vec::with_capacity(POW_2_ENTRIES);
        let mut first = DecDigits::new();
        first.digits[TWICE_MAX_PRECISION - 1] = 1;
        table.push(first);
        for i in 1..POW_2_ENTRIES {
            let mut next = DecDigits::new();
            next.accumulate(&table[i - 1]);
            next.accumulate(&table[i - 1]);
            table.push(next);
        }
        table
    })
}

/// The decimal digits of `2^exp`.
pub(crate) fn pow_of_two(exp: usize) -> &'static DecDigits {
    // Exponents at the top of the table overflow the digit array; no valid
    // product of two maximum-precision values ever sets those bits.
    debug_assert!(exp < POW_2_ENTRIES - 3);
    &pow_2_table()[exp]
}

fn pow_10_table() -> &'static [Mag; MAX_PRECISION as usize + 1] {
    static TABLE: OnceLock<[Mag; MAX_PRECISION as usize + 1]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [Mag::zero(); MAX_PRECISION as usize + 1];
        table[0] = Mag::from_i32(1);
        for i in 1..=MAX_PRECISION as usize {
            let mut next = table[i - 1];
            next.scale_by_ten()
                .expect("powers of ten through the maximum precision fit the buffer");
            table[i] = next;
        }
        table
    })
}

/// `10^exp` at native width. `exp` may not exceed the maximum precision,
/// the largest power a native buffer can represent; no caller needs more.
pub(crate) fn pow_of_ten(exp: u32) -> &'static Mag {
    &pow_10_table()[exp as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits_string(d: &DecDigits) -> String {
        d.digits
            .iter()
            .map(|&c| char::from(b'0' + if c == -1 { 0 } else { c as u8 }))
            .collect::<String>()
            .trim_start_matches('0')
            .to_owned()
    }

    #[test]
    fn small_powers_of_two() {
        assert_eq!(digits_string(pow_of_two(0)), "1");
        assert_eq!(digits_string(pow_of_two(10)), "1024");
        assert_eq!(digits_string(pow_of_two(63)), "9223372036854775808");
    }

    #[test]
    fn powers_of_ten_round_trip() {
        assert_eq!(pow_of_ten(0).to_i64(), 1);
        assert_eq!(pow_of_ten(9).to_i64(), 1_000_000_000);
        assert!(!pow_of_ten(38).is_negative());
        assert!(!pow_of_ten(38).is_zero());
    }
}
