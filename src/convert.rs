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

//! Conversions between magnitudes and native types.
//!
//! Binary-to-decimal conversion accumulates the decimal rendering of each set
//! bit from the power-of-two table; decimal-to-binary consumes the digit
//! string in nine-digit chunks, each of which fits a native 32-bit integer.

use std::num::FpCategory;

use crate::error::{DataStatus, NumericError, ParseNumericError};
use crate::magnitude::{Mag, Magnitude};
use crate::tables::{pow_of_ten, pow_of_two, DecDigits};
use crate::value::Numeric;
use crate::{MAX_PRECISION, TWICE_MAX_PRECISION};

/// The largest finite magnitude any `NUMERIC` domain can hold.
const OVERFLOW_LIMIT: f64 = 1e38;
/// Values below this magnitude underflow every `NUMERIC` domain.
const UNDERFLOW_LIMIT: f64 = 1e-38;

/// Accumulates the decimal digits of a sign-normalized (non-negative)
/// magnitude by summing the power-of-two rendering of each set bit.
fn magnitude_to_dec_digits<const W: usize>(positive: &Magnitude<W>) -> DecDigits {
    let mut result = DecDigits::new();
    for byte in 0..W {
        if positive.0[byte] == 0 {
            continue;
        }
        for bit in 0..8 {
            let pos = byte * 8 + bit;
            if positive.is_bit_set(pos) {
                result.accumulate(pow_of_two(W * 8 - pos - 1));
            }
        }
    }
    result
}

fn dec_digits_to_string(digits: &DecDigits) -> String {
    digits
        .digits
        .iter()
        .map(|&d| char::from(b'0' + if d == -1 { 0 } else { d as u8 }))
        .collect()
}

/// Renders a native-width magnitude as `TWICE_MAX_PRECISION` ASCII decimal
/// digits with no leading-zero suppression, prefixed with `-` when negative.
pub(crate) fn mag_to_dec_string(mag: &Mag) -> String {
    let mut local = *mag;
    let mut out = String::with_capacity(TWICE_MAX_PRECISION + 1);
    if local.is_negative() {
        out.push('-');
        local.negate();
    }
    out.push_str(&dec_digits_to_string(&magnitude_to_dec_digits(&local)));
    out
}

/// Renders a double-width magnitude, which must be non-negative, as
/// `TWICE_MAX_PRECISION` ASCII decimal digits.
pub(crate) fn long_to_dec_string<const W: usize>(positive: &Magnitude<W>) -> String {
    debug_assert!(!positive.is_negative());
    dec_digits_to_string(&magnitude_to_dec_digits(positive))
}

/// Converts a validated string of decimal digits, optionally prefixed with
/// `-`, into a magnitude. The digits are consumed in chunks of up to nine,
/// each scaled by the count of digits that follow it.
///
/// The caller must have checked that the encoded value fits the native
/// buffer; every internal call site validates against the maximum precision
/// first.
pub(crate) fn dec_str_to_mag(dec_str: &str) -> Mag {
    let (negative, digits) = match dec_str.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, dec_str),
    };

    let mut result = Mag::zero();
    let mut end = digits.len();
    while end > 0 {
        let start = end.saturating_sub(9);
        let chunk: i32 = digits[start..end]
            .parse()
            .expect("chunk holds only ASCII digits");
        if chunk != 0 {
            let mut big_chunk = Mag::from_i32(chunk);
            big_chunk
                .scale_dec((digits.len() - end) as u32)
                .expect("pre-validated digits fit the numeric buffer");
            result = result.add(&big_chunk);
        }
        end = start;
    }

    if negative {
        result.negate();
    }
    result
}

/// The number of significant decimal digits of a native integer. Zero
/// counts as one digit.
pub(crate) fn significant_digits(mut i: i64) -> u8 {
    let mut n = 0;
    loop {
        n += 1;
        i /= 10;
        if i == 0 {
            return n;
        }
    }
}

/// Converts a magnitude carrying `scale` fractional digits to an `i64`,
/// rounding the fraction half away from zero.
pub(crate) fn mag_to_i64(mag: &Mag, scale: u8) -> Result<i64, NumericError> {
    let zero_scale = if scale > 0 {
        let (mut quo, mut rem) = crate::arith::div_magnitudes(mag, pow_of_ten(u32::from(scale)))?;
        if !quo.is_negative() {
            rem.negate();
        }
        let tmp = pow_of_ten(u32::from(scale)).add(&rem).add(&rem);
        if tmp.is_negative() || tmp.is_zero() {
            if quo.is_negative() {
                quo.decrease();
            } else {
                quo.increase();
            }
        }
        quo
    } else {
        *mag
    };

    if !zero_scale.fits_in_i64() {
        return Err(NumericError::Overflow);
    }
    Ok(zero_scale.to_i64())
}

/// Converts a magnitude carrying `scale` fractional digits to a double via
/// its decimal string. Ordinary binary rounding error applies, symmetric
/// with parsing a floating literal.
pub(crate) fn mag_to_f64(mag: &Mag, scale: u8) -> f64 {
    let s = mag_to_dec_string(mag);
    let parsed: f64 = s.parse().expect("decimal digit string parses as a float");
    parsed / 10f64.powi(i32::from(scale))
}

/// The shortest decimal digit sequence and decimal-point position that
/// exactly round-trip the given finite, non-zero float. `decpt` counts the
/// digits left of the decimal point; zero or negative means the value is a
/// pure fraction with `-decpt` leading zeros after the point.
fn shortest_decimal(abs: f64) -> (String, i32) {
    let s = format!("{:e}", abs);
    let epos = s.find('e').expect("exponential format contains an exponent");
    let exp: i32 = s[epos + 1..]
        .parse()
        .expect("exponential format exponent is an integer");
    let digits: String = s[..epos].chars().filter(|&c| c != '.').collect();
    (digits, exp + 1)
}

fn shortest_decimal_f32(abs: f32) -> (String, i32) {
    let s = format!("{:e}", abs);
    let epos = s.find('e').expect("exponential format contains an exponent");
    let exp: i32 = s[epos + 1..]
        .parse()
        .expect("exponential format exponent is an integer");
    let digits: String = s[..epos].chars().filter(|&c| c != '.').collect();
    (digits, exp + 1)
}

/// Converts a double to a numeric aimed at `dst_scale` fractional digits.
pub(crate) fn f64_to_num(value: f64, dst_scale: u8) -> Result<(Numeric, DataStatus), NumericError> {
    real_to_num(value, dst_scale, |abs| shortest_decimal(abs))
}

/// Converts a float to a numeric aimed at `dst_scale` fractional digits. The
/// digit sequence is extracted at single precision so the result is the
/// shortest decimal that round-trips the `f32`, not its `f64` widening.
pub(crate) fn f32_to_num(value: f32, dst_scale: u8) -> Result<(Numeric, DataStatus), NumericError> {
    real_to_num(f64::from(value), dst_scale, |abs| {
        shortest_decimal_f32(abs as f32)
    })
}

fn real_to_num<F>(
    value: f64,
    dst_scale: u8,
    digits_of: F,
) -> Result<(Numeric, DataStatus), NumericError>
where
    F: Fn(f64) -> (String, i32),
{
    match value.classify() {
        FpCategory::Infinite => return Err(NumericError::Overflow),
        FpCategory::Nan => {
            return Ok((zero_at_scale(dst_scale), DataStatus::Truncated));
        }
        FpCategory::Zero => {
            return Ok((zero_at_scale(dst_scale), DataStatus::Ok));
        }
        FpCategory::Normal | FpCategory::Subnormal => {}
    }

    if value.abs() > OVERFLOW_LIMIT {
        return Err(NumericError::Overflow);
    }
    if value.abs() < UNDERFLOW_LIMIT {
        // The value underflows every representable domain; it degrades to
        // zero and the loss is reported.
        return Ok((zero_at_scale(dst_scale), DataStatus::Truncated));
    }

    let sign = value < 0.0;
    let (digits, decpt) = digits_of(value.abs());
    let ndigits = digits.len() as i32;
    let mut status = DataStatus::Ok;

    let (mut num_str, mut prec, mut scale) = if decpt <= 0 {
        // A pure fraction: reach the decimal point with leading zeros, then
        // keep at most the maximum precision of significant digits.
        let mut s = "0".repeat((-decpt) as usize);
        s.push_str(&digits);
        if s.len() > MAX_PRECISION as usize {
            s.truncate(MAX_PRECISION as usize);
            status = DataStatus::Truncated;
        }
        let p = s.len() as i32;
        (s, p, p)
    } else if decpt > i32::from(MAX_PRECISION) {
        // Unreachable given the overflow limit check above, but kept as a
        // hard stop against a digit sequence wider than any domain.
        return Err(NumericError::Overflow);
    } else if decpt < ndigits {
        (digits, ndigits, ndigits - decpt)
    } else {
        // The value is a whole number; append zeros out to the decimal
        // point.
        let mut s = digits;
        s.push_str(&"0".repeat((decpt - ndigits) as usize));
        (s, decpt, 0)
    };

    // Append zeros until the destination scale is reached.
    while prec < i32::from(MAX_PRECISION) && scale < i32::from(dst_scale) {
        num_str.push('0');
        prec += 1;
        scale += 1;
    }

    let mut mag = dec_str_to_mag(&num_str);
    if sign {
        mag.negate();
    }
    Ok((
        Numeric::from_parts_trusted(mag, prec as u8, scale as u8),
        status,
    ))
}

fn zero_at_scale(dst_scale: u8) -> Numeric {
    Numeric::from_parts_trusted(Mag::zero(), dst_scale.max(1), dst_scale)
}

/// Parses a decimal literal: optional leading sign, an optional decimal
/// point, thousands-separator commas in the integer part only, and
/// leading/trailing whitespace. Trailing whitespace ends the literal and
/// truncates the effective scale to the digits actually seen.
pub(crate) fn parse_numeric(s: &str) -> Result<(Numeric, DataStatus), ParseNumericError> {
    let bytes = s.as_bytes();
    let mut num_string = String::new();
    let mut prec: u32 = 0;
    let mut scale: i32 = 0;
    let mut leading_zeroes = true;
    let mut sign_found = false;
    let mut negate_value = false;
    let mut pad_character_zero = false;
    let mut trailing_spaces = false;
    let mut decimal_part = false;

    for (i, &c) in bytes.iter().enumerate() {
        if c == b'.' {
            if decimal_part || trailing_spaces {
                return Err(ParseNumericError::invalid());
            }
            leading_zeroes = false;
            decimal_part = true;
            scale = (bytes.len() - (i + 1)) as i32;
        } else if leading_zeroes {
            // Looking for the first digit between 1 and 9.
            match c {
                b'1'..=b'9' => {
                    leading_zeroes = false;
                    num_string.push(c as char);
                    prec += 1;
                }
                b'+' | b'-' => {
                    if sign_found {
                        return Err(ParseNumericError::invalid());
                    }
                    sign_found = true;
                    if c == b'-' {
                        negate_value = true;
                    }
                }
                b'0' => {
                    pad_character_zero = true;
                }
                _ if c.is_ascii_whitespace() => {}
                _ => return Err(ParseNumericError::invalid()),
            }
        } else if c.is_ascii_whitespace() {
            // The first space after digits begins the trailer; fractional
            // digits not seen no longer count toward the scale.
            trailing_spaces = true;
            scale -= 1;
            if scale < 0 {
                scale = 0;
            }
        } else if trailing_spaces {
            return Err(ParseNumericError::invalid());
        } else if c == b',' {
            if decimal_part {
                return Err(ParseNumericError::invalid());
            }
        } else if c.is_ascii_digit() {
            num_string.push(c as char);
            prec += 1;
            if prec > u32::from(MAX_PRECISION) {
                return Err(ParseNumericError::overflow());
            }
        } else {
            return Err(ParseNumericError::invalid());
        }
    }

    if prec == 0 {
        if !pad_character_zero {
            return Err(ParseNumericError::invalid());
        }
        num_string.push('0');
        prec = 1;
        scale = 0;
    }

    let mut mag = dec_str_to_mag(&num_string);
    if negate_value {
        mag.negate();
    }

    let status = if trailing_spaces {
        DataStatus::NotFullyConsumed
    } else {
        DataStatus::Ok
    };
    Ok((
        Numeric::from_parts_trusted(mag, prec as u8, scale as u8),
        status,
    ))
}
