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

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use crate::coerce;
use crate::convert;
use crate::error::{DataStatus, NumericError, ParseNumericError};
use crate::magnitude::{Mag, Magnitude};
use crate::{MAX_PRECISION, NUMERIC_BUF_SIZE};

/// A fixed-precision decimal number with SQL `NUMERIC(p, s)` semantics.
///
/// The value is stored as a fixed-width big-endian two's-complement integer
/// equal to `value * 10^scale`; the precision bounds the number of
/// significant decimal digits and the scale counts the digits to the right
/// of the decimal point. `scale <= precision <= 38` always holds.
///
/// All fallible operations are exposed as `checked_*` methods. For
/// convenience, `Numeric` also overloads the standard arithmetic operators;
/// those panic when the checked counterpart would report an error, so prefer
/// the checked methods when operating on untrusted inputs.
///
/// ```
/// use decfix::Numeric;
///
/// let price: Numeric = "19.99".parse()?;
/// let quantity = Numeric::from(3);
/// assert_eq!((price * quantity).to_string(), "59.97");
/// # Ok::<_, decfix::ParseNumericError>(())
/// ```
#[derive(Clone, Copy)]
pub struct Numeric {
    pub(crate) mag: Mag,
    pub(crate) precision: u8,
    pub(crate) scale: u8,
}

impl Numeric {
    /// Constructs a numeric representing the number 0, as `NUMERIC(1, 0)`.
    pub fn zero() -> Numeric {
        Numeric::default()
    }

    /// Constructs a numeric from its serialized magnitude and domain.
    ///
    /// The magnitude is a big-endian two's-complement integer equal to
    /// `value * 10^scale`. Fails with [`NumericError::InvalidArgument`] when
    /// the domain violates `1 <= precision <= 38` or `scale <= precision`,
    /// and with [`NumericError::Overflow`] when the magnitude carries more
    /// significant digits than the precision admits.
    pub fn from_parts(
        bytes: [u8; NUMERIC_BUF_SIZE],
        precision: u8,
        scale: u8,
    ) -> Result<Numeric, NumericError> {
        if precision < 1 || precision > MAX_PRECISION || scale > precision {
            return Err(NumericError::InvalidArgument);
        }
        let mag = Magnitude(bytes);
        if coerce::overflows_precision(&mag, precision) {
            return Err(NumericError::Overflow);
        }
        Ok(Numeric {
            mag,
            precision,
            scale,
        })
    }

    /// Constructs a numeric whose invariants the caller has already
    /// established.
    pub(crate) fn from_parts_trusted(mag: Mag, precision: u8, scale: u8) -> Numeric {
        debug_assert!(precision >= 1 && precision <= MAX_PRECISION);
        debug_assert!(scale <= precision);
        Numeric {
            mag,
            precision,
            scale,
        }
    }

    /// The memory representation of the magnitude as a big-endian byte
    /// array. This layout is bit-exact for storage and interchange; the
    /// precision and scale are carried separately by the caller.
    pub fn to_be_bytes(&self) -> [u8; NUMERIC_BUF_SIZE] {
        self.mag.0
    }

    /// The number of significant decimal digits the value may hold.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The number of decimal digits to the right of the decimal point.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Reports whether the number is zero.
    pub fn is_zero(&self) -> bool {
        self.mag.is_zero()
    }

    /// Reports whether the number is less than zero.
    pub fn is_negative(&self) -> bool {
        self.mag.is_negative()
    }

    /// Reports whether the number is greater than or equal to zero.
    pub fn is_positive(&self) -> bool {
        !self.mag.is_negative()
    }

    pub(crate) fn mag_ref(&self) -> &Mag {
        &self.mag
    }

    /// Parses a decimal literal, also reporting whether the input was fully
    /// consumed.
    ///
    /// The literal accepts an optional leading sign, an optional decimal
    /// point, thousands-separator commas within the integer part, and
    /// leading whitespace. Trailing whitespace ends the literal; the digits
    /// cut off by it no longer count toward the scale, and the outcome is
    /// tagged [`DataStatus::NotFullyConsumed`].
    pub fn parse(s: &str) -> Result<(Numeric, DataStatus), ParseNumericError> {
        convert::parse_numeric(s)
    }

    /// Converts a double to a numeric coerced to the given precision and
    /// scale.
    ///
    /// NaN converts to zero and reports [`DataStatus::Truncated`]; infinite
    /// values and magnitudes beyond any representable domain fail with
    /// [`NumericError::Overflow`]; magnitudes below every representable
    /// domain degrade to zero. The digit sequence used is the shortest that
    /// round-trips the double, so a value like `0.1` converts exactly.
    pub fn from_f64(
        value: f64,
        precision: u8,
        scale: u8,
    ) -> Result<(Numeric, DataStatus), NumericError> {
        let (num, status) = convert::f64_to_num(value, scale)?;
        let (coerced, coerce_status) = num.coerce_to(precision, scale)?;
        let status = if status == DataStatus::Ok {
            coerce_status
        } else {
            status
        };
        Ok((coerced, status))
    }

    /// Like [`Numeric::from_f64`], for floats. The digit sequence is the
    /// shortest that round-trips the `f32`.
    pub fn from_f32(
        value: f32,
        precision: u8,
        scale: u8,
    ) -> Result<(Numeric, DataStatus), NumericError> {
        let (num, status) = convert::f32_to_num(value, scale)?;
        let (coerced, coerce_status) = num.coerce_to(precision, scale)?;
        let status = if status == DataStatus::Ok {
            coerce_status
        } else {
            status
        };
        Ok((coerced, status))
    }

    /// Converts the numeric to a double via its decimal digit string.
    ///
    /// The result carries ordinary binary floating-point rounding error,
    /// symmetric with parsing the equivalent decimal literal.
    pub fn to_f64(&self) -> f64 {
        convert::mag_to_f64(&self.mag, self.scale)
    }

    pub(crate) fn from_i64_natural(n: i64) -> Numeric {
        Numeric::from_parts_trusted(Mag::from_i64(n), convert::significant_digits(n), 0)
    }
}

impl Default for Numeric {
    fn default() -> Numeric {
        Numeric::from_parts_trusted(Mag::zero(), 1, 0)
    }
}

impl fmt::Debug for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let temp = convert::mag_to_dec_string(&self.mag);
        let bytes = temp.as_bytes();
        let temp_size = bytes.len();
        let scale = usize::from(self.scale);
        let mut buf = String::with_capacity(temp_size + 2);
        let mut found_first_non_zero = false;
        for i in 0..temp_size {
            if bytes[i] == b'-' {
                buf.push('-');
            }
            if i == temp_size - scale {
                buf.push('.');
            }
            if !found_first_non_zero && (b'1'..=b'9').contains(&bytes[i]) {
                found_first_non_zero = true;
            }
            // Keep significant digits, plus the zero just before the
            // decimal point so a pure fraction prints as 0.x.
            if found_first_non_zero || i >= temp_size - scale - 1 {
                buf.push(char::from(bytes[i]));
            }
        }
        f.write_str(&buf)
    }
}

impl FromStr for Numeric {
    type Err = ParseNumericError;

    fn from_str(s: &str) -> Result<Numeric, ParseNumericError> {
        convert::parse_numeric(s).map(|(num, _)| num)
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Numeric {}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Numeric {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        // Values that differ only in scale padding compare equal, so the
        // hash must see a normalized form: the integral digits without
        // leading zeros and the fractional digits without trailing zeros.
        let dec_str = convert::mag_to_dec_string(&self.mag);
        let digits = dec_str.trim_start_matches('-').as_bytes();
        let split = digits.len() - usize::from(self.scale);
        let mut integral = &digits[..split];
        while let Some((&b'0', rest)) = integral.split_first() {
            integral = rest;
        }
        let mut fraction = &digits[split..];
        while let Some((&b'0', rest)) = fraction.split_last() {
            fraction = rest;
        }
        self.mag.is_negative().hash(state);
        integral.hash(state);
        fraction.hash(state);
    }
}

impl Neg for Numeric {
    type Output = Numeric;

    /// Negates the numeric.
    ///
    /// Panics when [`Numeric::checked_neg`] would report an error.
    fn neg(self) -> Numeric {
        self.checked_neg().expect("numeric negation overflows")
    }
}

impl Add<Numeric> for Numeric {
    type Output = Numeric;

    /// Adds two numerics.
    ///
    /// Panics when [`Numeric::checked_add`] would report an error.
    fn add(self, rhs: Numeric) -> Numeric {
        self.checked_add(&rhs).expect("numeric addition overflows")
    }
}

impl Sub<Numeric> for Numeric {
    type Output = Numeric;

    /// Subtracts two numerics.
    ///
    /// Panics when [`Numeric::checked_sub`] would report an error.
    fn sub(self, rhs: Numeric) -> Numeric {
        self.checked_sub(&rhs)
            .expect("numeric subtraction overflows")
    }
}

impl Mul<Numeric> for Numeric {
    type Output = Numeric;

    /// Multiplies two numerics.
    ///
    /// Panics when [`Numeric::checked_mul`] would report an error.
    fn mul(self, rhs: Numeric) -> Numeric {
        self.checked_mul(&rhs)
            .expect("numeric multiplication overflows")
    }
}

impl Div<Numeric> for Numeric {
    type Output = Numeric;

    /// Divides two numerics.
    ///
    /// Panics when [`Numeric::checked_div`] would report an error, including
    /// on division by zero.
    fn div(self, rhs: Numeric) -> Numeric {
        self.checked_div(&rhs).expect("numeric division fails")
    }
}

macro_rules! from_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Numeric {
                fn from(n: $t) -> Numeric {
                    Numeric::from_i64_natural(i64::from(n))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! to_int {
    ($($t:ident),* $(,)?) => {
        paste::paste! {
            impl Numeric {
                $(
                    #[doc = "Converts the numeric to an `" $t "`, rounding the fractional part half away from zero."]
                    #[doc = ""]
                    #[doc = "Fails with [`NumericError::Overflow`] when the rounded value is out of range."]
                    pub fn [<try_to_ $t>](&self) -> Result<$t, NumericError> {
                        let n = convert::mag_to_i64(&self.mag, self.scale)?;
                        <$t>::try_from(n).map_err(|_| NumericError::Overflow)
                    }
                )*
            }

            $(
                impl TryFrom<&Numeric> for $t {
                    type Error = NumericError;

                    fn try_from(n: &Numeric) -> Result<$t, NumericError> {
                        n.[<try_to_ $t>]()
                    }
                }
            )*
        }
    };
}

to_int!(i8, i16, i32, i64);

impl TryFrom<f64> for Numeric {
    type Error = NumericError;

    /// Converts a double to a numeric at its natural precision and scale.
    fn try_from(value: f64) -> Result<Numeric, NumericError> {
        convert::f64_to_num(value, 0).map(|(num, _)| num)
    }
}

impl TryFrom<f32> for Numeric {
    type Error = NumericError;

    /// Converts a float to a numeric at its natural precision and scale.
    fn try_from(value: f32) -> Result<Numeric, NumericError> {
        convert::f32_to_num(value, 0).map(|(num, _)| num)
    }
}

impl From<Numeric> for f64 {
    fn from(n: Numeric) -> f64 {
        n.to_f64()
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for Numeric {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for Numeric {
    fn deserialize<D>(deserializer: D) -> Result<Numeric, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct NumericVisitor;

        impl<'de> serde::de::Visitor<'de> for NumericVisitor {
            type Value = Numeric;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal number literal")
            }

            fn visit_str<E>(self, v: &str) -> Result<Numeric, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(NumericVisitor)
    }
}

#[cfg(feature = "num-traits")]
#[cfg_attr(docsrs, doc(cfg(feature = "num-traits")))]
impl num_traits::Zero for Numeric {
    fn zero() -> Numeric {
        Numeric::zero()
    }

    fn is_zero(&self) -> bool {
        Numeric::is_zero(self)
    }
}

#[cfg(feature = "num-traits")]
#[cfg_attr(docsrs, doc(cfg(feature = "num-traits")))]
impl num_traits::One for Numeric {
    fn one() -> Numeric {
        Numeric::from(1)
    }
}
