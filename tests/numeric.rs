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
use std::error::Error;
use std::hash::{Hash, Hasher};

use decfix::{numeric, DataStatus, Numeric, NumericError};

fn be_bytes(n: i64) -> [u8; 16] {
    let mut bytes = if n < 0 { [0xff; 16] } else { [0; 16] };
    bytes[8..].copy_from_slice(&n.to_be_bytes());
    bytes
}

#[derive(Default)]
struct ValidatingHasher {
    bytes: Vec<u8>,
}

impl Hasher for ValidatingHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes)
    }

    fn finish(&self) -> u64 {
        unimplemented!()
    }
}

fn hash_data<H>(h: H) -> Vec<u8>
where
    H: Hash,
{
    let mut hasher = ValidatingHasher::default();
    h.hash(&mut hasher);
    hasher.bytes
}

const ROUND_TRIP_TESTS: &[(&str, &str)] = &[
    ("0", "0"),
    ("1", "1"),
    ("-1", "-1"),
    ("123.456", "123.456"),
    ("-0.001", "-0.001"),
    ("0.1", "0.1"),
    (".5", "0.5"),
    ("0.00", "0.00"),
    ("007.50", "7.50"),
    ("+3.14", "3.14"),
    ("12,345.67", "12345.67"),
    ("  42  ", "42"),
    (
        "99999999999999999999999999999999999999",
        "99999999999999999999999999999999999999",
    ),
    (
        "-99999999999999999999999999999999999999",
        "-99999999999999999999999999999999999999",
    ),
];

#[test]
fn test_parse_display_round_trip() -> Result<(), Box<dyn Error>> {
    for (input, expected) in ROUND_TRIP_TESTS {
        let n: Numeric = input.parse()?;
        assert_eq!(n.to_string(), *expected, "round trip of {:?}", input);
    }
    Ok(())
}

#[test]
fn test_parse_syntax_errors() {
    for input in &[
        "", "   ", ".", "+", "--5", "+-5", "1.2.3", "12a", "1 2", "1.2,3", "abc", "1.5 .",
    ] {
        let res = input.parse::<Numeric>();
        assert!(res.is_err(), "{:?} should not parse", input);
        assert!(!res.unwrap_err().is_overflow());
    }
}

#[test]
fn test_parse_overflow() {
    // A 39-digit literal exceeds the maximum precision; the 38-digit
    // maximum parses.
    let wide = "1".repeat(39);
    let err = wide.parse::<Numeric>().unwrap_err();
    assert!(err.is_overflow());
    assert!("1".repeat(38).parse::<Numeric>().is_ok());
}

#[test]
fn test_parse_trailing_whitespace_scale() -> Result<(), Box<dyn Error>> {
    // Trailing spaces end the literal; each space cuts one digit of scale.
    let (n, status) = Numeric::parse("1.5  ")?;
    assert_eq!(status, DataStatus::NotFullyConsumed);
    assert_eq!(n.scale(), 1);
    assert_eq!(n.to_string(), "1.5");

    let (n, status) = Numeric::parse("42")?;
    assert_eq!(status, DataStatus::Ok);
    assert_eq!(n.to_string(), "42");
    Ok(())
}

const ADDITION_TESTS: &[(&str, &str, &str)] = &[
    ("1.1", "2.02", "3.12"),
    ("5", "5", "10"),
    ("-1.5", "0.5", "-1.0"),
    ("0.1", "0.2", "0.3"),
    ("99.9", "0.1", "100.0"),
    ("-3", "3", "0"),
];

#[test]
fn test_add() -> Result<(), Box<dyn Error>> {
    for (lhs, rhs, expected) in ADDITION_TESTS {
        let lhs: Numeric = lhs.parse()?;
        let rhs: Numeric = rhs.parse()?;
        assert_eq!(lhs.checked_add(&rhs)?.to_string(), *expected);
    }
    Ok(())
}

#[test]
fn test_add_sub_inverse() -> Result<(), Box<dyn Error>> {
    for (lhs, rhs, _) in ADDITION_TESTS {
        let a: Numeric = lhs.parse()?;
        let b: Numeric = rhs.parse()?;
        let sum = a.checked_add(&b)?;
        assert_eq!(sum.checked_sub(&b)?, a, "({} + {}) - {}", a, b, b);
    }
    Ok(())
}

#[test]
fn test_add_overflow() -> Result<(), Box<dyn Error>> {
    let max: Numeric = "9".repeat(38).parse()?;
    let one = Numeric::from(1);
    assert_eq!(max.checked_add(&one), Err(NumericError::Overflow));
    Ok(())
}

#[test]
fn test_add_lossy_fallback() -> Result<(), Box<dyn Error>> {
    // Aligning a NUMERIC(38, 0) with a NUMERIC(2, 2) would need precision
    // 40, so both operands fall back to the widest domain at the common
    // scale; the claimed precision is pessimistic and the digits still fit.
    let a = Numeric::from_parts(be_bytes(5), 38, 0)?;
    let b: Numeric = "0.25".parse()?;
    assert_eq!(a.checked_add(&b)?.to_string(), "5.25");
    Ok(())
}

#[test]
fn test_mul() -> Result<(), Box<dyn Error>> {
    let cases: &[(&str, &str, &str)] = &[
        ("1.5", "1.5", "2.25"),
        ("19.99", "3", "59.97"),
        ("-2.5", "4", "-10.0"),
        ("0", "123.45", "0.00"),
        ("9999999999", "9999999999", "99999999980000000001"),
    ];
    for (lhs, rhs, expected) in cases {
        let lhs: Numeric = lhs.parse()?;
        let rhs: Numeric = rhs.parse()?;
        assert_eq!(lhs.checked_mul(&rhs)?.to_string(), *expected);
    }
    Ok(())
}

#[test]
fn test_mul_precision_growth() -> Result<(), Box<dyn Error>> {
    // Two maximal NUMERIC(20, 0) values: the product needs 40 digits, which
    // no domain can hold. The result is an overflow, never a silently
    // wrapped value.
    let max20: Numeric = "9".repeat(20).parse()?;
    assert_eq!(max20.checked_mul(&max20), Err(NumericError::Overflow));

    let pow19: Numeric = format!("1{}", "0".repeat(19)).parse()?;
    assert_eq!(pow19.checked_mul(&pow19), Err(NumericError::Overflow));
    Ok(())
}

#[test]
fn test_div() -> Result<(), Box<dyn Error>> {
    let cases: &[(&str, &str, &str)] = &[
        // Integer division still yields a fractional result at the default
        // division scale.
        ("1", "3", "0.333333333"),
        ("2", "3", "0.666666667"),
        ("5", "2", "2.500000000"),
        ("-5", "2", "-2.500000000"),
        ("1", "0.5", "2.000000000"),
        ("7.0", "2", "3.500000000"),
        ("0", "5", "0.000000000"),
        ("10.000000000", "4", "2.500000000"),
    ];
    for (lhs, rhs, expected) in cases {
        let lhs: Numeric = lhs.parse()?;
        let rhs: Numeric = rhs.parse()?;
        assert_eq!(
            lhs.checked_div(&rhs)?.to_string(),
            *expected,
            "{} / {}",
            lhs,
            rhs
        );
    }
    Ok(())
}

#[test]
fn test_div_by_zero() -> Result<(), Box<dyn Error>> {
    let one = Numeric::from(1);
    let zero = Numeric::zero();
    assert_eq!(one.checked_div(&zero), Err(NumericError::DivisionByZero));
    assert_eq!(zero.checked_div(&zero), Err(NumericError::DivisionByZero));
    Ok(())
}

#[test]
fn test_div_rounds_half_away_from_zero() -> Result<(), Box<dyn Error>> {
    // 5 / 2 carried to scale zero rounds away from zero in both
    // directions.
    let five: Numeric = "5".parse()?;
    let neg_five: Numeric = "-5".parse()?;
    let two: Numeric = "2".parse()?;

    let (q, _) = five.checked_div(&two)?.coerce_to(10, 0)?;
    assert_eq!(q.to_string(), "3");
    let (q, _) = neg_five.checked_div(&two)?.coerce_to(10, 0)?;
    assert_eq!(q.to_string(), "-3");
    Ok(())
}

const ORDERING_TESTS: &[(&str, &str, Ordering)] = &[
    ("1.2", "1.2", Ordering::Equal),
    ("1.2", "1.200", Ordering::Equal),
    ("1", "2", Ordering::Less),
    ("2", "1", Ordering::Greater),
    ("-1", "1", Ordering::Less),
    ("-2", "-1", Ordering::Less),
    ("-1.5", "-1.25", Ordering::Less),
    ("0", "-0.001", Ordering::Greater),
    ("10", "9.999999999", Ordering::Greater),
];

#[test]
fn test_compare() -> Result<(), Box<dyn Error>> {
    for (lhs, rhs, expected) in ORDERING_TESTS {
        let lhs: Numeric = lhs.parse()?;
        let rhs: Numeric = rhs.parse()?;
        assert_eq!(lhs.cmp(&rhs), *expected, "cmp({}, {})", lhs, rhs);

        if lhs == rhs {
            assert_eq!(hash_data(lhs), hash_data(rhs), "{} and {} must hash alike", lhs, rhs);
        } else {
            assert_ne!(hash_data(lhs), hash_data(rhs), "{} and {} must hash apart", lhs, rhs);
        }
    }
    Ok(())
}

#[test]
fn test_compare_agrees_with_doubles() -> Result<(), Box<dyn Error>> {
    let values = ["-12.5", "-1", "0", "0.25", "1", "2.125", "300.5"];
    for lhs in &values {
        for rhs in &values {
            let a: Numeric = lhs.parse()?;
            let b: Numeric = rhs.parse()?;
            let fa = a.to_f64();
            let fb = b.to_f64();
            assert_eq!(
                a.cmp(&b),
                fa.partial_cmp(&fb).unwrap(),
                "cmp({}, {})",
                lhs,
                rhs
            );
        }
    }
    Ok(())
}

#[test]
fn test_compare_wide_domains() -> Result<(), Box<dyn Error>> {
    // Aligning these two would need precision 43; the comparison instead
    // splits each operand into integral and fractional parts and never
    // loses precision.
    let a: Numeric = "12345678901234567890123456789012345.67".parse()?;
    let b: Numeric = "123456.78901234567890".parse()?;
    assert_eq!(a.cmp(&b), Ordering::Greater);
    assert_eq!(b.cmp(&a), Ordering::Less);

    // Equal integral parts force the fractional comparison.
    let c = Numeric::from_parts(be_bytes(12345), 38, 2)?; // 123.45
    let d: Numeric = "123.450000001".parse()?;
    assert_eq!(c.cmp(&d), Ordering::Less);
    assert_eq!(d.cmp(&c), Ordering::Greater);
    let e: Numeric = "123.450000000".parse()?;
    assert_eq!(c.cmp(&e), Ordering::Equal);
    Ok(())
}

#[test]
fn test_coerce() -> Result<(), Box<dyn Error>> {
    let n: Numeric = "1.5".parse()?;
    let (padded, status) = n.coerce_to(5, 3)?;
    assert_eq!(padded.to_string(), "1.500");
    assert_eq!(status, DataStatus::Ok);

    let n: Numeric = "1.25".parse()?;
    let (rounded, status) = n.coerce_to(2, 1)?;
    assert_eq!(rounded.to_string(), "1.3");
    assert_eq!(status, DataStatus::Truncated);

    let n: Numeric = "-1.25".parse()?;
    let (rounded, _) = n.coerce_to(2, 1)?;
    assert_eq!(rounded.to_string(), "-1.3");

    let n: Numeric = "123.45".parse()?;
    let (rounded, _) = n.coerce_to(4, 1)?;
    assert_eq!(rounded.to_string(), "123.5");
    assert_eq!(n.coerce_to(3, 1), Err(NumericError::Overflow));

    // Rounding an all-nines value carries out of the destination precision.
    let n: Numeric = "99.99".parse()?;
    assert_eq!(n.coerce_to(2, 0), Err(NumericError::Overflow));
    let (carried, _) = n.coerce_to(4, 0)?;
    assert_eq!(carried.to_string(), "100");

    assert_eq!(n.coerce_to(0, 0), Err(NumericError::InvalidArgument));
    assert_eq!(n.coerce_to(10, 11), Err(NumericError::InvalidArgument));
    Ok(())
}

#[test]
fn test_from_parts_rejects_bad_domains() {
    assert_eq!(
        Numeric::from_parts(be_bytes(1), 0, 0),
        Err(NumericError::InvalidArgument)
    );
    assert_eq!(
        Numeric::from_parts(be_bytes(1), 39, 0),
        Err(NumericError::InvalidArgument)
    );
    assert_eq!(
        Numeric::from_parts(be_bytes(1), 5, 6),
        Err(NumericError::InvalidArgument)
    );
    // 1000 carries four significant digits.
    assert_eq!(
        Numeric::from_parts(be_bytes(1000), 3, 0),
        Err(NumericError::Overflow)
    );
}

#[test]
fn test_negate_most_negative_magnitude() {
    // The most-negative buffer value has no positive counterpart and more
    // significant digits than any domain admits; it is rejected outright.
    let mut bytes = [0u8; 16];
    bytes[0] = 0x80;
    assert_eq!(
        Numeric::from_parts(bytes, 38, 0),
        Err(NumericError::Overflow)
    );
}

#[test]
fn test_neg_and_abs() -> Result<(), Box<dyn Error>> {
    let n: Numeric = "-3.5".parse()?;
    assert_eq!(n.abs().to_string(), "3.5");
    assert_eq!(n.checked_neg()?.to_string(), "3.5");
    assert_eq!((-n).to_string(), "3.5");
    assert!(n.is_negative());
    assert!(!n.is_positive());
    assert!(n.abs().is_positive());
    Ok(())
}

#[test]
fn test_increase() -> Result<(), Box<dyn Error>> {
    let mut n: Numeric = "9.9".parse()?;
    n.increase()?;
    assert_eq!(n.to_string(), "10.0");
    assert_eq!(n.precision(), 3);
    Ok(())
}

#[test]
fn test_fraction_part() -> Result<(), Box<dyn Error>> {
    let n: Numeric = "2.00".parse()?;
    assert!(n.is_fraction_part_zero());
    let n: Numeric = "2.01".parse()?;
    assert!(!n.is_fraction_part_zero());
    Ok(())
}

#[test]
fn test_int_conversions() -> Result<(), Box<dyn Error>> {
    let n = Numeric::from(i64::MAX);
    assert_eq!(n.to_string(), "9223372036854775807");
    assert_eq!(n.precision(), 19);
    assert_eq!(n.try_to_i64()?, i64::MAX);

    // The fractional part rounds half away from zero.
    assert_eq!("123.456".parse::<Numeric>()?.try_to_i64()?, 123);
    assert_eq!("123.5".parse::<Numeric>()?.try_to_i64()?, 124);
    assert_eq!("-123.5".parse::<Numeric>()?.try_to_i64()?, -124);
    assert_eq!("2.5".parse::<Numeric>()?.try_to_i64()?, 3);

    assert_eq!("127".parse::<Numeric>()?.try_to_i8()?, 127);
    assert_eq!(
        "128".parse::<Numeric>()?.try_to_i8(),
        Err(NumericError::Overflow)
    );
    assert_eq!(
        "9999999999".parse::<Numeric>()?.try_to_i32(),
        Err(NumericError::Overflow)
    );
    assert_eq!(
        "9".repeat(38).parse::<Numeric>()?.try_to_i64(),
        Err(NumericError::Overflow)
    );

    assert_eq!(i64::try_from(&"42".parse::<Numeric>()?)?, 42);
    Ok(())
}

#[test]
fn test_float_conversions() -> Result<(), Box<dyn Error>> {
    // The digit sequence is the shortest exact decimal for the double, so
    // 0.1 converts exactly rather than as 0.1000000000000000055511151231.
    let (n, status) = Numeric::from_f64(0.1, 1, 1)?;
    assert_eq!(n.to_string(), "0.1");
    assert_eq!(status, DataStatus::Ok);

    let n = Numeric::try_from(123.445)?;
    assert_eq!(n.to_string(), "123.445");

    let n = Numeric::try_from(-2.5f32)?;
    assert_eq!(n.to_string(), "-2.5");

    // NaN degrades to zero and the loss is reported; infinities overflow.
    let (n, status) = Numeric::from_f64(f64::NAN, 5, 2)?;
    assert!(n.is_zero());
    assert_eq!(n.to_string(), "0.00");
    assert_eq!(status, DataStatus::Truncated);
    assert_eq!(
        Numeric::from_f64(f64::INFINITY, 5, 2),
        Err(NumericError::Overflow)
    );
    assert_eq!(Numeric::from_f64(1e39, 38, 0), Err(NumericError::Overflow));
    let (n, status) = Numeric::from_f64(1e-39, 5, 2)?;
    assert!(n.is_zero());
    assert_eq!(status, DataStatus::Truncated);

    let n: Numeric = "123.456".parse()?;
    assert!((n.to_f64() - 123.456).abs() < 1e-9);
    assert!((f64::from(n) - 123.456).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_wire_round_trip() -> Result<(), Box<dyn Error>> {
    let n: Numeric = "-12.34".parse()?;
    let restored = Numeric::from_parts(n.to_be_bytes(), n.precision(), n.scale())?;
    assert_eq!(restored, n);
    assert_eq!(restored.to_string(), "-12.34");
    Ok(())
}

#[test]
fn test_operator_overloading() -> Result<(), Box<dyn Error>> {
    let a: Numeric = "1.5".parse()?;
    let b: Numeric = "0.5".parse()?;
    assert_eq!((a + b).to_string(), "2.0");
    assert_eq!((a - b).to_string(), "1.0");
    assert_eq!((a * b).to_string(), "0.75");
    assert_eq!((a / b).to_string(), "3.000000000");
    assert_eq!((-a).to_string(), "-1.5");
    Ok(())
}

#[test]
fn test_numeric_macro() {
    assert_eq!(numeric!(1.753).to_string(), "1.753");
    assert!(numeric!(0).is_zero());
    assert!(numeric!(-0.1).is_negative());
}

#[test]
fn test_zero_and_default() {
    let zero = Numeric::zero();
    assert!(zero.is_zero());
    assert!(!zero.is_negative());
    assert_eq!(zero.to_string(), "0");
    assert_eq!(zero, Numeric::default());
}
