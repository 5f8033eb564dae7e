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

//! Scale and precision coercion.
//!
//! Arithmetic on two numerics first aligns them to a common scale by scaling
//! the operand with fewer fractional digits up by powers of ten. When exact
//! alignment would exceed the maximum precision, a lossy fallback coerces
//! both operands to the widest possible domain instead.

use std::cmp::Ordering;

use crate::convert::{dec_str_to_mag, mag_to_dec_string};
use crate::error::{DataStatus, NumericError};
use crate::magnitude::Mag;
use crate::tables::pow_of_ten;
use crate::value::Numeric;
use crate::MAX_PRECISION;

/// Reports whether `|mag|` is at least `10^precision`, i.e. whether the
/// value no longer fits a domain of the given precision.
pub(crate) fn overflows_precision(mag: &Mag, precision: u8) -> bool {
    let limit = pow_of_ten(u32::from(precision));
    if mag.is_negative() {
        let mut narg = *mag;
        narg.negate();
        narg.compare_pos(limit) != Ordering::Less
    } else {
        mag.compare_pos(limit) != Ordering::Less
    }
}

/// Returns the two operands coerced to a common scale and precision.
///
/// Matching scales only widen the precision to the larger of the two.
/// Otherwise the operand with the smaller scale is scaled up, growing its
/// precision by the scale difference; exceeding the maximum precision is an
/// overflow and the caller falls back to
/// [`prec_scale_when_overflow`].
pub(crate) fn common_prec_scale(
    dbv1: &Numeric,
    dbv2: &Numeric,
) -> Result<(Numeric, Numeric), NumericError> {
    let (prec1, scale1) = (dbv1.precision(), dbv1.scale());
    let (prec2, scale2) = (dbv2.precision(), dbv2.scale());

    if scale1 == scale2 {
        let cprec = prec1.max(prec2);
        return Ok((
            Numeric::from_parts_trusted(*dbv1.mag_ref(), cprec, scale1),
            Numeric::from_parts_trusted(*dbv2.mag_ref(), cprec, scale2),
        ));
    }

    if scale1 < scale2 {
        let scale_diff = scale2 - scale1;
        let prec1 = prec1 + scale_diff;
        if prec1 > MAX_PRECISION {
            return Err(NumericError::Overflow);
        }
        let mut temp = *dbv1.mag_ref();
        temp.scale_dec(u32::from(scale_diff))?;
        let cprec = prec1.max(prec2);
        Ok((
            Numeric::from_parts_trusted(temp, cprec, scale2),
            Numeric::from_parts_trusted(*dbv2.mag_ref(), cprec, scale2),
        ))
    } else {
        let scale_diff = scale1 - scale2;
        let prec2 = prec2 + scale_diff;
        if prec2 > MAX_PRECISION {
            return Err(NumericError::Overflow);
        }
        let mut temp = *dbv2.mag_ref();
        temp.scale_dec(u32::from(scale_diff))?;
        let cprec = prec1.max(prec2);
        Ok((
            Numeric::from_parts_trusted(*dbv1.mag_ref(), cprec, scale1),
            Numeric::from_parts_trusted(temp, cprec, scale1),
        ))
    }
}

/// The lossy fallback used when exact alignment overflows: both operands are
/// independently coerced, with rounding, to the maximum precision at the
/// larger of the two scales.
pub(crate) fn prec_scale_when_overflow(
    dbv1: &Numeric,
    dbv2: &Numeric,
) -> Result<(Numeric, Numeric), NumericError> {
    let scale = dbv1.scale().max(dbv2.scale());
    let (common1, _) = coerce_num_to_num(dbv1, MAX_PRECISION, scale)?;
    let (common2, _) = coerce_num_to_num(dbv2, MAX_PRECISION, scale)?;
    Ok((common1, common2))
}

/// Coerces a numeric to another precision and scale via its decimal string.
///
/// Trailing zeros are appended when the destination scale grows; trailing
/// digits are truncated when it shrinks, rounding half up on the magnitude
/// (half away from zero overall, since a negative source is coerced as its
/// positive part and negated afterward). The result fails with `Overflow`
/// when significant digits remain outside the destination precision, or when
/// rounding an all-nines result would carry out of it.
pub(crate) fn coerce_num_to_num(
    src: &Numeric,
    dest_prec: u8,
    dest_scale: u8,
) -> Result<(Numeric, DataStatus), NumericError> {
    if dest_prec < 1 || dest_prec > MAX_PRECISION || dest_scale > dest_prec {
        return Err(NumericError::InvalidArgument);
    }

    // Trivial case: the magnitude transfers unchanged.
    if src.precision() <= dest_prec && src.scale() == dest_scale {
        return Ok((
            Numeric::from_parts_trusted(*src.mag_ref(), dest_prec, dest_scale),
            DataStatus::Ok,
        ));
    }

    // Coerce the positive part so that rounding is always done in the same
    // direction.
    let negate_answer = src.mag_ref().is_negative();
    let mut work = *src.mag_ref();
    if negate_answer {
        work.negate();
    }

    let mut num_string = mag_to_dec_string(&work);
    let mut round_up = false;
    let mut status = DataStatus::Ok;
    if src.scale() < dest_scale {
        let scale_diff = usize::from(dest_scale - src.scale());
        num_string.push_str(&"0".repeat(scale_diff));
    } else if dest_scale < src.scale() {
        let scale_diff = usize::from(src.scale() - dest_scale);
        let cut = num_string.len() - scale_diff;
        if matches!(num_string.as_bytes()[cut], b'5'..=b'9') {
            round_up = true;
        }
        if num_string.as_bytes()[cut..].iter().any(|&b| b != b'0') {
            status = DataStatus::Truncated;
        }
        num_string.truncate(cut);
    }

    // The scaled digits fit the destination only if nothing significant
    // remains left of the last `dest_prec` places.
    let len = num_string.len();
    for &b in &num_string.as_bytes()[..len - usize::from(dest_prec)] {
        if b != b'0' {
            return Err(NumericError::Overflow);
        }
    }

    // Rounding up overflows only when every kept digit is a nine.
    if round_up {
        let is_all_nine = num_string.as_bytes()[len - usize::from(dest_prec)..]
            .iter()
            .all(|&b| b == b'9');
        if is_all_nine {
            return Err(NumericError::Overflow);
        }
    }

    let mut dest = dec_str_to_mag(&num_string);
    if round_up {
        dest.increase();
    }
    if negate_answer {
        dest.negate();
    }

    Ok((
        Numeric::from_parts_trusted(dest, dest_prec, dest_scale),
        status,
    ))
}
