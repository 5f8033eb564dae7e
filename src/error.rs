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

use std::error::Error;
use std::fmt;

/// An error raised by a numeric operation or conversion.
///
/// Arithmetic has no transient failure modes, so none of these errors are
/// retryable. Callers decide whether to surface or abort the enclosing
/// computation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NumericError {
    /// The result exceeds the maximum precision after rounding or truncation,
    /// or a conversion's magnitude exceeds the destination type's range.
    Overflow,
    /// The divisor's magnitude is zero.
    DivisionByZero,
    /// A malformed decimal string, or a precision/scale pair that violates
    /// `scale <= precision <= MAX_PRECISION`.
    InvalidArgument,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NumericError::Overflow => f.write_str("numeric value overflows its precision"),
            NumericError::DivisionByZero => f.write_str("numeric division by zero"),
            NumericError::InvalidArgument => f.write_str("invalid numeric argument"),
        }
    }
}

impl Error for NumericError {}

/// An error indicating that a string is not a valid numeric literal.
#[derive(Debug, Eq, PartialEq)]
pub struct ParseNumericError {
    pub(crate) kind: NumericError,
}

impl ParseNumericError {
    pub(crate) fn invalid() -> ParseNumericError {
        ParseNumericError {
            kind: NumericError::InvalidArgument,
        }
    }

    pub(crate) fn overflow() -> ParseNumericError {
        ParseNumericError {
            kind: NumericError::Overflow,
        }
    }

    /// Reports whether the parse failed because the literal carries more
    /// significant digits than the maximum precision, as opposed to being
    /// syntactically malformed.
    pub fn is_overflow(&self) -> bool {
        self.kind == NumericError::Overflow
    }
}

impl fmt::Display for ParseNumericError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            NumericError::Overflow => f.write_str("numeric literal exceeds maximum precision"),
            _ => f.write_str("invalid numeric syntax"),
        }
    }
}

impl Error for ParseNumericError {}

impl From<ParseNumericError> for NumericError {
    fn from(e: ParseNumericError) -> NumericError {
        e.kind
    }
}

/// The quality of a conversion or coercion result.
///
/// A lossy outcome is always reported; it is never silently dropped.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DataStatus {
    /// The result is exact.
    Ok,
    /// Digits were discarded to fit the destination precision or scale, or a
    /// NaN input was mapped to zero.
    Truncated,
    /// The source literal contained input beyond the converted prefix, such
    /// as trailing whitespace that ended the digits early.
    NotFullyConsumed,
}
