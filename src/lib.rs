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

//! decfix is a fixed-precision decimal arithmetic library for Rust.
//!
//! # Introduction
//!
//! Binary floating-point numbers can only approximate common decimal
//! numbers. The value 0.1, for example, would need an infinitely recurring
//! binary fraction, so binary floating-point cannot be used for financial
//! calculations or any calculation whose result must match one computed by
//! hand.
//!
//! decfix implements exact decimal arithmetic under SQL `NUMERIC(p, s)`
//! semantics: every value is an integer scaled by a power of ten, stored in
//! a fixed-width buffer, and every operation is governed by an explicit
//! precision and scale contract. There is no heap allocation and no
//! arbitrary-precision fallback; a result that cannot fit the maximum
//! precision of 38 decimal digits reports an overflow instead of silently
//! losing digits.
//!
//! The main types exposed by this library are as follows:
//!
//!  * [`Numeric`], a fixed-precision decimal number holding up to 38
//!    significant digits, along with arithmetic, comparison, rounding, and
//!    conversion functions. Fallible operations are exposed as `checked_*`
//!    methods; the standard operators are overloaded for convenience and
//!    panic on overflow.
//!
//!  * [`NumericError`], the structured error raised by operations:
//!    overflow, division by zero, or an invalid argument.
//!
//!  * [`DataStatus`], a tag attached to conversion and coercion results
//!    that distinguishes an exact outcome from one that was truncated or
//!    that left input unconsumed.
//!
//! # Examples
//!
//! The following example demonstrates the basic usage of the library:
//!
//! ```
//! # use std::error::Error;
//! use decfix::Numeric;
//!
//! let x: Numeric = "0.1".parse()?;
//! let y: Numeric = "0.2".parse()?;
//! let z: Numeric = "0.3".parse()?;
//!
//! assert_eq!(x + y, z);
//! assert_eq!((x + y).to_string(), "0.3");
//!
//! # Ok::<_, Box<dyn Error>>(())
//! ```

#![deny(missing_debug_implementations, missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use static_assertions::const_assert;

mod arith;
mod coerce;
mod convert;
mod error;
mod macros;
mod magnitude;
mod tables;
mod value;

pub use error::{DataStatus, NumericError, ParseNumericError};
pub use value::Numeric;

/// The width in bytes of a numeric magnitude buffer.
pub const NUMERIC_BUF_SIZE: usize = 16;

/// The maximum number of significant decimal digits a numeric may hold.
pub const MAX_PRECISION: u8 = 38;

/// The minimum scale a division result carries, so that dividing two
/// integers still yields a fractional quotient.
pub const DEFAULT_DIVISION_SCALE: u8 = 9;

pub(crate) const LONG_NUMERIC_BUF_SIZE: usize = 2 * NUMERIC_BUF_SIZE;
pub(crate) const TWICE_MAX_PRECISION: usize = 2 * MAX_PRECISION as usize;

// Every magnitude within the maximum precision must fit the buffer as a
// signed two's-complement integer.
const_assert!(10u128.pow(MAX_PRECISION as u32) < 1u128 << (NUMERIC_BUF_SIZE as u32 * 8 - 1));
const_assert!(DEFAULT_DIVISION_SCALE <= MAX_PRECISION);
