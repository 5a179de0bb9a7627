// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Fixed-point numeric core for the [Solera](https://solera.trade) margin protocol client.
//!
//! The `solera-core` crate mirrors the settlement engine's integer arithmetic exactly:
//! 256-bit words, an 18-decimal fixed base, and an explicit rounding mode at every
//! division. It carries no protocol knowledge beyond the numeric conventions shared by
//! every Solera deployment, and it is the leaf dependency of the rest of the client.
//!
//! It supplies:
//!
//! - Full-precision `mul_div` over 256-bit words with 512-bit intermediates.
//! - Exact conversions between human-readable decimals and base-unit integers.
//! - Principal/balance (`par`/`wei`) conversions through per-market accrual indices.
//!
//! No code path in this crate touches binary floating point.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod convert;
pub mod math;

pub use convert::{
    MarketIndex, base_string_to_decimal, base_units_to_decimal, decimal_to_base_string,
    decimal_to_base_units, par_to_wei, wei_to_par,
};
pub use math::{BASE, BASE_DECIMALS, MathError, Rounding, SECONDS_IN_A_YEAR, div, mul_div, pow10};
