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

//! Exact conversions between human-readable decimals, base-unit integers, and
//! principal/balance representations.
//!
//! Protocol balances exist in two forms: `wei` is the token amount held right now,
//! while `par` is the interest-adjusted principal the settlement engine actually
//! stores. The two are related through per-market accrual indices which only ever
//! grow. Conversions here reproduce the engine's rounding exactly: credits round
//! against the account (down), debts round against the account (up).

use alloy_primitives::{I256, Sign, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{BASE, BASE_DECIMALS, MathError, Rounding, mul_div, pow10};

/// Errors returned by value conversions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// A negative decimal was supplied where only non-negative values encode.
    #[error("negative value cannot be encoded as base units: {value}")]
    Negative {
        /// The offending input value.
        value: Decimal,
    },
    /// The decimal carries more fractional digits than the fixed base holds.
    #[error("precision loss: {value} exceeds {BASE_DECIMALS} fractional digits")]
    PrecisionLoss {
        /// The offending input value.
        value: Decimal,
    },
    /// The integer is too large to represent as a decimal.
    #[error("value out of range for decimal conversion: {value}")]
    OutOfRange {
        /// The offending input value.
        value: U256,
    },
    /// The string is not a base-10 unsigned integer.
    #[error("invalid numeric string: '{input}'")]
    InvalidNumeric {
        /// The rejected input.
        input: String,
    },
    /// An underlying fixed-point operation failed.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// A market's interest accrual indices, scaled by the fixed base.
///
/// Both indices start at `1e18` when a market is created and grow monotonically
/// as interest accrues.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MarketIndex {
    /// Accrual multiplier applied to borrowed principal.
    pub borrow: U256,
    /// Accrual multiplier applied to supplied principal.
    pub supply: U256,
}

impl MarketIndex {
    /// Creates a new [`MarketIndex`] instance.
    #[must_use]
    pub const fn new(borrow: U256, supply: U256) -> Self {
        Self { borrow, supply }
    }
}

/// Encodes a non-negative decimal as an exact base-unit integer.
///
/// # Errors
///
/// Returns an error if the value is negative or carries more than 18 significant
/// fractional digits; values are never silently truncated.
pub fn decimal_to_base_units(value: Decimal) -> Result<U256, ConvertError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConvertError::Negative { value });
    }

    let normalized = value.normalize();
    let scale = normalized.scale();
    if scale > BASE_DECIMALS {
        return Err(ConvertError::PrecisionLoss { value });
    }

    let mantissa = U256::from(normalized.mantissa().unsigned_abs());
    let scaled = mantissa
        .checked_mul(pow10(BASE_DECIMALS - scale)?)
        .ok_or(MathError::Overflow)?;
    Ok(scaled)
}

/// Decodes a base-unit integer back into a decimal.
///
/// # Errors
///
/// Returns an error if the value exceeds the representable decimal range.
pub fn base_units_to_decimal(value: U256) -> Result<Decimal, ConvertError> {
    let raw = i128::try_from(value).map_err(|_| ConvertError::OutOfRange { value })?;
    let decimal = Decimal::try_from_i128_with_scale(raw, BASE_DECIMALS)
        .map_err(|_| ConvertError::OutOfRange { value })?;
    Ok(decimal.normalize())
}

/// Encodes a non-negative decimal as a base-10 base-unit string for wire payloads.
///
/// # Errors
///
/// Returns an error under the same conditions as [`decimal_to_base_units`].
pub fn decimal_to_base_string(value: Decimal) -> Result<String, ConvertError> {
    Ok(decimal_to_base_units(value)?.to_string())
}

/// Parses a base-10 base-unit string back into a decimal.
///
/// # Errors
///
/// Returns an error if the string is not an unsigned base-10 integer or the value
/// exceeds the representable decimal range.
pub fn base_string_to_decimal(input: &str) -> Result<Decimal, ConvertError> {
    let value = U256::from_str_radix(input, 10).map_err(|_| ConvertError::InvalidNumeric {
        input: input.to_string(),
    })?;
    base_units_to_decimal(value)
}

/// Converts interest-adjusted principal (`par`) into a present token amount (`wei`).
///
/// Non-negative principal converts through the supply index rounding down; negative
/// principal converts through the borrow index rounding up, so debt never rounds in
/// the account's favor.
///
/// # Errors
///
/// Returns an error on 256-bit overflow.
pub fn par_to_wei(par: I256, index: &MarketIndex) -> Result<I256, ConvertError> {
    let (sign, magnitude) = par.into_sign_and_abs();
    match sign {
        Sign::Positive => {
            let wei = mul_div(magnitude, index.supply, BASE, Rounding::Down)?;
            signed_from_abs(Sign::Positive, wei)
        }
        Sign::Negative => {
            let wei = mul_div(magnitude, index.borrow, BASE, Rounding::Up)?;
            signed_from_abs(Sign::Negative, wei)
        }
    }
}

/// Converts a present token amount (`wei`) into interest-adjusted principal (`par`).
///
/// The inverse of [`par_to_wei`] with the same index/rounding selection; the pair
/// round-trips exactly whenever the forward product has no remainder at the base.
///
/// # Errors
///
/// Returns an error on 256-bit overflow.
pub fn wei_to_par(wei: I256, index: &MarketIndex) -> Result<I256, ConvertError> {
    let (sign, magnitude) = wei.into_sign_and_abs();
    match sign {
        Sign::Positive => {
            let par = mul_div(magnitude, BASE, index.supply, Rounding::Down)?;
            signed_from_abs(Sign::Positive, par)
        }
        Sign::Negative => {
            let par = mul_div(magnitude, BASE, index.borrow, Rounding::Up)?;
            signed_from_abs(Sign::Negative, par)
        }
    }
}

fn signed_from_abs(sign: Sign, magnitude: U256) -> Result<I256, ConvertError> {
    I256::checked_from_sign_and_abs(sign, magnitude)
        .ok_or(ConvertError::Math(MathError::Overflow))
}
