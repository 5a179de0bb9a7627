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

//! Unwind planning for expired borrows.
//!
//! Once a borrow passes its expiry timestamp anyone may close it against the
//! expiry autotrader at a liquidation spread that ramps in linearly after
//! expiry. [`plan_expiry_unwind`] walks the caller's collateral preference
//! order and emits one trade step per collateral market consumed, mirroring
//! the autotrader's own pricing so the plan settles exactly on chain.

use alloy::sol_types::SolValue;
use alloy_primitives::{Bytes, I256, Sign, U256};
use solera_core::math::{BASE, MathError, Rounding, div, mul_div};
use thiserror::Error;

use crate::{config::ExpiryConstants, types::MarketId};

/// Errors when planning the unwind of an expired borrow.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum UnwindError {
    /// The nominated market holds no debt to unwind.
    #[error("expired market balance is not a debt: {owed_wei} wei")]
    DebtNotNegative {
        /// The non-negative balance found.
        owed_wei: I256,
    },

    /// The borrow has not reached its expiry timestamp yet.
    #[error("borrow expires at {expiry_timestamp} but the block time is {block_timestamp}")]
    NotExpired {
        /// The current block timestamp.
        block_timestamp: u64,
        /// The borrow's expiry timestamp.
        expiry_timestamp: u32,
    },

    /// A market index fell outside the caller-supplied balance slices.
    #[error("market {market_id} is outside the supplied market data")]
    UnknownMarket {
        /// The out-of-range market.
        market_id: MarketId,
    },

    /// Arithmetic failure while pricing a step.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// A snapshot of an expired borrow and the market data needed to price it.
///
/// The per-market slices are indexed by [`MarketId`] and must all cover every
/// market named by `expired_market` and `collateral_preferences`.
#[derive(Clone, Copy, Debug)]
pub struct ExpiredPosition<'a> {
    /// The market with the expired negative balance.
    pub expired_market: MarketId,
    /// The expiry timestamp attached to the borrow.
    pub expiry_timestamp: u32,
    /// The current block timestamp.
    pub block_timestamp: u64,
    /// Collateral markets in the order they should be consumed.
    pub collateral_preferences: &'a [MarketId],
    /// Current wei balances of the expired account, per market.
    pub wei_balances: &'a [I256],
    /// Oracle prices, per market.
    pub prices: &'a [U256],
    /// Liquidation spread premiums scaled by the base, per market.
    pub spread_premiums: &'a [U256],
}

/// One trade against the expiry autotrader.
///
/// The primary market is the one whose balance the step zeroes out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnwindStep {
    /// The input market of the trade.
    pub primary_market: MarketId,
    /// The output market of the trade.
    pub secondary_market: MarketId,
}

/// The computed unwind: trade steps plus whatever debt the listed collateral
/// could not cover.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnwindPlan {
    /// Steps in execution order.
    pub steps: Vec<UnwindStep>,
    /// Debt remaining after all steps, as a non-positive wei balance.
    pub residual_owed_wei: I256,
}

/// Plans the sequence of expiry trades that closes an expired borrow.
///
/// Collateral markets are consumed in preference order. A market whose value
/// strictly exceeds the ramped owed value closes the debt in full with the
/// owed market as the trade input; otherwise the whole collateral balance is
/// sold and the remaining debt carries to the next preference.
///
/// # Errors
///
/// Returns an error when the expired balance is not a debt, the borrow has not
/// expired yet, a market index is out of range, or pricing arithmetic overflows.
pub fn plan_expiry_unwind(
    position: &ExpiredPosition<'_>,
    constants: &ExpiryConstants,
) -> Result<UnwindPlan, UnwindError> {
    let owed_balance = market_entry(position.wei_balances, position.expired_market)?;
    if owed_balance >= I256::ZERO {
        return Err(UnwindError::DebtNotNegative {
            owed_wei: owed_balance,
        });
    }
    if position.block_timestamp < u64::from(position.expiry_timestamp) {
        return Err(UnwindError::NotExpired {
            block_timestamp: position.block_timestamp,
            expiry_timestamp: position.expiry_timestamp,
        });
    }

    let owed_price = market_entry(position.prices, position.expired_market)?;
    let owed_premium = market_entry(position.spread_premiums, position.expired_market)?;

    let elapsed = position.block_timestamp - u64::from(position.expiry_timestamp);
    let ramp = div(
        U256::from(elapsed) * BASE,
        U256::from(constants.ramp_time),
        Rounding::Down,
    )?
    .min(BASE);

    let mut owed = owed_balance.unsigned_abs();
    let mut steps = Vec::new();

    for &held_market in position.collateral_preferences {
        let held_balance = market_entry(position.wei_balances, held_market)?;
        if held_balance <= I256::ZERO {
            continue;
        }

        let held_price = market_entry(position.prices, held_market)?;
        let held_premium = market_entry(position.spread_premiums, held_market)?;

        // spread = base * (1 + heldPremium) * (1 + owedPremium), ramped in
        let held_factor = BASE.checked_add(held_premium).ok_or(MathError::Overflow)?;
        let owed_factor = BASE.checked_add(owed_premium).ok_or(MathError::Overflow)?;
        let mut spread = mul_div(constants.spread, held_factor, BASE, Rounding::Down)?;
        spread = mul_div(spread, owed_factor, BASE, Rounding::Down)?;
        spread = mul_div(spread, ramp, BASE, Rounding::Down)?;
        let multiplier = BASE.checked_add(spread).ok_or(MathError::Overflow)?;

        let held_value = held_balance
            .unsigned_abs()
            .checked_mul(held_price)
            .ok_or(MathError::Overflow)?;
        let owed_raw = owed.checked_mul(owed_price).ok_or(MathError::Overflow)?;
        let owed_value = mul_div(owed_raw, multiplier, BASE, Rounding::Down)?;

        if held_value > owed_value {
            steps.push(UnwindStep {
                primary_market: position.expired_market,
                secondary_market: held_market,
            });
            owed = U256::ZERO;
        } else {
            steps.push(UnwindStep {
                primary_market: held_market,
                secondary_market: position.expired_market,
            });
            owed = mul_div(owed, owed_value - held_value, owed_value, Rounding::Down)?;
        }

        if owed.is_zero() {
            break;
        }
    }

    let residual_owed_wei = if owed.is_zero() {
        I256::ZERO
    } else {
        I256::checked_from_sign_and_abs(Sign::Negative, owed).ok_or(MathError::Overflow)?
    };

    Ok(UnwindPlan {
        steps,
        residual_owed_wei,
    })
}

/// Encodes the trade data the expiry autotrader expects for an unwind step.
#[must_use]
pub fn expiry_trade_data(owed_market: MarketId, expiry_timestamp: u32) -> Bytes {
    (U256::from(owed_market), expiry_timestamp).abi_encode().into()
}

/// Encodes the call data that asks the expiry contract to stamp a borrow with
/// an expiry `time_delta` seconds from now.
#[must_use]
pub fn set_expiry_call_data(market_id: MarketId, time_delta: u32) -> Bytes {
    (U256::from(market_id), time_delta).abi_encode().into()
}

fn market_entry<T: Copy>(entries: &[T], market_id: MarketId) -> Result<T, UnwindError> {
    entries
        .get(market_id as usize)
        .copied()
        .ok_or(UnwindError::UnknownMarket { market_id })
}
