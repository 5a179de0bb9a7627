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

//! Model types shared across the Solera client.
//!
//! Account references identify protocol sub-accounts as an `(owner, number)` pair;
//! owners are parsed 20-byte addresses, so reference equality is byte equality and
//! hex letter-casing of the input can never split one logical account in two.

use std::fmt::{Display, Formatter};

use alloy_primitives::{Address, I256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solera_core::{
    convert::{ConvertError, base_units_to_decimal},
    math::{MathError, SECONDS_IN_A_YEAR},
};
use strum::{Display, EnumIter, EnumString};

/// Identifies a listed market; doubles as the position into caller-supplied
/// per-market balance, price, and premium slices.
pub type MarketId = u32;

/// A reference to a protocol sub-account.
#[derive(Clone, Copy, Debug, Hash, PartialOrd, PartialEq, Ord, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    /// The owning address.
    pub owner: Address,
    /// The sub-account number under the owner (commonly a random 256-bit salt).
    pub number: U256,
}

impl AccountRef {
    /// Creates a new [`AccountRef`] instance.
    #[must_use]
    pub const fn new(owner: Address, number: U256) -> Self {
        Self { owner, number }
    }
}

impl Display for AccountRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.owner, self.number)
    }
}

/// The kind of an operation action, with its wire discriminant.
#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    PartialOrd,
    PartialEq,
    Ord,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum ActionType {
    /// Supply tokens into an account.
    Deposit = 0,
    /// Remove tokens from an account.
    Withdraw = 1,
    /// Move balance between two accounts.
    Transfer = 2,
    /// Acquire a fixed maker amount through an exchange wrapper.
    Buy = 3,
    /// Dispose of a fixed taker amount through an exchange wrapper.
    Sell = 4,
    /// Exchange balances with another account through an auto-trader contract.
    Trade = 5,
    /// Seize collateral from an undercollateralized account.
    Liquidate = 6,
    /// Absorb an insolvent account's remaining debt.
    Vaporize = 7,
    /// Invoke an external callee with arbitrary data.
    Call = 8,
}

impl ActionType {
    /// The numeric wire encoding of this action type.
    #[must_use]
    pub const fn wire_code(self) -> u8 {
        self as u8
    }
}

/// Whether an amount is denominated in present tokens or interest-adjusted principal.
#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    PartialOrd,
    PartialEq,
    Ord,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum AmountDenomination {
    /// Present token amount.
    Wei = 0,
    /// Interest-adjusted principal.
    Par = 1,
}

/// Whether an amount adjusts a balance or pins it to a target.
#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    PartialOrd,
    PartialEq,
    Ord,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum AmountReference {
    /// Change the balance by the given amount.
    Delta = 0,
    /// Set the balance to the given amount.
    Target = 1,
}

/// A signed action amount prior to wire encoding.
///
/// The wire format carries an unsigned magnitude with a separate sign flag; the
/// split is re-derived from [`Amount::value`] by the single wire projection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    /// The signed magnitude.
    pub value: I256,
    /// The balance representation the magnitude is expressed in.
    pub denomination: AmountDenomination,
    /// Whether the magnitude is a delta or a target.
    pub reference: AmountReference,
}

impl Amount {
    /// Creates a new [`Amount`] instance.
    #[must_use]
    pub const fn new(
        value: I256,
        denomination: AmountDenomination,
        reference: AmountReference,
    ) -> Self {
        Self {
            value,
            denomination,
            reference,
        }
    }

    /// A wei-denominated balance change.
    #[must_use]
    pub const fn delta_wei(value: I256) -> Self {
        Self::new(value, AmountDenomination::Wei, AmountReference::Delta)
    }

    /// A par-denominated balance change.
    #[must_use]
    pub const fn delta_par(value: I256) -> Self {
        Self::new(value, AmountDenomination::Par, AmountReference::Delta)
    }

    /// A wei-denominated balance target.
    #[must_use]
    pub const fn target_wei(value: I256) -> Self {
        Self::new(value, AmountDenomination::Wei, AmountReference::Target)
    }

    /// A par-denominated balance target.
    #[must_use]
    pub const fn target_par(value: I256) -> Self {
        Self::new(value, AmountDenomination::Par, AmountReference::Target)
    }
}

/// A market's outstanding principal totals, as reported by the settlement engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MarketTotals {
    /// Total borrowed principal, in wei.
    pub borrowed: U256,
    /// Total supplied principal, in wei.
    pub supply: U256,
}

impl MarketTotals {
    /// Creates a new [`MarketTotals`] instance.
    #[must_use]
    pub const fn new(borrowed: U256, supply: U256) -> Self {
        Self { borrowed, supply }
    }
}

/// Per-second interest rates scaled by the fixed base.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InterestPerSecond {
    /// The rate charged on borrowed principal.
    pub borrow_rate: U256,
    /// The rate earned on supplied principal.
    pub supply_rate: U256,
}

impl InterestPerSecond {
    /// Zero interest in both directions.
    pub const ZERO: Self = Self {
        borrow_rate: U256::ZERO,
        supply_rate: U256::ZERO,
    };

    /// The annualized borrow rate as a decimal fraction (`0.05` is 5% per year).
    ///
    /// # Errors
    ///
    /// Returns an error if the annualized value overflows the decimal range.
    pub fn borrow_apr(&self) -> Result<Decimal, ConvertError> {
        annualize(self.borrow_rate)
    }

    /// The annualized supply rate as a decimal fraction.
    ///
    /// # Errors
    ///
    /// Returns an error if the annualized value overflows the decimal range.
    pub fn supply_apr(&self) -> Result<Decimal, ConvertError> {
        annualize(self.supply_rate)
    }
}

fn annualize(rate_per_second: U256) -> Result<Decimal, ConvertError> {
    let annual = rate_per_second
        .checked_mul(SECONDS_IN_A_YEAR)
        .ok_or(MathError::Overflow)?;
    base_units_to_decimal(annual)
}
