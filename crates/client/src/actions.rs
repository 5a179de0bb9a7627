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

//! The nine user-facing action kinds and their shared wire projection.
//!
//! Each variant of [`Action`] carries only the fields that kind needs, named for
//! its own domain (a withdrawal has a `to`, a trade has an `auto_trader`). The
//! flattening onto the fixed eight-field calldata layout happens in exactly one
//! place, [`Action::parts`], so the market-ordering rules for exchanges and
//! liquidations cannot drift between call sites.

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::types::{AccountRef, ActionType, Amount, MarketId};

/// Moves tokens from an external wallet into a sub-account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// The sub-account credited.
    pub account: AccountRef,
    /// The market deposited into.
    pub market_id: MarketId,
    /// The size of the deposit.
    pub amount: Amount,
    /// The wallet debited. Must have approved the settlement engine.
    pub from: Address,
}

/// Moves tokens out of a sub-account to an external wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    /// The sub-account debited.
    pub account: AccountRef,
    /// The market withdrawn from.
    pub market_id: MarketId,
    /// The size of the withdrawal.
    pub amount: Amount,
    /// The wallet credited.
    pub to: Address,
}

/// Moves balance between two sub-accounts without touching token contracts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The sub-account the amount is applied to.
    pub account: AccountRef,
    /// The sub-account receiving the opposite of that application.
    pub to_account: AccountRef,
    /// The market transferred within.
    pub market_id: MarketId,
    /// The size of the transfer, from the perspective of `account`.
    pub amount: Amount,
}

/// Buys `maker_market` tokens on an external exchange, paying with `taker_market`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buy {
    /// The sub-account trading.
    pub account: AccountRef,
    /// The market spent on the exchange.
    pub taker_market: MarketId,
    /// The market received from the exchange.
    pub maker_market: MarketId,
    /// The amount of `maker_market` to receive.
    pub amount: Amount,
    /// The exchange wrapper contract routing the fill.
    pub exchange_wrapper: Address,
    /// Opaque order bytes forwarded to the wrapper.
    pub order_data: Bytes,
}

/// Sells `taker_market` tokens on an external exchange for `maker_market`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sell {
    /// The sub-account trading.
    pub account: AccountRef,
    /// The market spent on the exchange.
    pub taker_market: MarketId,
    /// The market received from the exchange.
    pub maker_market: MarketId,
    /// The amount of `taker_market` to spend.
    pub amount: Amount,
    /// The exchange wrapper contract routing the fill.
    pub exchange_wrapper: Address,
    /// Opaque order bytes forwarded to the wrapper.
    pub order_data: Bytes,
}

/// Trades directly against another sub-account via an autotrader contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// The sub-account initiating the trade.
    pub account: AccountRef,
    /// The passive counterparty. Must have authorized `auto_trader`.
    pub counterparty_account: AccountRef,
    /// The market the amount is quoted in.
    pub input_market: MarketId,
    /// The market priced by the autotrader in response.
    pub output_market: MarketId,
    /// The contract consulted for the counterparty's price.
    pub auto_trader: Address,
    /// The size of the trade, in the input market.
    pub amount: Amount,
    /// Opaque bytes forwarded to the autotrader.
    pub data: Bytes,
}

/// Forcibly closes an undercollateralized account's borrow at a spread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidate {
    /// The liquidator's sub-account.
    pub account: AccountRef,
    /// The undercollateralized sub-account being closed.
    pub liquidated_account: AccountRef,
    /// The market the liquidated account owes.
    pub owed_market: MarketId,
    /// The collateral market seized in exchange.
    pub held_market: MarketId,
    /// The amount of owed-market debt to absorb.
    pub amount: Amount,
}

/// Absorbs the debt of an account that has no collateral left at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vaporize {
    /// The vaporizer's sub-account.
    pub account: AccountRef,
    /// The insolvent sub-account being absorbed.
    pub vaporized_account: AccountRef,
    /// The market the vaporized account owes.
    pub owed_market: MarketId,
    /// The market drawn from the insurance pool in exchange.
    pub held_market: MarketId,
    /// The amount of owed-market debt to absorb.
    pub amount: Amount,
}

/// Invokes an arbitrary callee contract from within the operation.
///
/// Carries no amount; the callee sees only the calling sub-account and `data`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// The sub-account attributed to the call.
    pub account: AccountRef,
    /// The contract invoked.
    pub callee: Address,
    /// Opaque bytes forwarded to the callee.
    pub data: Bytes,
}

/// A single action within an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// See [`Deposit`].
    Deposit(Deposit),
    /// See [`Withdraw`].
    Withdraw(Withdraw),
    /// See [`Transfer`].
    Transfer(Transfer),
    /// See [`Buy`].
    Buy(Buy),
    /// See [`Sell`].
    Sell(Sell),
    /// See [`Trade`].
    Trade(Trade),
    /// See [`Liquidate`].
    Liquidate(Liquidate),
    /// See [`Vaporize`].
    Vaporize(Vaporize),
    /// See [`Call`].
    Call(Call),
}

/// An action flattened onto the fixed calldata field layout.
///
/// Unused fields hold their zero values. The amount is `None` only for kinds
/// that carry no amount at all, which encodes as the all-zero asset amount
/// rather than a zero delta.
#[derive(Clone, Debug)]
pub(crate) struct ActionParts {
    pub action_type: ActionType,
    pub account: AccountRef,
    pub amount: Option<Amount>,
    pub primary_market: MarketId,
    pub secondary_market: MarketId,
    pub other_address: Address,
    pub secondary_account: Option<AccountRef>,
    pub data: Bytes,
}

impl Action {
    /// The kind of this action.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Deposit(_) => ActionType::Deposit,
            Self::Withdraw(_) => ActionType::Withdraw,
            Self::Transfer(_) => ActionType::Transfer,
            Self::Buy(_) => ActionType::Buy,
            Self::Sell(_) => ActionType::Sell,
            Self::Trade(_) => ActionType::Trade,
            Self::Liquidate(_) => ActionType::Liquidate,
            Self::Vaporize(_) => ActionType::Vaporize,
            Self::Call(_) => ActionType::Call,
        }
    }

    /// The sub-account this action is applied to.
    #[must_use]
    pub const fn account(&self) -> AccountRef {
        match self {
            Self::Deposit(a) => a.account,
            Self::Withdraw(a) => a.account,
            Self::Transfer(a) => a.account,
            Self::Buy(a) => a.account,
            Self::Sell(a) => a.account,
            Self::Trade(a) => a.account,
            Self::Liquidate(a) => a.account,
            Self::Vaporize(a) => a.account,
            Self::Call(a) => a.account,
        }
    }

    /// Flattens the action onto the calldata field layout.
    ///
    /// Exchange actions place the received market first for buys and the spent
    /// market first for sells. Liquidations and vaporizations place the owed
    /// market first.
    pub(crate) fn parts(&self) -> ActionParts {
        match self {
            Self::Deposit(deposit) => ActionParts {
                action_type: ActionType::Deposit,
                account: deposit.account,
                amount: Some(deposit.amount),
                primary_market: deposit.market_id,
                secondary_market: 0,
                other_address: deposit.from,
                secondary_account: None,
                data: Bytes::new(),
            },
            Self::Withdraw(withdraw) => ActionParts {
                action_type: ActionType::Withdraw,
                account: withdraw.account,
                amount: Some(withdraw.amount),
                primary_market: withdraw.market_id,
                secondary_market: 0,
                other_address: withdraw.to,
                secondary_account: None,
                data: Bytes::new(),
            },
            Self::Transfer(transfer) => ActionParts {
                action_type: ActionType::Transfer,
                account: transfer.account,
                amount: Some(transfer.amount),
                primary_market: transfer.market_id,
                secondary_market: 0,
                other_address: Address::ZERO,
                secondary_account: Some(transfer.to_account),
                data: Bytes::new(),
            },
            Self::Buy(buy) => ActionParts {
                action_type: ActionType::Buy,
                account: buy.account,
                amount: Some(buy.amount),
                primary_market: buy.maker_market,
                secondary_market: buy.taker_market,
                other_address: buy.exchange_wrapper,
                secondary_account: None,
                data: buy.order_data.clone(),
            },
            Self::Sell(sell) => ActionParts {
                action_type: ActionType::Sell,
                account: sell.account,
                amount: Some(sell.amount),
                primary_market: sell.taker_market,
                secondary_market: sell.maker_market,
                other_address: sell.exchange_wrapper,
                secondary_account: None,
                data: sell.order_data.clone(),
            },
            Self::Trade(trade) => ActionParts {
                action_type: ActionType::Trade,
                account: trade.account,
                amount: Some(trade.amount),
                primary_market: trade.input_market,
                secondary_market: trade.output_market,
                other_address: trade.auto_trader,
                secondary_account: Some(trade.counterparty_account),
                data: trade.data.clone(),
            },
            Self::Liquidate(liquidate) => ActionParts {
                action_type: ActionType::Liquidate,
                account: liquidate.account,
                amount: Some(liquidate.amount),
                primary_market: liquidate.owed_market,
                secondary_market: liquidate.held_market,
                other_address: Address::ZERO,
                secondary_account: Some(liquidate.liquidated_account),
                data: Bytes::new(),
            },
            Self::Vaporize(vaporize) => ActionParts {
                action_type: ActionType::Vaporize,
                account: vaporize.account,
                amount: Some(vaporize.amount),
                primary_market: vaporize.owed_market,
                secondary_market: vaporize.held_market,
                other_address: Address::ZERO,
                secondary_account: Some(vaporize.vaporized_account),
                data: Bytes::new(),
            },
            Self::Call(call) => ActionParts {
                action_type: ActionType::Call,
                account: call.account,
                amount: None,
                primary_market: 0,
                secondary_market: 0,
                other_address: call.callee,
                secondary_account: None,
                data: call.data.clone(),
            },
        }
    }
}
