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

//! Assembles actions into a single atomic operation and dispatches it.
//!
//! An [`OperationBuilder`] accumulates actions while open, deduplicates the
//! accounts they touch, and encodes everything for one of the three dispatch
//! entrypoints on commit. A builder commits at most once: the state flips
//! before the gateway is invoked and is restored only if the gateway fails,
//! so a success observed by the caller can never be double-submitted.

use alloy_primitives::{Address, B256, Bytes, I256, U256};

use crate::{
    actions::{Action, Buy, Call, Deposit, Liquidate, Sell, Trade, Transfer, Vaporize, Withdraw},
    auth::{AuthorizationRange, SignedOperation, splice_authorizations},
    config::NetworkConstants,
    error::ClientError,
    expiry::{ExpiredPosition, expiry_trade_data, plan_expiry_unwind, set_expiry_call_data},
    types::{AccountRef, Amount, MarketId},
    wire::{self, AccountInfo, ActionArgs, AssetAmount},
};

/// How a committed operation reaches the settlement engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchMethod {
    /// Call the settlement engine's `operate` directly.
    Direct,
    /// Route through the payable proxy, which wraps sent ETH and refunds any
    /// excess to the given address.
    PayableProxy {
        /// The refund address for unused ETH.
        send_eth_to: Address,
    },
    /// Route through the signed-operation proxy with spliced authorizations.
    SignedProxy,
}

/// Options applied at commit time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CommitOptions {
    /// Simulate the dispatch without transitioning the builder.
    pub simulate: bool,
    /// ETH sent with the transaction. Ignored unless dispatching through the
    /// payable proxy.
    pub value: U256,
}

/// A fully encoded operation ready for submission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperationPayload {
    /// The dispatch contract to call.
    pub to: Address,
    /// The encoded `operate` calldata.
    pub calldata: Bytes,
    /// The ETH value to attach.
    pub value: U256,
}

/// Submits encoded operations to the chain.
///
/// Implementations wrap whatever transaction machinery the application uses;
/// the builder only needs a success hash or an error back.
pub trait OperationGateway {
    /// Submits the payload, or simulates it when `simulate` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when the submission is rejected or fails to send.
    fn operate(&self, payload: &OperationPayload, simulate: bool) -> anyhow::Result<B256>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BuilderState {
    Open,
    Committed,
}

/// Accumulates actions for one atomic operation.
#[derive(Clone, Debug)]
pub struct OperationBuilder {
    network_id: u32,
    method: DispatchMethod,
    state: BuilderState,
    accounts: Vec<AccountRef>,
    actions: Vec<ActionArgs>,
    auths: Vec<AuthorizationRange>,
}

impl OperationBuilder {
    /// Creates a new open [`OperationBuilder`] instance for the given network
    /// and dispatch method.
    #[must_use]
    pub const fn new(network_id: u32, method: DispatchMethod) -> Self {
        Self {
            network_id,
            method,
            state: BuilderState::Open,
            accounts: Vec::new(),
            actions: Vec::new(),
            auths: Vec::new(),
        }
    }

    /// Whether the builder has dispatched its operation.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.state == BuilderState::Committed
    }

    /// The number of actions appended so far.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// The deduplicated accounts referenced so far, in first-use order.
    #[must_use]
    pub fn accounts(&self) -> &[AccountRef] {
        &self.accounts
    }

    /// The encoded actions appended so far.
    #[must_use]
    pub fn actions(&self) -> &[ActionArgs] {
        &self.actions
    }

    /// Appends a deposit.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn deposit(&mut self, deposit: Deposit) -> Result<&mut Self, ClientError> {
        self.append(&Action::Deposit(deposit))
    }

    /// Appends a withdrawal.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn withdraw(&mut self, withdraw: Withdraw) -> Result<&mut Self, ClientError> {
        self.append(&Action::Withdraw(withdraw))
    }

    /// Appends a transfer between two sub-accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn transfer(&mut self, transfer: Transfer) -> Result<&mut Self, ClientError> {
        self.append(&Action::Transfer(transfer))
    }

    /// Appends an external-exchange buy.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn buy(&mut self, buy: Buy) -> Result<&mut Self, ClientError> {
        self.append(&Action::Buy(buy))
    }

    /// Appends an external-exchange sell.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn sell(&mut self, sell: Sell) -> Result<&mut Self, ClientError> {
        self.append(&Action::Sell(sell))
    }

    /// Appends a trade against another sub-account.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn trade(&mut self, trade: Trade) -> Result<&mut Self, ClientError> {
        self.append(&Action::Trade(trade))
    }

    /// Appends a liquidation.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn liquidate(&mut self, liquidate: Liquidate) -> Result<&mut Self, ClientError> {
        self.append(&Action::Liquidate(liquidate))
    }

    /// Appends a vaporization.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn vaporize(&mut self, vaporize: Vaporize) -> Result<&mut Self, ClientError> {
        self.append(&Action::Vaporize(vaporize))
    }

    /// Appends an arbitrary contract call.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed.
    pub fn call(&mut self, call: Call) -> Result<&mut Self, ClientError> {
        self.append(&Action::Call(call))
    }

    /// Appends a call to the expiry contract stamping a borrow with an expiry
    /// `time_delta` seconds from the block it lands in.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed or the
    /// network is unknown.
    pub fn set_expiry(
        &mut self,
        account: AccountRef,
        market_id: MarketId,
        time_delta: u32,
    ) -> Result<&mut Self, ClientError> {
        let constants = NetworkConstants::for_network(self.network_id)?;
        self.append(&Action::Call(Call {
            account,
            callee: constants.addresses.expiry,
            data: set_expiry_call_data(market_id, time_delta),
        }))
    }

    /// Appends a counterparty-signed run of actions.
    ///
    /// The run's accounts are merged into the operation's account list and its
    /// authorization is recorded for splicing at encode time.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed, the
    /// builder is not dispatching through the signed-operation proxy, or the
    /// signed run contains no actions.
    pub fn add_signed_operation(
        &mut self,
        signed: &SignedOperation,
    ) -> Result<&mut Self, ClientError> {
        self.ensure_open()?;
        if self.method != DispatchMethod::SignedProxy {
            return Err(ClientError::SignedModeRequired);
        }
        if signed.actions.is_empty() {
            return Err(ClientError::EmptyOperation);
        }

        let start_index = self.actions.len();
        for action in &signed.actions {
            self.push_action(action);
        }
        self.auths.push(AuthorizationRange {
            start_index,
            num_actions: signed.actions.len(),
            expiration: signed.expiration,
            salt: signed.salt,
            sender: signed.sender,
            signer: signed.signer,
            signature: signed.typed_signature.clone(),
        });
        Ok(self)
    }

    /// Appends the expiry trades that close an expired borrow, consuming the
    /// position's collateral in preference order.
    ///
    /// Any debt the listed collateral cannot cover is left in place and logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation has already been committed, the
    /// network is unknown, or the unwind cannot be planned.
    pub fn fully_unwind_expired_account(
        &mut self,
        liquidator: AccountRef,
        expired_account: AccountRef,
        position: &ExpiredPosition<'_>,
    ) -> Result<&mut Self, ClientError> {
        self.ensure_open()?;
        let constants = NetworkConstants::for_network(self.network_id)?;
        let plan = plan_expiry_unwind(position, &constants.expiry)?;

        if plan.residual_owed_wei < I256::ZERO {
            log::warn!(
                "Unwind of {expired_account} market {} leaves {} wei of debt uncovered",
                position.expired_market,
                plan.residual_owed_wei,
            );
        }

        for step in &plan.steps {
            self.push_action(&Action::Trade(Trade {
                account: liquidator,
                counterparty_account: expired_account,
                input_market: step.primary_market,
                output_market: step.secondary_market,
                auto_trader: constants.addresses.expiry,
                amount: Amount::target_par(I256::ZERO),
                data: expiry_trade_data(position.expired_market, position.expiry_timestamp),
            }));
        }
        Ok(self)
    }

    /// Encodes the operation for its dispatch entrypoint with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if no actions have been appended or the network is
    /// unknown.
    pub fn payload(&self) -> Result<OperationPayload, ClientError> {
        self.payload_with(&CommitOptions::default())
    }

    /// Encodes the operation for its dispatch entrypoint.
    ///
    /// # Errors
    ///
    /// Returns an error if no actions have been appended or the network is
    /// unknown.
    pub fn payload_with(&self, options: &CommitOptions) -> Result<OperationPayload, ClientError> {
        if self.actions.is_empty() {
            return Err(ClientError::EmptyOperation);
        }
        let constants = NetworkConstants::for_network(self.network_id)?;
        let accounts: Vec<AccountInfo> =
            self.accounts.iter().copied().map(AccountInfo::from).collect();
        let actions = self.actions.clone();

        let payload = match self.method {
            DispatchMethod::Direct => OperationPayload {
                to: constants.addresses.margin,
                calldata: wire::encode_operate(accounts, actions),
                value: U256::ZERO,
            },
            DispatchMethod::PayableProxy { send_eth_to } => OperationPayload {
                to: constants.addresses.payable_proxy,
                calldata: wire::encode_payable_operate(accounts, actions, send_eth_to),
                value: options.value,
            },
            DispatchMethod::SignedProxy => {
                let auths = splice_authorizations(&self.auths, self.actions.len());
                OperationPayload {
                    to: constants.addresses.signed_operation_proxy,
                    calldata: wire::encode_signed_operate(accounts, actions, auths),
                    value: U256::ZERO,
                }
            }
        };
        Ok(payload)
    }

    /// Encodes and dispatches the operation through the gateway.
    ///
    /// The builder transitions to committed before the gateway runs and
    /// reopens only if the gateway fails; a simulation never transitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is empty or already committed, the
    /// network is unknown, or the gateway rejects the dispatch.
    pub fn commit(
        &mut self,
        options: &CommitOptions,
        gateway: &dyn OperationGateway,
    ) -> Result<B256, ClientError> {
        self.ensure_open()?;
        let payload = self.payload_with(options)?;

        if !options.simulate {
            self.state = BuilderState::Committed;
        }
        log::debug!(
            "Dispatching operation to {}: {} actions, {} accounts, simulate={}",
            payload.to,
            self.actions.len(),
            self.accounts.len(),
            options.simulate,
        );

        match gateway.operate(&payload, options.simulate) {
            Ok(tx_hash) => Ok(tx_hash),
            Err(e) => {
                if !options.simulate {
                    self.state = BuilderState::Open;
                }
                Err(ClientError::Dispatch(e))
            }
        }
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        if self.state == BuilderState::Committed {
            return Err(ClientError::AlreadyCommitted);
        }
        Ok(())
    }

    fn append(&mut self, action: &Action) -> Result<&mut Self, ClientError> {
        self.ensure_open()?;
        self.push_action(action);
        Ok(self)
    }

    fn push_action(&mut self, action: &Action) {
        let parts = action.parts();
        let account_id = self.resolve_account_id(parts.account);
        let other_account_id = match parts.secondary_account {
            Some(account) => self.resolve_account_id(account),
            None => 0,
        };

        self.actions.push(ActionArgs {
            actionType: parts.action_type.wire_code(),
            accountId: U256::from(account_id),
            amount: parts
                .amount
                .map_or_else(AssetAmount::zeroed, AssetAmount::from),
            primaryMarketId: U256::from(parts.primary_market),
            secondaryMarketId: U256::from(parts.secondary_market),
            otherAddress: parts.other_address,
            otherAccountId: U256::from(other_account_id),
            data: parts.data,
        });
    }

    fn resolve_account_id(&mut self, account: AccountRef) -> usize {
        if let Some(position) = self.accounts.iter().position(|known| *known == account) {
            position
        } else {
            self.accounts.push(account);
            self.accounts.len() - 1
        }
    }
}
