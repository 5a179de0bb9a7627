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

//! ABI types and calldata encoders for the three dispatch entrypoints.
//!
//! The structs here mirror the settlement engine's Solidity definitions exactly;
//! everything above this module works with the richer types in [`crate::types`]
//! and [`crate::actions`] and converts at the last moment.

use alloy::{sol, sol_types::SolCall};
use alloy_primitives::{Address, Bytes, Sign, U256};

use crate::types::{AccountRef, Amount};

sol! {
    /// A sub-account as the settlement engine addresses it.
    #[derive(Debug, PartialEq, Eq)]
    struct AccountInfo {
        address owner;
        uint256 number;
    }

    /// A signed amount split into a sign flag and unsigned magnitude.
    #[derive(Debug, PartialEq, Eq)]
    struct AssetAmount {
        bool sign;
        uint8 denomination;
        uint8 reference;
        uint256 value;
    }

    /// One action, flattened onto the fixed field layout shared by all kinds.
    #[derive(Debug, PartialEq, Eq)]
    struct ActionArgs {
        uint8 actionType;
        uint256 accountId;
        AssetAmount amount;
        uint256 primaryMarketId;
        uint256 secondaryMarketId;
        address otherAddress;
        uint256 otherAccountId;
        bytes data;
    }

    /// Replay-protection metadata covering a signed sub-operation.
    #[derive(Debug, PartialEq, Eq)]
    struct OperationHeader {
        uint256 expiration;
        uint256 salt;
        address sender;
        address signer;
    }

    /// Authorizes a contiguous run of actions within a signed operation.
    #[derive(Debug, PartialEq, Eq)]
    struct Authorization {
        uint256 numActions;
        OperationHeader header;
        bytes signature;
    }

    contract SoleraMargin {
        function operate(AccountInfo[] accounts, ActionArgs[] actions) external;
    }

    contract PayableProxy {
        function operate(AccountInfo[] accounts, ActionArgs[] actions, address sendEthTo) external payable;
    }

    contract SignedOperationProxy {
        function operate(AccountInfo[] accounts, ActionArgs[] actions, Authorization[] auths) external;
    }
}

impl From<AccountRef> for AccountInfo {
    fn from(account: AccountRef) -> Self {
        Self {
            owner: account.owner,
            number: account.number,
        }
    }
}

impl From<Amount> for AssetAmount {
    fn from(amount: Amount) -> Self {
        let (sign, value) = amount.value.into_sign_and_abs();
        Self {
            sign: sign == Sign::Positive,
            denomination: amount.denomination as u8,
            reference: amount.reference as u8,
            value,
        }
    }
}

impl AssetAmount {
    /// The encoding for actions that carry no amount at all.
    ///
    /// Distinct from a zero-valued [`Amount`], which projects with a positive
    /// sign flag.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            sign: false,
            denomination: 0,
            reference: 0,
            value: U256::ZERO,
        }
    }
}

/// Encodes an `operate` call against the settlement engine.
pub fn encode_operate(accounts: Vec<AccountInfo>, actions: Vec<ActionArgs>) -> Bytes {
    SoleraMargin::operateCall { accounts, actions }
        .abi_encode()
        .into()
}

/// Encodes an `operate` call against the payable proxy, which wraps and unwraps
/// ETH and refunds any excess to `send_eth_to`.
pub fn encode_payable_operate(
    accounts: Vec<AccountInfo>,
    actions: Vec<ActionArgs>,
    send_eth_to: Address,
) -> Bytes {
    PayableProxy::operateCall {
        accounts,
        actions,
        sendEthTo: send_eth_to,
    }
    .abi_encode()
    .into()
}

/// Encodes an `operate` call against the signed-operation proxy, with one
/// authorization per contiguous run of actions.
pub fn encode_signed_operate(
    accounts: Vec<AccountInfo>,
    actions: Vec<ActionArgs>,
    auths: Vec<Authorization>,
) -> Bytes {
    SignedOperationProxy::operateCall {
        accounts,
        actions,
        auths,
    }
    .abi_encode()
    .into()
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use alloy_primitives::{I256, address};
    use rstest::rstest;

    use super::*;

    fn sample_accounts() -> Vec<AccountInfo> {
        vec![AccountInfo {
            owner: address!("1111111111111111111111111111111111111111"),
            number: U256::from(7_u8),
        }]
    }

    fn sample_actions() -> Vec<ActionArgs> {
        vec![ActionArgs {
            actionType: 0,
            accountId: U256::ZERO,
            amount: AssetAmount::from(Amount::delta_wei(I256::try_from(100).unwrap())),
            primaryMarketId: U256::ZERO,
            secondaryMarketId: U256::ZERO,
            otherAddress: address!("2222222222222222222222222222222222222222"),
            otherAccountId: U256::ZERO,
            data: Bytes::new(),
        }]
    }

    #[rstest]
    #[case(42, true, 42_u64)]
    #[case(-42, false, 42_u64)]
    #[case(0, true, 0_u64)]
    fn test_amount_projection_splits_sign_and_magnitude(
        #[case] value: i64,
        #[case] sign: bool,
        #[case] magnitude: u64,
    ) {
        let projected = AssetAmount::from(Amount::delta_par(I256::try_from(value).unwrap()));
        assert_eq!(projected.sign, sign);
        assert_eq!(projected.value, U256::from(magnitude));
        assert_eq!(projected.denomination, 1);
        assert_eq!(projected.reference, 0);
    }

    #[rstest]
    fn test_zeroed_differs_from_projected_zero() {
        let absent = AssetAmount::zeroed();
        let present = AssetAmount::from(Amount::delta_wei(I256::ZERO));
        assert!(!absent.sign);
        assert!(present.sign);
        assert_ne!(absent, present);
        assert_eq!(absent.value, present.value);
    }

    #[rstest]
    fn test_account_ref_projection() {
        let account = AccountRef::new(
            address!("3333333333333333333333333333333333333333"),
            U256::from(11_u8),
        );
        let info = AccountInfo::from(account);
        assert_eq!(info.owner, account.owner);
        assert_eq!(info.number, account.number);
    }

    #[rstest]
    fn test_entrypoint_selectors_are_distinct() {
        assert_ne!(
            SoleraMargin::operateCall::SELECTOR,
            PayableProxy::operateCall::SELECTOR
        );
        assert_ne!(
            SoleraMargin::operateCall::SELECTOR,
            SignedOperationProxy::operateCall::SELECTOR
        );
        assert_ne!(
            PayableProxy::operateCall::SELECTOR,
            SignedOperationProxy::operateCall::SELECTOR
        );
    }

    #[rstest]
    fn test_encode_operate_round_trips() {
        let encoded = encode_operate(sample_accounts(), sample_actions());
        assert_eq!(&encoded[..4], SoleraMargin::operateCall::SELECTOR.as_slice());

        let decoded = SoleraMargin::operateCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded.accounts, sample_accounts());
        assert_eq!(decoded.actions, sample_actions());
    }

    #[rstest]
    fn test_encode_payable_operate_carries_refund_address() {
        let refund = address!("4444444444444444444444444444444444444444");
        let encoded = encode_payable_operate(sample_accounts(), sample_actions(), refund);
        let decoded = PayableProxy::operateCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded.sendEthTo, refund);
    }

    #[rstest]
    fn test_encode_signed_operate_round_trips_nested_authorizations() {
        let auth = Authorization {
            numActions: U256::from(1_u8),
            header: OperationHeader {
                expiration: U256::from(123_u64),
                salt: U256::from(456_u64),
                sender: Address::ZERO,
                signer: address!("5555555555555555555555555555555555555555"),
            },
            signature: Bytes::from(vec![0xDE, 0xAD]),
        };
        let encoded =
            encode_signed_operate(sample_accounts(), sample_actions(), vec![auth.clone()]);
        let decoded = SignedOperationProxy::operateCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded.auths, vec![auth]);
    }
}
