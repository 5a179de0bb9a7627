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

//! Authorization splicing and typed-data hashing for signed operations.
//!
//! The signed-operation proxy verifies one [`wire::Authorization`] per
//! contiguous run of actions and requires the runs to tile the action list
//! exactly. Actions appended locally by the operation author need no
//! signature, so [`splice_authorizations`] fills every gap between signed
//! runs with an unsigned placeholder covering the gap's length.
//!
//! The typed-data hash here must match what the proxy recovers on chain; the
//! struct definitions in this module are the protocol surface and change only
//! with the proxy itself.

use alloy::{
    sol,
    sol_types::{SolStruct, eip712_domain},
};
use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::{actions, wire};

sol! {
    /// Typed-data form of a signed amount.
    struct AssetAmount {
        bool sign;
        uint8 denomination;
        uint8 reference;
        uint256 value;
    }

    /// Typed-data form of one action, with accounts inlined by owner and
    /// number so the hash is independent of the final operation's account
    /// ordering.
    struct Action {
        uint8 actionType;
        address accountOwner;
        uint256 accountNumber;
        AssetAmount assetAmount;
        uint256 primaryMarketId;
        uint256 secondaryMarketId;
        address otherAddress;
        address otherAccountOwner;
        uint256 otherAccountNumber;
        bytes data;
    }

    /// The typed-data payload a signer commits to.
    struct Operation {
        Action[] actions;
        uint256 expiration;
        uint256 salt;
        address sender;
        address signer;
    }
}

/// A run of actions authorized by a counterparty signature, ready to be
/// appended to an operation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SignedOperation {
    /// The authorized actions, in the exact order they were signed.
    pub actions: Vec<actions::Action>,
    /// Unix seconds after which the signature is dead, zero for no expiry.
    pub expiration: U256,
    /// Replay-protection salt chosen by the signer.
    pub salt: U256,
    /// The only address allowed to submit the operation, zero for anyone.
    pub sender: Address,
    /// The address that produced `typed_signature`.
    pub signer: Address,
    /// The EIP-712 signature over [`operation_hash`].
    pub typed_signature: Bytes,
}

/// Locates a signed run within the assembled action list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthorizationRange {
    /// Index of the run's first action in the operation.
    pub start_index: usize,
    /// Number of actions in the run.
    pub num_actions: usize,
    /// Signature expiration, zero for none.
    pub expiration: U256,
    /// The signer's replay salt.
    pub salt: U256,
    /// The submitter restriction, zero for none.
    pub sender: Address,
    /// The signing address.
    pub signer: Address,
    /// The typed-data signature covering the run.
    pub signature: Bytes,
}

/// Expands signed ranges into the proxy's authorization list.
///
/// Ranges must be disjoint and ordered by `start_index`, which the operation
/// builder guarantees by construction. Every gap, including a trailing one,
/// becomes an unsigned placeholder so the result tiles `[0, total_actions)`
/// exactly.
#[must_use]
pub fn splice_authorizations(
    ranges: &[AuthorizationRange],
    total_actions: usize,
) -> Vec<wire::Authorization> {
    let mut auths = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0_usize;

    for range in ranges {
        debug_assert!(range.start_index >= cursor, "overlapping signed ranges");
        if range.num_actions == 0 {
            continue;
        }
        if range.start_index > cursor {
            auths.push(unsigned_authorization(range.start_index - cursor));
        }
        auths.push(wire::Authorization {
            numActions: U256::from(range.num_actions),
            header: wire::OperationHeader {
                expiration: range.expiration,
                salt: range.salt,
                sender: range.sender,
                signer: range.signer,
            },
            signature: range.signature.clone(),
        });
        cursor = range.start_index + range.num_actions;
    }

    if cursor < total_actions {
        auths.push(unsigned_authorization(total_actions - cursor));
    }

    auths
}

/// The EIP-712 signing hash for a signed operation.
///
/// This is the digest the signer's wallet signs and the proxy recovers; the
/// domain is pinned to the proxy deployment on the given chain.
#[must_use]
pub fn operation_hash(
    operation: &SignedOperation,
    chain_id: u64,
    verifying_contract: Address,
) -> B256 {
    let typed = Operation {
        actions: operation.actions.iter().map(typed_action).collect(),
        expiration: operation.expiration,
        salt: operation.salt,
        sender: operation.sender,
        signer: operation.signer,
    };
    let domain = eip712_domain! {
        name: "SignedOperationProxy",
        version: "1.0",
        chain_id: chain_id,
        verifying_contract: verifying_contract,
    };
    typed.eip712_signing_hash(&domain)
}

fn unsigned_authorization(num_actions: usize) -> wire::Authorization {
    wire::Authorization {
        numActions: U256::from(num_actions),
        header: wire::OperationHeader {
            expiration: U256::ZERO,
            salt: U256::ZERO,
            sender: Address::ZERO,
            signer: Address::ZERO,
        },
        signature: Bytes::new(),
    }
}

fn typed_action(action: &actions::Action) -> Action {
    let parts = action.parts();
    let (other_owner, other_number) = parts
        .secondary_account
        .map_or((Address::ZERO, U256::ZERO), |acct| (acct.owner, acct.number));

    let projected = parts
        .amount
        .map_or_else(wire::AssetAmount::zeroed, wire::AssetAmount::from);

    Action {
        actionType: parts.action_type.wire_code(),
        accountOwner: parts.account.owner,
        accountNumber: parts.account.number,
        assetAmount: AssetAmount {
            sign: projected.sign,
            denomination: projected.denomination,
            reference: projected.reference,
            value: projected.value,
        },
        primaryMarketId: U256::from(parts.primary_market),
        secondaryMarketId: U256::from(parts.secondary_market),
        otherAddress: parts.other_address,
        otherAccountOwner: other_owner,
        otherAccountNumber: other_number,
        data: parts.data,
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use alloy_primitives::{I256, address};
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::{
        actions::{Call, Deposit, Withdraw},
        types::{AccountRef, Amount},
    };

    fn range(start_index: usize, num_actions: usize) -> AuthorizationRange {
        AuthorizationRange {
            start_index,
            num_actions,
            expiration: U256::ZERO,
            salt: U256::from(start_index as u64),
            sender: Address::ZERO,
            signer: address!("5555555555555555555555555555555555555555"),
            signature: Bytes::from(vec![0x5A]),
        }
    }

    fn sample_operation(salt: u64) -> SignedOperation {
        let account = AccountRef::new(
            address!("1111111111111111111111111111111111111111"),
            U256::from(7_u8),
        );
        SignedOperation {
            actions: vec![
                actions::Action::Deposit(Deposit {
                    account,
                    market_id: 0,
                    amount: Amount::delta_wei(I256::try_from(100).unwrap()),
                    from: account.owner,
                }),
                actions::Action::Withdraw(Withdraw {
                    account,
                    market_id: 2,
                    amount: Amount::delta_wei(I256::try_from(-50).unwrap()),
                    to: account.owner,
                }),
            ],
            expiration: U256::ZERO,
            salt: U256::from(salt),
            sender: Address::ZERO,
            signer: address!("5555555555555555555555555555555555555555"),
            typed_signature: Bytes::from(vec![0x5A; 65]),
        }
    }

    #[rstest]
    fn test_splice_without_ranges_emits_one_placeholder() {
        let auths = splice_authorizations(&[], 3);
        assert_eq!(auths.len(), 1);
        assert_eq!(auths[0].numActions, U256::from(3_u8));
        assert_eq!(auths[0].header.signer, Address::ZERO);
        assert!(auths[0].signature.is_empty());
    }

    #[rstest]
    fn test_splice_with_full_cover_emits_no_placeholder() {
        let auths = splice_authorizations(&[range(0, 2)], 2);
        assert_eq!(auths.len(), 1);
        assert_eq!(auths[0].numActions, U256::from(2_u8));
        assert_eq!(auths[0].signature, Bytes::from(vec![0x5A]));
    }

    #[rstest]
    fn test_splice_fills_leading_middle_and_trailing_gaps() {
        let auths = splice_authorizations(&[range(1, 1), range(4, 2)], 7);
        let num_actions: Vec<u64> = auths
            .iter()
            .map(|a| u64::try_from(a.numActions).unwrap())
            .collect();
        let signed: Vec<bool> = auths.iter().map(|a| !a.signature.is_empty()).collect();
        assert_eq!(num_actions, vec![1, 1, 2, 2, 1]);
        assert_eq!(signed, vec![false, true, false, true, false]);
    }

    #[rstest]
    fn test_splice_skips_empty_ranges() {
        let auths = splice_authorizations(&[range(1, 0)], 2);
        assert_eq!(auths.len(), 1);
        assert_eq!(auths[0].numActions, U256::from(2_u8));
        assert!(auths[0].signature.is_empty());
    }

    #[rstest]
    fn test_splice_of_empty_operation_is_empty() {
        assert!(splice_authorizations(&[], 0).is_empty());
    }

    #[rstest]
    fn test_operation_hash_is_deterministic() {
        let margin = address!("1c4b8e3ffd24cd97309d54f4ad0c3fe6bb78ecc1");
        let a = operation_hash(&sample_operation(1), 1, margin);
        let b = operation_hash(&sample_operation(1), 1, margin);
        assert_eq!(a, b);
    }

    #[rstest]
    fn test_operation_hash_separates_domains_and_payloads() {
        let margin = address!("1c4b8e3ffd24cd97309d54f4ad0c3fe6bb78ecc1");
        let base = operation_hash(&sample_operation(1), 1, margin);

        // different chain
        assert_ne!(base, operation_hash(&sample_operation(1), 11_155_111, margin));
        // different verifying contract
        let other = address!("739a1df6725657f6a16dc2d5519dc36fd7911a12");
        assert_ne!(base, operation_hash(&sample_operation(1), 1, other));
        // different salt
        assert_ne!(base, operation_hash(&sample_operation(2), 1, margin));
        // different action content
        let mut tweaked = sample_operation(1);
        if let actions::Action::Deposit(deposit) = &mut tweaked.actions[0] {
            deposit.market_id = 1;
        }
        assert_ne!(base, operation_hash(&tweaked, 1, margin));
    }

    #[rstest]
    fn test_absent_amount_hashes_differently_from_zero_delta() {
        let account = AccountRef::new(
            address!("1111111111111111111111111111111111111111"),
            U256::ZERO,
        );
        let call = actions::Action::Call(Call {
            account,
            callee: Address::ZERO,
            data: Bytes::new(),
        });
        let typed = typed_action(&call);
        assert!(!typed.assetAmount.sign);

        let deposit = actions::Action::Deposit(Deposit {
            account,
            market_id: 0,
            amount: Amount::delta_wei(I256::ZERO),
            from: Address::ZERO,
        });
        assert!(typed_action(&deposit).assetAmount.sign);
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Property-based testing
    ////////////////////////////////////////////////////////////////////////////////

    proptest! {
        #[rstest]
        fn prop_splice_tiles_the_action_list_exactly(
            segments in proptest::collection::vec((1_usize..=4, any::<bool>()), 0..=6),
        ) {
            let mut ranges = Vec::new();
            let mut cursor = 0_usize;
            for (len, is_signed) in &segments {
                if *is_signed {
                    ranges.push(range(cursor, *len));
                }
                cursor += len;
            }
            let total = cursor;

            let auths = splice_authorizations(&ranges, total);

            let mut covered = 0_usize;
            for auth in &auths {
                let n = usize::try_from(auth.numActions).unwrap();
                prop_assert!(n > 0);
                covered += n;
            }
            prop_assert_eq!(covered, total);

            let signed_out = auths.iter().filter(|a| !a.signature.is_empty()).count();
            prop_assert_eq!(signed_out, ranges.len());
        }
    }
}
