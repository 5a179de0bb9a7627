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

//! Per-network protocol constants.
//!
//! Every Solera deployment fixes its contract addresses, interest curve parameters,
//! expiry constants, and earnings rate at deploy time. The client mirrors them here
//! as static tables keyed by network id; a lookup miss is a deployment gap and is
//! reported as a fatal configuration error rather than retried.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solera_core::convert::{ConvertError, decimal_to_base_units};
use thiserror::Error;

use crate::types::MarketId;

/// The maximum number of interest curve coefficients (one per byte of the packed
/// on-chain parameter word).
pub const MAX_COEFFICIENTS: usize = 16;

/// Errors raised by configuration lookups and construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No constants exist for the requested network id.
    #[error("no protocol constants for network id {network_id}")]
    UnknownNetwork {
        /// The unrecognized network id.
        network_id: u32,
    },
    /// Neither a market-specific nor a default interest setter entry exists.
    #[error("no interest setter for market {market_id} on network {network_id}")]
    MissingInterestSetter {
        /// The network id the lookup ran against.
        network_id: u32,
        /// The market with no curve entry.
        market_id: MarketId,
    },
    /// Interest curve coefficients must sum to exactly 100.
    #[error("interest curve coefficients must sum to 100, got {sum}")]
    CoefficientSum {
        /// The rejected coefficient sum.
        sum: u32,
    },
    /// Too many interest curve coefficients were supplied.
    #[error("interest curve supports at most {MAX_COEFFICIENTS} coefficients, got {count}")]
    TooManyCoefficients {
        /// The rejected coefficient count.
        count: usize,
    },
    /// A constant failed to convert to base units.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// The deployed protocol contract addresses on one network.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProtocolAddresses {
    /// The settlement engine accepting direct `operate` calls.
    pub margin: Address,
    /// The ETH-forwarding proxy.
    pub payable_proxy: Address,
    /// The meta-transaction proxy verifying per-signer authorizations.
    pub signed_operation_proxy: Address,
    /// The expiry auto-trader counterparty for expired-position closes.
    pub expiry: Address,
}

/// Constants governing expired-position liquidation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpiryConstants {
    /// The network-wide base liquidation spread, scaled by the fixed base.
    pub spread: U256,
    /// Seconds over which the liquidation bonus ramps in after expiry.
    pub ramp_time: u64,
}

/// Interest curve parameters for one market, selected per deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestSetter {
    /// No interest accrues.
    AlwaysZero,
    /// Two-segment linear curve with a 90% utilization kink.
    AaveCopyCat {
        /// Selects the 4% initial-goal variant used for stablecoin markets.
        stablecoin: bool,
    },
    /// Repeated-squaring polynomial curve.
    DoubleExponent {
        /// Maximum annual rate as a base-scaled fraction (`1e18` is 100% per year).
        max_apr: U256,
        /// Per-term weights; must sum to exactly 100.
        coefficients: Vec<u8>,
    },
}

impl InterestSetter {
    /// Builds a validated [`InterestSetter::DoubleExponent`] entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the coefficients do not sum to 100, exceed
    /// [`MAX_COEFFICIENTS`], or `max_apr` does not convert exactly to base units.
    pub fn double_exponent(max_apr: Decimal, coefficients: &[u8]) -> Result<Self, ConfigError> {
        if coefficients.len() > MAX_COEFFICIENTS {
            return Err(ConfigError::TooManyCoefficients {
                count: coefficients.len(),
            });
        }
        let sum: u32 = coefficients.iter().map(|&c| u32::from(c)).sum();
        if sum != 100 {
            return Err(ConfigError::CoefficientSum { sum });
        }
        Ok(Self::DoubleExponent {
            max_apr: decimal_to_base_units(max_apr)?,
            coefficients: coefficients.to_vec(),
        })
    }
}

/// The full constant set for one Solera deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConstants {
    /// The chain id the deployment lives on.
    pub network_id: u32,
    /// The deployed contract addresses.
    pub addresses: ProtocolAddresses,
    /// Fraction of borrow interest passed through to suppliers, base-scaled.
    pub earnings_rate: U256,
    /// Expired-position liquidation constants.
    pub expiry: ExpiryConstants,
    /// The curve used for markets with no specific entry.
    pub default_interest_setter: Option<InterestSetter>,
    /// Market-specific curve overrides.
    pub interest_setters: HashMap<MarketId, InterestSetter>,
}

impl NetworkConstants {
    /// Returns the constants for a supported network id.
    ///
    /// # Errors
    ///
    /// Returns an error for network ids with no Solera deployment.
    pub fn for_network(network_id: u32) -> Result<&'static Self, ConfigError> {
        match network_id {
            1 => Ok(&networks::MAINNET),
            11_155_111 => Ok(&networks::SEPOLIA),
            _ => Err(ConfigError::UnknownNetwork { network_id }),
        }
    }

    /// Returns the interest setter for a market, falling back to the default entry.
    ///
    /// # Errors
    ///
    /// Returns an error when the market has no entry and no default exists.
    pub fn interest_setter(&self, market_id: MarketId) -> Result<&InterestSetter, ConfigError> {
        self.interest_setters
            .get(&market_id)
            .or(self.default_interest_setter.as_ref())
            .ok_or(ConfigError::MissingInterestSetter {
                network_id: self.network_id,
                market_id,
            })
    }
}

/// Statically configured Solera deployments.
pub mod networks {
    use std::sync::LazyLock;

    use alloy_primitives::address;

    use super::*;

    /// Ethereum mainnet deployment.
    pub static MAINNET: LazyLock<NetworkConstants> = LazyLock::new(|| NetworkConstants {
        network_id: 1,
        addresses: ProtocolAddresses {
            margin: address!("0x1c4b8e3ffd24cd97309d54f4ad0c3fe6bb78ecc1"),
            payable_proxy: address!("0xa8b39372dd8803ec9220df55bf66bde9215f7a46"),
            signed_operation_proxy: address!("0x3ea9318146d721f29af2f3f09ead4ca5dded4a05"),
            expiry: address!("0x739a1df6725657f6a16dc2d5519dc36fd7911a12"),
        },
        earnings_rate: U256::from(900_000_000_000_000_000_u64),
        expiry: ExpiryConstants {
            spread: U256::from(50_000_000_000_000_000_u64),
            ramp_time: 3_600,
        },
        default_interest_setter: Some(InterestSetter::AaveCopyCat { stablecoin: false }),
        interest_setters: HashMap::from([
            // WETH
            (
                0,
                InterestSetter::DoubleExponent {
                    max_apr: U256::from(500_000_000_000_000_000_u64),
                    coefficients: vec![0, 20, 10, 0, 0, 0, 10, 60],
                },
            ),
            // DAI
            (1, InterestSetter::AaveCopyCat { stablecoin: true }),
            // USDC
            (2, InterestSetter::AaveCopyCat { stablecoin: true }),
        ]),
    });

    /// Sepolia test deployment.
    pub static SEPOLIA: LazyLock<NetworkConstants> = LazyLock::new(|| NetworkConstants {
        network_id: 11_155_111,
        addresses: ProtocolAddresses {
            margin: address!("0x528b5f61bac83a9ed0e87e487f9b6f49ade4c3b7"),
            payable_proxy: address!("0x07aed2476ce10ff8d4e270ba54072e085ae24a0c"),
            signed_operation_proxy: address!("0xd69d0b1e12e34c60ae3c0d89bd6a3b79bc88ff3e"),
            expiry: address!("0x44f77e57f1bef59aa8c53b7b5a7efcd0a33c9b8f"),
        },
        earnings_rate: U256::from(900_000_000_000_000_000_u64),
        expiry: ExpiryConstants {
            spread: U256::from(50_000_000_000_000_000_u64),
            // short ramp so expiry flows can be exercised quickly on testnet
            ramp_time: 600,
        },
        default_interest_setter: Some(InterestSetter::AaveCopyCat { stablecoin: false }),
        interest_setters: HashMap::from([(1, InterestSetter::AaveCopyCat { stablecoin: true })]),
    });
}
