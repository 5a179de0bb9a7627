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

//! Client-side operation encoder for the [Solera](https://solera.trade) margin protocol.
//!
//! The `solera-client` crate owns everything between a strategy's intent and the calldata
//! handed to a transaction gateway:
//!
//! - An [`OperationBuilder`] which batches actions against margin accounts and dispatches
//!   them to the settlement engine directly, through the payable proxy, or through the
//!   signed-operation proxy.
//! - Interest rate projection for every setter family a deployment configures.
//! - Expiry unwind planning which mirrors the settlement engine's spread and ramp math.
//! - EIP-712 hashing and authorization splicing for operations signed off-chain.
//!
//! Deployment constants for the supported networks ship with the crate, see
//! [`config::networks`]. All arithmetic runs on the 256-bit fixed-point primitives from
//! `solera-core`; no code path touches binary floating point.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod actions;
pub mod auth;
pub mod builder;
pub mod config;
pub mod error;
pub mod expiry;
pub mod interest;
pub mod types;
pub mod wire;

pub use builder::{
    CommitOptions, DispatchMethod, OperationBuilder, OperationGateway, OperationPayload,
};
pub use error::ClientError;
pub use types::{AccountRef, ActionType, Amount, AmountDenomination, AmountReference, MarketId};
