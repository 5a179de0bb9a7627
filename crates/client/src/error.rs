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

//! Error types for the Solera client.

use solera_core::{convert::ConvertError, math::MathError};
use thiserror::Error;

use crate::{config::ConfigError, expiry::UnwindError};

/// Errors surfaced by the Solera client.
///
/// None of these are retried internally: state violations and configuration gaps are
/// programmer or deployment errors, and a failed dispatch is reported to the caller
/// after the builder has been reopened.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation was already committed and can no longer be mutated or re-dispatched.
    #[error("operation already committed")]
    AlreadyCommitted,
    /// Commit was attempted with no actions recorded.
    #[error("operation contains no actions")]
    EmptyOperation,
    /// A signed sub-operation was added to a builder not using the signed dispatch path.
    #[error("signed sub-operations require the signed-proxy dispatch path")]
    SignedModeRequired,
    /// Network or market configuration was missing.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An expiry-unwind precondition was violated.
    #[error(transparent)]
    Unwind(#[from] UnwindError),
    /// A value conversion failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),
    /// A fixed-point arithmetic operation failed.
    #[error(transparent)]
    Math(#[from] MathError),
    /// The gateway rejected or failed the dispatch.
    #[error("operation dispatch failed: {0}")]
    Dispatch(anyhow::Error),
}
