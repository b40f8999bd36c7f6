// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # Security-Token Offering Ledger
//!
//! This library implements a permissioned security-token issuance and
//! lifecycle platform: releasing tokens, opening offerings (STOs), issuing
//! to KYC'd investors, transferring between permissioned holders, and
//! redeeming positions — with an authoritative per-offering ledger of
//! holders, permissions, and aggregate statistics.
//!
//! ## Core Components
//!
//! - [`StPlatform`]: Business operation façade (release, offer-release,
//!   issue, transfer, repay, queries)
//! - [`SecurityTokenOffering`]: Per-offering holder ledger with O(1)
//!   swap-and-pop active-set accounting
//! - [`TokenHolder`]: Holder record with balance and permission gates
//! - [`TrexGateway`]: Factory deploying token/offering instances and
//!   owning the registries
//! - [`StError`]: Error types for operation failures
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_decimal_macros::dec;
//! use sto_ledger_rs::{
//!     Address, ManualClock, StIssueParams, StPlatform, StReleaseParams,
//!     StoReleaseParams, TrexGateway,
//! };
//!
//! let owner = Address::from_low_u64(1);
//! let spc = Address::from_low_u64(2);
//! let platform = StPlatform::with_clock(owner, Arc::new(ManualClock::new(1_000)));
//! platform.initialize().unwrap();
//! platform
//!     .set_trex_gateway(owner, Arc::new(TrexGateway::new(Address::from_low_u64(3))))
//!     .unwrap();
//!
//! platform
//!     .release(owner, StReleaseParams { symbol: "DEMO".into(), spc_address: spc })
//!     .unwrap();
//! let sto_address = platform
//!     .sto_release(
//!         owner,
//!         StoReleaseParams { symbol: "DEMO".into(), spc_address: spc, rate: dec!(2) },
//!     )
//!     .unwrap();
//!
//! platform
//!     .issue(
//!         spc,
//!         StIssueParams {
//!             symbol: "DEMO".into(),
//!             spc_address: spc,
//!             add_permission_list: true,
//!             sto_address,
//!             investor: Address::from_low_u64(4),
//!             amount: dec!(1000),
//!             can_receive_after: 0,
//!             can_send_after: 0,
//!             kyc_expiry: 2_000,
//!             can_buy_from_sto: true,
//!         },
//!     )
//!     .unwrap();
//!
//! let holders = platform.get_token_holders("DEMO", spc);
//! assert_eq!(holders[0].balance(), dec!(2000));
//! ```
//!
//! ## Thread Safety
//!
//! Each offering's state sits behind its own mutex; operations on
//! different offerings never contend. Registries and token balances use
//! concurrent maps.

pub mod base;
pub mod clock;
pub mod error;
mod events;
mod gateway;
pub mod holder;
mod identity;
mod platform;
mod registry;
mod sto;
mod token;

pub use base::{Address, RegistryKey, Timestamp};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StError;
pub use events::{EventLog, StEvent};
pub use gateway::TrexGateway;
pub use holder::{HolderPermissions, TokenHolder};
pub use identity::{Claim, IdentityRegistry};
pub use platform::{
    SecurityTokenSummary, StIssueParams, StPlatform, StReleaseParams, StRepaymentParams,
    StTransferParams, StoReleaseParams,
};
pub use registry::{StoRegistry, TokenRegistry};
pub use sto::{SecurityTokenOffering, StoValue};
pub use token::{SecurityToken, StLinkToken};
