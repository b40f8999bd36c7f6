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

//! Error types for security-token operations.

use crate::base::Address;
use thiserror::Error;

/// Security-token operation errors.
///
/// Every failure aborts its operation with no partial state change. Nothing
/// is retried automatically; callers correct the underlying condition and
/// resubmit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StError {
    /// Caller is neither the platform owner nor the SPC for the symbol
    /// (nor, for transfers, the sending investor)
    #[error("invalid executor {0}")]
    InvalidExecutor(Address),

    /// An internal call arrived from an unexpected or uninitialized sender,
    /// e.g. issuance against an offering that was never released
    #[error("invalid sender {0}")]
    InvalidSender(Address),

    /// The TREX gateway binding is missing or the zero address
    #[error("invalid trex gateway address {0}")]
    InvalidTrexGatewayAddress(Address),

    /// Offer-release or a downstream operation ran before the token release
    #[error("security token offering not created")]
    SecurityTokenOfferingNotCreated,

    /// A token was already released for this (issuer, symbol) pair
    #[error("token already deployed")]
    TokenAlreadyDeployed,

    /// The facade was initialized twice
    #[error("contract is already initialized")]
    AlreadyInitialized,

    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// A required address is the zero address; `name` identifies the field
    #[error("invalid address {address} ({name})")]
    InvalidAddress { address: Address, name: &'static str },

    /// Holder KYC expiry is not in the future
    #[error("investor KYC expired")]
    InvestorKycExpired,

    /// Sender's `can_send_after` gate has not opened yet
    #[error("investor still unable to send")]
    InvestorStillUnableToSend,

    /// Destination's `can_receive_after` gate has not opened yet
    #[error("investor still unable to receive")]
    InvestorStillUnableToReceive,

    /// Holder is not eligible to purchase from the offering
    #[error("purchase unauthorized investor")]
    PurchaseUnauthorizedInvestor,

    /// Transfer or repayment exceeds the holder's ledger balance
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Burn request exceeds the wallet's token balance
    #[error("cannot burn more than balance")]
    CannotBurnMoreThanBalance,

    /// Token-level transfer refused (paused token or frozen wallet)
    #[error("transfer not possible")]
    TransferNotPossible,
}
