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

//! Token-holder records.
//!
//! A [`TokenHolder`] is the canonical attribute set for one
//! (offering, wallet) pair: ledger balance, time-gated send/receive
//! permissions, KYC expiry, and purchase eligibility. It knows nothing
//! about the offering's collection structure; the offering ledger owns
//! placement in the active set.

use crate::base::{Address, Timestamp};
use crate::error::StError;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Permission attributes applied to a holder on issuance or transfer.
///
/// `can_receive_after` / `can_send_after` gate movement in time;
/// `kyc_expiry` must stay in the future for the holder to participate;
/// `can_buy_from_sto` gates primary-market purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolderPermissions {
    pub can_receive_after: Timestamp,
    pub can_send_after: Timestamp,
    pub kyc_expiry: Timestamp,
    pub can_buy_from_sto: bool,
}

/// One holder's record within a single offering.
///
/// The record persists for the lifetime of the offering: when the balance
/// reaches zero the wallet leaves the offering's active set, but the record
/// (attributes and identity handle included) stays behind and is revived if
/// tokens flow back to the wallet later.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenHolder {
    symbol: String,
    spc_address: Address,
    wallet_address: Address,
    balance: Decimal,
    permissions: HolderPermissions,
    is_revoked: bool,
    onchain_id: Address,
}

impl TokenHolder {
    /// Creates a record with a zero balance; the caller credits the real
    /// balance as its next step.
    ///
    /// # Errors
    ///
    /// [`StError::InvalidAddress`] if `wallet_address` is the zero address.
    pub fn new(
        symbol: impl Into<String>,
        spc_address: Address,
        wallet_address: Address,
        onchain_id: Address,
        permissions: HolderPermissions,
    ) -> Result<Self, StError> {
        if wallet_address.is_zero() {
            return Err(StError::InvalidAddress {
                address: wallet_address,
                name: "params.walletAddress",
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            spc_address,
            wallet_address,
            balance: Decimal::ZERO,
            permissions,
            is_revoked: false,
            onchain_id,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn spc_address(&self) -> Address {
        self.spc_address
    }

    pub fn wallet_address(&self) -> Address {
        self.wallet_address
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn permissions(&self) -> HolderPermissions {
        self.permissions
    }

    pub fn can_receive_after(&self) -> Timestamp {
        self.permissions.can_receive_after
    }

    pub fn can_send_after(&self) -> Timestamp {
        self.permissions.can_send_after
    }

    pub fn kyc_expiry(&self) -> Timestamp {
        self.permissions.kyc_expiry
    }

    pub fn can_buy_from_sto(&self) -> bool {
        self.permissions.can_buy_from_sto
    }

    /// No in-scope operation revokes a holder; the flag stays `false`
    /// until an explicit revocation flow exists.
    pub fn is_revoked(&self) -> bool {
        self.is_revoked
    }

    pub fn onchain_id(&self) -> Address {
        self.onchain_id
    }

    /// Replaces the permission set when `overwrite` is true; leaves the
    /// existing permissions untouched otherwise (a transfer with
    /// `add_permission_list = false` opts out of updating the holder).
    pub fn apply_attributes(&mut self, permissions: HolderPermissions, overwrite: bool) {
        if overwrite {
            self.permissions = permissions;
        }
    }

    /// Increases the ledger balance.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), StError> {
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        self.balance += amount;
        self.assert_invariants();
        Ok(())
    }

    /// Decreases the ledger balance.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), StError> {
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        if self.balance < amount {
            return Err(StError::InsufficientBalance);
        }
        self.balance -= amount;
        self.assert_invariants();
        Ok(())
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: holder balance went negative: {}",
            self.balance
        );
    }
}

impl Serialize for TokenHolder {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TokenHolder", 9)?;
        state.serialize_field("symbol", &self.symbol)?;
        state.serialize_field("spc_address", &self.spc_address)?;
        state.serialize_field("wallet_address", &self.wallet_address)?;
        state.serialize_field("balance", &self.balance)?;
        state.serialize_field("can_receive_after", &self.permissions.can_receive_after)?;
        state.serialize_field("can_send_after", &self.permissions.can_send_after)?;
        state.serialize_field("kyc_expiry", &self.permissions.kyc_expiry)?;
        state.serialize_field("can_buy_from_sto", &self.permissions.can_buy_from_sto)?;
        state.serialize_field("is_revoked", &self.is_revoked)?;
        state.end()
    }
}
