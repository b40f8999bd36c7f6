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

//! Security-token offering ledger.
//!
//! A [`SecurityTokenOffering`] owns the holder accounting for one offering
//! instance: the set of active token holders, their permission attributes,
//! and the aggregate counters (raised amount, sold amount, investor count).
//!
//! # Active set
//!
//! The active set is a dense array of wallet addresses with a wallet→index
//! side map, giving O(1) lookup, insertion, and removal. Removal uses
//! swap-with-last-then-truncate, so iteration order is NOT stable across
//! removals. Holder records persist after leaving the active set; a wallet
//! that later receives tokens again is revived with its stored attributes.
//!
//! # Invariants
//!
//! - A wallet is in the active set iff its record balance is positive.
//! - `investor_count` always equals the active-set cardinality.
//! - `raised_amount` and `sold_tokens_amount` never decrease; repayment
//!   leaves them untouched.
//!
//! # Thread Safety
//!
//! All mutable state sits behind one [`Mutex`], the per-offering
//! serialization region. Operations on different offerings never contend.

use crate::base::{Address, Timestamp};
use crate::error::StError;
use crate::holder::{HolderPermissions, TokenHolder};
use crate::identity::IdentityRegistry;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Aggregate statistics snapshot for one offering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoValue {
    pub symbol: String,
    pub rate: Decimal,
    pub raised_amount: Decimal,
    pub sold_tokens_amount: Decimal,
    pub investor_count: u64,
    pub contract_address: Address,
}

#[derive(Debug)]
struct StoData {
    /// Persistent record store; survives active-set removal.
    records: HashMap<Address, TokenHolder>,
    /// Dense array of active wallets (balance > 0).
    active: Vec<Address>,
    /// Wallet → position in `active`, updated on every swap.
    index: HashMap<Address, usize>,
    raised_amount: Decimal,
    sold_tokens_amount: Decimal,
}

impl StoData {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            active: Vec::new(),
            index: HashMap::new(),
            raised_amount: Decimal::ZERO,
            sold_tokens_amount: Decimal::ZERO,
        }
    }

    fn is_active(&self, wallet: &Address) -> bool {
        self.index.contains_key(wallet)
    }

    fn activate(&mut self, wallet: Address) {
        debug_assert!(!self.is_active(&wallet), "wallet activated twice");
        self.index.insert(wallet, self.active.len());
        self.active.push(wallet);
    }

    /// Swap-and-pop removal: the last element overwrites position `i`
    /// (no-op when `i` is already last) and the array shrinks by one.
    fn deactivate(&mut self, wallet: &Address) {
        let Some(i) = self.index.remove(wallet) else {
            return;
        };
        self.active.swap_remove(i);
        if let Some(&moved) = self.active.get(i) {
            self.index.insert(moved, i);
        }
    }

    fn assert_invariants(&self) {
        debug_assert_eq!(self.active.len(), self.index.len());
        #[cfg(debug_assertions)]
        for wallet in &self.active {
            let balance = self
                .records
                .get(wallet)
                .map(TokenHolder::balance)
                .unwrap_or(Decimal::ZERO);
            debug_assert!(
                balance > Decimal::ZERO,
                "Invariant violated: active holder {wallet} has balance {balance}"
            );
        }
    }
}

/// Holder accounting ledger for one offering instance.
pub struct SecurityTokenOffering {
    symbol: String,
    spc_address: Address,
    rate: Decimal,
    contract_address: Address,
    identity: Arc<IdentityRegistry>,
    inner: Mutex<StoData>,
}

impl SecurityTokenOffering {
    /// Creates an offering ledger bound to (issuer, symbol) with a fixed
    /// purchase rate.
    ///
    /// # Errors
    ///
    /// [`StError::InvalidAmount`] if `rate` is not positive.
    pub fn new(
        symbol: impl Into<String>,
        spc_address: Address,
        rate: Decimal,
        contract_address: Address,
        identity: Arc<IdentityRegistry>,
    ) -> Result<Self, StError> {
        if rate <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        Ok(Self {
            symbol: symbol.into(),
            spc_address,
            rate,
            contract_address,
            identity,
            inner: Mutex::new(StoData::new()),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn spc_address(&self) -> Address {
        self.spc_address
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Records a primary-market purchase of `amount * rate` tokens.
    ///
    /// A wallet never seen by this offering requires
    /// `overwrite == true` (the permission list must be registered on
    /// first contact) and permissions allowing the purchase. Repeat
    /// issuance credits the existing record; `raised_amount` and
    /// `sold_tokens_amount` grow by the purchase amount every time.
    ///
    /// # Errors
    ///
    /// - [`StError::InvalidAmount`] - `amount` is not positive.
    /// - [`StError::InvalidAddress`] - zero wallet, or first contact
    ///   without permission registration.
    /// - [`StError::PurchaseUnauthorizedInvestor`] - effective
    ///   `can_buy_from_sto` is false.
    /// - [`StError::InvestorKycExpired`] - effective KYC expiry is not in
    ///   the future.
    pub fn record_issuance(
        &self,
        wallet: Address,
        amount: Decimal,
        permissions: HolderPermissions,
        overwrite: bool,
        now: Timestamp,
    ) -> Result<(), StError> {
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        if wallet.is_zero() {
            return Err(StError::InvalidAddress {
                address: wallet,
                name: "params.walletAddress",
            });
        }

        let purchase = amount * self.rate;
        let mut data = self.inner.lock();

        let effective = match data.records.get(&wallet) {
            Some(existing) => {
                if overwrite {
                    permissions
                } else {
                    existing.permissions()
                }
            }
            None => {
                if !overwrite {
                    // No holder record exists to fall back on.
                    return Err(StError::InvalidAddress {
                        address: Address::ZERO,
                        name: "tokenHolder",
                    });
                }
                permissions
            }
        };
        if !effective.can_buy_from_sto {
            return Err(StError::PurchaseUnauthorizedInvestor);
        }
        if effective.kyc_expiry <= now {
            return Err(StError::InvestorKycExpired);
        }

        // Validation passed; commit.
        if !data.records.contains_key(&wallet) {
            let onchain_id = self.identity.create_identity(wallet);
            let holder = TokenHolder::new(
                self.symbol.clone(),
                self.spc_address,
                wallet,
                onchain_id,
                permissions,
            )?;
            data.records.insert(wallet, holder);
        }
        if !data.is_active(&wallet) {
            data.activate(wallet);
        }
        let holder = data
            .records
            .get_mut(&wallet)
            .ok_or(StError::InsufficientBalance)?;
        holder.apply_attributes(permissions, overwrite);
        holder.credit(purchase)?;

        data.raised_amount += purchase;
        data.sold_tokens_amount += purchase;
        data.assert_invariants();
        Ok(())
    }

    /// Records a secondary-market transfer between holders.
    ///
    /// The purchase rate does not apply. Mutation order is removal before
    /// insertion: the sender is decremented (and swap-and-pop removed at
    /// exactly zero) before the destination is upserted, which determines
    /// the resulting active-set order.
    ///
    /// # Errors
    ///
    /// - [`StError::InvalidAmount`] - `amount` is not positive.
    /// - [`StError::InvalidAddress`] - zero destination, or destination
    ///   never seen and `overwrite == false`.
    /// - [`StError::InsufficientBalance`] - sender absent or short.
    /// - [`StError::InvestorStillUnableToSend`] - sender's send gate.
    /// - [`StError::InvestorStillUnableToReceive`] - destination's
    ///   receive gate.
    /// - [`StError::InvestorKycExpired`] - destination KYC.
    pub fn record_transfer(
        &self,
        from: Address,
        to: Address,
        amount: Decimal,
        permissions: HolderPermissions,
        overwrite: bool,
        now: Timestamp,
    ) -> Result<(), StError> {
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        if to.is_zero() {
            return Err(StError::InvalidAddress {
                address: to,
                name: "params.to",
            });
        }

        let mut data = self.inner.lock();

        let sender = match data.records.get(&from) {
            Some(holder) if data.is_active(&from) => holder,
            _ => return Err(StError::InsufficientBalance),
        };
        if sender.balance() < amount {
            return Err(StError::InsufficientBalance);
        }
        if now < sender.can_send_after() {
            return Err(StError::InvestorStillUnableToSend);
        }

        let destination = match data.records.get(&to) {
            Some(existing) => {
                if overwrite {
                    permissions
                } else {
                    existing.permissions()
                }
            }
            None => {
                if !overwrite {
                    return Err(StError::InvalidAddress {
                        address: Address::ZERO,
                        name: "tokenHolder",
                    });
                }
                permissions
            }
        };
        if now < destination.can_receive_after {
            return Err(StError::InvestorStillUnableToReceive);
        }
        if destination.kyc_expiry <= now {
            return Err(StError::InvestorKycExpired);
        }

        // Validation passed; commit. Removal side first.
        let sender = data
            .records
            .get_mut(&from)
            .ok_or(StError::InsufficientBalance)?;
        sender.debit(amount)?;
        if sender.balance() == Decimal::ZERO {
            data.deactivate(&from);
        }

        if !data.records.contains_key(&to) {
            let onchain_id = self.identity.create_identity(to);
            let holder = TokenHolder::new(
                self.symbol.clone(),
                self.spc_address,
                to,
                onchain_id,
                permissions,
            )?;
            data.records.insert(to, holder);
        }
        if !data.is_active(&to) {
            data.activate(to);
        }
        let receiver = data
            .records
            .get_mut(&to)
            .ok_or(StError::InsufficientBalance)?;
        receiver.apply_attributes(permissions, overwrite);
        receiver.credit(amount)?;

        data.assert_invariants();
        Ok(())
    }

    /// Records a redemption: the holder's balance drops by `amount` and the
    /// holder leaves the active set at exactly zero.
    ///
    /// `raised_amount` and `sold_tokens_amount` are historical issuance
    /// figures and are not decremented.
    ///
    /// # Errors
    ///
    /// - [`StError::InvalidAmount`] - `amount` is not positive.
    /// - [`StError::InsufficientBalance`] - holder absent or short (the
    ///   token capability normally reports this first as an excessive
    ///   burn).
    pub fn record_repayment(&self, from: Address, amount: Decimal) -> Result<(), StError> {
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }

        let mut data = self.inner.lock();
        if !data.is_active(&from) {
            return Err(StError::InsufficientBalance);
        }
        let holder = data
            .records
            .get_mut(&from)
            .ok_or(StError::InsufficientBalance)?;
        holder.debit(amount)?;
        if holder.balance() == Decimal::ZERO {
            data.deactivate(&from);
        }

        data.assert_invariants();
        Ok(())
    }

    /// Snapshots of all active holders in current active-set order.
    ///
    /// The order is not stable across removals because of swap-and-pop.
    pub fn all_token_holders(&self) -> Vec<TokenHolder> {
        let data = self.inner.lock();
        data.active
            .iter()
            .filter_map(|wallet| data.records.get(wallet).cloned())
            .collect()
    }

    /// Snapshot of one active holder, or `None` once the balance has
    /// reached zero.
    pub fn holder_by_wallet(&self, wallet: Address) -> Option<TokenHolder> {
        let data = self.inner.lock();
        if !data.is_active(&wallet) {
            return None;
        }
        data.records.get(&wallet).cloned()
    }

    /// Read-only aggregate snapshot.
    pub fn value(&self) -> StoValue {
        let data = self.inner.lock();
        StoValue {
            symbol: self.symbol.clone(),
            rate: self.rate,
            raised_amount: data.raised_amount,
            sold_tokens_amount: data.sold_tokens_amount,
            investor_count: data.active.len() as u64,
            contract_address: self.contract_address,
        }
    }
}
