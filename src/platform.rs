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

//! Business operation façade.
//!
//! [`StPlatform`] is the entry point for the five business operations:
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | Release | Deploys and registers the security token |
//! | Sto-Release | Opens an offering bound to a released token |
//! | Issue | Mints `amount × rate` tokens to a KYC'd investor |
//! | Transfer | Moves tokens between permissioned holders |
//! | Repay | Burns tokens, redeeming the holder's position |
//!
//! Each operation authenticates the caller (platform owner or the symbol's
//! SPC; a transfer also accepts the sending investor), requires the gateway
//! binding, validates before mutating, and emits one [`StEvent`] on
//! success. Read-only queries expose token, holder, and offering snapshots.

use crate::base::{Address, RegistryKey, Timestamp};
use crate::clock::{Clock, SystemClock};
use crate::error::StError;
use crate::events::{EventLog, StEvent};
use crate::gateway::TrexGateway;
use crate::holder::{HolderPermissions, TokenHolder};
use crate::sto::StoValue;
use crate::token::SecurityToken;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Release operation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StReleaseParams {
    pub symbol: String,
    pub spc_address: Address,
}

/// Offer-release operation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoReleaseParams {
    pub symbol: String,
    pub spc_address: Address,
    pub rate: Decimal,
}

/// Issue operation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StIssueParams {
    pub symbol: String,
    pub spc_address: Address,
    /// When false, the investor's existing permission list is left as-is;
    /// a first-contact investor then has no record to fall back on and the
    /// issue fails.
    pub add_permission_list: bool,
    pub sto_address: Address,
    pub investor: Address,
    pub amount: Decimal,
    pub can_receive_after: Timestamp,
    pub can_send_after: Timestamp,
    pub kyc_expiry: Timestamp,
    pub can_buy_from_sto: bool,
}

/// Transfer operation parameters. The purchase rate does not apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StTransferParams {
    pub symbol: String,
    pub spc_address: Address,
    pub add_permission_list: bool,
    pub from: Address,
    pub to: Address,
    pub amount: Decimal,
    pub can_receive_after: Timestamp,
    pub can_send_after: Timestamp,
    pub kyc_expiry: Timestamp,
    pub can_buy_from_sto: bool,
}

/// Repay operation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StRepaymentParams {
    pub symbol: String,
    pub spc_address: Address,
    pub from: Address,
    pub amount: Decimal,
}

/// Per-token summary returned by [`StPlatform::get_security_tokens`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityTokenSummary {
    pub symbol: String,
    pub token_address: Address,
    pub total_supply: Decimal,
    pub treasury_wallet: Address,
    /// Treasury wallet freeze state.
    pub frozen: bool,
    /// Whether the token accepts transfers (not paused).
    pub allowed: bool,
}

/// Business operation façade over the gateway, ledgers, and token
/// capability.
pub struct StPlatform {
    owner: Address,
    initialized: AtomicBool,
    gateway: Mutex<Option<Arc<TrexGateway>>>,
    clock: Arc<dyn Clock>,
    events: EventLog,
    /// Per-(issuer, symbol) operation locks. Token and ledger mutations of
    /// one operation commit inside a single region; operations on
    /// different symbols never contend.
    op_locks: DashMap<RegistryKey, Arc<Mutex<()>>>,
}

impl StPlatform {
    /// Creates a platform owned by `owner`, using wall-clock time for
    /// permission gates.
    pub fn new(owner: Address) -> Self {
        Self::with_clock(owner, Arc::new(SystemClock))
    }

    /// Creates a platform with an injected time source.
    pub fn with_clock(owner: Address, clock: Arc<dyn Clock>) -> Self {
        Self {
            owner,
            initialized: AtomicBool::new(false),
            gateway: Mutex::new(None),
            clock,
            events: EventLog::new(),
            op_locks: DashMap::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// One-shot initialization.
    ///
    /// # Errors
    ///
    /// [`StError::AlreadyInitialized`] on a repeat call.
    pub fn initialize(&self) -> Result<(), StError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(StError::AlreadyInitialized);
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Binds the deployment gateway. Owner-only.
    ///
    /// # Errors
    ///
    /// - [`StError::InvalidExecutor`] - caller is not the owner.
    /// - [`StError::InvalidTrexGatewayAddress`] - gateway has the zero
    ///   address.
    pub fn set_trex_gateway(
        &self,
        caller: Address,
        gateway: Arc<TrexGateway>,
    ) -> Result<(), StError> {
        if caller != self.owner {
            return Err(StError::InvalidExecutor(caller));
        }
        if gateway.address().is_zero() {
            return Err(StError::InvalidTrexGatewayAddress(gateway.address()));
        }
        *self.gateway.lock() = Some(gateway);
        Ok(())
    }

    /// Event log of completed operations.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn gateway(&self) -> Result<Arc<TrexGateway>, StError> {
        self.gateway
            .lock()
            .clone()
            .ok_or(StError::InvalidTrexGatewayAddress(Address::ZERO))
    }

    /// Owner or the symbol's SPC.
    fn authorize(&self, caller: Address, spc_address: Address) -> Result<(), StError> {
        if caller != self.owner && caller != spc_address {
            return Err(StError::InvalidExecutor(caller));
        }
        Ok(())
    }

    fn op_lock(&self, key: &RegistryKey) -> Arc<Mutex<()>> {
        Arc::clone(
            &self
                .op_locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Releases (deploys and registers) a security token for the pair.
    ///
    /// # Errors
    ///
    /// - [`StError::InvalidExecutor`] / [`StError::InvalidTrexGatewayAddress`]
    /// - [`StError::TokenAlreadyDeployed`] - the pair already released.
    pub fn release(&self, caller: Address, params: StReleaseParams) -> Result<Address, StError> {
        self.authorize(caller, params.spc_address)?;
        let gateway = self.gateway()?;

        let token_address = gateway.deploy_token(params.spc_address, &params.symbol)?;
        self.events.emit(StEvent::StReleased {
            symbol: params.symbol,
            spc_address: params.spc_address,
            token_address,
        });
        Ok(token_address)
    }

    /// Opens an offering against a released token; the new offering
    /// becomes current for issuance.
    ///
    /// # Errors
    ///
    /// - [`StError::SecurityTokenOfferingNotCreated`] - release the token
    ///   first.
    /// - [`StError::InvalidAmount`] - non-positive rate.
    pub fn sto_release(
        &self,
        caller: Address,
        params: StoReleaseParams,
    ) -> Result<Address, StError> {
        self.authorize(caller, params.spc_address)?;
        let gateway = self.gateway()?;

        let key = RegistryKey::new(params.spc_address, &params.symbol);
        let sto_address = gateway.deploy_sto(params.spc_address, &params.symbol, params.rate)?;
        let token_address = gateway
            .token_address_of(&key)
            .ok_or(StError::SecurityTokenOfferingNotCreated)?;

        self.events.emit(StEvent::StoReleased {
            symbol: params.symbol,
            spc_address: params.spc_address,
            token_address,
            sto_address,
        });
        Ok(sto_address)
    }

    /// Issues `amount × rate` tokens to an investor: updates the offering
    /// ledger, mints on the token, and lifts the token's initial pause on
    /// first issuance.
    ///
    /// # Errors
    ///
    /// - [`StError::InvalidSender`] - `sto_address` does not resolve to a
    ///   released offering.
    /// - [`StError::InvalidAddress`] - zero investor wallet, or first
    ///   contact with `add_permission_list == false`.
    /// - [`StError::InvalidAmount`] / [`StError::PurchaseUnauthorizedInvestor`]
    ///   / [`StError::InvestorKycExpired`] - ledger validation.
    pub fn issue(&self, caller: Address, params: StIssueParams) -> Result<(), StError> {
        self.authorize(caller, params.spc_address)?;
        let gateway = self.gateway()?;

        let sto = gateway
            .offering(params.sto_address)
            .ok_or(StError::InvalidSender(params.sto_address))?;
        if params.investor.is_zero() {
            return Err(StError::InvalidAddress {
                address: params.investor,
                name: "params.walletAddress",
            });
        }

        // Token must resolve before the ledger mutates.
        let key = RegistryKey::new(params.spc_address, &params.symbol);
        let token = gateway
            .token_of(&key)
            .ok_or(StError::SecurityTokenOfferingNotCreated)?;

        let lock = self.op_lock(&key);
        let _guard = lock.lock();

        let permissions = HolderPermissions {
            can_receive_after: params.can_receive_after,
            can_send_after: params.can_send_after,
            kyc_expiry: params.kyc_expiry,
            can_buy_from_sto: params.can_buy_from_sto,
        };
        sto.record_issuance(
            params.investor,
            params.amount,
            permissions,
            params.add_permission_list,
            self.clock.now(),
        )?;

        token.mint(params.investor, params.amount * sto.rate())?;
        if token.paused() {
            token.unpause();
        }

        self.events.emit(StEvent::StIssued {
            symbol: params.symbol,
            spc_address: params.spc_address,
            sto_address: params.sto_address,
            investor: params.investor,
            amount: params.amount,
        });
        Ok(())
    }

    /// Transfers tokens between holders; the sending investor may execute
    /// its own transfer.
    ///
    /// # Errors
    ///
    /// - [`StError::InvalidSender`] - no current offering for the pair.
    /// - [`StError::TransferNotPossible`] - token paused or a wallet
    ///   frozen.
    /// - Ledger validation errors (balance, time gates, destination KYC).
    pub fn transfer(&self, caller: Address, params: StTransferParams) -> Result<(), StError> {
        if caller != self.owner && caller != params.spc_address && caller != params.from {
            return Err(StError::InvalidExecutor(caller));
        }
        let gateway = self.gateway()?;

        let key = RegistryKey::new(params.spc_address, &params.symbol);
        let sto = gateway
            .current_offering(&key)
            .ok_or(StError::InvalidSender(Address::ZERO))?;
        let token = gateway
            .token_of(&key)
            .ok_or(StError::SecurityTokenOfferingNotCreated)?;

        let lock = self.op_lock(&key);
        let _guard = lock.lock();

        // Token-level gates must pass before the ledger commits.
        if token.paused() || token.is_frozen(params.from) || token.is_frozen(params.to) {
            return Err(StError::TransferNotPossible);
        }
        if token.balance_of(params.from) < params.amount {
            return Err(StError::InsufficientBalance);
        }

        let permissions = HolderPermissions {
            can_receive_after: params.can_receive_after,
            can_send_after: params.can_send_after,
            kyc_expiry: params.kyc_expiry,
            can_buy_from_sto: params.can_buy_from_sto,
        };
        sto.record_transfer(
            params.from,
            params.to,
            params.amount,
            permissions,
            params.add_permission_list,
            self.clock.now(),
        )?;

        token.transfer(params.from, params.to, params.amount)?;

        self.events.emit(StEvent::StTransfered {
            symbol: params.symbol,
            spc_address: params.spc_address,
            from: params.from,
            to: params.to,
            amount: params.amount,
        });
        Ok(())
    }

    /// Redeems tokens: burns on the token, then decrements the holder and
    /// removes it at zero. Aggregate sale figures stay untouched.
    ///
    /// Only the owner or SPC may repay; holders cannot force their own
    /// redemption.
    ///
    /// # Errors
    ///
    /// - [`StError::CannotBurnMoreThanBalance`] - repayment exceeds the
    ///   wallet's token balance.
    /// - [`StError::InvalidSender`] - no current offering for the pair.
    pub fn repay(&self, caller: Address, params: StRepaymentParams) -> Result<(), StError> {
        self.authorize(caller, params.spc_address)?;
        let gateway = self.gateway()?;

        let key = RegistryKey::new(params.spc_address, &params.symbol);
        let sto = gateway
            .current_offering(&key)
            .ok_or(StError::InvalidSender(Address::ZERO))?;
        let token = gateway
            .token_of(&key)
            .ok_or(StError::SecurityTokenOfferingNotCreated)?;

        let lock = self.op_lock(&key);
        let _guard = lock.lock();

        // The ledger must be able to follow the burn before it happens.
        if sto
            .holder_by_wallet(params.from)
            .map(|holder| holder.balance())
            .unwrap_or(Decimal::ZERO)
            < params.amount
        {
            return Err(StError::CannotBurnMoreThanBalance);
        }

        token.burn(params.from, params.amount)?;
        sto.record_repayment(params.from, params.amount)?;

        self.events.emit(StEvent::StRepayed {
            symbol: params.symbol,
            spc_address: params.spc_address,
            from: params.from,
            amount: params.amount,
        });
        Ok(())
    }

    /// Summaries of every token released by an issuer.
    pub fn get_security_tokens(&self, spc_address: Address) -> Vec<SecurityTokenSummary> {
        let Ok(gateway) = self.gateway() else {
            return Vec::new();
        };
        gateway
            .tokens_of_issuer(spc_address)
            .into_iter()
            .map(|(symbol, token_address, token)| SecurityTokenSummary {
                symbol,
                token_address,
                total_supply: token.total_supply(),
                treasury_wallet: token.treasury_wallet(),
                frozen: token.is_frozen(token.treasury_wallet()),
                allowed: !token.paused(),
            })
            .collect()
    }

    /// Active holder snapshots for the pair's current offering, in
    /// active-set order (unstable across removals).
    pub fn get_token_holders(&self, symbol: &str, spc_address: Address) -> Vec<TokenHolder> {
        let Ok(gateway) = self.gateway() else {
            return Vec::new();
        };
        let key = RegistryKey::new(spc_address, symbol);
        gateway
            .current_offering(&key)
            .map(|sto| sto.all_token_holders())
            .unwrap_or_default()
    }

    /// Aggregate snapshots of every offering released for the pair,
    /// oldest first.
    pub fn get_offerings(&self, symbol: &str, spc_address: Address) -> Vec<StoValue> {
        let Ok(gateway) = self.gateway() else {
            return Vec::new();
        };
        let key = RegistryKey::new(spc_address, symbol);
        gateway
            .offerings_of(&key)
            .iter()
            .map(|sto| sto.value())
            .collect()
    }
}
