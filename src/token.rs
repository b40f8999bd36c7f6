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

//! Compliant-token capability.
//!
//! The offering ledger never touches token balances directly; it consumes
//! the [`SecurityToken`] capability surface. [`StLinkToken`] is the
//! in-memory reference implementation the gateway deploys: a plain balance
//! map with pause and per-wallet freeze compliance gates and an agent role
//! for administrative overrides.
//!
//! Ledger balances and token balances can diverge when the
//! `forced_transfer` path is used outside the offering flow; that is the
//! operator's responsibility, exactly as with the on-chain original.

use crate::base::Address;
use crate::error::StError;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Capability surface of the external compliant-token collaborator.
pub trait SecurityToken: Send + Sync {
    /// Credits freshly issued tokens. Allowed while paused (primary
    /// issuance is an agent action, not a transfer).
    fn mint(&self, wallet: Address, amount: Decimal) -> Result<(), StError>;

    /// Destroys tokens held by `wallet`.
    fn burn(&self, wallet: Address, amount: Decimal) -> Result<(), StError>;

    /// Compliance-checked transfer between wallets.
    fn transfer(&self, from: Address, to: Address, amount: Decimal) -> Result<(), StError>;

    /// Administrative transfer bypassing the pause/freeze gates; only a
    /// designated agent may call it.
    fn forced_transfer(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), StError>;

    fn balance_of(&self, wallet: Address) -> Decimal;

    fn total_supply(&self) -> Decimal;

    fn is_frozen(&self, wallet: Address) -> bool;

    fn paused(&self) -> bool;

    fn pause(&self);

    fn unpause(&self);
}

#[derive(Debug, Default)]
struct TokenData {
    balances: HashMap<Address, Decimal>,
    total_supply: Decimal,
    paused: bool,
    frozen: HashSet<Address>,
}

/// In-memory compliant token.
///
/// Freshly deployed tokens start paused; the first issuance through the
/// platform lifts the pause.
#[derive(Debug)]
pub struct StLinkToken {
    symbol: String,
    treasury_wallet: Address,
    agents: Mutex<HashSet<Address>>,
    inner: Mutex<TokenData>,
}

impl StLinkToken {
    pub fn new(symbol: impl Into<String>, treasury_wallet: Address) -> Self {
        let mut agents = HashSet::new();
        agents.insert(treasury_wallet);
        Self {
            symbol: symbol.into(),
            treasury_wallet,
            agents: Mutex::new(agents),
            inner: Mutex::new(TokenData {
                paused: true,
                ..TokenData::default()
            }),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn treasury_wallet(&self) -> Address {
        self.treasury_wallet
    }

    /// Grants the agent role (forced transfers, freezing).
    pub fn add_agent(&self, agent: Address) {
        self.agents.lock().insert(agent);
    }

    pub fn is_agent(&self, address: Address) -> bool {
        self.agents.lock().contains(&address)
    }

    /// Freezes or unfreezes a wallet; only agents may do this.
    pub fn set_address_frozen(
        &self,
        caller: Address,
        wallet: Address,
        frozen: bool,
    ) -> Result<(), StError> {
        if !self.is_agent(caller) {
            return Err(StError::InvalidExecutor(caller));
        }
        let mut data = self.inner.lock();
        if frozen {
            data.frozen.insert(wallet);
        } else {
            data.frozen.remove(&wallet);
        }
        Ok(())
    }

    fn move_balance(
        data: &mut TokenData,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), StError> {
        let from_balance = data.balances.get(&from).copied().unwrap_or(Decimal::ZERO);
        if from_balance < amount {
            return Err(StError::InsufficientBalance);
        }
        data.balances.insert(from, from_balance - amount);
        *data.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }
}

impl SecurityToken for StLinkToken {
    fn mint(&self, wallet: Address, amount: Decimal) -> Result<(), StError> {
        if wallet.is_zero() {
            return Err(StError::InvalidAddress {
                address: wallet,
                name: "wallet",
            });
        }
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        let mut data = self.inner.lock();
        *data.balances.entry(wallet).or_insert(Decimal::ZERO) += amount;
        data.total_supply += amount;
        Ok(())
    }

    fn burn(&self, wallet: Address, amount: Decimal) -> Result<(), StError> {
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        let mut data = self.inner.lock();
        let balance = data.balances.get(&wallet).copied().unwrap_or(Decimal::ZERO);
        if balance < amount {
            return Err(StError::CannotBurnMoreThanBalance);
        }
        data.balances.insert(wallet, balance - amount);
        data.total_supply -= amount;
        Ok(())
    }

    fn transfer(&self, from: Address, to: Address, amount: Decimal) -> Result<(), StError> {
        if to.is_zero() {
            return Err(StError::InvalidAddress {
                address: to,
                name: "to",
            });
        }
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        let mut data = self.inner.lock();
        if data.paused || data.frozen.contains(&from) || data.frozen.contains(&to) {
            return Err(StError::TransferNotPossible);
        }
        Self::move_balance(&mut data, from, to, amount)
    }

    fn forced_transfer(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<(), StError> {
        if !self.is_agent(caller) {
            return Err(StError::InvalidExecutor(caller));
        }
        if amount <= Decimal::ZERO {
            return Err(StError::InvalidAmount);
        }
        let mut data = self.inner.lock();
        Self::move_balance(&mut data, from, to, amount)
    }

    fn balance_of(&self, wallet: Address) -> Decimal {
        self.inner
            .lock()
            .balances
            .get(&wallet)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn total_supply(&self) -> Decimal {
        self.inner.lock().total_supply
    }

    fn is_frozen(&self, wallet: Address) -> bool {
        self.inner.lock().frozen.contains(&wallet)
    }

    fn paused(&self) -> bool {
        self.inner.lock().paused
    }

    fn pause(&self) {
        self.inner.lock().paused = true;
    }

    fn unpause(&self) {
        self.inner.lock().paused = false;
    }
}
