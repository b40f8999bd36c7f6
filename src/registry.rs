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

//! Token and offering registries.
//!
//! [`TokenRegistry`] maps (issuer, symbol) to the released token instance
//! and enforces the one-release-per-symbol rule. [`StoRegistry`] keeps the
//! ordered history of offering instances per (issuer, symbol) plus the
//! "current" offering new issuance resolves against.

use crate::base::{Address, RegistryKey};
use crate::error::StError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// (issuer, symbol) → released token instance address.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: DashMap<RegistryKey, Address>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    /// Registers a newly released token.
    ///
    /// # Errors
    ///
    /// Returns [`StError::TokenAlreadyDeployed`] if a token already exists
    /// for the key; release is never silently repeated.
    pub fn register(&self, key: RegistryKey, token: Address) -> Result<(), StError> {
        // Entry API gives atomic check-and-insert.
        match self.tokens.entry(key) {
            Entry::Occupied(_) => Err(StError::TokenAlreadyDeployed),
            Entry::Vacant(entry) => {
                entry.insert(token);
                Ok(())
            }
        }
    }

    pub fn token_of(&self, key: &RegistryKey) -> Option<Address> {
        self.tokens.get(key).map(|entry| *entry)
    }

    /// All tokens released by one issuer, in no particular order.
    pub fn tokens_of_issuer(&self, spc_address: Address) -> Vec<(String, Address)> {
        self.tokens
            .iter()
            .filter(|entry| entry.key().spc_address == spc_address)
            .map(|entry| (entry.key().symbol.clone(), *entry.value()))
            .collect()
    }
}

#[derive(Debug, Default)]
struct StoHistory {
    /// Oldest first; re-releasing a symbol appends rather than replaces.
    all: Vec<Address>,
    current: Address,
}

/// (issuer, symbol) → offering instances.
#[derive(Debug, Default)]
pub struct StoRegistry {
    offerings: DashMap<RegistryKey, StoHistory>,
}

impl StoRegistry {
    pub fn new() -> Self {
        Self {
            offerings: DashMap::new(),
        }
    }

    /// Appends an offering for the key and makes it current.
    ///
    /// `token` is the token registered for the same key; callers resolve it
    /// from the [`TokenRegistry`] first, so a missing token surfaces as
    /// [`StError::SecurityTokenOfferingNotCreated`] before this runs.
    pub fn register(
        &self,
        key: RegistryKey,
        token: Option<Address>,
        sto: Address,
    ) -> Result<(), StError> {
        if token.is_none() {
            return Err(StError::SecurityTokenOfferingNotCreated);
        }
        let mut history = self.offerings.entry(key).or_default();
        history.all.push(sto);
        history.current = sto;
        Ok(())
    }

    /// The offering new issuance resolves against, if any.
    pub fn current_offering(&self, key: &RegistryKey) -> Option<Address> {
        self.offerings
            .get(key)
            .map(|history| history.current)
            .filter(|address| !address.is_zero())
    }

    /// Every offering ever released for the key, oldest first.
    pub fn all_offerings(&self, key: &RegistryKey) -> Vec<Address> {
        self.offerings
            .get(key)
            .map(|history| history.all.clone())
            .unwrap_or_default()
    }
}
