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

//! TREX-style deployment gateway.
//!
//! The [`TrexGateway`] is the factory collaborator: it deploys token and
//! offering instances, hands out their addresses, and owns the registries
//! that map (issuer, symbol) to those instances. The business façade binds
//! to one gateway and performs every lookup through it.

use crate::base::{Address, RegistryKey};
use crate::error::StError;
use crate::identity::IdentityRegistry;
use crate::registry::{StoRegistry, TokenRegistry};
use crate::sto::SecurityTokenOffering;
use crate::token::StLinkToken;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Factory and instance store for tokens and offerings.
pub struct TrexGateway {
    address: Address,
    token_registry: TokenRegistry,
    sto_registry: StoRegistry,
    tokens: DashMap<Address, Arc<StLinkToken>>,
    offerings: DashMap<Address, Arc<SecurityTokenOffering>>,
    identity: Arc<IdentityRegistry>,
    next_instance: AtomicU64,
}

impl TrexGateway {
    /// Deployed instances get deterministic addresses in this range,
    /// disjoint from identity handles.
    const INSTANCE_BASE: u64 = 0x2000_0000;

    pub fn new(address: Address) -> Self {
        Self {
            address,
            token_registry: TokenRegistry::new(),
            sto_registry: StoRegistry::new(),
            tokens: DashMap::new(),
            offerings: DashMap::new(),
            identity: Arc::new(IdentityRegistry::new()),
            next_instance: AtomicU64::new(1),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn identity(&self) -> Arc<IdentityRegistry> {
        Arc::clone(&self.identity)
    }

    fn next_address(&self) -> Address {
        let id = self.next_instance.fetch_add(1, Ordering::SeqCst);
        Address::from_low_u64(Self::INSTANCE_BASE + id)
    }

    /// Deploys a token for (issuer, symbol) and registers it.
    ///
    /// The fresh token starts paused and has the issuer as treasury and
    /// initial agent.
    ///
    /// # Errors
    ///
    /// [`StError::TokenAlreadyDeployed`] when the pair already released.
    pub fn deploy_token(&self, spc_address: Address, symbol: &str) -> Result<Address, StError> {
        let key = RegistryKey::new(spc_address, symbol);
        let address = self.next_address();
        self.token_registry.register(key, address)?;

        let token = StLinkToken::new(symbol, spc_address);
        // The gateway acts as the platform-side token agent.
        token.add_agent(self.address);
        self.tokens.insert(address, Arc::new(token));
        Ok(address)
    }

    /// Deploys an offering bound to (issuer, symbol, rate), appends it to
    /// the offering history, and makes it current.
    ///
    /// # Errors
    ///
    /// - [`StError::SecurityTokenOfferingNotCreated`] without a prior
    ///   token release for the pair.
    /// - [`StError::InvalidAmount`] for a non-positive rate.
    pub fn deploy_sto(
        &self,
        spc_address: Address,
        symbol: &str,
        rate: Decimal,
    ) -> Result<Address, StError> {
        let key = RegistryKey::new(spc_address, symbol);
        let token = self.token_registry.token_of(&key);
        if token.is_none() {
            return Err(StError::SecurityTokenOfferingNotCreated);
        }

        let address = self.next_address();
        let sto = SecurityTokenOffering::new(
            symbol,
            spc_address,
            rate,
            address,
            Arc::clone(&self.identity),
        )?;
        self.sto_registry.register(key, token, address)?;
        self.offerings.insert(address, Arc::new(sto));
        Ok(address)
    }

    pub fn token(&self, address: Address) -> Option<Arc<StLinkToken>> {
        self.tokens.get(&address).map(|entry| Arc::clone(&entry))
    }

    pub fn token_of(&self, key: &RegistryKey) -> Option<Arc<StLinkToken>> {
        self.token_registry
            .token_of(key)
            .and_then(|address| self.token(address))
    }

    pub fn token_address_of(&self, key: &RegistryKey) -> Option<Address> {
        self.token_registry.token_of(key)
    }

    pub fn offering(&self, address: Address) -> Option<Arc<SecurityTokenOffering>> {
        self.offerings.get(&address).map(|entry| Arc::clone(&entry))
    }

    /// The offering new issuance resolves against for the pair.
    pub fn current_offering(&self, key: &RegistryKey) -> Option<Arc<SecurityTokenOffering>> {
        self.sto_registry
            .current_offering(key)
            .and_then(|address| self.offering(address))
    }

    /// Every offering released for the pair, oldest first.
    pub fn offerings_of(&self, key: &RegistryKey) -> Vec<Arc<SecurityTokenOffering>> {
        self.sto_registry
            .all_offerings(key)
            .into_iter()
            .filter_map(|address| self.offering(address))
            .collect()
    }

    /// (symbol, address, token) triples released by one issuer.
    pub fn tokens_of_issuer(
        &self,
        spc_address: Address,
    ) -> Vec<(String, Address, Arc<StLinkToken>)> {
        self.token_registry
            .tokens_of_issuer(spc_address)
            .into_iter()
            .filter_map(|(symbol, address)| {
                self.token(address).map(|token| (symbol, address, token))
            })
            .collect()
    }
}
