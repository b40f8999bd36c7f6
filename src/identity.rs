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

//! On-chain identity handles.
//!
//! Each token holder carries an opaque identity handle created lazily on
//! first contact. The ledger never inspects identities; claims are wired
//! for future use and currently always read back empty.

use crate::base::Address;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// An identity claim. No claim issuer is integrated yet, so every lookup
/// returns the empty claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub topic: u64,
    pub scheme: u64,
    pub issuer: Address,
    pub signature: Vec<u8>,
    pub data: Vec<u8>,
    pub uri: String,
}

/// Registry allocating identity handles for holder wallets.
///
/// Handles are deterministic non-zero addresses in a reserved range; one
/// wallet always maps to the same handle.
#[derive(Debug)]
pub struct IdentityRegistry {
    identities: DashMap<Address, Address>,
    next_id: AtomicU64,
}

impl IdentityRegistry {
    /// Handle addresses start high to stay clear of gateway-allocated
    /// token/offering instance addresses.
    const HANDLE_BASE: u64 = 0x1000_0000;

    pub fn new() -> Self {
        Self {
            identities: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the wallet's identity handle, allocating one on first use.
    pub fn create_identity(&self, owner: Address) -> Address {
        *self.identities.entry(owner).or_insert_with(|| {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            Address::from_low_u64(Self::HANDLE_BASE + id)
        })
    }

    /// Handle previously allocated for `owner`, if any.
    pub fn identity_of(&self, owner: Address) -> Option<Address> {
        self.identities.get(&owner).map(|entry| *entry)
    }

    /// Claim lookup placeholder: any topic on any handle yields the empty
    /// claim.
    pub fn get_claim(&self, _handle: Address, _topic: u64) -> Claim {
        Claim::default()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
