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

//! Operation notifications.
//!
//! Every successful business operation emits one [`StEvent`]. Events land
//! on a lock-free FIFO log; consumers drain them in emission order.

use crate::base::Address;
use crossbeam::queue::SegQueue;
use rust_decimal::Decimal;
use serde::Serialize;

/// Notification emitted by a completed business operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StEvent {
    StReleased {
        symbol: String,
        spc_address: Address,
        token_address: Address,
    },
    StoReleased {
        symbol: String,
        spc_address: Address,
        token_address: Address,
        sto_address: Address,
    },
    StIssued {
        symbol: String,
        spc_address: Address,
        sto_address: Address,
        investor: Address,
        amount: Decimal,
    },
    StTransfered {
        symbol: String,
        spc_address: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    },
    StRepayed {
        symbol: String,
        spc_address: Address,
        from: Address,
        amount: Decimal,
    },
}

impl StEvent {
    pub fn symbol(&self) -> &str {
        match self {
            Self::StReleased { symbol, .. } => symbol,
            Self::StoReleased { symbol, .. } => symbol,
            Self::StIssued { symbol, .. } => symbol,
            Self::StTransfered { symbol, .. } => symbol,
            Self::StRepayed { symbol, .. } => symbol,
        }
    }

    pub fn spc_address(&self) -> Address {
        match self {
            Self::StReleased { spc_address, .. } => *spc_address,
            Self::StoReleased { spc_address, .. } => *spc_address,
            Self::StIssued { spc_address, .. } => *spc_address,
            Self::StTransfered { spc_address, .. } => *spc_address,
            Self::StRepayed { spc_address, .. } => *spc_address,
        }
    }
}

/// Lock-free FIFO event log.
///
/// Pushes never block; [`EventLog::drain`] removes and returns everything
/// emitted so far in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: SegQueue<StEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: SegQueue::new(),
        }
    }

    pub fn emit(&self, event: StEvent) {
        self.events.push(event);
    }

    /// Removes and returns all pending events, oldest first.
    pub fn drain(&self) -> Vec<StEvent> {
        let mut drained = Vec::with_capacity(self.events.len());
        while let Some(event) = self.events.pop() {
            drained.push(event);
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
