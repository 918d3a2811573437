// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! Every mutation of a [`ClientStatus`](super::ClientStatus) is expressed as a
//! [`StateChange`] and applied in one step, so the snapshot never shows a
//! half-finished transition.
//!
//! # Examples
//!
//! ```
//! use smartsocket::state::{ClientState, ClientStatus, StateChange};
//! use smartsocket::types::{DeviceState, Endpoint};
//!
//! let mut status = ClientStatus::new();
//! let endpoint: Endpoint = "127.0.0.1:55333".parse().unwrap();
//!
//! status.apply(&StateChange::Connecting { endpoint });
//! status.apply(&StateChange::connected(DeviceState::Off));
//! assert_eq!(status.state(), ClientState::Connected);
//!
//! // Applying the same change again reports no change
//! assert!(!status.apply(&StateChange::connected(DeviceState::Off)));
//! ```

use crate::error::Error;
use crate::response::DeviceInfo;
use crate::types::{DeviceState, Endpoint};

/// A single transition of the client snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// A connection attempt to `endpoint` started.
    ///
    /// Clears everything learned from a previous device.
    Connecting {
        /// Target of the attempt.
        endpoint: Endpoint,
    },

    /// The handshake completed.
    Connected {
        /// Relay state reported in the handshake, `Unknown` if none.
        device: DeviceState,
        /// Load in watts reported in the handshake.
        power: Option<f64>,
        /// Identity reported in the handshake.
        info: Option<DeviceInfo>,
    },

    /// The device acknowledged a command or answered a status query.
    Device {
        /// Relay state after the command.
        state: DeviceState,
        /// Load in watts, if reported.
        power: Option<f64>,
    },

    /// A connection attempt or command failed; the error is retained.
    ///
    /// The last known relay state is kept.
    Failed(Error),

    /// The client disconnected. Everything returns to its initial value.
    Reset,
}

impl StateChange {
    /// Creates a [`StateChange::Connected`] without device identity or load.
    #[must_use]
    pub fn connected(device: DeviceState) -> Self {
        Self::Connected {
            device,
            power: None,
            info: None,
        }
    }

    /// Creates a [`StateChange::Device`] without a load reading.
    #[must_use]
    pub fn device(state: DeviceState) -> Self {
        Self::Device { state, power: None }
    }
}
