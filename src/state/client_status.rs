// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client status tracking.

use crate::error::Error;
use crate::response::DeviceInfo;
use crate::types::{DeviceState, Endpoint};

use super::{ClientState, StateChange};

/// Snapshot of everything the client knows about its connection and device.
///
/// All fields start empty. They change only through [`ClientStatus::apply`].
///
/// # Examples
///
/// ```
/// use smartsocket::state::{ClientState, ClientStatus};
/// use smartsocket::types::DeviceState;
///
/// let status = ClientStatus::new();
/// assert_eq!(status.state(), ClientState::Disconnected);
/// assert_eq!(status.device(), DeviceState::Unknown);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientStatus {
    state: ClientState,
    device: DeviceState,
    /// Load in watts; only meaningful while the relay is on.
    power: Option<f64>,
    device_info: Option<DeviceInfo>,
    endpoint: Option<Endpoint>,
    last_error: Option<Error>,
}

impl ClientStatus {
    /// Creates the initial snapshot: `Disconnected`, `Unknown`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the connection lifecycle state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Returns the last known relay state.
    #[must_use]
    pub fn device(&self) -> DeviceState {
        self.device
    }

    /// Returns the last reported load in watts.
    #[must_use]
    pub fn power(&self) -> Option<f64> {
        self.power
    }

    /// Returns the identity reported in the handshake.
    #[must_use]
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    /// Returns the endpoint of the current or last connection attempt.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Returns the error that moved the client to `Failed`.
    #[must_use]
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Applies a state change.
    ///
    /// Returns `true` if the snapshot actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        let before = self.clone();

        match change {
            StateChange::Connecting { endpoint } => {
                *self = Self {
                    state: ClientState::Connecting,
                    endpoint: Some(endpoint.clone()),
                    ..Self::default()
                };
            }
            StateChange::Connected {
                device,
                power,
                info,
            } => {
                self.state = ClientState::Connected;
                self.last_error = None;
                self.device_info.clone_from(info);
                self.set_device(*device, *power);
            }
            StateChange::Device { state, power } => {
                self.set_device(*state, *power);
            }
            StateChange::Failed(error) => {
                self.state = ClientState::Failed;
                self.last_error = Some(error.clone());
            }
            StateChange::Reset => {
                *self = Self::default();
            }
        }

        *self != before
    }

    fn set_device(&mut self, device: DeviceState, power: Option<f64>) {
        self.device = device;
        self.power = if device == DeviceState::Off {
            None
        } else {
            power
        };
    }
}
