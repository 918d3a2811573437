// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handshake reply parsing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::CHALLENGE_LEN;
use crate::types::PowerState;

/// Identity a device may announce during the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable device identifier.
    pub id: Uuid,
    /// Human readable name.
    pub name: String,
}

/// Reply to a handshake request.
///
/// The device proves it speaks the protocol by returning the masked
/// challenge, and may report its identity and current state:
///
/// ```json
/// {"version": 1, "challenge": [..16 bytes..], "device": {"id": "...", "name": "Kettle"}, "state": "ON", "power": 1800.0}
/// ```
///
/// # Examples
///
/// ```
/// use smartsocket::response::HandshakeReply;
/// use smartsocket::types::PowerState;
///
/// let json = r#"{"version": 1, "challenge": [0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0], "state": "OFF"}"#;
/// let reply: HandshakeReply = serde_json::from_str(json).unwrap();
/// assert_eq!(reply.version, 1);
/// assert_eq!(reply.state, Some(PowerState::Off));
/// assert!(reply.device.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeReply {
    /// Protocol version spoken by the device.
    pub version: u8,
    /// The client challenge XOR-ed with the handshake mask.
    pub challenge: [u8; CHALLENGE_LEN],
    /// Device identity, if the device reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,
    /// Current power state, if the device reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PowerState>,
    /// Current load in watts, if the device measures it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
}

impl HandshakeReply {
    /// Creates a reply carrying only the protocol version and challenge answer.
    #[must_use]
    pub fn new(version: u8, challenge: [u8; CHALLENGE_LEN]) -> Self {
        Self {
            version,
            challenge,
            device: None,
            state: None,
            power: None,
        }
    }

    /// Adds the device identity.
    #[must_use]
    pub fn with_device(mut self, id: Uuid, name: impl Into<String>) -> Self {
        self.device = Some(DeviceInfo {
            id,
            name: name.into(),
        });
        self
    }

    /// Adds the current power state.
    #[must_use]
    pub fn with_state(mut self, state: PowerState) -> Self {
        self.state = Some(state);
        self
    }

    /// Adds the current load in watts.
    #[must_use]
    pub fn with_power(mut self, watts: f64) -> Self {
        self.power = Some(watts);
        self
    }
}
