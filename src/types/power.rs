// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-related types for smart sockets.
//!
//! [`PowerState`] is what the device reports on the wire. [`DeviceState`] is
//! what the client knows about the device, which includes not knowing yet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Power state reported by a smart socket.
///
/// # Examples
///
/// ```
/// use smartsocket::types::PowerState;
///
/// assert_eq!(PowerState::On.as_str(), "ON");
/// assert_eq!("off".parse::<PowerState>().unwrap(), PowerState::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    /// The relay is open, no load is powered.
    #[serde(rename = "OFF")]
    Off,
    /// The relay is closed, the load is powered.
    #[serde(rename = "ON")]
    On,
}

impl PowerState {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns `true` if the socket is switched on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OFF" | "0" | "FALSE" => Ok(Self::Off),
            "ON" | "1" | "TRUE" => Ok(Self::On),
            _ => Err(format!("invalid power state: {s}")),
        }
    }
}

/// Last known power state of the remote device, as tracked by the client.
///
/// The state is [`DeviceState::Unknown`] until the device reports it, either
/// in the handshake or by acknowledging a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceState {
    /// The device has not reported its state yet.
    #[default]
    Unknown,
    /// The device acknowledged being switched on.
    On,
    /// The device acknowledged being switched off.
    Off,
}

impl DeviceState {
    /// Returns the state name used in the client's text rendering.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::On => "On",
            Self::Off => "Off",
        }
    }

    /// Returns `Some(true)` if on, `Some(false)` if off, `None` if unknown.
    #[must_use]
    pub const fn is_on(&self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::On => Some(true),
            Self::Off => Some(false),
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PowerState> for DeviceState {
    fn from(state: PowerState) -> Self {
        match state {
            PowerState::On => Self::On,
            PowerState::Off => Self::Off,
        }
    }
}

impl From<Option<PowerState>> for DeviceState {
    fn from(state: Option<PowerState>) -> Self {
        state.map_or(Self::Unknown, Self::from)
    }
}
