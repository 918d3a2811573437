// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection lifecycle of the client.

use std::fmt;

/// Lifecycle state of a [`SmartSocketClient`](crate::SmartSocketClient).
///
/// ```text
/// Disconnected ──connect──▶ Connecting ──ok──▶ Connected
///       ▲                        │                 │
///       │                      error           I/O error
///       │                        ▼                 │
///       └──────disconnect───── Failed ◀────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClientState {
    /// No connection. Initial state and the state after `disconnect`.
    #[default]
    Disconnected,
    /// Dialing and handshaking.
    Connecting,
    /// Connected and able to send commands.
    Connected,
    /// The last connection attempt or command failed at the transport level.
    Failed,
}

impl ClientState {
    /// Returns the state name as shown by `Display`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Failed => "Failed",
        }
    }

    /// Returns `true` if commands may be sent.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if the client is in the failed state.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disconnected() {
        assert_eq!(ClientState::default(), ClientState::Disconnected);
    }

    #[test]
    fn display_names() {
        assert_eq!(ClientState::Disconnected.to_string(), "Disconnected");
        assert_eq!(ClientState::Connecting.to_string(), "Connecting");
        assert_eq!(ClientState::Connected.to_string(), "Connected");
        assert_eq!(ClientState::Failed.to_string(), "Failed");
    }

    #[test]
    fn predicates() {
        assert!(ClientState::Connected.is_connected());
        assert!(!ClientState::Connecting.is_connected());
        assert!(ClientState::Failed.is_failed());
        assert!(!ClientState::Disconnected.is_failed());
    }
}
