// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command acknowledgment parsing.

use serde::{Deserialize, Serialize};

use crate::types::PowerState;

/// Acknowledgment of a switch or status command.
///
/// ```json
/// {"ok": true, "state": "ON", "power": 60.0}
/// {"ok": false, "error": "relay stuck"}
/// ```
///
/// # Examples
///
/// ```
/// use smartsocket::response::CommandReply;
/// use smartsocket::types::PowerState;
///
/// let reply: CommandReply = serde_json::from_str(r#"{"ok": true, "state": "ON"}"#).unwrap();
/// assert!(reply.ok);
/// assert_eq!(reply.state, Some(PowerState::On));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandReply {
    /// Whether the device executed the command.
    pub ok: bool,
    /// Power state after the command, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PowerState>,
    /// Load in watts after the command, if measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    /// Reason for a refusal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandReply {
    /// Creates a successful acknowledgment reporting `state`.
    #[must_use]
    pub fn success(state: PowerState) -> Self {
        Self {
            ok: true,
            state: Some(state),
            power: None,
            error: None,
        }
    }

    /// Creates a refusal with a reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            state: None,
            power: None,
            error: Some(reason.into()),
        }
    }

    /// Adds the measured load in watts.
    #[must_use]
    pub fn with_power(mut self, watts: f64) -> Self {
        self.power = Some(watts);
        self
    }

    /// Returns the refusal reason, or a generic one if the device gave none.
    #[must_use]
    pub fn rejection_reason(&self) -> &str {
        self.error.as_deref().unwrap_or("no reason given")
    }
}
