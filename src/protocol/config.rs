// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection settings.

use std::time::Duration;

/// Timeouts applied to a smart socket connection.
///
/// # Examples
///
/// ```
/// use smartsocket::protocol::ConnectionConfig;
/// use std::time::Duration;
///
/// // Defaults
/// let config = ConnectionConfig::new();
/// assert_eq!(config.connect_timeout(), Duration::from_secs(5));
///
/// // Tuned for a slow network
/// let config = ConnectionConfig::new()
///     .with_connect_timeout(Duration::from_secs(15))
///     .with_request_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl ConnectionConfig {
    /// Default time allowed to establish the TCP connection.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default time allowed for a reply, handshake included.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration with default timeouts.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-request reply timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the TCP connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per-request reply timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new()
    }
}
