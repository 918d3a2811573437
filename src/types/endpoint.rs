// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network address of a smart socket.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use crate::error::ConfigError;

/// A validated `(host, port)` pair identifying a device.
///
/// Parsing only checks the syntax; name resolution happens when the
/// connection is dialed.
///
/// # Examples
///
/// ```
/// use smartsocket::types::Endpoint;
///
/// let ep: Endpoint = "127.0.0.1:55333".parse().unwrap();
/// assert_eq!(ep.host(), "127.0.0.1");
/// assert_eq!(ep.port(), 55333);
///
/// let v6: Endpoint = "[::1]:55333".parse().unwrap();
/// assert_eq!(v6.host(), "::1");
/// assert_eq!(v6.to_string(), "[::1]:55333");
///
/// assert!("not-an-address".parse::<Endpoint>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from its parts, validating both.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAddress` if the host is not a valid
    /// hostname or IP literal, or if the port is zero.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
        let host = host.into();
        if !is_valid_host(&host) {
            return Err(ConfigError::InvalidAddress(format!("invalid host: {host:?}")));
        }
        if port == 0 {
            return Err(ConfigError::InvalidAddress("port must not be 0".to_string()));
        }
        Ok(Self { host, port })
    }

    /// Returns the host part, without IPv6 brackets.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidAddress(s.to_string());

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, port) = rest.split_once("]:").ok_or_else(invalid)?;
            host.parse::<Ipv6Addr>().map_err(|_| invalid())?;
            (host, port)
        } else {
            let (host, port) = s.rsplit_once(':').ok_or_else(invalid)?;
            if host.contains(':') {
                return Err(invalid());
            }
            (host, port)
        };

        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;

        Self::new(host, port).map_err(|_| invalid())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Accepts IPv6 literals and dotted names made of letters, digits, `-` and `_`.
fn is_valid_host(host: &str) -> bool {
    if host.parse::<Ipv6Addr>().is_ok() {
        return true;
    }
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}
