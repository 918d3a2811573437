// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `smartsocket` - An async client for TCP smart sockets.
//!
//! The library connects to a single smart socket, switches its relay on and
//! off, and keeps a snapshot of the connection and device state that can be
//! inspected at any time.
//!
//! # Features
//!
//! - **Lifecycle**: connect, handshake, disconnect, with an explicit state machine
//! - **Power control**: switch on, switch off, status query with load reading
//! - **Ordering**: concurrent calls are queued and reach the device in issue order
//! - **Errors**: layered error types that the client both returns and retains
//!
//! # Quick Start
//!
//! ```no_run
//! use smartsocket::SmartSocketClient;
//!
//! #[tokio::main]
//! async fn main() -> smartsocket::Result<()> {
//!     let client = SmartSocketClient::new();
//!
//!     client.connect("127.0.0.1:55333").await?;
//!     client.switch_on().await?;
//!     println!("{client}"); // Client(state=Connected, device=On)
//!
//!     client.switch_off().await?;
//!     client.disconnect().await;
//!     println!("{client}"); // Client(state=Disconnected, device=Unknown)
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Timeouts
//!
//! ```no_run
//! use std::time::Duration;
//! use smartsocket::{ConnectionConfig, SmartSocketClient};
//!
//! #[tokio::main]
//! async fn main() -> smartsocket::Result<()> {
//!     let config = ConnectionConfig::new()
//!         .with_connect_timeout(Duration::from_secs(2))
//!         .with_request_timeout(Duration::from_millis(500));
//!     let client = SmartSocketClient::with_config(config);
//!
//!     client.connect("socket.local:55333").await?;
//!     let state = client.status().await?;
//!     println!("relay is {state}, drawing {:?} W", client.power()?);
//!     Ok(())
//! }
//! ```

mod client;
pub mod command;
pub mod error;
pub mod protocol;
pub mod response;
pub mod state;
pub mod types;

pub use client::SmartSocketClient;
pub use command::{Command, Handshake, Opcode};
pub use error::{ConfigError, ConnectError, DecodeError, Error, IoError, Result, StateError};
pub use protocol::ConnectionConfig;
pub use response::{CommandReply, DeviceInfo, HandshakeReply, Response};
pub use state::{ClientState, ClientStatus, StateChange};
pub use types::{DeviceState, Endpoint, PowerState};
