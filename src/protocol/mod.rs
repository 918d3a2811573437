// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol and transport for smart sockets.
//!
//! # Frames
//!
//! Every message is a length-prefixed frame:
//!
//! ```text
//! +--------+----------------+-----------------+
//! | opcode | length (u32 BE)| payload         |
//! +--------+----------------+-----------------+
//! ```
//!
//! Requests use opcodes `0x01..=0x04`; a reply repeats the request opcode with
//! the high bit set. See [`ClientCodec`] and [`DeviceCodec`].
//!
//! # Connections
//!
//! [`Connection`] dials a device, runs the handshake and carries one request
//! at a time. [`ConnectionManager`] owns the client's single connection and
//! discards it after any transport failure.

mod codec;
mod config;
mod connection;
mod manager;

pub use codec::{ClientCodec, DeviceCodec, FrameHeader, HEADER_LEN, MAX_PAYLOAD_LEN};
pub use config::ConnectionConfig;
pub use connection::Connection;
pub use manager::ConnectionManager;
