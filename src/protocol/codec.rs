// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame codec for the smart socket wire protocol.
//!
//! Every message is one frame:
//!
//! ```text
//! +--------+----------------+-----------------+
//! | opcode | length (u32 BE)| payload (length)|
//! +--------+----------------+-----------------+
//! ```
//!
//! The codec works on complete frames and has no side effects. Reading the
//! right number of bytes off a stream is the transport's job; it uses
//! [`FrameHeader::parse`] to learn how many payload bytes follow.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::command::{CHALLENGE_LEN, Command, Handshake, Opcode};
use crate::error::DecodeError;
use crate::response::Response;

/// Size of the fixed frame header.
pub const HEADER_LEN: usize = 5;

/// Largest payload either side accepts.
pub const MAX_PAYLOAD_LEN: u32 = 64 * 1024;

const HANDSHAKE_PAYLOAD_LEN: usize = 1 + CHALLENGE_LEN;

/// Fixed header at the start of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Raw opcode byte.
    pub opcode: u8,
    /// Number of payload bytes that follow the header.
    pub len: u32,
}

impl FrameHeader {
    /// Parses a header read from a stream.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::PayloadTooLarge` if the announced payload
    /// exceeds [`MAX_PAYLOAD_LEN`].
    pub fn parse(buf: &[u8; HEADER_LEN]) -> Result<Self, DecodeError> {
        let mut src = &buf[..];
        let opcode = src.get_u8();
        let len = src.get_u32();
        if len > MAX_PAYLOAD_LEN {
            return Err(DecodeError::PayloadTooLarge(len));
        }
        Ok(Self { opcode, len })
    }

    /// Returns the payload length as a buffer size.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        // u32 always fits in usize on supported targets
        self.len as usize
    }
}

/// Encodes requests and decodes replies on the client side.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCodec;

impl ClientCodec {
    /// Serializes a command into a frame.
    #[must_use]
    pub fn encode(&self, command: &Command) -> Bytes {
        match command {
            Command::Handshake(handshake) => {
                let mut payload = BytesMut::with_capacity(HANDSHAKE_PAYLOAD_LEN);
                payload.put_u8(handshake.version());
                payload.put_slice(handshake.challenge());
                frame(command.opcode().request_byte(), &payload)
            }
            Command::SwitchOn | Command::SwitchOff | Command::StatusQuery => {
                frame(command.opcode().request_byte(), &[])
            }
        }
    }

    /// Parses a complete reply frame.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the frame is truncated, has trailing bytes,
    /// carries a non-reply opcode, or its payload does not match the opcode.
    pub fn decode(&self, src: Bytes) -> Result<Response, DecodeError> {
        let (byte, payload) = split_frame(src)?;
        let opcode = Opcode::from_reply_byte(byte).ok_or(DecodeError::UnknownOpcode(byte))?;

        let response = match opcode {
            Opcode::Handshake => Response::Handshake(serde_json::from_slice(&payload)?),
            Opcode::SwitchOn => Response::SwitchOn(serde_json::from_slice(&payload)?),
            Opcode::SwitchOff => Response::SwitchOff(serde_json::from_slice(&payload)?),
            Opcode::StatusQuery => Response::Status(serde_json::from_slice(&payload)?),
        };
        Ok(response)
    }
}

/// Decodes requests and encodes replies on the device side.
///
/// The client never needs this; it exists so device firmware shims and test
/// doubles speak exactly the same framing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceCodec;

impl DeviceCodec {
    /// Parses a complete request frame.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the frame is truncated, has trailing bytes,
    /// carries a non-request opcode, or a payload of the wrong size.
    pub fn decode(&self, src: Bytes) -> Result<Command, DecodeError> {
        let (byte, mut payload) = split_frame(src)?;
        let opcode = Opcode::from_request_byte(byte).ok_or(DecodeError::UnknownOpcode(byte))?;

        match opcode {
            Opcode::Handshake => {
                if payload.len() != HANDSHAKE_PAYLOAD_LEN {
                    return Err(DecodeError::Malformed(format!(
                        "handshake payload is {} bytes, expected {HANDSHAKE_PAYLOAD_LEN}",
                        payload.len()
                    )));
                }
                let version = payload.get_u8();
                let mut challenge = [0u8; CHALLENGE_LEN];
                payload.copy_to_slice(&mut challenge);
                Ok(Command::Handshake(Handshake::from_parts(version, challenge)))
            }
            Opcode::SwitchOn => expect_empty(opcode, &payload).map(|()| Command::SwitchOn),
            Opcode::SwitchOff => expect_empty(opcode, &payload).map(|()| Command::SwitchOff),
            Opcode::StatusQuery => expect_empty(opcode, &payload).map(|()| Command::StatusQuery),
        }
    }

    /// Serializes a reply into a frame.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::PayloadTooLarge` if the JSON body exceeds
    /// [`MAX_PAYLOAD_LEN`].
    pub fn encode(&self, response: &Response) -> Result<Bytes, DecodeError> {
        let payload = match response {
            Response::Handshake(reply) => serde_json::to_vec(reply)?,
            Response::SwitchOn(reply) | Response::SwitchOff(reply) | Response::Status(reply) => {
                serde_json::to_vec(reply)?
            }
        };

        let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
        if len > MAX_PAYLOAD_LEN {
            return Err(DecodeError::PayloadTooLarge(len));
        }
        Ok(frame(response.opcode().reply_byte(), &payload))
    }
}

/// Builds a frame around a payload no larger than [`MAX_PAYLOAD_LEN`].
fn frame(opcode: u8, payload: &[u8]) -> Bytes {
    // Callers keep payloads under MAX_PAYLOAD_LEN
    #[allow(clippy::cast_possible_truncation)]
    let len = payload.len() as u32;

    let mut wire = BytesMut::with_capacity(HEADER_LEN + payload.len());
    wire.put_u8(opcode);
    wire.put_u32(len);
    wire.put_slice(payload);
    wire.freeze()
}

fn expect_empty(opcode: Opcode, payload: &Bytes) -> Result<(), DecodeError> {
    if payload.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::Malformed(format!(
            "{opcode} carries {} unexpected payload bytes",
            payload.len()
        )))
    }
}

/// Splits a complete frame into its opcode byte and payload.
fn split_frame(mut src: Bytes) -> Result<(u8, Bytes), DecodeError> {
    if src.len() < HEADER_LEN {
        return Err(DecodeError::Truncated {
            needed: HEADER_LEN,
            available: src.len(),
        });
    }

    let mut header = [0u8; HEADER_LEN];
    src.copy_to_slice(&mut header);
    let header = FrameHeader::parse(&header)?;

    let len = header.payload_len();
    if src.len() < len {
        return Err(DecodeError::Truncated {
            needed: HEADER_LEN + len,
            available: HEADER_LEN + src.len(),
        });
    }
    if src.len() > len {
        return Err(DecodeError::TrailingBytes(src.len() - len));
    }

    Ok((header.opcode, src))
}
