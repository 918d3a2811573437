// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for smart socket control.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off state as reported by the device
//! - [`DeviceState`] - Last known state tracked by the client (may be unknown)
//! - [`Endpoint`] - Validated `host:port` address of a device

mod endpoint;
mod power;

pub use endpoint::Endpoint;
pub use power::{DeviceState, PowerState};
