// SPDX-License-Identifier: MPL-2.0

//! Demo: connect to a smart socket, switch it on and off, then disconnect.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example switch -- [host:port]
//! ```
//!
//! The address defaults to `127.0.0.1:55333`. Set `RUST_LOG=smartsocket=debug`
//! to see the wire traffic.

use std::env;

use smartsocket::SmartSocketClient;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_ADDRESS: &str = "127.0.0.1:55333";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let address = env::args().nth(1).unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let client = SmartSocketClient::new();
    println!("{client}");

    client.connect(&address).await?;
    println!("{client}");

    if let Some(info) = client.device_info() {
        println!("Device: {} ({})", info.name, info.id);
    }

    client.switch_on().await?;
    println!("{client}");
    if let Some(watts) = client.power()? {
        println!("Drawing {watts} W");
    }

    client.switch_off().await?;
    println!("{client}");

    client.disconnect().await;
    println!("{client}");

    Ok(())
}
