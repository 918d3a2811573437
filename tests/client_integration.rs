// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the client against an in-process fake device.

use std::future::pending;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use smartsocket::protocol::{DeviceCodec, FrameHeader, HEADER_LEN};
use smartsocket::{
    ClientState, ClientStatus, Command, CommandReply, ConfigError, ConnectError,
    ConnectionConfig, DeviceState, Error, HandshakeReply, IoError, PowerState, Response,
    SmartSocketClient, StateError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

const DEVICE_ID: Uuid = Uuid::from_u128(0x5a5a_0000_1111_2222_3333_4444_5555_6666);

// ============================================================================
// Fake device
// ============================================================================

/// How the fake device answers the handshake.
#[derive(Debug, Clone, Copy, Default)]
enum HandshakeMode {
    #[default]
    Answer,
    WrongChallenge,
    Ignore,
}

/// Misbehavior kicking in once `DeviceScript::faulty_after` commands were answered.
#[derive(Debug, Clone)]
enum Fault {
    HangUp,
    Silent,
    Corrupt,
    Reject(String),
}

#[derive(Debug, Clone, Default)]
struct DeviceScript {
    initial: Option<PowerState>,
    watts: Option<f64>,
    handshake: HandshakeMode,
    faulty_after: usize,
    fault: Option<Fault>,
    /// Pause before answering each command.
    reply_delay: Option<Duration>,
}

struct FakeDevice {
    address: String,
    log: Arc<Mutex<Vec<Command>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeDevice {
    async fn start(script: DeviceScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let log = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let relay = Arc::new(Mutex::new(script.initial));

        let (log_task, connections_task) = (Arc::clone(&log), Arc::clone(&connections));
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                connections_task.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(
                    stream,
                    script.clone(),
                    Arc::clone(&log_task),
                    Arc::clone(&relay),
                ));
            }
        });

        Self {
            address,
            log,
            connections,
        }
    }

    async fn healthy() -> Self {
        Self::start(DeviceScript::default()).await
    }

    fn address(&self) -> &str {
        &self.address
    }

    /// Commands received after the handshake, in arrival order.
    fn commands(&self) -> Vec<Command> {
        self.log.lock().clone()
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

async fn serve(
    mut stream: TcpStream,
    script: DeviceScript,
    log: Arc<Mutex<Vec<Command>>>,
    relay: Arc<Mutex<Option<PowerState>>>,
) {
    let Some(Command::Handshake(hs)) = read_command(&mut stream).await else {
        return;
    };

    let answer = match script.handshake {
        HandshakeMode::Answer => hs.expected_answer(),
        HandshakeMode::WrongChallenge => *hs.challenge(),
        HandshakeMode::Ignore => pending().await,
    };
    let mut reply = HandshakeReply::new(hs.version(), answer).with_device(DEVICE_ID, "test socket");
    let initial = *relay.lock();
    if let Some(state) = initial {
        reply = reply.with_state(state);
        if let (PowerState::On, Some(watts)) = (state, script.watts) {
            reply = reply.with_power(watts);
        }
    }
    write_response(&mut stream, &Response::Handshake(reply)).await;

    let mut answered = 0;
    while let Some(command) = read_command(&mut stream).await {
        log.lock().push(command.clone());

        if answered >= script.faulty_after {
            match &script.fault {
                Some(Fault::HangUp) => return,
                Some(Fault::Silent) => pending::<()>().await,
                Some(Fault::Corrupt) => {
                    let _ = stream.write_all(&[0xff, 0, 0, 0, 0]).await;
                    continue;
                }
                Some(Fault::Reject(reason)) => {
                    let response = match command {
                        Command::SwitchOn => Response::SwitchOn(CommandReply::rejected(reason)),
                        Command::SwitchOff => Response::SwitchOff(CommandReply::rejected(reason)),
                        _ => Response::Status(CommandReply::rejected(reason)),
                    };
                    write_response(&mut stream, &response).await;
                    continue;
                }
                None => {}
            }
        }

        let ack = |state: PowerState| match (state, script.watts) {
            (PowerState::On, Some(watts)) => CommandReply::success(state).with_power(watts),
            _ => CommandReply::success(state),
        };

        if let Some(delay) = script.reply_delay {
            tokio::time::sleep(delay).await;
        }

        let response = match command {
            Command::Handshake(_) => return,
            Command::SwitchOn => {
                *relay.lock() = Some(PowerState::On);
                Response::SwitchOn(ack(PowerState::On))
            }
            Command::SwitchOff => {
                *relay.lock() = Some(PowerState::Off);
                Response::SwitchOff(ack(PowerState::Off))
            }
            Command::StatusQuery => {
                let current = *relay.lock();
                match current {
                    Some(state) => Response::Status(ack(state)),
                    None => Response::Status(CommandReply {
                        ok: true,
                        state: None,
                        power: None,
                        error: None,
                    }),
                }
            }
        };
        write_response(&mut stream, &response).await;
        answered += 1;
    }
}

async fn read_command(stream: &mut TcpStream) -> Option<Command> {
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await.ok()?;
    let len = FrameHeader::parse(&header).ok()?.payload_len();

    let mut frame = vec![0u8; HEADER_LEN + len];
    frame[..HEADER_LEN].copy_from_slice(&header);
    stream.read_exact(&mut frame[HEADER_LEN..]).await.ok()?;

    DeviceCodec.decode(Bytes::from(frame)).ok()
}

async fn write_response(stream: &mut TcpStream, response: &Response) {
    let frame = DeviceCodec.encode(response).unwrap();
    let _ = stream.write_all(&frame).await;
}

fn fast_client() -> SmartSocketClient {
    SmartSocketClient::with_config(
        ConnectionConfig::new()
            .with_connect_timeout(Duration::from_secs(2))
            .with_request_timeout(Duration::from_millis(200)),
    )
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn connect_then_disconnect_resets_everything() {
        let device = FakeDevice::healthy().await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        assert_eq!(client.state(), ClientState::Connected);
        assert_eq!(
            client.device_info().map(|info| info.id),
            Some(DEVICE_ID)
        );

        client.disconnect().await;
        assert_eq!(client.state(), ClientState::Disconnected);
        assert_eq!(client.device_state(), DeviceState::Unknown);
        assert_eq!(client.status_snapshot(), ClientStatus::new());
    }

    #[tokio::test]
    async fn disconnect_twice_equals_once() {
        let device = FakeDevice::healthy().await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        client.switch_on().await.unwrap();

        client.disconnect().await;
        let once = client.status_snapshot();
        client.disconnect().await;
        assert_eq!(client.status_snapshot(), once);
    }

    #[tokio::test]
    async fn end_to_end_rendering() {
        let device = FakeDevice::start(DeviceScript {
            initial: Some(PowerState::Off),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        assert_eq!(
            client.to_string(),
            "Client(state=Disconnected, device=Unknown)"
        );

        client.connect(device.address()).await.unwrap();
        assert_eq!(client.to_string(), "Client(state=Connected, device=Off)");

        client.switch_on().await.unwrap();
        assert_eq!(client.to_string(), "Client(state=Connected, device=On)");

        client.switch_off().await.unwrap();
        assert_eq!(client.to_string(), "Client(state=Connected, device=Off)");

        client.disconnect().await;
        assert_eq!(
            client.to_string(),
            "Client(state=Disconnected, device=Unknown)"
        );
    }

    #[tokio::test]
    async fn handshake_reports_initial_state() {
        let device = FakeDevice::start(DeviceScript {
            initial: Some(PowerState::On),
            watts: Some(60.0),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        assert_eq!(client.device_state(), DeviceState::On);
        assert_eq!(client.is_switched_on().unwrap(), Some(true));
        assert_eq!(client.power().unwrap(), Some(60.0));
        assert_eq!(
            client.device_info().map(|info| info.name),
            Some("test socket".to_string())
        );
    }

    #[tokio::test]
    async fn reconnect_replaces_connection() {
        let device = FakeDevice::healthy().await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        client.connect(device.address()).await.unwrap();
        assert_eq!(device.connections(), 2);
        assert!(client.is_connected());

        client.switch_on().await.unwrap();
        assert_eq!(device.commands(), vec![Command::SwitchOn]);
    }

    #[tokio::test]
    async fn endpoint_is_recorded() {
        let device = FakeDevice::healthy().await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        assert_eq!(
            client.endpoint().map(|ep| ep.to_string()),
            Some(device.address().to_string())
        );
    }
}

// ============================================================================
// Power control
// ============================================================================

mod power_control {
    use super::*;

    #[tokio::test]
    async fn switch_on_then_off_in_order() {
        let device = FakeDevice::healthy().await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        client.switch_on().await.unwrap();
        client.switch_off().await.unwrap();

        assert_eq!(client.device_state(), DeviceState::Off);
        assert_eq!(client.is_switched_on().unwrap(), Some(false));
        assert_eq!(
            device.commands(),
            vec![Command::SwitchOn, Command::SwitchOff]
        );
    }

    #[tokio::test]
    async fn switching_off_clears_power_draw() {
        let device = FakeDevice::start(DeviceScript {
            watts: Some(1800.0),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        client.switch_on().await.unwrap();
        assert_eq!(client.power().unwrap(), Some(1800.0));

        client.switch_off().await.unwrap();
        assert_eq!(client.power().unwrap(), None);
    }

    #[tokio::test]
    async fn status_query_refreshes_state() {
        let device = FakeDevice::start(DeviceScript {
            initial: Some(PowerState::Off),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        assert_eq!(client.status().await.unwrap(), DeviceState::Off);

        client.switch_on().await.unwrap();
        assert_eq!(client.status().await.unwrap(), DeviceState::On);
        assert_eq!(
            device.commands(),
            vec![Command::StatusQuery, Command::SwitchOn, Command::StatusQuery]
        );
    }

    #[tokio::test]
    async fn status_without_state_keeps_last_known() {
        let device = FakeDevice::healthy().await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        assert_eq!(client.status().await.unwrap(), DeviceState::Unknown);
    }

    #[tokio::test]
    async fn concurrent_calls_reach_device_in_issue_order() {
        let device = FakeDevice::healthy().await;
        let client = SmartSocketClient::new();
        client.connect(device.address()).await.unwrap();

        let (on, off, status, on_again) = tokio::join!(
            client.switch_on(),
            client.switch_off(),
            client.status(),
            client.switch_on(),
        );
        on.unwrap();
        off.unwrap();
        assert_eq!(status.unwrap(), DeviceState::Off);
        on_again.unwrap();

        assert_eq!(
            device.commands(),
            vec![
                Command::SwitchOn,
                Command::SwitchOff,
                Command::StatusQuery,
                Command::SwitchOn
            ]
        );
        assert_eq!(client.device_state(), DeviceState::On);
    }
}

// ============================================================================
// Error handling
// ============================================================================

mod error_handling {
    use super::*;

    #[tokio::test]
    async fn malformed_address_is_rejected_without_io() {
        let client = SmartSocketClient::new();

        let err = client.connect("not an address").await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidAddress(_))));
        assert_eq!(client.state(), ClientState::Disconnected);
        assert!(client.last_error().is_none());
    }

    #[tokio::test]
    async fn switch_before_connect() {
        let client = SmartSocketClient::new();

        let err = client.switch_on().await.unwrap_err();
        assert_eq!(err, Error::State(StateError::NotConnected));
        assert_eq!(client.device_state(), DeviceState::Unknown);
        assert_eq!(client.state(), ClientState::Disconnected);
    }

    #[tokio::test]
    async fn refused_connection_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let client = SmartSocketClient::new();
        let err = client.connect(&address).await.unwrap_err();

        assert_eq!(err, Error::Connect(ConnectError::Refused));
        assert_eq!(client.state(), ClientState::Failed);
        assert_eq!(client.last_error(), Some(err));
    }

    #[tokio::test]
    async fn wrong_handshake_answer() {
        let device = FakeDevice::start(DeviceScript {
            handshake: HandshakeMode::WrongChallenge,
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        let err = client.connect(device.address()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connect(ConnectError::HandshakeFailed(_))
        ));
        assert_eq!(client.state(), ClientState::Failed);

        // A failed client refuses commands until it reconnects
        assert_eq!(
            client.switch_on().await.unwrap_err(),
            Error::State(StateError::NotConnected)
        );
    }

    #[tokio::test]
    async fn unanswered_handshake_fails() {
        let device = FakeDevice::start(DeviceScript {
            handshake: HandshakeMode::Ignore,
            ..DeviceScript::default()
        })
        .await;
        let client = fast_client();

        let err = client.connect(device.address()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connect(ConnectError::HandshakeFailed(ref reason)) if reason.contains("timed out")
        ));
        assert_eq!(client.state(), ClientState::Failed);
    }

    #[tokio::test]
    async fn peer_close_fails_and_keeps_device_state() {
        let device = FakeDevice::start(DeviceScript {
            faulty_after: 1,
            fault: Some(Fault::HangUp),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        client.switch_on().await.unwrap();

        let err = client.switch_off().await.unwrap_err();
        assert_eq!(err, Error::Io(IoError::Closed));
        assert_eq!(client.state(), ClientState::Failed);
        assert_eq!(client.device_state(), DeviceState::On);
        assert_eq!(client.last_error(), Some(Error::Io(IoError::Closed)));
        assert_eq!(
            client.to_string(),
            "Client(state=Failed, device=On)"
        );
    }

    #[tokio::test]
    async fn reconnect_after_failure() {
        let device = FakeDevice::start(DeviceScript {
            faulty_after: 1,
            fault: Some(Fault::HangUp),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();
        client.switch_on().await.unwrap();
        assert!(client.switch_off().await.is_err());

        client.connect(device.address()).await.unwrap();
        assert_eq!(client.state(), ClientState::Connected);
        assert!(client.last_error().is_none());
        client.switch_off().await.unwrap();
        assert_eq!(client.device_state(), DeviceState::Off);
    }

    #[tokio::test]
    async fn slow_device_times_out() {
        let device = FakeDevice::start(DeviceScript {
            fault: Some(Fault::Silent),
            ..DeviceScript::default()
        })
        .await;
        let client = fast_client();

        client.connect(device.address()).await.unwrap();
        let err = client.switch_on().await.unwrap_err();

        assert_eq!(err, Error::Io(IoError::Timeout(200)));
        assert_eq!(client.state(), ClientState::Failed);
        assert_eq!(client.device_state(), DeviceState::Unknown);
    }

    #[tokio::test]
    async fn corrupt_reply() {
        let device = FakeDevice::start(DeviceScript {
            fault: Some(Fault::Corrupt),
            ..DeviceScript::default()
        })
        .await;
        let client = fast_client();

        client.connect(device.address()).await.unwrap();
        let err = client.switch_on().await.unwrap_err();

        assert!(matches!(err, Error::Io(IoError::Corrupt(_))));
        assert_eq!(client.state(), ClientState::Failed);
    }

    #[tokio::test]
    async fn rejected_command_keeps_connection() {
        let device = FakeDevice::start(DeviceScript {
            fault: Some(Fault::Reject("overload".to_string())),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        client.connect(device.address()).await.unwrap();

        let err = client.switch_on().await.unwrap_err();
        assert_eq!(err, Error::Rejected("overload".to_string()));
        assert_eq!(client.state(), ClientState::Connected);
        assert_eq!(client.device_state(), DeviceState::Unknown);
        assert!(client.last_error().is_none());

        // Still talking to the device, not a closed connection
        let err = client.switch_off().await.unwrap_err();
        assert_eq!(err, Error::Rejected("overload".to_string()));
        assert_eq!(
            device.commands(),
            vec![Command::SwitchOn, Command::SwitchOff]
        );
    }

    #[tokio::test]
    async fn dropped_command_fails_client_and_skips_late_reply() {
        let device = FakeDevice::start(DeviceScript {
            reply_delay: Some(Duration::from_millis(150)),
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();
        client.connect(device.address()).await.unwrap();

        let dropped = tokio::time::timeout(Duration::from_millis(50), client.switch_on()).await;
        assert!(dropped.is_err());
        assert_eq!(client.state(), ClientState::Failed);
        assert_eq!(client.last_error(), Some(Error::Io(IoError::Abandoned)));

        // The late SwitchOn reply has landed by now and must not be taken
        // as the answer to the next command
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(
            client.switch_off().await.unwrap_err(),
            Error::State(StateError::NotConnected)
        );

        client.connect(device.address()).await.unwrap();
        assert_eq!(client.device_state(), DeviceState::On);
        client.switch_off().await.unwrap();
        assert_eq!(client.device_state(), DeviceState::Off);
        assert_eq!(device.connections(), 2);
        assert_eq!(
            device.commands(),
            vec![Command::SwitchOn, Command::SwitchOff]
        );
    }

    #[tokio::test]
    async fn dropped_connect_does_not_stay_connecting() {
        let device = FakeDevice::start(DeviceScript {
            handshake: HandshakeMode::Ignore,
            ..DeviceScript::default()
        })
        .await;
        let client = SmartSocketClient::new();

        let dropped =
            tokio::time::timeout(Duration::from_millis(50), client.connect(device.address())).await;
        assert!(dropped.is_err());

        assert_eq!(client.state(), ClientState::Failed);
        assert_eq!(
            client.last_error(),
            Some(Error::Connect(ConnectError::Abandoned))
        );
        assert_eq!(client.to_string(), "Client(state=Failed, device=Unknown)");
    }
}
