use crate::metrics::{BRIDGE_CONNECTED, PROTOCOL_ERRORS, SESSIONS_STARTED};
use crate::protocol::{IncomingMessage, ProtocolError, StatusMsg};
use hydra_core::{Controller, Outcome};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bridge socket error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub bind_addr: String,
    pub poll_interval: Duration,
    /// Longest unterminated line a client may buffer before it is dropped.
    pub max_line_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7100".to_string(),
            poll_interval: Duration::from_millis(5),
            max_line_bytes: 4096,
        }
    }
}

/// Parse one protocol line and dispatch it through the controller.
///
/// Returns the status line to publish when the event changed the console
/// state, `None` when it was ignored or had no binding.
#[instrument(level = "debug", skip(controller))]
pub fn handle_line(controller: &mut Controller, line: &str) -> Result<Option<String>, ProtocolError> {
    let event = match IncomingMessage::parse(line)?.into_event()? {
        Some(event) => event,
        None => {
            debug!("No binding for message");
            return Ok(None);
        }
    };

    match controller.dispatch(&event) {
        Outcome::Applied => {
            let snapshot = controller.snapshot();
            debug!(
                sequence = snapshot.sequence,
                actions = ?snapshot.actions,
                "Event applied"
            );
            StatusMsg::from_snapshot(snapshot).to_line().map(Some)
        }
        Outcome::Ignored(reason) => {
            debug!(event = event.kind(), ?reason, "Event ignored");
            Ok(None)
        }
    }
}

/// Single-client TCP front end for a controller.
///
/// Clients send one JSON event per line and receive one status line per
/// applied event, plus the current status on connect.
pub struct Bridge {
    listener: TcpListener,
    config: BridgeConfig,
}

impl Bridge {
    pub fn bind(config: BridgeConfig) -> Result<Self, BridgeError> {
        let listener = TcpListener::bind(&config.bind_addr).map_err(|source| BridgeError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, BridgeError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn run(&self, controller: &mut Controller, stop: &AtomicBool) -> Result<(), BridgeError> {
        info!(addr = %self.local_addr()?, "Bridge listening");
        SESSIONS_STARTED.inc();

        let mut client: Option<TcpStream> = None;
        let mut recv_buf: Vec<u8> = Vec::with_capacity(4096);
        let mut send_buf: Vec<u8> = Vec::new();
        let mut send_offset: usize = 0;

        while !stop.load(Ordering::Relaxed) {
            if client.is_none() {
                match self.listener.accept() {
                    Ok((stream, addr)) => {
                        info!(client_addr = %addr, "Bridge client connected");
                        stream.set_nonblocking(true)?;
                        client = Some(stream);
                        BRIDGE_CONNECTED.set(1.0);

                        match StatusMsg::from_snapshot(controller.snapshot()).to_line() {
                            Ok(line) => send_buf.extend_from_slice(line.as_bytes()),
                            Err(e) => warn!(error = %e, "Failed to encode status"),
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(err) => {
                        warn!("Bridge accept error: {}", err);
                    }
                }
            }

            let mut drop_client = false;
            if let Some(stream) = client.as_mut() {
                let mut temp = [0u8; 1024];
                match stream.read(&mut temp) {
                    Ok(0) => {
                        info!("Bridge client disconnected");
                        drop_client = true;
                    }
                    Ok(n) => {
                        recv_buf.extend_from_slice(&temp[..n]);
                        while let Some(pos) = recv_buf.iter().position(|b| *b == b'\n') {
                            let line = recv_buf.drain(..=pos).collect::<Vec<u8>>();
                            let Ok(text) = std::str::from_utf8(&line) else {
                                warn!("Dropping non UTF-8 line");
                                PROTOCOL_ERRORS.inc();
                                continue;
                            };
                            let trimmed = text.trim();
                            if trimmed.is_empty() {
                                continue;
                            }
                            match handle_line(controller, trimmed) {
                                Ok(Some(status)) => send_buf.extend_from_slice(status.as_bytes()),
                                Ok(None) => {}
                                Err(e) => {
                                    warn!(error = %e, "Rejected bridge message");
                                    PROTOCOL_ERRORS.inc();
                                }
                            }
                        }
                        if recv_buf.len() > self.config.max_line_bytes {
                            warn!(
                                buffered = recv_buf.len(),
                                limit = self.config.max_line_bytes,
                                "Line too long, dropping bridge client"
                            );
                            PROTOCOL_ERRORS.inc();
                            drop_client = true;
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(err) => {
                        warn!(error = %err, "Bridge read error");
                        drop_client = true;
                    }
                }

                if !drop_client && send_offset < send_buf.len() {
                    match stream.write(&send_buf[send_offset..]) {
                        Ok(0) => {
                            info!("Bridge client disconnected");
                            drop_client = true;
                        }
                        Ok(n) => {
                            send_offset += n;
                            if send_offset >= send_buf.len() {
                                send_buf.clear();
                                send_offset = 0;
                            }
                        }
                        Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
                        Err(err) => {
                            warn!(error = %err, "Bridge write error");
                            drop_client = true;
                        }
                    }
                }
            }

            if drop_client {
                client = None;
                recv_buf.clear();
                send_buf.clear();
                send_offset = 0;
                BRIDGE_CONNECTED.set(0.0);
            }

            std::thread::sleep(self.config.poll_interval);
        }

        info!("Bridge stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_line_publishes_only_applied_events() {
        let mut controller = Controller::new();

        let ignored = handle_line(&mut controller, r#"{"type":"key","code":"Space"}"#).unwrap();
        assert!(ignored.is_none());

        let status = handle_line(&mut controller, r#"{"type":"ignition","on":true}"#)
            .unwrap()
            .expect("ignition should publish");
        let value: serde_json::Value = serde_json::from_str(&status).unwrap();
        assert_eq!(value["type"], "status");
        assert_eq!(value["sequence"], 1);
        assert_eq!(value["engine_running"], true);
        assert_eq!(value["actions"], serde_json::json!(["IDLE"]));
        assert_eq!(value["readout"]["status"]["main_pressure_kpa"], 3900);
    }

    #[test]
    fn handle_line_surfaces_protocol_errors() {
        let mut controller = Controller::new();
        assert!(handle_line(&mut controller, "not json").is_err());
        assert_eq!(controller.snapshot().sequence, 0);
    }
}
