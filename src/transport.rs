//! Transport connector – owns the one socket to the live-map listener.
//!
//! Connection establishment is an explicit state machine:
//!
//! ```text
//! Disconnected ── connect() ──▶ Connecting ──▶ Connected
//!                                   │               │ send() I/O error
//!                                   ▼               ▼
//!                                 Failed        Disconnected
//! ```
//!
//! There is deliberately no reconnect path and no timeout on connect,
//! handshake read or send – a dead peer stalls the collection loop rather
//! than erroring it, and a failed send flips the state so the loop winds
//! down on its next cycle.

use crate::frame;
use bytes::Bytes;
use log::{debug, info};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};

/// Upper bound on the handshake response we are willing to buffer.
const HANDSHAKE_RESPONSE_CAP: usize = 4096;

// ---------------------------------------------------------------------------
// Errors & state
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("upgrade handshake rejected: {0}")]
    Handshake(String),

    #[error("not connected")]
    NotConnected,

    #[error("socket I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ---------------------------------------------------------------------------
// TelemetryTransport
// ---------------------------------------------------------------------------

/// A connect-once, write-only upgraded stream.
///
/// At most one live socket exists per value; dropping the transport drops
/// the socket.
pub struct TelemetryTransport {
    state: TransportState,
    stream: Option<TcpStream>,
}

impl Default for TelemetryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTransport {
    pub fn new() -> Self {
        Self {
            state: TransportState::Disconnected,
            stream: None,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == TransportState::Connected
    }

    /// Resolve `host`, open the TCP stream and perform the upgrade
    /// handshake.
    ///
    /// Every failure leaves the transport in [`TransportState::Failed`]
    /// with no socket retained.
    pub async fn connect(
        &mut self,
        host: &str,
        port: u16,
        path: &str,
    ) -> Result<(), TransportError> {
        self.state = TransportState::Connecting;

        let result = self.connect_inner(host, port, path).await;
        match &result {
            Ok(()) => {
                self.state = TransportState::Connected;
                info!("telemetry stream connected to {}:{}{}", host, port, path);
            }
            Err(e) => {
                self.state = TransportState::Failed;
                self.stream = None;
                debug!("telemetry connect failed: {}", e);
            }
        }
        result
    }

    async fn connect_inner(
        &mut self,
        host: &str,
        port: u16,
        path: &str,
    ) -> Result<(), TransportError> {
        let addr = lookup_host((host, port))
            .await
            .and_then(|mut addrs| {
                addrs.next().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses returned")
                })
            })
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                port,
                source,
            })?;

        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|source| TransportError::Connect { addr, source })?;

        stream
            .write_all(frame::handshake_request(host, port, path).as_bytes())
            .await?;

        let response = read_handshake_response(&mut stream).await?;
        frame::validate_handshake_response(&response)?;

        self.stream = Some(stream);
        Ok(())
    }

    /// Write one encoded frame.
    ///
    /// An I/O error transitions the state to `Disconnected` and drops the
    /// socket – the collection loop observes that at the top of its next
    /// cycle and stops.
    pub async fn send(&mut self, frame: Bytes) -> Result<(), TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        match stream.write_all(&frame).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = TransportState::Disconnected;
                self.stream = None;
                Err(TransportError::Io(e))
            }
        }
    }
}

/// Read the upgrade response headers into a bounded buffer.
///
/// Stops at the header terminator or at [`HANDSHAKE_RESPONSE_CAP`] bytes;
/// whatever was buffered is handed to validation either way. EOF before any
/// data is a handshake failure.
async fn read_handshake_response(stream: &mut TcpStream) -> Result<String, TransportError> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 512];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Err(TransportError::Handshake(
                    "peer closed before responding".into(),
                ));
            }
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= HANDSHAKE_RESPONSE_CAP {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::HANDSHAKE_ACCEPT;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection, consume the request headers, reply with `response`.
    async fn one_shot_server(response: String) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            // Hold the socket open briefly so client-side sends succeed.
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        });
        addr
    }

    fn accepting_response() -> String {
        format!(
            "HTTP/1.1 101 Switching Protocols\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Accept: {HANDSHAKE_ACCEPT}\r\n\r\n"
        )
    }

    #[tokio::test]
    async fn connect_succeeds_against_accepting_server() {
        let addr = one_shot_server(accepting_response()).await;

        let mut transport = TelemetryTransport::new();
        transport
            .connect(&addr.ip().to_string(), addr.port(), "/ws")
            .await
            .expect("handshake should be accepted");

        assert!(transport.is_connected());
        assert_eq!(transport.state(), TransportState::Connected);

        transport
            .send(frame::encode_text_frame("{}"))
            .await
            .expect("send on live socket");
    }

    #[tokio::test]
    async fn connect_fails_on_non_upgrade_response() {
        let addr =
            one_shot_server("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n".to_string()).await;

        let mut transport = TelemetryTransport::new();
        let err = transport
            .connect(&addr.ip().to_string(), addr.port(), "/ws")
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Handshake(_)));
        assert_eq!(transport.state(), TransportState::Failed);
    }

    #[tokio::test]
    async fn connect_fails_on_unresolvable_host() {
        let mut transport = TelemetryTransport::new();
        let err = transport
            .connect("definitely-not-a-real-host.invalid", 8080, "/ws")
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Resolve { .. }));
        assert_eq!(transport.state(), TransportState::Failed);
    }

    #[tokio::test]
    async fn send_without_connect_is_not_connected() {
        let mut transport = TelemetryTransport::new();
        let err = transport
            .send(frame::encode_text_frame("{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));
    }
}
