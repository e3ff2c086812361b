//! Minimal client-side WebSocket wire implementation.
//!
//! The listener speaks plain RFC 6455-style WebSocket over TCP (no TLS).
//! We implement only what this client uses:
//!
//! | Direction        | Piece                                    |
//! |------------------|------------------------------------------|
//! | Client → server  | HTTP/1.1 upgrade request, text data frame |
//! | Server → client  | upgrade response (validated, then ignored) |
//!
//! No continuation frames, no control frames (ping/pong/close), and no
//! inbound data path – after the handshake the socket is write-only.
//!
//! Reference: <https://datatracker.ietf.org/doc/html/rfc6455>

use crate::transport::TransportError;
use bytes::{BufMut, Bytes, BytesMut};

/// Fixed handshake nonce (the RFC 6455 §1.3 sample key). Deliberately not
/// randomized: the key only feeds the accept check, and a constant key keeps
/// the expected accept value a constant too.
pub const HANDSHAKE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";

/// SHA-1/base64 accept value the server must derive from [`HANDSHAKE_KEY`].
pub const HANDSHAKE_ACCEPT: &str = "s3pnPLaKsYmzkphz7IjnfkVMBl4=";

/// FIN + text opcode.
const TEXT_FRAME_HEADER: u8 = 0x81;

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// Build the HTTP/1.1 upgrade request for `path` on `host:port`.
pub fn handshake_request(host: &str, port: u16, path: &str) -> String {
    format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}:{port}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {HANDSHAKE_KEY}\r\n\
         Sec-WebSocket-Version: 13\r\n\r\n"
    )
}

/// Validate the server's upgrade response.
///
/// Accepts iff the status line reports 101 and the `Sec-WebSocket-Accept`
/// header matches the value derived from our fixed key. Remaining headers
/// are not interpreted.
pub fn validate_handshake_response(raw: &str) -> Result<(), TransportError> {
    let mut lines = raw.split("\r\n");

    let status = lines.next().unwrap_or("");
    let mut status_parts = status.split_whitespace();
    let proto_ok = status_parts
        .next()
        .is_some_and(|p| p.starts_with("HTTP/1.1"));
    let code_ok = status_parts.next() == Some("101");
    if !proto_ok || !code_ok {
        return Err(TransportError::Handshake(format!(
            "expected '101 Switching Protocols', got {status:?}"
        )));
    }

    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("sec-websocket-accept") {
                return if value.trim() == HANDSHAKE_ACCEPT {
                    Ok(())
                } else {
                    Err(TransportError::Handshake(format!(
                        "bad Sec-WebSocket-Accept {:?}",
                        value.trim()
                    )))
                };
            }
        }
    }

    Err(TransportError::Handshake(
        "response carries no Sec-WebSocket-Accept header".into(),
    ))
}

// ---------------------------------------------------------------------------
// Data frames
// ---------------------------------------------------------------------------

/// Encode `payload` as a single unmasked text frame:
/// `[0x81][len as u8][payload bytes]`.
///
/// The length field is always one byte and no masking key is sent, matching
/// what the deployed listener decodes. Payloads over 125 bytes therefore
/// carry a length byte a compliant peer would misread (126/127 signal
/// extended lengths; 256 wraps to 0). Callers own keeping payloads short or
/// accepting the consequence.
pub fn encode_text_frame(payload: &str) -> Bytes {
    let mut frame = BytesMut::with_capacity(payload.len() + 2);
    frame.put_u8(TEXT_FRAME_HEADER);
    frame.put_u8(payload.len() as u8);
    frame.put_slice(payload.as_bytes());
    frame.freeze()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// A response any compliant server would send for [`HANDSHAKE_KEY`].
    fn canonical_response() -> String {
        format!(
            "HTTP/1.1 101 Switching Protocols\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Accept: {HANDSHAKE_ACCEPT}\r\n\r\n"
        )
    }

    // ---------------------------------------------------------------
    // Handshake request
    // ---------------------------------------------------------------

    #[test]
    fn request_line_and_headers() {
        let req = handshake_request("map.example.net", 8080, "/ws");
        assert!(req.starts_with("GET /ws HTTP/1.1\r\n"));
        assert!(req.contains("Host: map.example.net:8080\r\n"));
        assert!(req.contains("Upgrade: websocket\r\n"));
        assert!(req.contains("Connection: Upgrade\r\n"));
        assert!(req.contains(&format!("Sec-WebSocket-Key: {HANDSHAKE_KEY}\r\n")));
        assert!(req.contains("Sec-WebSocket-Version: 13\r\n"));
        assert!(req.ends_with("\r\n\r\n"));
    }

    // ---------------------------------------------------------------
    // Handshake response validation
    // ---------------------------------------------------------------

    #[test]
    fn accepts_canonical_response() {
        assert!(validate_handshake_response(&canonical_response()).is_ok());
    }

    #[test]
    fn accept_header_name_is_case_insensitive() {
        let raw = canonical_response().replace("Sec-WebSocket-Accept", "SEC-WEBSOCKET-ACCEPT");
        assert!(validate_handshake_response(&raw).is_ok());
    }

    #[test]
    fn rejects_non_101_status() {
        let raw = "HTTP/1.1 404 Not Found\r\n\r\n";
        assert!(matches!(
            validate_handshake_response(raw),
            Err(TransportError::Handshake(_))
        ));
    }

    #[test]
    fn rejects_wrong_accept_value() {
        let raw = canonical_response().replace(HANDSHAKE_ACCEPT, "AAAAAAAAAAAAAAAAAAAAAAAAAAA=");
        assert!(matches!(
            validate_handshake_response(&raw),
            Err(TransportError::Handshake(_))
        ));
    }

    #[test]
    fn rejects_missing_accept_header() {
        let raw = "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\r\n";
        assert!(validate_handshake_response(raw).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(validate_handshake_response("not http at all").is_err());
        assert!(validate_handshake_response("").is_err());
    }

    // ---------------------------------------------------------------
    // Frame encoding – within the single-byte range
    // ---------------------------------------------------------------

    #[test]
    fn empty_payload() {
        let frame = encode_text_frame("");
        assert_eq!(&frame[..], &[0x81, 0x00]);
    }

    #[test]
    fn short_payload_roundtrip() {
        let frame = encode_text_frame("hello");
        assert_eq!(frame[0], 0x81);
        assert_eq!(frame[1], 5);
        assert_eq!(&frame[2..], b"hello");
    }

    #[test]
    fn boundary_125_is_exact() {
        let payload = "x".repeat(125);
        let frame = encode_text_frame(&payload);
        assert_eq!(frame[1], 125);
        assert_eq!(frame.len(), 2 + 125);
    }

    // ---------------------------------------------------------------
    // Frame encoding – documented >125 limitation
    // ---------------------------------------------------------------

    #[test]
    fn length_126_collides_with_extended_marker() {
        let frame = encode_text_frame(&"x".repeat(126));
        // Byte value 126 is the 16-bit-extended-length marker, but no
        // extended bytes follow – a compliant decoder misparses this.
        assert_eq!(frame[1], 126);
        assert_eq!(frame.len(), 2 + 126);
        assert_ne!(frame[2..4], 126u16.to_be_bytes());
    }

    #[test]
    fn length_255_exceeds_single_byte_range() {
        let frame = encode_text_frame(&"x".repeat(255));
        assert_eq!(frame[1], 255);
        assert!(frame[1] > 125, "outside the valid single-byte length range");
        assert_eq!(frame.len(), 2 + 255);
    }

    #[test]
    fn length_256_wraps_to_zero() {
        let payload = "x".repeat(256);
        let frame = encode_text_frame(&payload);
        assert_eq!(frame[1], 0);
        assert_ne!(frame[1] as usize, payload.len());
        // All 256 payload bytes still follow the broken header.
        assert_eq!(frame.len(), 2 + 256);
    }

    #[test]
    fn payload_length_is_bytes_not_chars() {
        // 'é' is two bytes in UTF-8
        let frame = encode_text_frame("é");
        assert_eq!(frame[1], 2);
        assert_eq!(&frame[2..], "é".as_bytes());
    }
}
