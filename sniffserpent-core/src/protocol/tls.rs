//! TLS protocol parser.
//!
//! Parses the first TLS record of a segment. Handshake records are decoded
//! far enough to expose the handshake type, its length and the offered or
//! selected cipher suites.

use smallvec::SmallVec;

use super::{Layer, ParseContext, ParseResult, Protocol};

/// TLS/HTTPS port.
pub const TLS_PORT: u16 = 443;

const RECORD_HEADER_LEN: usize = 5;

/// TLS record content types.
pub mod content_type {
    pub const CHANGE_CIPHER_SPEC: u8 = 20;
    pub const ALERT: u8 = 21;
    pub const HANDSHAKE: u8 = 22;
    pub const APPLICATION_DATA: u8 = 23;
}

/// TLS handshake types.
pub mod handshake_type {
    pub const CLIENT_HELLO: u8 = 1;
    pub const SERVER_HELLO: u8 = 2;
    pub const NEW_SESSION_TICKET: u8 = 4;
    pub const CERTIFICATE: u8 = 11;
    pub const SERVER_KEY_EXCHANGE: u8 = 12;
    pub const SERVER_HELLO_DONE: u8 = 14;
    pub const CLIENT_KEY_EXCHANGE: u8 = 16;
    pub const FINISHED: u8 = 20;
}

/// First handshake message of a handshake record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsHandshake {
    pub msg_type: u8,
    /// Handshake body length from the 3-byte length field.
    pub length: u32,
    /// Offered suites (Client Hello only).
    pub cipher_suites: Vec<u16>,
    /// Selected suite (Server Hello only).
    pub cipher_suite: Option<u16>,
}

/// Decoded TLS record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsRecord {
    pub content_type: u8,
    /// Record-layer version as a 16-bit value (0x0303 for TLS 1.2).
    pub version: u16,
    pub length: u16,
    pub handshake: Option<TlsHandshake>,
}

impl TlsRecord {
    pub fn is_handshake(&self) -> bool {
        self.content_type == content_type::HANDSHAKE
    }
}

/// TLS protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct TlsProtocol;

impl Protocol for TlsProtocol {
    fn name(&self) -> &'static str {
        "tls"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        if context.has_port(TLS_PORT) {
            Some(50)
        } else {
            None
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        // TLS record header is 5 bytes: type (1) + version (2) + length (2)
        if data.len() < RECORD_HEADER_LEN {
            return ParseResult::error("TLS record too short".to_string(), data);
        }

        let content_type = data[0];
        if !(content_type::CHANGE_CIPHER_SPEC..=content_type::APPLICATION_DATA)
            .contains(&content_type)
            || data[1] != 3
        {
            return ParseResult::error(
                format!("not a TLS record (type {content_type}, version {}.{})", data[1], data[2]),
                data,
            );
        }

        let length = u16::from_be_bytes([data[3], data[4]]);
        // A record split across segments is decoded from what is present
        let end = (RECORD_HEADER_LEN + length as usize).min(data.len());
        let fragment = &data[RECORD_HEADER_LEN..end];

        let handshake = if content_type == content_type::HANDSHAKE {
            parse_handshake(fragment)
        } else {
            None
        };

        let record = TlsRecord {
            content_type,
            version: u16::from_be_bytes([data[1], data[2]]),
            length,
            handshake,
        };

        ParseResult::success(Layer::Tls(record), &data[end..], SmallVec::new())
    }
}

/// Parse the handshake message header and the hello bodies.
fn parse_handshake(data: &[u8]) -> Option<TlsHandshake> {
    if data.len() < 4 {
        return None;
    }

    let msg_type = data[0];
    let length = u32::from_be_bytes([0, data[1], data[2], data[3]]);
    let body = &data[4..(4 + length as usize).min(data.len())];

    let mut handshake = TlsHandshake {
        msg_type,
        length,
        cipher_suites: Vec::new(),
        cipher_suite: None,
    };

    match msg_type {
        handshake_type::CLIENT_HELLO => {
            handshake.cipher_suites = client_hello_suites(body).unwrap_or_default();
        }
        handshake_type::SERVER_HELLO => {
            handshake.cipher_suite = server_hello_suite(body);
        }
        _ => {}
    }

    Some(handshake)
}

/// Offset of the first byte after version (2), random (32) and session id.
fn after_session_id(body: &[u8]) -> Option<usize> {
    let session_id_len = *body.get(34)? as usize;
    Some(35 + session_id_len)
}

fn client_hello_suites(body: &[u8]) -> Option<Vec<u16>> {
    let offset = after_session_id(body)?;
    let len_bytes = body.get(offset..offset + 2)?;
    let suites_len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
    let start = offset + 2;
    let suites = body.get(start..(start + suites_len).min(body.len()))?;

    Some(
        suites
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect(),
    )
}

fn server_hello_suite(body: &[u8]) -> Option<u16> {
    let offset = after_session_id(body)?;
    let suite = body.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([suite[0], suite[1]]))
}
