//! TLS handshake summaries.

use super::common::{brief_prefix, header_section, payload_section, size_suffix};
use super::fit::fit_list;
use super::Summary;
use crate::frame::Frame;
use crate::protocol::{tls_handshake_type as handshake_type, TlsHandshake};

/// A frame whose TCP payload starts with a TLS handshake record.
#[derive(Debug, Clone, Copy)]
pub struct TlsPacket<'a> {
    frame: &'a Frame,
}

impl<'a> TlsPacket<'a> {
    pub const NAME: &'static str = "TLS";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    /// Only handshake records are kept; application data, alerts and
    /// cipher spec changes are dropped.
    pub fn accepts(frame: &Frame) -> bool {
        frame.tls().is_some_and(|record| record.is_handshake())
    }
}

impl Summary for TlsPacket<'_> {
    fn brief_summary(&self) -> String {
        format!("{}{}", brief_prefix(Self::NAME, self.frame), size_suffix(self.frame))
    }

    fn detailed_summary(&self) -> String {
        let mut out = header_section(Self::NAME, self.frame);
        if let Some(record) = self.frame.tls() {
            out.push_str(&format!("Version: {}\n\n", record.version));
            if let Some(handshake) = &record.handshake {
                out.push_str(&handshake_fields(handshake));
            }
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}

fn handshake_fields(handshake: &TlsHandshake) -> String {
    let name = match handshake.msg_type {
        handshake_type::CLIENT_HELLO => "Client Hello",
        handshake_type::SERVER_HELLO => "Server Hello",
        handshake_type::CLIENT_KEY_EXCHANGE => "Client Key Exchange",
        handshake_type::SERVER_KEY_EXCHANGE => "Server Key Exchange",
        handshake_type::NEW_SESSION_TICKET => "New Session Ticket",
        _ => return String::new(),
    };
    let mut out = format!(
        "Handshake Type: {name}\n\nLength: {} bytes\n\n",
        handshake.length
    );
    match handshake.msg_type {
        handshake_type::CLIENT_HELLO => {
            out.push_str(&fit_list("Cipher Suites:", &handshake.cipher_suites));
        }
        handshake_type::SERVER_HELLO => {
            if let Some(suite) = handshake.cipher_suite {
                out.push_str(&format!("Cipher Suite: {suite}\n\n"));
            }
        }
        _ => {}
    }
    out
}
