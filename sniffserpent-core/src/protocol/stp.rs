//! IEEE 802.1D spanning tree BPDU parser.

use std::fmt;

use smallvec::SmallVec;

use super::ethernet::llc_sap;
use super::{Layer, ParseContext, ParseResult, Protocol};
use crate::format::MacAddr;

/// BPDU type codes.
pub mod bpdu_type {
    pub const CONFIG: u8 = 0x00;
    pub const RST: u8 = 0x02;
    pub const TCN: u8 = 0x80;
}

/// Configuration and RST BPDU length.
const CONFIG_BPDU_LEN: usize = 35;

/// Bridge identifier: 16-bit priority and MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeId {
    pub priority: u16,
    pub mac: MacAddr,
}

impl BridgeId {
    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            priority: u16::from_be_bytes([bytes[0], bytes[1]]),
            mac: MacAddr::from_slice(&bytes[2..8]).unwrap_or_default(),
        }
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.priority, self.mac)
    }
}

/// Decoded BPDU. Topology change notifications only carry the first
/// four bytes, the remaining fields stay zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StpBpdu {
    pub protocol_id: u16,
    pub version: u8,
    pub bpdu_type: u8,
    pub flags: u8,
    pub root_id: BridgeId,
    pub path_cost: u32,
    pub bridge_id: BridgeId,
    pub port_id: u16,
    /// Timer values in 1/256 second units.
    pub message_age: u16,
    pub max_age: u16,
    pub hello_time: u16,
    pub forward_delay: u16,
}

impl StpBpdu {
    /// Message age in seconds.
    pub fn age_secs(&self) -> f64 {
        self.message_age as f64 / 256.0
    }
}

/// STP protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct StpProtocol;

impl Protocol for StpProtocol {
    fn name(&self) -> &'static str {
        "stp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("llc_sap") {
            Some(sap) if sap == llc_sap::STP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < 4 {
            return ParseResult::error(format!("BPDU too short: {} bytes", data.len()), data);
        }

        let mut bpdu = StpBpdu {
            protocol_id: u16::from_be_bytes([data[0], data[1]]),
            version: data[2],
            bpdu_type: data[3],
            ..Default::default()
        };
        if bpdu.protocol_id != 0 {
            return ParseResult::error(format!("unknown BPDU protocol id {}", bpdu.protocol_id), data);
        }

        if bpdu.bpdu_type == bpdu_type::TCN {
            return ParseResult::success(Layer::Stp(bpdu), &data[4..], SmallVec::new());
        }
        if data.len() < CONFIG_BPDU_LEN {
            return ParseResult::error(
                format!("configuration BPDU too short: {} bytes", data.len()),
                data,
            );
        }

        let be16 = |at: usize| u16::from_be_bytes([data[at], data[at + 1]]);
        bpdu.flags = data[4];
        bpdu.root_id = BridgeId::from_bytes(&data[5..13]);
        bpdu.path_cost = u32::from_be_bytes([data[13], data[14], data[15], data[16]]);
        bpdu.bridge_id = BridgeId::from_bytes(&data[17..25]);
        bpdu.port_id = be16(25);
        bpdu.message_age = be16(27);
        bpdu.max_age = be16(29);
        bpdu.hello_time = be16(31);
        bpdu.forward_delay = be16(33);

        ParseResult::success(Layer::Stp(bpdu), &data[CONFIG_BPDU_LEN..], SmallVec::new())
    }
}
