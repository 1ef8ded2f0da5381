//! IPv6 protocol parser.

use std::net::Ipv6Addr;

use smallvec::SmallVec;

use etherparse::Ipv6HeaderSlice;

use super::ethernet::ethertype;
use super::{Layer, ParseContext, ParseResult, Protocol};

/// Extension headers skipped on the way to the upper-layer protocol.
pub mod next_header {
    pub const HOP_BY_HOP: u8 = 0;
    pub const ROUTING: u8 = 43;
    pub const FRAGMENT: u8 = 44;
    pub const DESTINATION: u8 = 60;
}

/// Decoded IPv6 fixed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Header {
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
    pub traffic_class: u8,
    pub flow_label: u32,
    pub hop_limit: u8,
    pub payload_len: u16,
    /// Upper-layer protocol after any skipped extension headers.
    pub next_header: u8,
}

/// IPv6 protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct Ipv6Protocol;

impl Protocol for Ipv6Protocol {
    fn name(&self) -> &'static str {
        "ipv6"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ethertype") {
            Some(et) if et == ethertype::IPV6 as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        let ipv6 = match Ipv6HeaderSlice::from_slice(data) {
            Ok(ipv6) => ipv6,
            Err(e) => return ParseResult::error(format!("IPv6 parse error: {e}"), data),
        };

        let header_len = ipv6.slice().len();
        let payload_len = ipv6.payload_length();
        let end = (header_len + payload_len as usize).min(data.len());
        let mut payload = &data[header_len..end];

        // Walk extension headers; a non-first fragment stops the chain
        let mut proto = ipv6.next_header().0;
        let mut chain_upper = true;
        loop {
            match proto {
                next_header::HOP_BY_HOP | next_header::ROUTING | next_header::DESTINATION => {
                    if payload.len() < 2 {
                        break;
                    }
                    let ext_len = (payload[1] as usize + 1) * 8;
                    if payload.len() < ext_len {
                        break;
                    }
                    proto = payload[0];
                    payload = &payload[ext_len..];
                }
                next_header::FRAGMENT => {
                    if payload.len() < 8 {
                        break;
                    }
                    let offset = u16::from_be_bytes([payload[2], payload[3]]) >> 3;
                    chain_upper = offset == 0;
                    proto = payload[0];
                    payload = &payload[8..];
                    if !chain_upper {
                        break;
                    }
                }
                _ => break,
            }
        }

        let header = Ipv6Header {
            source: ipv6.source_addr(),
            destination: ipv6.destination_addr(),
            traffic_class: ipv6.traffic_class(),
            flow_label: ipv6.flow_label().value(),
            hop_limit: ipv6.hop_limit(),
            payload_len,
            next_header: proto,
        };

        let mut child_hints = SmallVec::new();
        if chain_upper {
            child_hints.push(("ip_protocol", proto as u64));
        }
        ParseResult::success(Layer::Ipv6(header), payload, child_hints)
    }
}
