//! IPv4 protocol parser.

use std::net::Ipv4Addr;

use smallvec::SmallVec;

use etherparse::Ipv4HeaderSlice;

use super::ethernet::ethertype;
use super::{Layer, ParseContext, ParseResult, Protocol};

/// Decoded IPv4 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Full type-of-service byte (DSCP and ECN).
    pub tos: u8,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub total_len: u16,
    pub identification: u16,
    pub fragment_offset: u16,
}

/// IPv4 protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4Protocol;

impl Protocol for Ipv4Protocol {
    fn name(&self) -> &'static str {
        "ipv4"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ethertype") {
            Some(et) if et == ethertype::IPV4 as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        let ipv4 = match Ipv4HeaderSlice::from_slice(data) {
            Ok(ipv4) => ipv4,
            Err(e) => return ParseResult::error(format!("IPv4 parse error: {e}"), data),
        };

        let header = Ipv4Header {
            source: ipv4.source_addr(),
            destination: ipv4.destination_addr(),
            tos: ipv4.slice()[1],
            ttl: ipv4.ttl(),
            protocol: ipv4.protocol().0,
            checksum: ipv4.header_checksum(),
            total_len: ipv4.total_len(),
            identification: ipv4.identification(),
            fragment_offset: ipv4.fragments_offset().value(),
        };

        // Only the first fragment carries the transport header
        let mut child_hints = SmallVec::new();
        if header.fragment_offset == 0 {
            child_hints.push(("ip_protocol", header.protocol as u64));
        }

        // Trim link-layer padding beyond the datagram
        let header_len = ipv4.slice().len();
        let end = (header.total_len as usize).clamp(header_len, data.len());
        ParseResult::success(Layer::Ipv4(header), &data[header_len..end], child_hints)
    }
}
