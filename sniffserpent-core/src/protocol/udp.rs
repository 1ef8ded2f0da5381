//! UDP protocol parser.

use smallvec::SmallVec;

use etherparse::UdpHeaderSlice;

use super::{Layer, ParseContext, ParseResult, Protocol};

/// IP protocol number for UDP.
pub const IP_PROTO_UDP: u8 = 17;

/// Decoded UDP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub length: u16,
    pub checksum: u16,
}

/// UDP protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct UdpProtocol;

impl Protocol for UdpProtocol {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ip_protocol") {
            Some(proto) if proto == IP_PROTO_UDP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        let udp = match UdpHeaderSlice::from_slice(data) {
            Ok(udp) => udp,
            Err(e) => return ParseResult::error(format!("UDP parse error: {e}"), data),
        };

        let header = UdpHeader {
            source_port: udp.source_port(),
            destination_port: udp.destination_port(),
            length: udp.length(),
            checksum: udp.checksum(),
        };

        let mut child_hints = SmallVec::new();
        child_hints.push(("src_port", header.source_port as u64));
        child_hints.push(("dst_port", header.destination_port as u64));
        child_hints.push(("transport", IP_PROTO_UDP as u64));

        // The length field bounds the payload unless it is bogus
        let header_len = udp.slice().len();
        let end = (header.length as usize).clamp(header_len, data.len());
        ParseResult::success(Layer::Udp(header), &data[header_len..end], child_hints)
    }
}
