//! IGMP protocol parser.

use std::net::Ipv4Addr;

use smallvec::SmallVec;

use super::{Layer, ParseContext, ParseResult, Protocol};

/// IP protocol number for IGMP.
pub const IP_PROTO_IGMP: u8 = 2;

/// IGMP message types.
pub mod igmp_type {
    pub const MEMBERSHIP_QUERY: u8 = 0x11;
    pub const MEMBERSHIP_REPORT_V1: u8 = 0x12;
    pub const MEMBERSHIP_REPORT_V2: u8 = 0x16;
    pub const LEAVE_GROUP: u8 = 0x17;
    pub const MEMBERSHIP_REPORT_V3: u8 = 0x22;
}

/// Decoded IGMP header (common v1/v2 layout, also the prefix of v3 queries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgmpHeader {
    pub igmp_type: u8,
    pub max_resp_code: u8,
    pub checksum: u16,
    pub group_address: Ipv4Addr,
}

/// IGMP protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct IgmpProtocol;

impl Protocol for IgmpProtocol {
    fn name(&self) -> &'static str {
        "igmp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ip_protocol") {
            Some(proto) if proto == IP_PROTO_IGMP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < 8 {
            return ParseResult::error(
                format!("IGMP message too short: {} bytes", data.len()),
                data,
            );
        }

        let header = IgmpHeader {
            igmp_type: data[0],
            max_resp_code: data[1],
            checksum: u16::from_be_bytes([data[2], data[3]]),
            group_address: Ipv4Addr::new(data[4], data[5], data[6], data[7]),
        };

        ParseResult::success(Layer::Igmp(header), &data[8..], SmallVec::new())
    }
}
