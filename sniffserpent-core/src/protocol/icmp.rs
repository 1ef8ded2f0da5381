//! ICMP protocol parser.

use smallvec::SmallVec;

use super::{Layer, ParseContext, ParseResult, Protocol};

/// IP protocol number for ICMP.
pub const IP_PROTO_ICMP: u8 = 1;

/// ICMP type constants.
pub mod icmp_type {
    pub const ECHO_REPLY: u8 = 0;
    pub const DESTINATION_UNREACHABLE: u8 = 3;
    pub const ECHO_REQUEST: u8 = 8;
    pub const TIME_EXCEEDED: u8 = 11;
    pub const TIMESTAMP_REQUEST: u8 = 13;
    pub const TIMESTAMP_REPLY: u8 = 14;
    pub const INFORMATION_REQUEST: u8 = 15;
    pub const INFORMATION_REPLY: u8 = 16;
    pub const ADDRESS_MASK_REQUEST: u8 = 17;
    pub const ADDRESS_MASK_REPLY: u8 = 18;
}

/// Decoded ICMP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    /// Present for query messages (echo, timestamp, information, mask).
    pub identifier: Option<u16>,
    pub sequence: Option<u16>,
}

/// True for message types whose second word is identifier + sequence.
fn is_query(icmp_type: u8) -> bool {
    matches!(
        icmp_type,
        icmp_type::ECHO_REPLY
            | icmp_type::ECHO_REQUEST
            | icmp_type::TIMESTAMP_REQUEST..=icmp_type::ADDRESS_MASK_REPLY
    )
}

/// ICMP protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct IcmpProtocol;

impl Protocol for IcmpProtocol {
    fn name(&self) -> &'static str {
        "icmp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ip_protocol") {
            Some(proto) if proto == IP_PROTO_ICMP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        // ICMP header is at least 8 bytes
        if data.len() < 8 {
            return ParseResult::error(
                format!("ICMP header too short: {} bytes", data.len()),
                data,
            );
        }

        let icmp_type = data[0];
        let (identifier, sequence) = if is_query(icmp_type) {
            (
                Some(u16::from_be_bytes([data[4], data[5]])),
                Some(u16::from_be_bytes([data[6], data[7]])),
            )
        } else {
            (None, None)
        };

        let header = IcmpHeader {
            icmp_type,
            code: data[1],
            checksum: u16::from_be_bytes([data[2], data[3]]),
            identifier,
            sequence,
        };

        ParseResult::success(Layer::Icmp(header), &data[8..], SmallVec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::{icmp_context, IcmpBuilder};

    fn parse_icmp(packet: &[u8]) -> IcmpHeader {
        match IcmpProtocol.parse(packet, &icmp_context()).layer {
            Some(Layer::Icmp(h)) => h,
            other => panic!("expected ICMP layer, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_echo_request() {
        let packet = IcmpBuilder::new()
            .echo_request()
            .identifier(0x1234)
            .sequence(7)
            .payload(b"ping".to_vec())
            .build();

        let icmp = parse_icmp(&packet);
        assert_eq!(icmp.icmp_type, icmp_type::ECHO_REQUEST);
        assert_eq!(icmp.identifier, Some(0x1234));
        assert_eq!(icmp.sequence, Some(7));
    }

    #[test]
    fn test_parse_unreachable_has_no_sequence() {
        let packet = IcmpBuilder::new().destination_unreachable(3).build();

        let icmp = parse_icmp(&packet);
        assert_eq!(icmp.icmp_type, icmp_type::DESTINATION_UNREACHABLE);
        assert_eq!(icmp.code, 3);
        assert_eq!(icmp.identifier, None);
        assert_eq!(icmp.sequence, None);
    }

    #[test]
    fn test_parse_icmp_too_short() {
        let packet = [0x08, 0x00, 0x00];
        assert!(!IcmpProtocol.parse(&packet, &icmp_context()).is_ok());
    }
}
