//! ARP decoding for any hardware and protocol address sizes.

use smallvec::SmallVec;

use super::ethernet::ethertype;
use super::{Layer, ParseContext, ParseResult, Protocol};
use crate::format::{format_hw_addr, format_proto_addr};

pub mod operation {
    pub const REQUEST: u16 = 1;
    pub const REPLY: u16 = 2;
}

/// Fixed part of an ARP message before the addresses.
const FIXED_LEN: usize = 8;

/// Decoded ARP message.
///
/// Addresses are kept in their display form since ARP carries
/// variable-length hardware and protocol addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpHeader {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_len: u8,
    pub protocol_len: u8,
    pub operation: u16,
    pub sender_hw: String,
    pub sender_proto: String,
    pub target_hw: String,
    pub target_proto: String,
}

impl ArpHeader {
    pub fn is_request(&self) -> bool {
        self.operation == operation::REQUEST
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArpProtocol;

impl Protocol for ArpProtocol {
    fn name(&self) -> &'static str {
        "arp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ethertype") {
            Some(et) if et == ethertype::ARP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < FIXED_LEN {
            return ParseResult::error(format!("ARP packet too short: {} bytes", data.len()), data);
        }

        let hardware_len = data[4];
        let protocol_len = data[5];
        let hw = hardware_len as usize;
        let proto = protocol_len as usize;
        let total = FIXED_LEN + 2 * (hw + proto);
        if data.len() < total {
            return ParseResult::error(
                format!("ARP addresses truncated: need {total} bytes, have {}", data.len()),
                data,
            );
        }

        let (sender, target) = data[FIXED_LEN..total].split_at(hw + proto);
        let sender_hw = format_hw_addr(&sender[..hw]);
        let sender_proto = format_proto_addr(&sender[hw..]);
        let target_hw = format_hw_addr(&target[..hw]);
        let target_proto = format_proto_addr(&target[hw..]);

        let header = ArpHeader {
            hardware_type: u16::from_be_bytes([data[0], data[1]]),
            protocol_type: u16::from_be_bytes([data[2], data[3]]),
            hardware_len,
            protocol_len,
            operation: u16::from_be_bytes([data[6], data[7]]),
            sender_hw,
            sender_proto,
            target_hw,
            target_proto,
        };

        // Anything past the addresses is Ethernet padding, not payload
        ParseResult::success(Layer::Arp(header), &[], SmallVec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::build_arp_packet;

    const ETH_HEADER: usize = 14;

    fn arp_context() -> ParseContext {
        let mut ctx = ParseContext::new(1);
        ctx.insert_hint("ethertype", ethertype::ARP as u64);
        ctx
    }

    fn parse_arp(message: &[u8]) -> ArpHeader {
        match ArpProtocol.parse(message, &arp_context()).layer {
            Some(Layer::Arp(h)) => h,
            other => panic!("expected ARP layer, got {other:?}"),
        }
    }

    #[test]
    fn test_who_has() {
        let frame = build_arp_packet(1, [192, 168, 1, 1], [192, 168, 1, 2]);
        let arp = parse_arp(&frame[ETH_HEADER..]);

        assert!(arp.is_request());
        assert_eq!((arp.hardware_type, arp.protocol_type), (1, 0x0800));
        assert_eq!((arp.hardware_len, arp.protocol_len), (6, 4));
        assert_eq!(arp.sender_hw, "00:11:22:33:44:55");
        assert_eq!(arp.sender_proto, "192.168.1.1");
        assert_eq!(arp.target_hw, "00:00:00:00:00:00");
        assert_eq!(arp.target_proto, "192.168.1.2");
    }

    #[test]
    fn test_is_at() {
        let frame = build_arp_packet(2, [10, 0, 0, 1], [10, 0, 0, 2]);
        let arp = parse_arp(&frame[ETH_HEADER..]);

        assert!(!arp.is_request());
        assert_eq!(arp.operation, operation::REPLY);
        assert_eq!(arp.target_hw, "66:77:88:99:aa:bb");
        assert_eq!(arp.sender_proto, "10.0.0.1");
    }

    #[test]
    fn test_trailing_padding_dropped() {
        let mut frame = build_arp_packet(1, [10, 0, 0, 1], [10, 0, 0, 2]);
        frame.resize(60, 0);
        let result = ArpProtocol.parse(&frame[ETH_HEADER..], &arp_context());
        assert!(result.is_ok());
        assert!(result.remaining.is_empty());
    }

    #[test]
    fn test_addresses_cut_short() {
        let frame = build_arp_packet(1, [10, 0, 0, 1], [10, 0, 0, 2]);
        let result = ArpProtocol.parse(&frame[ETH_HEADER..ETH_HEADER + 10], &arp_context());
        assert!(!result.is_ok());
        assert_eq!(result.remaining.len(), 10);
    }
}
