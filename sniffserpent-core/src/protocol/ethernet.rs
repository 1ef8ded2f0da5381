//! Ethernet II and IEEE 802.3/LLC parser.

use smallvec::SmallVec;

use etherparse::Ethernet2HeaderSlice;

use super::{Layer, ParseContext, ParseResult, Protocol};
use crate::format::MacAddr;
use crate::pcap::LINKTYPE_ETHERNET;

/// EtherType values the decoder chains on.
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const IPV6: u16 = 0x86DD;

    /// Values up to this one are 802.3 length fields, not EtherTypes.
    pub const MAX_8023_LENGTH: u16 = 1500;
}

/// LLC service access points.
pub mod llc_sap {
    /// IEEE 802.1D spanning tree.
    pub const STP: u8 = 0x42;
}

/// IEEE 802.2 LLC header carried by 802.3 frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlcHeader {
    pub dsap: u8,
    pub ssap: u8,
    pub control: u8,
}

/// Decoded link-layer header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetHeader {
    pub source: MacAddr,
    pub destination: MacAddr,
    /// EtherType for Ethernet II, payload length for 802.3.
    pub ether_type: u16,
    /// Present for 802.3 frames.
    pub llc: Option<LlcHeader>,
}

impl EthernetHeader {
    /// True for 802.3 frames, where the type field is a length.
    pub fn is_8023(&self) -> bool {
        self.ether_type <= ethertype::MAX_8023_LENGTH
    }
}

/// Ethernet protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct EthernetProtocol;

impl Protocol for EthernetProtocol {
    fn name(&self) -> &'static str {
        "ethernet"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        if context.is_root() && context.link_type == LINKTYPE_ETHERNET {
            Some(100)
        } else {
            None
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        let eth = match Ethernet2HeaderSlice::from_slice(data) {
            Ok(eth) => eth,
            Err(e) => return ParseResult::error(format!("Ethernet parse error: {e}"), data),
        };

        let header_len = eth.slice().len();
        let mut header = EthernetHeader {
            source: MacAddr(eth.source()),
            destination: MacAddr(eth.destination()),
            ether_type: eth.ether_type().0,
            llc: None,
        };
        let mut child_hints = SmallVec::new();

        if !header.is_8023() {
            child_hints.push(("ethertype", header.ether_type as u64));
            return ParseResult::success(Layer::Ethernet(header), &data[header_len..], child_hints);
        }

        // 802.3: length field followed by an LLC header
        let body = &data[header_len..];
        let body = &body[..(header.ether_type as usize).min(body.len())];
        if body.len() < 3 {
            return ParseResult::success(Layer::Ethernet(header), body, child_hints);
        }

        let llc = LlcHeader {
            dsap: body[0],
            ssap: body[1],
            control: body[2],
        };
        child_hints.push(("llc_sap", llc.dsap as u64));
        header.llc = Some(llc);

        ParseResult::success(Layer::Ethernet(header), &body[3..], child_hints)
    }
}
