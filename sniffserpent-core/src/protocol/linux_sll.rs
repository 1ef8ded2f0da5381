//! Linux cooked capture (SLL) parser.
//!
//! Captures on the `any` device carry a 16-byte pseudo header instead of a
//! real link-layer header. For Ethernet-like devices its protocol field is an
//! EtherType, so the network decoders chain on it unchanged.

use smallvec::SmallVec;

use super::{Layer, ParseContext, ParseResult, Protocol};
use crate::format::MacAddr;
use crate::pcap::LINKTYPE_LINUX_SLL;

/// SLL header length in bytes.
pub const LINUX_SLL_HEADER_LEN: usize = 16;

/// ARPHRD device types.
pub mod arphrd {
    pub const ETHER: u16 = 1;
    pub const LOOPBACK: u16 = 772;
    pub const IPGRE: u16 = 778;
    pub const IEEE80211_RADIOTAP: u16 = 803;
    pub const NETLINK: u16 = 824;
}

/// Direction of the packet relative to the capturing host.
pub mod packet_type {
    pub const HOST: u16 = 0;
    pub const BROADCAST: u16 = 1;
    pub const MULTICAST: u16 = 2;
    pub const OTHERHOST: u16 = 3;
    pub const OUTGOING: u16 = 4;
}

/// Decoded cooked-capture header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxSllHeader {
    pub packet_type: u16,
    pub arphrd_type: u16,
    /// Valid bytes of the link-layer address (at most 8).
    pub address: Vec<u8>,
    /// EtherType for Ethernet-like devices.
    pub protocol: u16,
}

impl LinuxSllHeader {
    /// Sender MAC, when the device uses 6-byte addresses.
    pub fn source_mac(&self) -> Option<MacAddr> {
        MacAddr::from_slice(&self.address)
    }

    pub fn packet_type_name(&self) -> &'static str {
        match self.packet_type {
            packet_type::HOST => "HOST",
            packet_type::BROADCAST => "BROADCAST",
            packet_type::MULTICAST => "MULTICAST",
            packet_type::OTHERHOST => "OTHERHOST",
            packet_type::OUTGOING => "OUTGOING",
            _ => "UNKNOWN",
        }
    }
}

/// Linux SLL protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct LinuxSllProtocol;

impl Protocol for LinuxSllProtocol {
    fn name(&self) -> &'static str {
        "linux_sll"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        if context.is_root() && context.link_type == LINKTYPE_LINUX_SLL {
            Some(100)
        } else {
            None
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < LINUX_SLL_HEADER_LEN {
            return ParseResult::error(
                format!("Linux SLL header too short: {} bytes", data.len()),
                data,
            );
        }

        let address_len = u16::from_be_bytes([data[4], data[5]]) as usize;
        let header = LinuxSllHeader {
            packet_type: u16::from_be_bytes([data[0], data[1]]),
            arphrd_type: u16::from_be_bytes([data[2], data[3]]),
            address: data[6..6 + address_len.min(8)].to_vec(),
            protocol: u16::from_be_bytes([data[14], data[15]]),
        };

        let mut child_hints = SmallVec::new();
        match header.arphrd_type {
            arphrd::ETHER | arphrd::LOOPBACK | arphrd::IPGRE => {
                child_hints.push(("ethertype", header.protocol as u64));
            }
            arphrd::NETLINK => child_hints.push(("netlink_family", header.protocol as u64)),
            _ => child_hints.push(("sll_protocol", header.protocol as u64)),
        }

        ParseResult::success(
            Layer::LinuxSll(header),
            &data[LINUX_SLL_HEADER_LEN..],
            child_hints,
        )
    }
}
