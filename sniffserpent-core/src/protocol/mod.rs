//! Layer-by-layer frame decoding.
//!
//! A frame is decoded by repeatedly asking the [`ProtocolRegistry`] which
//! [`Protocol`] should take the next bytes. Every decoder turns its header
//! into a [`Layer`] and leaves hints (ethertype, ports, ...) that steer the
//! choice of the next one.
//!
//! ## Supported Protocols
//!
//! | Layer | Protocols |
//! |-------|-----------|
//! | Link | Ethernet II, IEEE 802.3/LLC, Linux SLL, STP |
//! | Network | IPv4, IPv6, ARP, ICMP, IGMP |
//! | Transport | TCP, UDP |
//! | Application | DNS, DHCP, TLS, HTTP |
//!
//! ## Example
//!
//! ```rust
//! use sniffserpent_core::protocol::{default_registry, parse_packet};
//!
//! let registry = default_registry();
//! // Ethernet frame carrying an ARP request
//! let packet_data: &[u8] = &[
//!     0xff, 0xff, 0xff, 0xff, 0xff, 0xff,  // dst mac
//!     0x00, 0x11, 0x22, 0x33, 0x44, 0x55,  // src mac
//!     0x08, 0x06,                          // ethertype (ARP)
//!     0x00, 0x01, 0x08, 0x00, 0x06, 0x04,  // htype, ptype, hlen, plen
//!     0x00, 0x01,                          // op: request
//!     0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 192, 168, 1, 1,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 192, 168, 1, 2,
//! ];
//!
//! let results = parse_packet(&registry, 1, packet_data); // 1 = Ethernet
//! let names: Vec<_> = results.iter().map(|(name, _)| *name).collect();
//! assert_eq!(names, ["ethernet", "arp"]);
//! ```

mod context;
mod layer;
mod registry;

// Protocol implementations
mod arp;
mod dhcp;
mod dns;
mod ethernet;
mod http;
mod icmp;
mod igmp;
mod ipv4;
mod ipv6;
mod linux_sll;
mod stp;
mod tcp;
mod tls;
mod udp;

#[cfg(test)]
pub mod test_utils;

pub use context::{HintEntry, Hints, ParseContext, ParseResult};
pub use layer::Layer;
pub use registry::{BuiltinProtocol, Protocol, ProtocolRegistry};

pub use arp::{ArpHeader, ArpProtocol};
pub use dhcp::{DhcpMessage, DhcpOption, DhcpProtocol};
pub use dns::{DnsMessage, DnsProtocol, DnsQuestion, DnsRecord};
pub use ethernet::{EthernetHeader, EthernetProtocol, LlcHeader};
pub use http::{HttpHeaders, HttpMessage, HttpProtocol};
pub use icmp::{IcmpHeader, IcmpProtocol};
pub use igmp::{IgmpHeader, IgmpProtocol};
pub use ipv4::{Ipv4Header, Ipv4Protocol};
pub use ipv6::{Ipv6Header, Ipv6Protocol};
pub use linux_sll::{LinuxSllHeader, LinuxSllProtocol};
pub use stp::{BridgeId, StpBpdu, StpProtocol};
pub use tcp::{TcpFlags, TcpHeader, TcpOption, TcpProtocol};
pub use tls::{TlsHandshake, TlsProtocol, TlsRecord};
pub use udp::{UdpHeader, UdpProtocol};

// Numeric constants
pub use arp::operation as arp_operation;
pub use dhcp::{message_type as dhcp_message_type, option as dhcp_option};
pub use dns::record_type;
pub use ethernet::{ethertype, llc_sap};
pub use icmp::icmp_type;
pub use igmp::igmp_type;
pub use ipv6::next_header;
pub use linux_sll::{arphrd, packet_type as sll_packet_type};
pub use stp::bpdu_type;
pub use tcp::flags as tcp_flags;
pub use tls::{content_type as tls_content_type, handshake_type as tls_handshake_type};

/// Registry holding every built-in decoder.
pub fn default_registry() -> ProtocolRegistry {
    let decoders: [BuiltinProtocol; 14] = [
        EthernetProtocol.into(),
        LinuxSllProtocol.into(),
        ArpProtocol.into(),
        StpProtocol.into(),
        Ipv4Protocol.into(),
        Ipv6Protocol.into(),
        TcpProtocol.into(),
        UdpProtocol.into(),
        IcmpProtocol.into(),
        IgmpProtocol.into(),
        // Port-keyed application decoders; HTTP outranks TLS on a shared port
        TlsProtocol.into(),
        DnsProtocol.into(),
        DhcpProtocol.into(),
        HttpProtocol.into(),
    ];

    let mut registry = ProtocolRegistry::new();
    for decoder in decoders {
        registry.register(decoder);
    }
    registry
}

/// Decode `data` into `(layer name, result)` pairs, outermost first.
///
/// Decoding ends when no decoder claims the remaining bytes, when they run
/// out, or after the first failed layer. A failed layer is still reported so
/// its undecoded input can be kept as payload.
pub fn parse_packet<'a>(
    registry: &ProtocolRegistry,
    link_type: u16,
    data: &'a [u8],
) -> Vec<(&'static str, ParseResult<'a>)> {
    let mut results = Vec::with_capacity(4);
    let mut context = ParseContext::new(link_type);
    let mut remaining = data;

    while !remaining.is_empty() {
        let Some(parser) = registry.find_parser(&context) else {
            break;
        };

        let result = parser.parse(remaining, &context);

        context.parent_protocol = Some(parser.name());
        context.hints = result.child_hints.clone();

        let should_stop = result.error.is_some();
        remaining = result.remaining;

        results.push((parser.name(), result));

        if should_stop {
            break;
        }
    }

    results
}
