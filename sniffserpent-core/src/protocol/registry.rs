//! Parser selection.
//!
//! Each decoder answers two questions: can it take the bytes at the current
//! position (given the hints left by the layer below), and if so how sure is
//! it. The registry asks every decoder and hands the bytes to the most
//! confident one.

use super::{
    ArpProtocol, DhcpProtocol, DnsProtocol, EthernetProtocol, HttpProtocol, IcmpProtocol,
    IgmpProtocol, Ipv4Protocol, Ipv6Protocol, LinuxSllProtocol, ParseContext, ParseResult,
    StpProtocol, TcpProtocol, TlsProtocol, UdpProtocol,
};

/// A single-layer decoder.
pub trait Protocol: Send + Sync {
    /// Lowercase layer name, as reported by [`parse_packet`](super::parse_packet).
    fn name(&self) -> &'static str;

    /// Confidence that the next bytes belong to this layer, or `None` to pass.
    fn can_parse(&self, context: &ParseContext) -> Option<u32>;

    fn parse<'a>(&self, data: &'a [u8], context: &ParseContext) -> ParseResult<'a>;
}

/// Every decoder this crate ships, dispatched without boxing.
#[derive(Debug, Clone, Copy)]
pub enum BuiltinProtocol {
    Ethernet(EthernetProtocol),
    LinuxSll(LinuxSllProtocol),
    Arp(ArpProtocol),
    Stp(StpProtocol),
    Ipv4(Ipv4Protocol),
    Ipv6(Ipv6Protocol),
    Tcp(TcpProtocol),
    Udp(UdpProtocol),
    Icmp(IcmpProtocol),
    Igmp(IgmpProtocol),
    Dns(DnsProtocol),
    Dhcp(DhcpProtocol),
    Tls(TlsProtocol),
    Http(HttpProtocol),
}

macro_rules! builtin_protocols {
    ($($variant:ident($decoder:ty)),* $(,)?) => {
        impl BuiltinProtocol {
            fn decoder(&self) -> &dyn Protocol {
                match self {
                    $(BuiltinProtocol::$variant(p) => p,)*
                }
            }
        }

        $(
            impl From<$decoder> for BuiltinProtocol {
                fn from(p: $decoder) -> Self {
                    BuiltinProtocol::$variant(p)
                }
            }
        )*
    };
}

builtin_protocols! {
    Ethernet(EthernetProtocol),
    LinuxSll(LinuxSllProtocol),
    Arp(ArpProtocol),
    Stp(StpProtocol),
    Ipv4(Ipv4Protocol),
    Ipv6(Ipv6Protocol),
    Tcp(TcpProtocol),
    Udp(UdpProtocol),
    Icmp(IcmpProtocol),
    Igmp(IgmpProtocol),
    Dns(DnsProtocol),
    Dhcp(DhcpProtocol),
    Tls(TlsProtocol),
    Http(HttpProtocol),
}

impl Protocol for BuiltinProtocol {
    fn name(&self) -> &'static str {
        self.decoder().name()
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        self.decoder().can_parse(context)
    }

    fn parse<'a>(&self, data: &'a [u8], context: &ParseContext) -> ParseResult<'a> {
        self.decoder().parse(data, context)
    }
}

/// Ordered set of decoders consulted at each layer.
#[derive(Debug, Clone, Default)]
pub struct ProtocolRegistry {
    parsers: Vec<BuiltinProtocol>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: Into<BuiltinProtocol>>(&mut self, parser: P) {
        self.parsers.push(parser.into());
    }

    /// The most confident decoder for `context`. On equal confidence the
    /// later registration wins.
    pub fn find_parser(&self, context: &ParseContext) -> Option<&BuiltinProtocol> {
        let mut best: Option<(&BuiltinProtocol, u32)> = None;
        for parser in &self.parsers {
            let Some(score) = parser.can_parse(context) else {
                continue;
            };
            if best.map_or(true, |(_, top)| score >= top) {
                best = Some((parser, score));
            }
        }
        best.map(|(parser, _)| parser)
    }

    /// Registered layer names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parsers.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
