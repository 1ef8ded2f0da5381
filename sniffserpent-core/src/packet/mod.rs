//! Protocol packet wrappers and their text summaries.
//!
//! Every accepted frame is wrapped in exactly one protocol view. The view
//! renders:
//! - a one-line brief summary for the live list
//! - a multi-line detailed summary, rendered on demand
//!
//! [`PacketKind`] dispatches statically over the ten views and
//! [`PacketRecord`] ties a view to its sequence id.

mod arp;
mod common;
mod dhcp;
mod dns;
mod fit;
mod http;
mod icmp;
mod igmp;
mod stp;
mod tcp;
mod tls;
mod udp;

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::frame::Frame;

pub use arp::{hardware_type_name, protocol_type_name, ArpPacket};
pub use dhcp::{DhcpPacket, ACCEPTED_TYPES as DHCP_ACCEPTED_TYPES};
pub use dns::{class_name, record_type_name, DnsPacket};
pub use fit::{fit_list, fit_str, WRAP_WIDTH};
pub use http::HttpPacket;
pub use icmp::{icmp_type_name, IcmpPacket};
pub use igmp::{igmp_type_name, IgmpPacket, ACCEPTED_TYPES as IGMP_ACCEPTED_TYPES};
pub use stp::StpPacket;
pub use tcp::TcpPacket;
pub use tls::TlsPacket;
pub use udp::UdpPacket;

/// Brief and detailed text rendering of a packet.
pub trait Summary {
    /// One line: endpoints, protocol-specific type tag and frame size.
    fn brief_summary(&self) -> String;

    /// Blank-line separated `Label: value` items.
    fn detailed_summary(&self) -> String;
}

/// The protocols a packet can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolTag {
    Http,
    Tls,
    Dhcp,
    Dns,
    Tcp,
    Udp,
    Icmp,
    Arp,
    Igmp,
    Stp,
}

impl ProtocolTag {
    /// Every tag in classification priority order.
    pub const ALL: [ProtocolTag; 10] = [
        ProtocolTag::Http,
        ProtocolTag::Tls,
        ProtocolTag::Dhcp,
        ProtocolTag::Dns,
        ProtocolTag::Tcp,
        ProtocolTag::Udp,
        ProtocolTag::Icmp,
        ProtocolTag::Arp,
        ProtocolTag::Igmp,
        ProtocolTag::Stp,
    ];

    /// Display name used in summaries.
    pub fn name(self) -> &'static str {
        match self {
            ProtocolTag::Http => HttpPacket::NAME,
            ProtocolTag::Tls => TlsPacket::NAME,
            ProtocolTag::Dhcp => DhcpPacket::NAME,
            ProtocolTag::Dns => DnsPacket::NAME,
            ProtocolTag::Tcp => TcpPacket::NAME,
            ProtocolTag::Udp => UdpPacket::NAME,
            ProtocolTag::Icmp => IcmpPacket::NAME,
            ProtocolTag::Arp => ArpPacket::NAME,
            ProtocolTag::Igmp => IgmpPacket::NAME,
            ProtocolTag::Stp => StpPacket::NAME,
        }
    }

    /// Registry name of the decoded layer this tag looks for.
    pub fn layer_name(self) -> &'static str {
        match self {
            ProtocolTag::Http => "http",
            ProtocolTag::Tls => "tls",
            ProtocolTag::Dhcp => "dhcp",
            ProtocolTag::Dns => "dns",
            ProtocolTag::Tcp => "tcp",
            ProtocolTag::Udp => "udp",
            ProtocolTag::Icmp => "icmp",
            ProtocolTag::Arp => "arp",
            ProtocolTag::Igmp => "igmp",
            ProtocolTag::Stp => "stp",
        }
    }
}

impl fmt::Display for ProtocolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProtocolTag {
    type Err = ConfigError;

    /// Case-insensitive match on the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProtocolTag::ALL
            .into_iter()
            .find(|tag| tag.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownProtocol {
                name: wanted.to_string(),
            })
    }
}

/// A frame viewed through one protocol wrapper.
#[derive(Debug, Clone, Copy)]
pub enum PacketKind<'a> {
    Http(HttpPacket<'a>),
    Tls(TlsPacket<'a>),
    Dhcp(DhcpPacket<'a>),
    Dns(DnsPacket<'a>),
    Tcp(TcpPacket<'a>),
    Udp(UdpPacket<'a>),
    Icmp(IcmpPacket<'a>),
    Arp(ArpPacket<'a>),
    Igmp(IgmpPacket<'a>),
    Stp(StpPacket<'a>),
}

macro_rules! delegate_summary {
    ($self:expr, $method:ident) => {
        match $self {
            PacketKind::Http(p) => p.$method(),
            PacketKind::Tls(p) => p.$method(),
            PacketKind::Dhcp(p) => p.$method(),
            PacketKind::Dns(p) => p.$method(),
            PacketKind::Tcp(p) => p.$method(),
            PacketKind::Udp(p) => p.$method(),
            PacketKind::Icmp(p) => p.$method(),
            PacketKind::Arp(p) => p.$method(),
            PacketKind::Igmp(p) => p.$method(),
            PacketKind::Stp(p) => p.$method(),
        }
    };
}

impl<'a> PacketKind<'a> {
    /// Wrap `frame` in the view for `tag`.
    pub fn new(tag: ProtocolTag, frame: &'a Frame) -> Self {
        match tag {
            ProtocolTag::Http => PacketKind::Http(HttpPacket::new(frame)),
            ProtocolTag::Tls => PacketKind::Tls(TlsPacket::new(frame)),
            ProtocolTag::Dhcp => PacketKind::Dhcp(DhcpPacket::new(frame)),
            ProtocolTag::Dns => PacketKind::Dns(DnsPacket::new(frame)),
            ProtocolTag::Tcp => PacketKind::Tcp(TcpPacket::new(frame)),
            ProtocolTag::Udp => PacketKind::Udp(UdpPacket::new(frame)),
            ProtocolTag::Icmp => PacketKind::Icmp(IcmpPacket::new(frame)),
            ProtocolTag::Arp => PacketKind::Arp(ArpPacket::new(frame)),
            ProtocolTag::Igmp => PacketKind::Igmp(IgmpPacket::new(frame)),
            ProtocolTag::Stp => PacketKind::Stp(StpPacket::new(frame)),
        }
    }

    pub fn tag(&self) -> ProtocolTag {
        match self {
            PacketKind::Http(_) => ProtocolTag::Http,
            PacketKind::Tls(_) => ProtocolTag::Tls,
            PacketKind::Dhcp(_) => ProtocolTag::Dhcp,
            PacketKind::Dns(_) => ProtocolTag::Dns,
            PacketKind::Tcp(_) => ProtocolTag::Tcp,
            PacketKind::Udp(_) => ProtocolTag::Udp,
            PacketKind::Icmp(_) => ProtocolTag::Icmp,
            PacketKind::Arp(_) => ProtocolTag::Arp,
            PacketKind::Igmp(_) => ProtocolTag::Igmp,
            PacketKind::Stp(_) => ProtocolTag::Stp,
        }
    }
}

impl Summary for PacketKind<'_> {
    fn brief_summary(&self) -> String {
        delegate_summary!(self, brief_summary)
    }

    fn detailed_summary(&self) -> String {
        delegate_summary!(self, detailed_summary)
    }
}

/// An accepted packet: its sequence id, protocol tag and decoded frame.
///
/// Records are immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketRecord {
    id: u64,
    tag: ProtocolTag,
    frame: Frame,
}

impl PacketRecord {
    pub fn new(id: u64, tag: ProtocolTag, frame: Frame) -> Self {
        Self { id, tag, frame }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tag(&self) -> ProtocolTag {
        self.tag
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn kind(&self) -> PacketKind<'_> {
        PacketKind::new(self.tag, &self.frame)
    }
}

impl Summary for PacketRecord {
    fn brief_summary(&self) -> String {
        self.kind().brief_summary()
    }

    fn detailed_summary(&self) -> String {
        self.kind().detailed_summary()
    }
}
