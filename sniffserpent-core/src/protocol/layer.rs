//! Typed protocol layers produced by the decoders.

use super::arp::ArpHeader;
use super::dhcp::DhcpMessage;
use super::dns::DnsMessage;
use super::ethernet::EthernetHeader;
use super::http::HttpMessage;
use super::icmp::IcmpHeader;
use super::igmp::IgmpHeader;
use super::ipv4::Ipv4Header;
use super::ipv6::Ipv6Header;
use super::linux_sll::LinuxSllHeader;
use super::stp::StpBpdu;
use super::tcp::TcpHeader;
use super::tls::TlsRecord;
use super::udp::UdpHeader;

/// One decoded protocol header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Ethernet(EthernetHeader),
    LinuxSll(LinuxSllHeader),
    Arp(ArpHeader),
    Stp(StpBpdu),
    Ipv4(Ipv4Header),
    Ipv6(Ipv6Header),
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Icmp(IcmpHeader),
    Igmp(IgmpHeader),
    Dns(DnsMessage),
    Dhcp(DhcpMessage),
    Tls(TlsRecord),
    Http(HttpMessage),
}

impl Layer {
    /// Registry name of the protocol that produced this layer.
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Layer::Ethernet(_) => "ethernet",
            Layer::LinuxSll(_) => "linux_sll",
            Layer::Arp(_) => "arp",
            Layer::Stp(_) => "stp",
            Layer::Ipv4(_) => "ipv4",
            Layer::Ipv6(_) => "ipv6",
            Layer::Tcp(_) => "tcp",
            Layer::Udp(_) => "udp",
            Layer::Icmp(_) => "icmp",
            Layer::Igmp(_) => "igmp",
            Layer::Dns(_) => "dns",
            Layer::Dhcp(_) => "dhcp",
            Layer::Tls(_) => "tls",
            Layer::Http(_) => "http",
        }
    }
}
