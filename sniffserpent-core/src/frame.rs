//! Decoded frames.
//!
//! A [`Frame`] owns the raw packet together with every layer the protocol
//! registry could decode from it. Layers are immutable once decoded.

use std::net::IpAddr;

use crate::error::ProtocolError;
use crate::format::MacAddr;
use crate::pcap::RawPacket;
use crate::protocol::{
    parse_packet, ArpHeader, DhcpMessage, DnsMessage, EthernetHeader, HttpMessage, IcmpHeader,
    IgmpHeader, Ipv4Header, Ipv6Header, Layer, LinuxSllHeader, ProtocolRegistry, StpBpdu,
    TcpHeader, TlsRecord, UdpHeader,
};

/// A raw packet plus its decoded protocol layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    raw: RawPacket,
    layers: Vec<Layer>,
    payload: Vec<u8>,
}

macro_rules! layer_accessor {
    ($($(#[$doc:meta])* $fn:ident => $variant:ident($ty:ty);)*) => {
        $(
            $(#[$doc])*
            pub fn $fn(&self) -> Option<&$ty> {
                self.layers.iter().find_map(|layer| match layer {
                    Layer::$variant(header) => Some(header),
                    _ => None,
                })
            }
        )*
    };
}

impl Frame {
    /// Decode `raw` through `registry`.
    ///
    /// Fails only when the link layer itself cannot be decoded. A failing
    /// upper layer ends the chain and its bytes become the payload.
    pub fn decode(registry: &ProtocolRegistry, raw: RawPacket) -> Result<Self, ProtocolError> {
        let results = parse_packet(registry, raw.link_type, &raw.data);

        let Some((first_name, first)) = results.first() else {
            return Err(ProtocolError::UnsupportedLinkType {
                link_type: raw.link_type,
            });
        };
        if let Some(reason) = &first.error {
            return Err(ProtocolError::Malformed {
                protocol: *first_name,
                reason: reason.clone(),
            });
        }

        let payload = results
            .last()
            .map(|(_, result)| result.remaining.to_vec())
            .unwrap_or_default();
        let layers = results
            .into_iter()
            .filter_map(|(_, result)| result.layer)
            .collect();

        Ok(Self {
            raw,
            layers,
            payload,
        })
    }

    /// The captured packet.
    pub fn raw(&self) -> &RawPacket {
        &self.raw
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Captured length in bytes.
    pub fn len(&self) -> usize {
        self.raw.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.data.is_empty()
    }

    /// Bytes left after the last decoded layer.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// True if a layer produced by `protocol` (registry name) is present.
    pub fn has(&self, protocol: &str) -> bool {
        self.layers.iter().any(|l| l.protocol_name() == protocol)
    }

    layer_accessor! {
        ethernet => Ethernet(EthernetHeader);
        /// Cooked-capture header of frames captured on the `any` device.
        linux_sll => LinuxSll(LinuxSllHeader);
        arp => Arp(ArpHeader);
        stp => Stp(StpBpdu);
        ipv4 => Ipv4(Ipv4Header);
        ipv6 => Ipv6(Ipv6Header);
        tcp => Tcp(TcpHeader);
        udp => Udp(UdpHeader);
        icmp => Icmp(IcmpHeader);
        igmp => Igmp(IgmpHeader);
        dns => Dns(DnsMessage);
        dhcp => Dhcp(DhcpMessage);
        tls => Tls(TlsRecord);
        http => Http(HttpMessage);
    }

    /// Network-layer source, IPv4 first.
    pub fn src_ip(&self) -> Option<IpAddr> {
        self.ipv4()
            .map(|ip| IpAddr::V4(ip.source))
            .or_else(|| self.ipv6().map(|ip| IpAddr::V6(ip.source)))
    }

    /// Network-layer destination, IPv4 first.
    pub fn dst_ip(&self) -> Option<IpAddr> {
        self.ipv4()
            .map(|ip| IpAddr::V4(ip.destination))
            .or_else(|| self.ipv6().map(|ip| IpAddr::V6(ip.destination)))
    }

    /// Ethernet source, or the sender address of a cooked capture.
    pub fn src_mac(&self) -> Option<MacAddr> {
        self.ethernet()
            .map(|eth| eth.source)
            .or_else(|| self.linux_sll().and_then(LinuxSllHeader::source_mac))
    }

    pub fn dst_mac(&self) -> Option<MacAddr> {
        self.ethernet().map(|eth| eth.destination)
    }

    /// Transport ports as `(source, destination)`.
    pub fn ports(&self) -> Option<(u16, u16)> {
        self.tcp()
            .map(|tcp| (tcp.source_port, tcp.destination_port))
            .or_else(|| self.udp().map(|udp| (udp.source_port, udp.destination_port)))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::pcap::LINKTYPE_LINUX_SLL;
    use crate::protocol::default_registry;
    use crate::protocol::test_utils::*;

    #[test]
    fn test_decode_tcp_frame() {
        let frame = decode_frame(build_tcp_payload_packet(
            [10, 0, 0, 1],
            [10, 0, 0, 2],
            40000,
            5000,
            b"hello".to_vec(),
        ));

        assert_eq!(frame.len(), 59);
        assert!(frame.has("tcp"));
        assert!(!frame.has("udp"));
        assert_eq!(frame.ports(), Some((40000, 5000)));
        assert_eq!(frame.src_ip(), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert_eq!(frame.payload(), b"hello");
    }

    #[test]
    fn test_decode_arp_ignores_padding() {
        let mut data = build_arp_packet(1, [192, 168, 1, 1], [192, 168, 1, 2]);
        data.extend_from_slice(&[0u8; 18]); // Pad to 60 bytes
        let frame = decode_frame(data);

        assert!(frame.arp().is_some());
        assert!(frame.payload().is_empty());
        assert_eq!(frame.src_ip(), None);
        assert_eq!(frame.len(), 60);
    }

    #[test]
    fn test_failed_application_layer_becomes_payload() {
        let frame = decode_frame(build_tcp_payload_packet(
            [10, 0, 0, 1],
            [10, 0, 0, 2],
            50000,
            443,
            vec![0x99, 0x01, 0x02, 0x03, 0x04, 0x05],
        ));

        assert!(frame.tls().is_none());
        assert!(frame.tcp().is_some());
        assert_eq!(frame.payload(), &[0x99, 0x01, 0x02, 0x03, 0x04, 0x05]);
    }

    #[test]
    fn test_decode_unsupported_link_type() {
        let raw = RawPacket::new(1, 0, 4, 105, vec![0, 1, 2, 3]);
        assert_eq!(
            Frame::decode(&default_registry(), raw),
            Err(ProtocolError::UnsupportedLinkType { link_type: 105 })
        );
    }

    #[test]
    fn test_decode_cooked_capture() {
        let data = to_linux_sll(&build_tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 40000, 22, 0x02));
        let len = data.len() as u32;
        let frame = Frame::decode(
            &default_registry(),
            RawPacket::new(1, 0, len, LINKTYPE_LINUX_SLL, data),
        )
        .unwrap();

        assert!(frame.has("linux_sll"));
        assert!(frame.ethernet().is_none());
        assert_eq!(frame.ports(), Some((40000, 22)));
        assert_eq!(frame.src_mac(), Some(MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55])));
        assert_eq!(frame.dst_mac(), None);
        assert_eq!(frame.len(), 56);
    }

    #[test]
    fn test_decode_truncated_cooked_header() {
        let raw = RawPacket::new(1, 0, 8, LINKTYPE_LINUX_SLL, vec![0; 8]);
        assert!(matches!(
            Frame::decode(&default_registry(), raw),
            Err(ProtocolError::Malformed { protocol: "linux_sll", .. })
        ));
    }

    #[test]
    fn test_decode_truncated_ethernet() {
        let raw = RawPacket::ethernet(vec![0xff; 10]);
        assert!(matches!(
            Frame::decode(&default_registry(), raw),
            Err(ProtocolError::Malformed { protocol: "ethernet", .. })
        ));
    }
}
