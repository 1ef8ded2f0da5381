//! Protocol classification.
//!
//! The [`DispatchTable`] walks the enabled tags in priority order. The first
//! tag whose layer is present in the frame decides: its acceptance check
//! either keeps the packet under that tag or drops it. Lower priority tags
//! are never consulted once a layer matched.

use std::collections::BTreeSet;

use crate::error::ConfigError;
use crate::frame::Frame;
use crate::packet::{DhcpPacket, IgmpPacket, ProtocolTag, TlsPacket};

/// Acceptance check run once a tag's layer is present.
type Acceptor = fn(&Frame) -> bool;

fn accept_any(_frame: &Frame) -> bool {
    true
}

fn acceptor(tag: ProtocolTag) -> Acceptor {
    match tag {
        ProtocolTag::Tls => TlsPacket::accepts,
        ProtocolTag::Dhcp => DhcpPacket::accepts,
        ProtocolTag::Igmp => IgmpPacket::accepts,
        _ => accept_any,
    }
}

/// Enabled protocol tags in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    entries: Vec<ProtocolTag>,
}

impl DispatchTable {
    /// Every protocol enabled.
    pub fn all() -> Self {
        Self {
            entries: ProtocolTag::ALL.to_vec(),
        }
    }

    /// Every protocol except `excluded`.
    ///
    /// Fails when nothing would be left to capture.
    pub fn excluding(excluded: &BTreeSet<ProtocolTag>) -> Result<Self, ConfigError> {
        let entries: Vec<_> = ProtocolTag::ALL
            .into_iter()
            .filter(|tag| !excluded.contains(tag))
            .collect();
        if entries.is_empty() {
            return Err(ConfigError::EmptyProtocolFilter);
        }
        Ok(Self { entries })
    }

    /// Enabled tags in priority order.
    pub fn tags(&self) -> impl Iterator<Item = ProtocolTag> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick the tag for `frame`, or `None` if it is dropped.
    pub fn classify(&self, frame: &Frame) -> Option<ProtocolTag> {
        let tag = self
            .entries
            .iter()
            .copied()
            .find(|tag| frame.has(tag.layer_name()))?;
        acceptor(tag)(frame).then_some(tag)
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::*;

    fn classify(data: Vec<u8>) -> Option<ProtocolTag> {
        DispatchTable::all().classify(&decode_frame(data))
    }

    #[test]
    fn test_priority_order() {
        let http = build_tcp_payload_packet(
            [10, 0, 0, 1],
            [10, 0, 0, 2],
            50000,
            80,
            b"GET / HTTP/1.1\r\nHost: a\r\n\r\n".to_vec(),
        );
        assert_eq!(classify(http), Some(ProtocolTag::Http));

        let dns = build_udp_packet([10, 0, 0, 1], [8, 8, 8, 8], 53001, 53, dns_query(1, "a.b"));
        assert_eq!(classify(dns), Some(ProtocolTag::Dns));

        assert_eq!(classify(build_arp_packet(1, [10, 0, 0, 1], [10, 0, 0, 2])), Some(ProtocolTag::Arp));
        assert_eq!(classify(build_stp_frame()), Some(ProtocolTag::Stp));
        assert_eq!(
            classify(build_icmp_echo_request([10, 0, 0, 1], [10, 0, 0, 2], 1, 1)),
            Some(ProtocolTag::Icmp)
        );
    }

    #[test]
    fn test_non_http_on_port_80_is_tcp() {
        let packet = build_tcp_payload_packet([10, 0, 0, 1], [10, 0, 0, 2], 50000, 80, vec![0x00, 0x01]);
        assert_eq!(classify(packet), Some(ProtocolTag::Tcp));
    }

    #[test]
    fn test_tls_application_data_rejected() {
        let record = vec![0x17, 0x03, 0x03, 0x00, 0x02, 0xaa, 0xbb];
        let packet = build_tcp_payload_packet([10, 0, 0, 1], [10, 0, 0, 2], 50000, 443, record);
        // TLS layer is present, so TCP is never tried
        assert_eq!(classify(packet), None);
    }

    #[test]
    fn test_malformed_dns_is_udp() {
        let packet = build_udp_packet([10, 0, 0, 1], [8, 8, 8, 8], 53001, 53, vec![0xff; 5]);
        assert_eq!(classify(packet), Some(ProtocolTag::Udp));
    }

    #[test]
    fn test_bootp_without_cookie_is_udp() {
        let mut bootp = dhcp_message(1, [0, 0, 0, 0], &[]);
        bootp[236..240].copy_from_slice(&[0, 0, 0, 0]); // Clobber the magic cookie
        let packet = build_udp_packet([0, 0, 0, 0], [255, 255, 255, 255], 68, 67, bootp);
        assert_eq!(classify(packet), Some(ProtocolTag::Udp));
    }

    #[test]
    fn test_dhcp_types() {
        let discover = dhcp_message(1, [0, 0, 0, 0], &[]);
        let packet = build_udp_packet([0, 0, 0, 0], [255, 255, 255, 255], 68, 67, discover);
        assert_eq!(classify(packet), Some(ProtocolTag::Dhcp));

        let unknown = dhcp_message(99, [0, 0, 0, 0], &[]);
        let packet = build_udp_packet([0, 0, 0, 0], [255, 255, 255, 255], 68, 67, unknown);
        assert_eq!(classify(packet), None);
    }

    #[test]
    fn test_igmp_types() {
        assert_eq!(classify(build_igmp_packet(0x11, [224, 0, 0, 1])), Some(ProtocolTag::Igmp));
        assert_eq!(classify(build_igmp_packet(0x22, [224, 0, 0, 22])), None);
    }

    #[test]
    fn test_excluded_tag_falls_through() {
        let excluded = BTreeSet::from([ProtocolTag::Http]);
        let table = DispatchTable::excluding(&excluded).expect("table");
        let packet = build_tcp_payload_packet(
            [10, 0, 0, 1],
            [10, 0, 0, 2],
            50000,
            80,
            b"GET / HTTP/1.1\r\n\r\n".to_vec(),
        );
        assert_eq!(table.classify(&decode_frame(packet)), Some(ProtocolTag::Tcp));
        assert_eq!(table.len(), 9);
    }

    #[test]
    fn test_excluding_everything_fails() {
        let excluded: BTreeSet<_> = ProtocolTag::ALL.into_iter().collect();
        assert_eq!(
            DispatchTable::excluding(&excluded).map(|t| t.len()),
            Err(ConfigError::EmptyProtocolFilter)
        );
    }

    #[test]
    fn test_unmatched_frame_is_dropped() {
        let only_dns: BTreeSet<_> = ProtocolTag::ALL
            .into_iter()
            .filter(|tag| *tag != ProtocolTag::Dns)
            .collect();
        let table = DispatchTable::excluding(&only_dns).expect("table");
        let packet = build_tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 1, 2, 0x02);
        assert_eq!(table.classify(&decode_frame(packet)), None);
    }
}
