//! Frame builders for unit tests.
//!
//! Checksums are left as written (zero unless set); none of the decoders
//! verify them.

use super::{default_registry, ParseContext};
use crate::frame::Frame;
use crate::pcap::RawPacket;

/// Generates `fn field(mut self, value) -> Self` setters.
macro_rules! setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, value: $ty) -> Self {
                self.$field = value;
                self
            }
        )*
    };
}

#[derive(Debug, Clone)]
pub struct EthernetBuilder {
    src_mac: [u8; 6],
    dst_mac: [u8; 6],
    ethertype: u16,
    payload: Vec<u8>,
}

impl EthernetBuilder {
    pub fn new() -> Self {
        Self {
            src_mac: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            dst_mac: [0xff; 6],
            ethertype: 0x0800,
            payload: Vec::new(),
        }
    }

    setters!(src_mac: [u8; 6], dst_mac: [u8; 6], ethertype: u16, payload: Vec<u8>);

    pub fn ipv4(self) -> Self {
        self.ethertype(0x0800)
    }

    pub fn ipv6(self) -> Self {
        self.ethertype(0x86dd)
    }

    pub fn arp(self) -> Self {
        self.ethertype(0x0806)
    }

    pub fn build(self) -> Vec<u8> {
        [
            &self.dst_mac[..],
            &self.src_mac,
            &self.ethertype.to_be_bytes(),
            &self.payload[..],
        ]
        .concat()
    }
}

/// IPv4 without options, so the header is always 20 bytes.
#[derive(Debug, Clone)]
pub struct Ipv4Builder {
    tos: u8,
    ttl: u8,
    protocol: u8,
    checksum: u16,
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    payload: Vec<u8>,
}

impl Ipv4Builder {
    pub fn new() -> Self {
        Self {
            tos: 0,
            ttl: 64,
            protocol: 6,
            checksum: 0,
            src_ip: [192, 168, 1, 1],
            dst_ip: [192, 168, 1, 2],
            payload: Vec::new(),
        }
    }

    setters!(
        tos: u8,
        ttl: u8,
        protocol: u8,
        checksum: u16,
        src_ip: [u8; 4],
        dst_ip: [u8; 4],
        payload: Vec<u8>,
    );

    pub fn tcp(self) -> Self {
        self.protocol(6)
    }

    pub fn udp(self) -> Self {
        self.protocol(17)
    }

    pub fn icmp(self) -> Self {
        self.protocol(1)
    }

    pub fn igmp(self) -> Self {
        self.protocol(2)
    }

    pub fn build(self) -> Vec<u8> {
        let total_length = (20 + self.payload.len()) as u16;
        let mut out = vec![0x45, self.tos];
        out.extend_from_slice(&total_length.to_be_bytes());
        // id 1, no fragmentation
        out.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, self.ttl, self.protocol]);
        out.extend_from_slice(&self.checksum.to_be_bytes());
        out.extend_from_slice(&self.src_ip);
        out.extend_from_slice(&self.dst_ip);
        out.extend(self.payload);
        out
    }
}

/// IPv6 between fe80::1 and fe80::2, no extension headers.
#[derive(Debug, Clone)]
pub struct Ipv6Builder {
    traffic_class: u8,
    next_header: u8,
    hop_limit: u8,
    payload: Vec<u8>,
}

impl Ipv6Builder {
    pub fn new() -> Self {
        Self {
            traffic_class: 0,
            next_header: 17,
            hop_limit: 64,
            payload: Vec::new(),
        }
    }

    setters!(traffic_class: u8, next_header: u8, hop_limit: u8, payload: Vec<u8>);

    pub fn tcp(self) -> Self {
        self.next_header(6)
    }

    pub fn udp(self) -> Self {
        self.next_header(17)
    }

    pub fn build(self) -> Vec<u8> {
        let link_local = |last: u8| {
            let mut addr = [0u8; 16];
            addr[..2].copy_from_slice(&[0xfe, 0x80]);
            addr[15] = last;
            addr
        };
        let tc = self.traffic_class;
        let mut out = vec![0x60 | (tc >> 4), tc << 4, 0, 0];
        out.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        out.extend_from_slice(&[self.next_header, self.hop_limit]);
        out.extend_from_slice(&link_local(1));
        out.extend_from_slice(&link_local(2));
        out.extend(self.payload);
        out
    }
}

#[derive(Debug, Clone)]
pub struct TcpBuilder {
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack_num: u32,
    flags: u8,
    window: u16,
    options: Vec<u8>,
    payload: Vec<u8>,
}

impl TcpBuilder {
    /// SYN from port 12345 to port 80.
    pub fn new() -> Self {
        Self {
            src_port: 12345,
            dst_port: 80,
            seq: 1,
            ack_num: 0,
            flags: 0x02,
            window: 65535,
            options: Vec::new(),
            payload: Vec::new(),
        }
    }

    setters!(
        src_port: u16,
        dst_port: u16,
        seq: u32,
        ack_num: u32,
        flags: u8,
        window: u16,
        payload: Vec<u8>,
    );

    pub fn syn(self) -> Self {
        self.flags(0x02)
    }

    pub fn psh_ack(self) -> Self {
        self.flags(0x18)
    }

    /// Raw option bytes, zero-padded to a word boundary.
    pub fn options(mut self, mut options: Vec<u8>) -> Self {
        options.resize(options.len().div_ceil(4) * 4, 0);
        self.options = options;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let words = (5 + self.options.len() / 4) as u8;
        let mut out = Vec::with_capacity(20 + self.options.len() + self.payload.len());
        out.extend_from_slice(&self.src_port.to_be_bytes());
        out.extend_from_slice(&self.dst_port.to_be_bytes());
        out.extend_from_slice(&self.seq.to_be_bytes());
        out.extend_from_slice(&self.ack_num.to_be_bytes());
        out.extend_from_slice(&[words << 4, self.flags]);
        out.extend_from_slice(&self.window.to_be_bytes());
        // checksum, urgent pointer
        out.extend_from_slice(&[0; 4]);
        out.extend(self.options);
        out.extend(self.payload);
        out
    }
}

#[derive(Debug, Clone)]
pub struct UdpBuilder {
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
}

impl UdpBuilder {
    pub fn new() -> Self {
        Self {
            src_port: 12345,
            dst_port: 53,
            payload: Vec::new(),
        }
    }

    setters!(src_port: u16, dst_port: u16, payload: Vec<u8>);

    pub fn build(self) -> Vec<u8> {
        let length = (8 + self.payload.len()) as u16;
        let mut out = Vec::with_capacity(length as usize);
        for word in [self.src_port, self.dst_port, length, 0] {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out.extend(self.payload);
        out
    }
}

/// ICMP message; an echo request with id 1 and sequence 1 until told otherwise.
#[derive(Debug, Clone)]
pub struct IcmpBuilder {
    kind: (u8, u8),
    rest: [u8; 4],
    payload: Vec<u8>,
}

impl IcmpBuilder {
    pub fn new() -> Self {
        Self {
            kind: (8, 0),
            rest: [0, 1, 0, 1],
            payload: Vec::new(),
        }
    }

    setters!(payload: Vec<u8>);

    pub fn echo_request(mut self) -> Self {
        self.kind = (8, 0);
        self
    }

    pub fn destination_unreachable(mut self, code: u8) -> Self {
        self.kind = (3, code);
        self.rest = [0; 4];
        self
    }

    pub fn identifier(mut self, id: u16) -> Self {
        self.rest[..2].copy_from_slice(&id.to_be_bytes());
        self
    }

    pub fn sequence(mut self, seq: u16) -> Self {
        self.rest[2..].copy_from_slice(&seq.to_be_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let (icmp_type, code) = self.kind;
        let mut out = vec![icmp_type, code, 0, 0];
        out.extend_from_slice(&self.rest);
        out.extend(self.payload);
        out
    }
}

/// Wrap an IPv4 packet in an Ethernet II frame.
fn over_ethernet(ipv4: Ipv4Builder) -> Vec<u8> {
    EthernetBuilder::new().ipv4().payload(ipv4.build()).build()
}

fn ipv4_between(src_ip: [u8; 4], dst_ip: [u8; 4]) -> Ipv4Builder {
    Ipv4Builder::new().src_ip(src_ip).dst_ip(dst_ip)
}

/// Header-only TCP segment with the given flag byte.
pub fn build_tcp_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    flags: u8,
) -> Vec<u8> {
    let tcp = TcpBuilder::new().src_port(src_port).dst_port(dst_port).flags(flags);
    over_ethernet(ipv4_between(src_ip, dst_ip).tcp().payload(tcp.build()))
}

/// PSH+ACK segment carrying `payload`.
pub fn build_tcp_payload_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
) -> Vec<u8> {
    let tcp = TcpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .psh_ack()
        .payload(payload);
    over_ethernet(ipv4_between(src_ip, dst_ip).tcp().payload(tcp.build()))
}

pub fn build_udp_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
) -> Vec<u8> {
    let udp = UdpBuilder::new().src_port(src_port).dst_port(dst_port).payload(payload);
    over_ethernet(ipv4_between(src_ip, dst_ip).udp().payload(udp.build()))
}

pub fn build_icmp_echo_request(src_ip: [u8; 4], dst_ip: [u8; 4], id: u16, seq: u16) -> Vec<u8> {
    let icmp = IcmpBuilder::new().echo_request().identifier(id).sequence(seq);
    over_ethernet(ipv4_between(src_ip, dst_ip).icmp().payload(icmp.build()))
}

/// IGMP message from 192.168.1.10 to `group`, sent to the group's multicast MAC.
pub fn build_igmp_packet(igmp_type: u8, group: [u8; 4]) -> Vec<u8> {
    // max response time 10s, zero checksum
    let igmp = [&[igmp_type, 0x64, 0x00, 0x00][..], &group].concat();
    let ipv4 = ipv4_between([192, 168, 1, 10], group).ttl(1).igmp().payload(igmp);

    EthernetBuilder::new()
        .dst_mac([0x01, 0x00, 0x5e, group[1] & 0x7f, group[2], group[3]])
        .payload(ipv4.build())
        .build()
}

/// ARP over Ethernet. Operation 1 is a request (unknown target MAC), 2 a reply.
pub fn build_arp_packet(operation: u16, sender_ip: [u8; 4], target_ip: [u8; 4]) -> Vec<u8> {
    let sender_mac = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
    let target_mac = match operation {
        1 => [0x00; 6],
        _ => [0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb],
    };

    // Ethernet/IPv4 hardware and protocol types with their address lengths
    let mut arp = vec![0x00, 0x01, 0x08, 0x00, 6, 4];
    arp.extend_from_slice(&operation.to_be_bytes());
    for part in [&sender_mac[..], &sender_ip, &target_mac, &target_ip] {
        arp.extend_from_slice(part);
    }

    EthernetBuilder::new().src_mac(sender_mac).arp().payload(arp).build()
}

/// 802.3 frame with an LLC header and a configuration BPDU.
pub fn build_stp_frame() -> Vec<u8> {
    let bridge = [0x80, 0x00, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
    let mut llc = vec![0x42, 0x42, 0x03];
    // protocol id, version, configuration BPDU, flags
    llc.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00]);
    llc.extend_from_slice(&bridge);
    llc.extend_from_slice(&4u32.to_be_bytes());
    llc.extend_from_slice(&bridge);
    llc.extend_from_slice(&[0x80, 0x01]);
    // message age 0, max age 20, hello 2, forward delay 15 (1/256 s units)
    llc.extend_from_slice(&[0x00, 0x00, 0x14, 0x00, 0x02, 0x00, 0x0f, 0x00]);

    EthernetBuilder::new()
        .dst_mac([0x01, 0x80, 0xc2, 0x00, 0x00, 0x00])
        .ethertype(llc.len() as u16)
        .payload(llc)
        .build()
}

/// Recursive A query for `name`.
pub fn dns_query(id: u16, name: &str) -> Vec<u8> {
    let mut msg = id.to_be_bytes().to_vec();
    // RD set, one question
    msg.extend_from_slice(&[0x01, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
    for label in name.split('.') {
        msg.push(label.len() as u8);
        msg.extend_from_slice(label.as_bytes());
    }
    msg.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01]);
    msg
}

/// DHCP message whose first option is the message type, followed by `options`.
pub fn dhcp_message(message_type: u8, yiaddr: [u8; 4], options: &[u8]) -> Vec<u8> {
    let is_reply = matches!(message_type, 2 | 5 | 6);
    let mut msg = vec![0u8; 236];
    msg[..3].copy_from_slice(&[if is_reply { 2 } else { 1 }, 1, 6]);
    msg[4..8].copy_from_slice(&0x1234_5678u32.to_be_bytes());
    msg[16..20].copy_from_slice(&yiaddr);
    msg[28..34].copy_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    msg.extend_from_slice(&[0x63, 0x82, 0x53, 0x63, 53, 1, message_type]);
    msg.extend_from_slice(options);
    msg.push(255);
    msg
}

/// Re-frame an Ethernet II frame the way the `any` device delivers it: a
/// cooked header carrying the source MAC and EtherType in place of the
/// Ethernet header.
pub fn to_linux_sll(ethernet: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x06]; // Host, ARPHRD_ETHER, 6-byte address
    out.extend_from_slice(&ethernet[6..12]);
    out.extend_from_slice(&[0x00, 0x00]);
    out.extend_from_slice(&ethernet[12..]);
    out
}

pub fn decode_frame(data: Vec<u8>) -> Frame {
    Frame::decode(&default_registry(), RawPacket::ethernet(data)).expect("frame decodes")
}

/// Context as left by IPv4 for an ICMP payload.
pub fn icmp_context() -> ParseContext {
    let mut ctx = ParseContext::new(1);
    ctx.insert_hint("ip_protocol", 1);
    ctx.parent_protocol = Some("ipv4");
    ctx
}

#[cfg(test)]
mod tests {
    use super::super::{EthernetProtocol, Protocol, TcpProtocol};
    use super::*;

    #[test]
    fn test_ethernet_layout() {
        let frame = EthernetBuilder::new()
            .src_mac([0x11, 0x22, 0x33, 0x44, 0x55, 0x66])
            .dst_mac([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff])
            .payload(vec![0x45, 0x00])
            .build();

        assert_eq!(frame.len(), 16);
        assert_eq!(&frame[..6], &[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(&frame[6..12], &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(&frame[12..14], &[0x08, 0x00]);
        assert!(EthernetProtocol.parse(&frame, &ParseContext::new(1)).is_ok());
    }

    #[test]
    fn test_tcp_options_padded_to_words() {
        let segment = TcpBuilder::new()
            .options(vec![0x02, 0x04, 0x05, 0xb4, 0x01, 0x03, 0x03, 0x07, 0x04, 0x02])
            .build();
        assert_eq!(segment.len(), 32);
        assert_eq!(segment[12] >> 4, 8);

        let mut ctx = ParseContext::new(1);
        ctx.insert_hint("ip_protocol", 6);
        ctx.parent_protocol = Some("ipv4");
        let result = TcpProtocol.parse(&segment, &ctx);
        assert!(result.is_ok(), "{:?}", result.error);
    }

    #[test]
    fn test_tcp_packet_length() {
        let packet = build_tcp_packet([192, 168, 1, 100], [192, 168, 1, 200], 12345, 80, 0x02);
        assert_eq!(packet.len(), 14 + 20 + 20);
    }

    #[test]
    fn test_stp_length_field_covers_llc() {
        let frame = build_stp_frame();
        let length = u16::from_be_bytes([frame[12], frame[13]]) as usize;
        assert_eq!(length, frame.len() - 14);
        assert_eq!(length, 3 + 35);
    }
}
