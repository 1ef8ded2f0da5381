//! TCP protocol parser.

use smallvec::SmallVec;

use etherparse::{TcpHeaderSlice, TcpOptionElement};

use super::{Layer, ParseContext, ParseResult, Protocol};

/// IP protocol number for TCP.
pub const IP_PROTO_TCP: u8 = 6;

/// TCP flags bit positions in the flags byte.
pub mod flags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
}

/// The low byte of the TCP flags field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags(pub u8);

impl TcpFlags {
    #[inline]
    pub fn contains(self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    pub fn fin(self) -> bool {
        self.contains(flags::FIN)
    }

    pub fn syn(self) -> bool {
        self.contains(flags::SYN)
    }

    pub fn rst(self) -> bool {
        self.contains(flags::RST)
    }

    pub fn psh(self) -> bool {
        self.contains(flags::PSH)
    }

    pub fn ack(self) -> bool {
        self.contains(flags::ACK)
    }

    pub fn urg(self) -> bool {
        self.contains(flags::URG)
    }
}

/// A decoded TCP option. NOP padding and end-of-list are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcpOption {
    Mss(u16),
    WindowScale(u8),
    SackPermitted,
    Sack(SmallVec<[(u32, u32); 4]>),
    Timestamp(u32, u32),
}

/// Decoded TCP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence: u32,
    pub acknowledgment: u32,
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
    pub options: Vec<TcpOption>,
}

/// Parse TCP options using etherparse's iterator, skipping malformed ones.
fn parse_tcp_options(tcp: &TcpHeaderSlice<'_>) -> Vec<TcpOption> {
    tcp.options_iterator()
        .filter_map(Result::ok)
        .filter_map(|opt| match opt {
            TcpOptionElement::Noop => None,
            TcpOptionElement::MaximumSegmentSize(mss) => Some(TcpOption::Mss(mss)),
            TcpOptionElement::WindowScale(scale) => Some(TcpOption::WindowScale(scale)),
            TcpOptionElement::SelectiveAcknowledgementPermitted => Some(TcpOption::SackPermitted),
            TcpOptionElement::SelectiveAcknowledgement(first, rest) => {
                let mut blocks = SmallVec::new();
                blocks.push(first);
                blocks.extend(rest.into_iter().flatten());
                Some(TcpOption::Sack(blocks))
            }
            TcpOptionElement::Timestamp(ts_val, ts_ecr) => Some(TcpOption::Timestamp(ts_val, ts_ecr)),
        })
        .collect()
}

/// TCP protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct TcpProtocol;

impl Protocol for TcpProtocol {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ip_protocol") {
            Some(proto) if proto == IP_PROTO_TCP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        let tcp = match TcpHeaderSlice::from_slice(data) {
            Ok(tcp) => tcp,
            Err(e) => return ParseResult::error(format!("TCP parse error: {e}"), data),
        };

        let header_len = tcp.slice().len();
        let header = TcpHeader {
            source_port: tcp.source_port(),
            destination_port: tcp.destination_port(),
            sequence: tcp.sequence_number(),
            acknowledgment: tcp.acknowledgment_number(),
            flags: TcpFlags(tcp.slice()[13]),
            window: tcp.window_size(),
            checksum: tcp.checksum(),
            urgent_pointer: tcp.urgent_pointer(),
            options: if header_len > 20 {
                parse_tcp_options(&tcp)
            } else {
                Vec::new()
            },
        };

        let mut child_hints = SmallVec::new();
        child_hints.push(("src_port", header.source_port as u64));
        child_hints.push(("dst_port", header.destination_port as u64));
        child_hints.push(("transport", IP_PROTO_TCP as u64));

        ParseResult::success(Layer::Tcp(header), &data[header_len..], child_hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_tcp(segment: &[u8]) -> (TcpHeader, usize) {
        let mut context = ParseContext::new(1);
        context.insert_hint("ip_protocol", 6);
        let result = TcpProtocol.parse(segment, &context);
        assert!(result.is_ok(), "{:?}", result.error);
        match result.layer {
            Some(Layer::Tcp(h)) => (h, result.remaining.len()),
            other => panic!("expected TCP layer, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_tcp_syn_ack() {
        let segment = [
            0x01, 0xbb, // Src port: 443
            0xd4, 0x31, // Dst port: 54321
            0x00, 0x00, 0x00, 0x64, // Seq: 100
            0x00, 0x00, 0x00, 0x01, // Ack: 1
            0x50, // Data offset: 5
            0x12, // Flags: SYN+ACK
            0xff, 0xff, // Window: 65535
            0x12, 0x34, // Checksum
            0x00, 0x00, // Urgent pointer
        ];

        let (tcp, remaining) = parse_tcp(&segment);
        assert_eq!(tcp.source_port, 443);
        assert_eq!(tcp.destination_port, 54321);
        assert_eq!(tcp.sequence, 100);
        assert_eq!(tcp.acknowledgment, 1);
        assert!(tcp.flags.syn() && tcp.flags.ack());
        assert!(!tcp.flags.fin() && !tcp.flags.rst() && !tcp.flags.psh() && !tcp.flags.urg());
        assert_eq!(tcp.checksum, 0x1234);
        assert!(tcp.options.is_empty());
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_parse_tcp_options() {
        let segment = [
            0x30, 0x39, // Src port: 12345
            0x00, 0x50, // Dst port: 80
            0x00, 0x00, 0x00, 0x01, // Seq
            0x00, 0x00, 0x00, 0x00, // Ack
            0x80, // Data offset: 8 (32 bytes)
            0x02, // Flags: SYN
            0xfa, 0xf0, // Window
            0x00, 0x00, // Checksum
            0x00, 0x00, // Urgent pointer
            0x02, 0x04, 0x05, 0xb4, // MSS: 1460
            0x01, // NOP
            0x03, 0x03, 0x07, // Window scale: 7
            0x04, 0x02, // SACK permitted
            0x01, 0x01, // NOP, NOP
        ];

        let (tcp, _) = parse_tcp(&segment);
        assert_eq!(
            tcp.options,
            vec![
                TcpOption::Mss(1460),
                TcpOption::WindowScale(7),
                TcpOption::SackPermitted,
            ]
        );
    }

    #[test]
    fn test_port_hints() {
        let segment = [
            0x30, 0x39, 0x00, 0x35, // Ports: 12345 -> 53
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // Seq, Ack
            0x50, 0x18, 0x01, 0x00, // Offset, PSH+ACK, Window
            0x00, 0x00, 0x00, 0x00, // Checksum, Urgent
            0xaa, // Payload
        ];

        let result = TcpProtocol.parse(&segment, &ParseContext::new(1));
        assert_eq!(result.hint("src_port"), Some(12345));
        assert_eq!(result.hint("dst_port"), Some(53));
        assert_eq!(result.remaining, &[0xaa]);
    }

    #[test]
    fn test_parse_tcp_too_short() {
        let segment = [0x00; 12];
        assert!(!TcpProtocol.parse(&segment, &ParseContext::new(1)).is_ok());
    }
}
