//! DHCP protocol parser.
//!
//! Parses DHCP messages carried over BOOTP. Matches on UDP ports 67/68 and
//! requires the DHCP magic cookie; plain BOOTP is left to the transport layer.

use std::net::Ipv4Addr;

use smallvec::SmallVec;

use super::{Layer, ParseContext, ParseResult, Protocol};
use crate::format::format_hw_addr;

/// DHCP server port.
pub const DHCP_SERVER_PORT: u16 = 67;

/// DHCP client port.
pub const DHCP_CLIENT_PORT: u16 = 68;

/// DHCP magic cookie (0x63825363).
const DHCP_MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];

/// BOOTP fixed header size (without cookie and options).
const BOOTP_HEADER_SIZE: usize = 236;

/// DHCP message types (option 53).
pub mod message_type {
    pub const DISCOVER: u8 = 1;
    pub const OFFER: u8 = 2;
    pub const REQUEST: u8 = 3;
    pub const DECLINE: u8 = 4;
    pub const ACK: u8 = 5;
    pub const NAK: u8 = 6;
    pub const RELEASE: u8 = 7;
    pub const INFORM: u8 = 8;
}

/// DHCP option codes used by the summaries.
pub mod option {
    pub const PAD: u8 = 0;
    pub const SUBNET_MASK: u8 = 1;
    pub const ROUTER: u8 = 3;
    pub const DOMAIN_NAME_SERVER: u8 = 6;
    pub const HOST_NAME: u8 = 12;
    pub const BROADCAST_ADDRESS: u8 = 28;
    pub const REQUESTED_ADDRESS: u8 = 50;
    pub const LEASE_TIME: u8 = 51;
    pub const MESSAGE_TYPE: u8 = 53;
    pub const SERVER_ID: u8 = 54;
    pub const PARAMETER_REQUEST_LIST: u8 = 55;
    pub const VENDOR_CLASS_ID: u8 = 60;
    pub const CLIENT_ID: u8 = 61;
    pub const END: u8 = 255;
}

/// One raw DHCP option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpOption {
    pub code: u8,
    pub data: Vec<u8>,
}

/// Decoded DHCP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpMessage {
    pub op: u8,
    pub htype: u8,
    pub hlen: u8,
    pub hops: u8,
    pub xid: u32,
    pub secs: u16,
    pub flags: u16,
    pub ciaddr: Ipv4Addr,
    pub yiaddr: Ipv4Addr,
    pub siaddr: Ipv4Addr,
    pub giaddr: Ipv4Addr,
    /// Client hardware address, rendered.
    pub chaddr: String,
    pub options: Vec<DhcpOption>,
}

fn ipv4_at(bytes: &[u8]) -> Option<Ipv4Addr> {
    let octets: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

impl DhcpMessage {
    /// Raw bytes of the first option with `code`.
    pub fn option(&self, code: u8) -> Option<&[u8]> {
        self.options
            .iter()
            .find(|o| o.code == code)
            .map(|o| o.data.as_slice())
    }

    fn text_option(&self, code: u8) -> Option<String> {
        self.option(code)
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }

    fn addr_option(&self, code: u8) -> Option<Ipv4Addr> {
        self.option(code).and_then(ipv4_at)
    }

    /// Value of option 53, wherever it appears in the option list.
    pub fn message_type(&self) -> Option<u8> {
        self.option(option::MESSAGE_TYPE)
            .and_then(|data| data.first().copied())
    }

    pub fn hostname(&self) -> Option<String> {
        self.text_option(option::HOST_NAME)
    }

    pub fn vendor_class_id(&self) -> Option<String> {
        self.text_option(option::VENDOR_CLASS_ID)
    }

    pub fn client_id(&self) -> Option<String> {
        self.text_option(option::CLIENT_ID)
    }

    pub fn server_id(&self) -> Option<Ipv4Addr> {
        self.addr_option(option::SERVER_ID)
    }

    pub fn requested_addr(&self) -> Option<Ipv4Addr> {
        self.addr_option(option::REQUESTED_ADDRESS)
    }

    pub fn subnet_mask(&self) -> Option<Ipv4Addr> {
        self.addr_option(option::SUBNET_MASK)
    }

    pub fn broadcast_address(&self) -> Option<Ipv4Addr> {
        self.addr_option(option::BROADCAST_ADDRESS)
    }

    /// First router listed in option 3.
    pub fn router(&self) -> Option<Ipv4Addr> {
        self.addr_option(option::ROUTER)
    }

    pub fn lease_time(&self) -> Option<u32> {
        let data = self.option(option::LEASE_TIME)?;
        let bytes: [u8; 4] = data.get(..4)?.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    /// Every address in option 6.
    pub fn name_servers(&self) -> Vec<Ipv4Addr> {
        self.option(option::DOMAIN_NAME_SERVER)
            .map(|data| data.chunks_exact(4).filter_map(ipv4_at).collect())
            .unwrap_or_default()
    }

    /// Option codes the client asked for (option 55).
    pub fn param_req_list(&self) -> Option<Vec<u8>> {
        self.option(option::PARAMETER_REQUEST_LIST)
            .map(<[u8]>::to_vec)
    }
}

/// DHCP protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct DhcpProtocol;

impl Protocol for DhcpProtocol {
    fn name(&self) -> &'static str {
        "dhcp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        // Check for DHCP ports (67 or 68) in either direction
        if context.has_port(DHCP_SERVER_PORT) || context.has_port(DHCP_CLIENT_PORT) {
            Some(100)
        } else {
            None
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < BOOTP_HEADER_SIZE + DHCP_MAGIC_COOKIE.len() {
            return ParseResult::error("DHCP header too short".to_string(), data);
        }

        if data[BOOTP_HEADER_SIZE..BOOTP_HEADER_SIZE + 4] != DHCP_MAGIC_COOKIE {
            return ParseResult::error(
                "DHCP magic cookie not found (might be BOOTP)".to_string(),
                data,
            );
        }

        let hlen = data[2];
        let chaddr_len = (hlen as usize).min(16);

        let message = DhcpMessage {
            op: data[0],
            htype: data[1],
            hlen,
            hops: data[3],
            xid: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            secs: u16::from_be_bytes([data[8], data[9]]),
            flags: u16::from_be_bytes([data[10], data[11]]),
            ciaddr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            yiaddr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
            siaddr: Ipv4Addr::new(data[20], data[21], data[22], data[23]),
            giaddr: Ipv4Addr::new(data[24], data[25], data[26], data[27]),
            chaddr: format_hw_addr(&data[28..28 + chaddr_len]),
            options: parse_dhcp_options(&data[BOOTP_HEADER_SIZE + 4..]),
        };

        // No child protocols after DHCP
        ParseResult::success(Layer::Dhcp(message), &[], SmallVec::new())
    }
}

/// Walk the TLV option area until END or the data runs out.
fn parse_dhcp_options(data: &[u8]) -> Vec<DhcpOption> {
    let mut options = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let code = data[offset];

        if code == option::PAD {
            offset += 1;
            continue;
        }
        if code == option::END {
            break;
        }

        let Some(&len) = data.get(offset + 1) else {
            break;
        };
        let start = offset + 2;
        let end = start + len as usize;
        if end > data.len() {
            break;
        }

        options.push(DhcpOption {
            code,
            data: data[start..end].to_vec(),
        });
        offset = end;
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal DHCP message with the given options appended.
    fn create_dhcp_message(op: u8, yiaddr: [u8; 4], options: &[u8]) -> Vec<u8> {
        let mut packet = vec![0u8; BOOTP_HEADER_SIZE];
        packet[0] = op; // Op
        packet[1] = 1; // Htype: Ethernet
        packet[2] = 6; // Hlen
        packet[4..8].copy_from_slice(&0x3903_f326u32.to_be_bytes()); // Xid
        packet[16..20].copy_from_slice(&yiaddr); // Yiaddr
        packet[28..34].copy_from_slice(&[0x00, 0x0b, 0x82, 0x01, 0xfc, 0x42]); // Chaddr
        packet.extend_from_slice(&DHCP_MAGIC_COOKIE);
        packet.extend_from_slice(options);
        packet.push(option::END);
        packet
    }

    fn dhcp_context() -> ParseContext {
        let mut ctx = ParseContext::new(1);
        ctx.insert_hint("src_port", 68);
        ctx.insert_hint("dst_port", 67);
        ctx
    }

    fn parse_dhcp(packet: &[u8]) -> DhcpMessage {
        let result = DhcpProtocol.parse(packet, &dhcp_context());
        assert!(result.is_ok(), "{:?}", result.error);
        match result.layer {
            Some(Layer::Dhcp(m)) => m,
            other => panic!("expected DHCP layer, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_dhcp_discover() {
        let options = [
            53, 1, 1, // Message type: Discover
            12, 4, b'h', b'o', b's', b't', // Host name
            50, 4, 192, 168, 1, 100, // Requested address
            55, 3, 1, 3, 6, // Parameter request list
            60, 4, b'M', b'S', b'F', b'T', // Vendor class id
        ];
        let dhcp = parse_dhcp(&create_dhcp_message(1, [0; 4], &options));

        assert_eq!(dhcp.op, 1);
        assert_eq!(dhcp.xid, 0x3903_f326);
        assert_eq!(dhcp.chaddr, "00:0b:82:01:fc:42");
        assert_eq!(dhcp.message_type(), Some(message_type::DISCOVER));
        assert_eq!(dhcp.hostname().as_deref(), Some("host"));
        assert_eq!(dhcp.requested_addr(), Some(Ipv4Addr::new(192, 168, 1, 100)));
        assert_eq!(dhcp.param_req_list(), Some(vec![1, 3, 6]));
        assert_eq!(dhcp.vendor_class_id().as_deref(), Some("MSFT"));
        assert_eq!(dhcp.server_id(), None);
    }

    #[test]
    fn test_parse_dhcp_offer() {
        let options = [
            1, 4, 255, 255, 255, 0, // Subnet mask
            53, 1, 2, // Message type: Offer (not first)
            3, 8, 192, 168, 1, 1, 192, 168, 1, 2, // Routers
            6, 8, 8, 8, 8, 8, 1, 1, 1, 1, // Name servers
            51, 4, 0x00, 0x01, 0x51, 0x80, // Lease time: 86400
            54, 4, 192, 168, 1, 1, // Server id
        ];
        let dhcp = parse_dhcp(&create_dhcp_message(2, [192, 168, 1, 100], &options));

        assert_eq!(dhcp.message_type(), Some(message_type::OFFER));
        assert_eq!(dhcp.yiaddr, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(dhcp.subnet_mask(), Some(Ipv4Addr::new(255, 255, 255, 0)));
        assert_eq!(dhcp.router(), Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(
            dhcp.name_servers(),
            vec![Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(1, 1, 1, 1)]
        );
        assert_eq!(dhcp.lease_time(), Some(86400));
        assert_eq!(dhcp.server_id(), Some(Ipv4Addr::new(192, 168, 1, 1)));
    }

    #[test]
    fn test_bootp_without_cookie_rejected() {
        let mut packet = create_dhcp_message(1, [0; 4], &[53, 1, 1]);
        packet[BOOTP_HEADER_SIZE..BOOTP_HEADER_SIZE + 4].copy_from_slice(&[0; 4]);

        let result = DhcpProtocol.parse(&packet, &dhcp_context());
        assert!(!result.is_ok());
        assert!(result.layer.is_none());
    }

    #[test]
    fn test_parse_dhcp_too_short() {
        let packet = vec![0u8; 100];
        assert!(!DhcpProtocol.parse(&packet, &dhcp_context()).is_ok());
    }

    #[test]
    fn test_truncated_option_stops_walk() {
        let options = [53, 1, 3, 12, 10, b'a']; // Host name claims 10 bytes
        let mut packet = create_dhcp_message(1, [0; 4], &options);
        packet.pop(); // Drop END so the option really is truncated

        let dhcp = parse_dhcp(&packet);
        assert_eq!(dhcp.message_type(), Some(message_type::REQUEST));
        assert_eq!(dhcp.hostname(), None);
    }

    #[test]
    fn test_can_parse_dhcp() {
        assert_eq!(DhcpProtocol.can_parse(&dhcp_context()), Some(100));
        let mut ctx = ParseContext::new(1);
        ctx.insert_hint("dst_port", 53);
        assert_eq!(DhcpProtocol.can_parse(&ctx), None);
    }
}
