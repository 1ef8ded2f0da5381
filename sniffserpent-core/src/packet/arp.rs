//! ARP summaries.

use super::common::{mac_lines, payload_section, size_suffix};
use super::fit::fit_str;
use super::Summary;
use crate::frame::Frame;
use crate::protocol::ArpHeader;

/// Name of an ARP hardware type.
pub fn hardware_type_name(code: u16) -> Option<&'static str> {
    let name = match code {
        1 => "Ethernet",
        4 => "Ethernet II",
        6 => "IEEE 802 (Token Ring)",
        8 => "ArcNet",
        15 => "Frame Relay",
        17 => "ATM",
        18 => "HDLC",
        23 => "IEEE 802.11 (Wi-Fi)",
        32 => "Fibre Channel",
        41 => "InfiniBand",
        42 => "IPv6 over Ethernet",
        512 => "PPP",
        _ => return None,
    };
    Some(name)
}

/// Name of an ARP protocol type.
pub fn protocol_type_name(code: u16) -> Option<&'static str> {
    let name = match code {
        1 => "Ethernet",
        2045 => "VLAN Tagging (802.1Q)",
        2046 => "RARP",
        2048 => "IPv4",
        2049 => "X.25",
        2054 => "ARP",
        4525 => "IPv6",
        32902 => "RARP",
        33058 => "AppleTalk (Appletalk AARP)",
        33079 => "AppleTalk",
        34304 => "PPP",
        34887 => "PPPoE Discovery",
        35020 => "MPLS",
        35023 => "PPPoE (PPP over Ethernet)",
        35048 => "MPLS Multicast",
        35117 => "PPPoE Session",
        _ => return None,
    };
    Some(name)
}

fn operation(arp: &ArpHeader) -> &'static str {
    if arp.is_request() {
        "Request"
    } else {
        "Reply"
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> ArpPacket<'a> {
    pub const NAME: &'static str = "ARP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Summary for ArpPacket<'_> {
    fn brief_summary(&self) -> String {
        let mut out = format!("{} Packet:", Self::NAME);
        if let Some(arp) = self.frame.arp() {
            out.push_str(&format!(
                " ({}):({}) --> ({}):({}) Type: {}",
                arp.sender_proto,
                arp.sender_hw,
                arp.target_proto,
                arp.target_hw,
                operation(arp)
            ));
        }
        out.push_str(&size_suffix(self.frame));
        out
    }

    fn detailed_summary(&self) -> String {
        let mut out = format!("{} Packet:\n\n", Self::NAME);
        out.push_str(&mac_lines(self.frame));
        let arp = self.frame.arp();
        out.push_str(&fit_str("Source IP:", arp.map(|a| &a.sender_proto)));
        out.push_str(&fit_str("Destination IP:", arp.map(|a| &a.target_proto)));
        out.push_str(&format!("Packet Size: {} bytes\n\n", self.frame.len()));
        if let Some(arp) = arp {
            let hardware = hardware_type_name(arp.hardware_type)
                .map_or_else(|| arp.hardware_type.to_string(), str::to_string);
            let protocol = protocol_type_name(arp.protocol_type)
                .map_or_else(|| arp.protocol_type.to_string(), str::to_string);
            out.push_str(&format!("Operation: {}\n\n", operation(arp)));
            out.push_str(&format!("Hardware Type: {hardware}\n\n"));
            out.push_str(&format!("Hardware Length: {} bytes\n\n", arp.hardware_len));
            out.push_str(&format!("Protocol Type: {protocol}\n\n"));
            out.push_str(&format!("Protocol Length: {} bytes\n\n", arp.protocol_len));
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}
