//! ICMP message summaries.

use super::common::{ip_info, or_none, payload_section, size_suffix};
use super::Summary;
use crate::frame::Frame;

/// Name of an ICMP message type.
pub fn icmp_type_name(code: u8) -> Option<&'static str> {
    let name = match code {
        0 => "Echo Reply",
        3 => "Destination Unreachable",
        4 => "Source Quench",
        5 => "Redirect",
        8 => "Echo Request",
        9 => "Router Advertisement",
        10 => "Router Selection",
        11 => "Time Exceeded",
        12 => "Parameter Problem",
        13 => "Timestamp",
        14 => "Timestamp Reply",
        15 => "Information Request",
        16 => "Information Reply",
        17 => "Address Mask Request",
        18 => "Address Mask Reply",
        _ => return None,
    };
    Some(name)
}

fn type_label(code: u8) -> String {
    icmp_type_name(code).map_or_else(|| code.to_string(), str::to_string)
}

#[derive(Debug, Clone, Copy)]
pub struct IcmpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> IcmpPacket<'a> {
    pub const NAME: &'static str = "ICMP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Summary for IcmpPacket<'_> {
    fn brief_summary(&self) -> String {
        let mut out = format!("{} Packet:", Self::NAME);
        if let (Some(src), Some(dst)) = (self.frame.src_ip(), self.frame.dst_ip()) {
            out.push_str(&format!(" ({src}) --> ({dst}) |"));
        }
        if let Some(icmp) = self.frame.icmp() {
            out.push_str(&format!(" Type: {}, Code: {}", type_label(icmp.icmp_type), icmp.code));
        }
        out.push_str(&size_suffix(self.frame));
        out
    }

    fn detailed_summary(&self) -> String {
        let mut out = format!("{} Packet:\n\n", Self::NAME);
        out.push_str(&ip_info(self.frame));
        if let Some(icmp) = self.frame.icmp() {
            out.push_str(&format!("Type: {}\n\n", type_label(icmp.icmp_type)));
            out.push_str(&format!("Code: {}\n\n", icmp.code));
            out.push_str(&format!("Sequence Number: {}\n\n", or_none(icmp.sequence)));
            out.push_str(&format!("Identifier: {}\n\n", or_none(icmp.identifier)));
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}
