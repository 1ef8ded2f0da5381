//! IGMP summaries.

use super::common::{endpoints, header_section, payload_section, size_suffix};
use super::Summary;
use crate::frame::Frame;

/// Message types that produce a record.
pub const ACCEPTED_TYPES: [u8; 4] = [0x11, 0x12, 0x16, 0x17];

/// Name of an IGMP message type.
pub fn igmp_type_name(code: u8) -> Option<&'static str> {
    let name = match code {
        17 => "Membership Query",
        18 => "Membership Report v1",
        22 => "Membership Report v2",
        23 => "Leave Group",
        30 => "Membership Report v3",
        31 => "Multicast Router Advertisement",
        32 => "Multicast Router Solicitation",
        33 => "Multicast Router Termination",
        _ => return None,
    };
    Some(name)
}

fn type_label(code: u8) -> String {
    igmp_type_name(code).map_or_else(|| code.to_string(), str::to_string)
}

#[derive(Debug, Clone, Copy)]
pub struct IgmpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> IgmpPacket<'a> {
    pub const NAME: &'static str = "IGMP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    pub fn accepts(frame: &Frame) -> bool {
        frame
            .igmp()
            .is_some_and(|igmp| ACCEPTED_TYPES.contains(&igmp.igmp_type))
    }
}

impl Summary for IgmpPacket<'_> {
    fn brief_summary(&self) -> String {
        let mut out = format!("{} Packet:", Self::NAME);
        if let Some((src, dst)) = endpoints(self.frame) {
            out.push_str(&format!(" ({src}) --> ({dst})"));
        }
        if let Some(igmp) = self.frame.igmp() {
            out.push_str(&format!(" Type: {}", type_label(igmp.igmp_type)));
        }
        out.push_str(&size_suffix(self.frame));
        out
    }

    fn detailed_summary(&self) -> String {
        let mut out = header_section(Self::NAME, self.frame);
        if let Some(igmp) = self.frame.igmp() {
            out.push_str(&format!("Type: {}\n\n", type_label(igmp.igmp_type)));
            out.push_str(&format!("Group Address: {}\n\n", igmp.group_address));
            out.push_str(&format!("Maximum Response Code: {}\n\n", igmp.max_resp_code));
            out.push_str(&format!("Checksum: {}\n\n", igmp.checksum));
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}
