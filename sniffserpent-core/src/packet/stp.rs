//! Spanning tree BPDU summaries.

use super::common::{or_none, payload_section, size_suffix};
use super::Summary;
use crate::frame::Frame;

#[derive(Debug, Clone, Copy)]
pub struct StpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> StpPacket<'a> {
    pub const NAME: &'static str = "STP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Summary for StpPacket<'_> {
    fn brief_summary(&self) -> String {
        format!(
            "{} Packet: ({}) --> ({}){}",
            Self::NAME,
            or_none(self.frame.src_mac()),
            or_none(self.frame.dst_mac()),
            size_suffix(self.frame)
        )
    }

    fn detailed_summary(&self) -> String {
        let mut out = String::new();
        if let Some(bpdu) = self.frame.stp() {
            out.push_str(&format!("{} Packet:\n\n", Self::NAME));
            out.push_str(&format!("STP Protocol: {}\n\n", bpdu.protocol_id));
            out.push_str(&format!("Version: {}\n\n", bpdu.version));
            out.push_str(&format!("Source MAC: {}\n\n", or_none(self.frame.src_mac())));
            out.push_str(&format!("Destination MAC: {}\n\n", or_none(self.frame.dst_mac())));
            out.push_str(&format!("Bridge ID: {}\n\n", bpdu.bridge_id));
            out.push_str(&format!("Port ID: {}\n\n", bpdu.port_id));
            out.push_str(&format!("Path Cost: {}\n\n", bpdu.path_cost));
            out.push_str(&format!("Age: {}\n\n", bpdu.age_secs()));
        }
        out.push_str(&format!("Packet Size: {} bytes\n\n", self.frame.len()));
        out.push_str(&payload_section(self.frame));
        out
    }
}
