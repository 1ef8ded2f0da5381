//! UDP datagram summaries.

use super::common::{brief_prefix, header_section, payload_section, size_suffix};
use super::Summary;
use crate::frame::Frame;

/// A frame classified as plain UDP. Only the common fields are shown.
#[derive(Debug, Clone, Copy)]
pub struct UdpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> UdpPacket<'a> {
    pub const NAME: &'static str = "UDP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Summary for UdpPacket<'_> {
    fn brief_summary(&self) -> String {
        format!("{}{}", brief_prefix(Self::NAME, self.frame), size_suffix(self.frame))
    }

    fn detailed_summary(&self) -> String {
        let mut out = header_section(Self::NAME, self.frame);
        out.push_str(&payload_section(self.frame));
        out
    }
}
