//! TCP segment summaries.

use std::fmt;

use super::common::{brief_prefix, header_section, payload_section, size_suffix};
use super::Summary;
use crate::frame::Frame;
use crate::protocol::{TcpFlags, TcpHeader, TcpOption};

/// A frame classified as plain TCP.
#[derive(Debug, Clone, Copy)]
pub struct TcpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> TcpPacket<'a> {
    pub const NAME: &'static str = "TCP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Summary for TcpPacket<'_> {
    fn brief_summary(&self) -> String {
        format!("{}{}", brief_prefix(Self::NAME, self.frame), size_suffix(self.frame))
    }

    fn detailed_summary(&self) -> String {
        let mut out = header_section(Self::NAME, self.frame);
        if let Some(tcp) = self.frame.tcp() {
            out.push_str(&segment_fields(tcp));
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}

fn segment_fields(tcp: &TcpHeader) -> String {
    let mut out = format!(
        "Sequence Number: {}\n\nAcknowledgment Number: {}\n\nWindow Size: {} bytes\n\n",
        tcp.sequence, tcp.acknowledgment, tcp.window
    );
    out.push_str(&format!("Flags:\n{}\n\n", flag_lines(tcp.flags)));
    if !tcp.options.is_empty() {
        let options: Vec<String> = tcp.options.iter().map(|opt| opt.to_string()).collect();
        out.push_str(&format!("TCP Options:\n{}\n\n", options.join(", ")));
    }
    out
}

/// FIN through PSH on the first line, ACK and URG on the second.
fn flag_lines(flags: TcpFlags) -> String {
    format!(
        "FIN: {}, SYN: {}, RST: {}, PSH: {}, \nACK: {}, URG: {}",
        flags.fin(),
        flags.syn(),
        flags.rst(),
        flags.psh(),
        flags.ack(),
        flags.urg()
    )
}

impl fmt::Display for TcpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcpOption::Mss(mss) => write!(f, "MSS: {mss}"),
            TcpOption::WindowScale(shift) => write!(f, "WScale: {shift}"),
            TcpOption::SackPermitted => write!(f, "SAckOK: true"),
            TcpOption::Sack(blocks) => {
                let blocks: Vec<String> = blocks
                    .iter()
                    .map(|(left, right)| format!("({left}, {right})"))
                    .collect();
                write!(f, "SAck: {}", blocks.join(" "))
            }
            TcpOption::Timestamp(value, echo) => write!(f, "Timestamp: ({value}, {echo})"),
        }
    }
}
