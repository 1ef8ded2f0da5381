//! Capture file access.
//!
//! Reading PCAP/PCAPNG files for replay and the raw packet type that
//! capture engines hand to the session.

mod packet;
mod reader;

pub use packet::{RawPacket, LINKTYPE_ETHERNET, LINKTYPE_LINUX_SLL};
pub use reader::PcapReader;
