//! Raw packet representation.

use std::time::Duration;

/// Link type constant for Ethernet.
pub const LINKTYPE_ETHERNET: u16 = 1;

/// Link type of Linux cooked captures, as produced by the `any` device.
pub const LINKTYPE_LINUX_SLL: u16 = 113;

/// A raw packet as delivered by a capture engine or read from a capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// Frame number (1-indexed, per engine run).
    pub frame_number: u64,

    /// Timestamp in microseconds since epoch.
    pub timestamp_us: i64,

    /// Original length on the wire.
    pub original_length: u32,

    /// Link layer type (e.g., 1 = Ethernet).
    pub link_type: u16,

    /// Captured bytes.
    pub data: Vec<u8>,
}

impl RawPacket {
    /// Create a new raw packet.
    pub fn new(
        frame_number: u64,
        timestamp_us: i64,
        original_length: u32,
        link_type: u16,
        data: Vec<u8>,
    ) -> Self {
        Self {
            frame_number,
            timestamp_us,
            original_length,
            link_type,
            data,
        }
    }

    /// Build an Ethernet packet with no timing information, mostly for tests.
    pub fn ethernet(data: Vec<u8>) -> Self {
        let len = data.len() as u32;
        Self::new(0, 0, len, LINKTYPE_ETHERNET, data)
    }

    /// Number of captured bytes.
    pub fn captured_length(&self) -> usize {
        self.data.len()
    }

    /// Check if the packet was truncated during capture.
    pub fn is_truncated(&self) -> bool {
        (self.data.len() as u32) < self.original_length
    }

    /// Timestamp as a duration since the epoch (negative stamps clamp to zero).
    pub fn timestamp(&self) -> Duration {
        Duration::from_micros(self.timestamp_us.max(0) as u64)
    }
}
