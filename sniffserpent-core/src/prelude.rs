//! Convenient re-exports for common usage.
//!
//! ```rust,no_run
//! use sniffserpent_core::prelude::*;
//!
//! let table = ProtocolFilter::parse_excluded("arp,stp").unwrap().dispatch_table().unwrap();
//! assert_eq!(table.len(), 8);
//! ```

// Packet model
pub use crate::frame::Frame;
pub use crate::packet::{PacketKind, PacketRecord, ProtocolTag, Summary};

// Classification and filters
pub use crate::classify::DispatchTable;
pub use crate::filter::{AddressFilter, ProtocolFilter};

// Pipeline
#[cfg(feature = "live")]
pub use crate::pipeline::LiveEngine;
pub use crate::pipeline::{
    CaptureEngine, CaptureRequest, CaptureSession, CaptureSource, DisplaySink, ReplayEngine,
    SessionConfig, SessionEvent, SessionState, StopFlag,
};

// Protocol decoding
pub use crate::protocol::{default_registry, ProtocolRegistry};

// Error types
pub use crate::error::{Error, Result};
