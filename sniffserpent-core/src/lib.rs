//! # sniffserpent-core
//!
//! Protocol packet model and capture pipeline for the SniffSerpent sniffer.
//!
//! Each captured frame is decoded into typed layers, classified into one of
//! ten protocol views and rendered as a one-line brief summary or a
//! multi-line detailed summary. A capture session runs the engine on a
//! background thread and hands summaries to a display in bounded batches.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sniffserpent_core::prelude::*;
//!
//! struct Print;
//!
//! impl DisplaySink for Print {
//!     fn on_summaries_ready(&mut self, summaries: &[String]) {
//!         for line in summaries {
//!             println!("{line}");
//!         }
//!     }
//! }
//!
//! let mut session = CaptureSession::new(Arc::new(ReplayEngine), SessionConfig::default());
//! session
//!     .start(CaptureRequest::new(CaptureSource::File("capture.pcap".into())))
//!     .unwrap();
//! while session.is_running() {
//!     session.tick(&mut Print);
//!     std::thread::sleep(session.config().tick_interval);
//! }
//! session.tick(&mut Print);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        sniffserpent-core                            |
//! +---------------------------------------------------------------------+
//! |  protocol/    - Protocol trait, header decoders, ProtocolRegistry   |
//! |  frame        - Frame: raw packet plus decoded layers               |
//! |  packet/      - Protocol views, brief and detailed summaries        |
//! |  credentials  - Login credential spotting in request bodies         |
//! |  classify     - Priority dispatch table                             |
//! |  filter       - Protocol, address and interface selection           |
//! |  pipeline/    - Engines, registry, summary queue, capture session   |
//! |  export       - Text report and pcap writer                         |
//! |  pcap/        - PCAP/PCAPNG reading for replay                      |
//! |  format/      - Address formatting utilities                        |
//! |  error        - Error types                                         |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Crate Features
//!
//! - `live` - libpcap-backed [`pipeline::LiveEngine`] and interface listing

pub mod classify;
pub mod credentials;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod frame;
pub mod packet;
pub mod pcap;
pub mod pipeline;
pub mod prelude;
pub mod protocol;

pub use classify::DispatchTable;
pub use credentials::{extract_credentials, Credentials};
pub use error::{CaptureError, ConfigError, Error, PcapError, ProtocolError, Result};
pub use filter::{capture_interfaces, AddressFilter, ProtocolFilter};
pub use frame::Frame;
pub use packet::{fit_str, PacketKind, PacketRecord, ProtocolTag, Summary};
pub use pcap::{PcapReader, RawPacket};
pub use pipeline::{
    CaptureEngine, CaptureRequest, CaptureSession, CaptureSource, DisplaySink, ReplayEngine,
    SessionConfig, SessionEvent, SessionState,
};
pub use protocol::{default_registry, parse_packet, ProtocolRegistry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
