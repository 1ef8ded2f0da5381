//! sniffserpent - sniff network traffic and summarize it by protocol.
//!
//! The packet model and capture pipeline live in `sniffserpent-core`; this
//! crate adds the command-line front end.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sniffserpent::cli::TerminalSink;
//! use sniffserpent_core::prelude::*;
//!
//! let mut session = CaptureSession::new(Arc::new(ReplayEngine), SessionConfig::default());
//! session.start(CaptureRequest::new(CaptureSource::File("capture.pcap".into())))?;
//! let mut sink = TerminalSink::new(std::io::stdout());
//! while !sink.is_finished() {
//!     session.tick(&mut sink);
//! }
//! # Ok::<(), sniffserpent_core::Error>(())
//! ```

pub mod cli;

pub use sniffserpent_core::{Error, Result};
