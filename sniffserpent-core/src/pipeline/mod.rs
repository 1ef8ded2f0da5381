//! Producer/consumer capture pipeline.
//!
//! A background driver pulls packets from a [`CaptureEngine`], classifies
//! them and stores each accepted record in the [`PacketRegistry`] before
//! pushing its brief summary onto the [`SummaryQueue`]. The display side
//! calls [`CaptureSession::tick`] to take bounded batches off the queue.

mod engine;
mod queue;
mod registry;
mod session;

#[cfg(feature = "live")]
pub use engine::{list_interfaces, LiveEngine};
pub use engine::{CaptureEngine, CaptureSource, ReplayEngine, StopFlag};
pub use queue::SummaryQueue;
pub use registry::PacketRegistry;
pub use session::{
    CaptureRequest, CaptureSession, DisplaySink, SessionConfig, SessionEvent, SessionState,
};
