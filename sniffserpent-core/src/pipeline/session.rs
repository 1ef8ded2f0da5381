//! Capture session: background driver plus foreground drain.

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, trace, warn};

use super::engine::{CaptureEngine, CaptureSource, StopFlag};
use super::queue::SummaryQueue;
use super::registry::PacketRegistry;
use crate::classify::DispatchTable;
use crate::error::{CaptureError, Error};
use crate::export;
use crate::filter::{AddressFilter, ProtocolFilter};
use crate::frame::Frame;
use crate::packet::{PacketRecord, Summary};
use crate::pcap::RawPacket;
use crate::protocol::{default_registry, ProtocolRegistry};

/// Session tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Summaries handed to the display per tick during live capture.
    pub live_batch: usize,
    /// Summaries handed to the display per tick during replay.
    pub replay_batch: usize,
    /// How often the display should tick, and how often a finished replay
    /// checks whether the queue has drained.
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            live_batch: 500,
            replay_batch: 1000,
            tick_interval: Duration::from_secs(2),
        }
    }
}

impl SessionConfig {
    pub fn with_live_batch(mut self, live_batch: usize) -> Self {
        self.live_batch = live_batch;
        self
    }

    pub fn with_replay_batch(mut self, replay_batch: usize) -> Self {
        self.replay_batch = replay_batch;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Batch limit for `source`.
    pub fn batch_for(&self, source: &CaptureSource) -> usize {
        if source.is_replay() {
            self.replay_batch
        } else {
            self.live_batch
        }
    }
}

/// What to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub source: CaptureSource,
    pub protocols: ProtocolFilter,
    pub address: AddressFilter,
}

impl CaptureRequest {
    pub fn new(source: CaptureSource) -> Self {
        Self {
            source,
            protocols: ProtocolFilter::default(),
            address: AddressFilter::default(),
        }
    }

    pub fn with_protocols(mut self, protocols: ProtocolFilter) -> Self {
        self.protocols = protocols;
        self
    }

    pub fn with_address(mut self, address: AddressFilter) -> Self {
        self.address = address;
        self
    }
}

/// Notifications from the capture driver to the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// `false` when capture starts, `true` once controls may be used again.
    StateChanged(bool),
    PermissionDenied,
    EngineError(String),
}

/// Display collaborator fed by [`CaptureSession::tick`].
pub trait DisplaySink {
    /// A batch of brief summaries, oldest first.
    fn on_summaries_ready(&mut self, summaries: &[String]);

    fn on_state_changed(&mut self, _enabled: bool) {}

    fn on_permission_denied(&mut self) {}

    fn on_engine_error(&mut self, _reason: &str) {}
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
}

/// A capture session over one engine.
///
/// The driver thread decodes, classifies and stores packets; the caller
/// drains summaries with [`tick`](Self::tick) and looks up details by id.
pub struct CaptureSession {
    engine: Arc<dyn CaptureEngine>,
    config: SessionConfig,
    registry: Arc<PacketRegistry>,
    queue: Arc<SummaryQueue>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    stop: StopFlag,
    batch_limit: usize,
    driver: Option<JoinHandle<()>>,
}

impl CaptureSession {
    pub fn new(engine: Arc<dyn CaptureEngine>, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            engine,
            batch_limit: config.live_batch,
            config,
            registry: Arc::new(PacketRegistry::new()),
            queue: Arc::new(SummaryQueue::new()),
            events_tx,
            events_rx,
            stop: StopFlag::new(),
            driver: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.driver.as_ref().is_some_and(|h| !h.is_finished()) {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Start capturing.
    ///
    /// Fails without touching the current records when a session is already
    /// running or the protocol selection is empty.
    pub fn start(&mut self, request: CaptureRequest) -> Result<(), Error> {
        if self.is_running() {
            return Err(CaptureError::AlreadyRunning.into());
        }
        let table = request.protocols.dispatch_table()?;
        self.reap();

        self.registry.clear();
        self.queue.clear();
        self.events_rx.try_iter().for_each(drop);
        self.stop.reset();
        self.batch_limit = self.config.batch_for(&request.source);

        let driver = Driver {
            engine: Arc::clone(&self.engine),
            table,
            request,
            registry: Arc::clone(&self.registry),
            queue: Arc::clone(&self.queue),
            events: self.events_tx.clone(),
            stop: self.stop.clone(),
            poll_interval: self.config.tick_interval,
        };
        debug!(source = %driver.request.source, batch = self.batch_limit, "starting capture");
        self.driver = Some(thread::spawn(move || driver.run()));
        Ok(())
    }

    /// Hand the next batch of summaries and any pending events to `sink`.
    ///
    /// Returns the number of summaries delivered.
    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> usize {
        let batch = self.queue.drain(self.batch_limit);
        if !batch.is_empty() {
            sink.on_summaries_ready(&batch);
        }
        let mut finished = false;
        for event in self.events_rx.try_iter() {
            match event {
                SessionEvent::StateChanged(enabled) => {
                    finished |= enabled;
                    sink.on_state_changed(enabled);
                }
                SessionEvent::PermissionDenied => sink.on_permission_denied(),
                SessionEvent::EngineError(reason) => sink.on_engine_error(&reason),
            }
        }
        if finished {
            // The driver sends its last event right before returning
            self.join_driver();
        } else {
            self.reap();
        }
        batch.len()
    }

    /// Ask the driver to stop and wait for it.
    pub fn stop(&mut self) {
        self.stop.request();
        if self.driver.is_some() {
            self.join_driver();
            debug!(records = self.registry.len(), "capture stopped");
        }
    }

    /// Stop and drop everything the session holds.
    pub fn shutdown(&mut self) {
        self.stop();
        self.registry.clear();
        self.queue.clear();
        self.events_rx.try_iter().for_each(drop);
    }

    /// Drop every record. Refused while running.
    pub fn clear(&mut self) -> Result<(), CaptureError> {
        if self.is_running() {
            return Err(CaptureError::Busy { action: "clear" });
        }
        self.registry.clear();
        self.queue.clear();
        debug!("session cleared");
        Ok(())
    }

    /// Detailed summary of record `id`, rendered now.
    pub fn detail(&self, id: u64) -> Option<String> {
        self.registry.get(id).map(|record| record.detailed_summary())
    }

    /// Every record in id order.
    pub fn records(&self) -> Vec<Arc<PacketRecord>> {
        self.registry.records()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Summaries captured but not yet handed to a sink.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Save the records to `path`, as text or pcap depending on the extension.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if self.is_running() {
            return Err(CaptureError::Busy { action: "save scan" }.into());
        }
        export::save(&self.records(), path)
    }

    /// Join the driver if it already exited.
    fn reap(&mut self) {
        if self.driver.as_ref().is_some_and(|h| h.is_finished()) {
            self.join_driver();
        }
    }

    fn join_driver(&mut self) {
        if let Some(handle) = self.driver.take() {
            if handle.join().is_err() {
                warn!("capture driver panicked");
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved onto the capture thread.
struct Driver {
    engine: Arc<dyn CaptureEngine>,
    table: DispatchTable,
    request: CaptureRequest,
    registry: Arc<PacketRegistry>,
    queue: Arc<SummaryQueue>,
    events: Sender<SessionEvent>,
    stop: StopFlag,
    poll_interval: Duration,
}

impl Driver {
    fn run(self) {
        self.emit(SessionEvent::StateChanged(false));

        let protocols = default_registry();
        let bpf = self.request.address.bpf_expression();
        let mut on_packet = |raw: RawPacket| self.accept(&protocols, raw);
        let result = self
            .engine
            .open(&self.request.source, &bpf, &mut on_packet, &self.stop);

        match result {
            Ok(()) => {
                if self.request.source.is_replay() {
                    self.wait_for_drain();
                }
            }
            Err(CaptureError::PermissionDenied { source_name }) => {
                warn!(source = %source_name, "permission denied");
                self.registry.clear();
                self.queue.clear();
                self.emit(SessionEvent::PermissionDenied);
            }
            Err(e) => {
                warn!(error = %e, "an error occurred while sniffing");
                self.emit(SessionEvent::EngineError(e.to_string()));
            }
        }
        debug!(records = self.registry.len(), "capture driver finished");
        self.emit(SessionEvent::StateChanged(true));
    }

    /// Decode, filter, classify, store, enqueue.
    fn accept(&self, protocols: &ProtocolRegistry, raw: RawPacket) {
        let frame_number = raw.frame_number;
        let frame = match Frame::decode(protocols, raw) {
            Ok(frame) => frame,
            Err(e) => {
                trace!(frame = frame_number, error = %e, "skipping undecodable frame");
                return;
            }
        };
        if !self.request.address.matches(&frame) {
            trace!(frame = frame_number, "frame outside address filter");
            return;
        }
        let Some(tag) = self.table.classify(&frame) else {
            trace!(frame = frame_number, "frame rejected by classifier");
            return;
        };
        let record = self.registry.insert(tag, frame);
        self.queue.push(record.brief_summary());
    }

    /// Replay finishes only once the display has taken every summary.
    fn wait_for_drain(&self) {
        while !self.queue.is_empty() && !self.stop.is_requested() {
            thread::sleep(self.poll_interval);
        }
    }

    fn emit(&self, event: SessionEvent) {
        // The session owns the receiver for as long as the driver can run
        let _ = self.events.send(event);
    }
}
