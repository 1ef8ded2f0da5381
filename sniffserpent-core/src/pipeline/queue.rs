//! FIFO of brief summaries between the capture and display threads.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Unbounded summary queue. Pushing never blocks.
#[derive(Debug, Clone)]
pub struct SummaryQueue {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl SummaryQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn push(&self, summary: String) {
        // The queue holds its own receiver, so the channel never disconnects
        let _ = self.tx.send(summary);
    }

    /// Remove up to `limit` summaries in FIFO order.
    pub fn drain(&self, limit: usize) -> Vec<String> {
        self.rx.try_iter().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn clear(&self) {
        self.rx.try_iter().for_each(drop);
    }
}

impl Default for SummaryQueue {
    fn default() -> Self {
        Self::new()
    }
}
