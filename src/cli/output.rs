//! Terminal rendering of a capture session.

use std::io::{self, Write};
use std::sync::Arc;

use sniffserpent_core::export::DELIMITER;
use sniffserpent_core::{DisplaySink, PacketRecord, Summary};

/// Prints summaries as they are drained, numbered by packet id.
pub struct TerminalSink<W: Write> {
    out: W,
    printed: u64,
    finished: bool,
    permission_denied: bool,
    errors: Vec<String>,
    io_error: Option<io::Error>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            finished: false,
            permission_denied: false,
            errors: Vec::new(),
            io_error: None,
        }
    }

    /// True once the capture driver has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn permission_denied(&self) -> bool {
        self.permission_denied
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn printed(&self) -> u64 {
        self.printed
    }

    /// Surface the first write failure.
    pub fn check(&mut self) -> io::Result<()> {
        match self.io_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_batch(&mut self, summaries: &[String]) -> io::Result<()> {
        for summary in summaries {
            writeln!(self.out, "[{}] {summary}", self.printed)?;
            self.printed += 1;
        }
        self.out.flush()
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn on_summaries_ready(&mut self, summaries: &[String]) {
        if self.io_error.is_some() {
            return;
        }
        if let Err(e) = self.write_batch(summaries) {
            self.io_error = Some(e);
        }
    }

    fn on_state_changed(&mut self, enabled: bool) {
        self.finished = enabled;
    }

    fn on_permission_denied(&mut self) {
        self.permission_denied = true;
    }

    fn on_engine_error(&mut self, reason: &str) {
        self.errors.push(reason.to_string());
    }
}

/// Detailed summary of every record, framed by delimiter lines.
pub fn write_details<W: Write>(records: &[Arc<PacketRecord>], out: &mut W) -> io::Result<()> {
    for record in records {
        writeln!(out, "{DELIMITER}")?;
        writeln!(out, "Packet {}\n", record.id())?;
        write!(out, "{}", record.detailed_summary())?;
    }
    if !records.is_empty() {
        writeln!(out, "{DELIMITER}")?;
    }
    out.flush()
}
