//! Saving a session's records.
//!
//! Text reports hold the detailed summary of every record between
//! delimiter lines. Capture files hold the raw frames as classic pcap.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use pcap_file::pcap::{PcapHeader, PcapPacket, PcapWriter};
use pcap_file::DataLink;
use tracing::{debug, warn};

use crate::error::{CaptureError, Error, PcapError};
use crate::packet::{PacketRecord, Summary};
use crate::pcap::LINKTYPE_ETHERNET;

/// Line written before and after each record in a text report.
pub const DELIMITER: &str =
    "------------------------------------------------------------------------------------";

/// Output format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Pcap,
}

impl ExportFormat {
    /// `.pcap` (any case) writes a capture file, anything else a text report.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pcap") => ExportFormat::Pcap,
            _ => ExportFormat::Text,
        }
    }
}

/// Write the detailed summary of every record, in order.
pub fn write_text<W: Write>(records: &[Arc<PacketRecord>], mut out: W) -> Result<(), Error> {
    for record in records {
        write!(out, "{DELIMITER}\n\n")?;
        out.write_all(record.detailed_summary().as_bytes())?;
        write!(out, "{DELIMITER}\n\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Write the raw frames as a pcap with microsecond timestamps.
///
/// The file takes the link type of the first record. Frames captured with a
/// different link type cannot share the file and are skipped.
pub fn write_pcap<W: Write>(records: &[Arc<PacketRecord>], out: W) -> Result<(), Error> {
    let link_type = records
        .first()
        .map_or(LINKTYPE_ETHERNET, |record| record.frame().raw().link_type);
    let header = PcapHeader {
        datalink: DataLink::from(u32::from(link_type)),
        ..Default::default()
    };
    let mut writer = PcapWriter::with_header(out, header).map_err(write_error)?;
    for record in records {
        let raw = record.frame().raw();
        if raw.link_type != link_type {
            warn!(
                id = record.id(),
                link_type = raw.link_type,
                "skipping frame of another link type"
            );
            continue;
        }
        let packet = PcapPacket::new(raw.timestamp(), raw.original_length, &raw.data);
        writer.write_packet(&packet).map_err(write_error)?;
    }
    writer.into_writer().flush()?;
    Ok(())
}

/// Save `records` to `path` in the format its extension names.
pub fn save(records: &[Arc<PacketRecord>], path: &Path) -> Result<(), Error> {
    if records.is_empty() {
        return Err(CaptureError::NothingToSave.into());
    }
    let format = ExportFormat::from_path(path);
    let out = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Text => write_text(records, out)?,
        ExportFormat::Pcap => write_pcap(records, out)?,
    }
    debug!(path = %path.display(), records = records.len(), ?format, "saved scan");
    Ok(())
}

fn write_error(err: pcap_file::PcapError) -> Error {
    PcapError::Write {
        reason: err.to_string(),
    }
    .into()
}
