//! Capture file reader used for replay.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError as ParserError, PcapNGReader};
use tracing::{debug, trace};

use super::packet::LINKTYPE_ETHERNET;
use super::RawPacket;
use crate::error::{Error, PcapError};

/// Read buffer size (64KB).
const BUFFER_SIZE: usize = 65536;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

type Stream = BufReader<Box<dyn Read + Send>>;

/// Reader for PCAP and PCAPNG files, with transparent gzip decompression.
///
/// Frames are numbered from 1 in file order.
pub struct PcapReader {
    inner: Inner,
    frame_number: u64,
    link_type: u16,
    nanosecond: bool,
}

enum Inner {
    Legacy(LegacyPcapReader<Stream>),
    Ng(PcapNGReader<Stream>),
}

impl PcapReader {
    /// Open a capture file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let gzipped = is_gzip_file(path)?;

        let mut magic = [0u8; 4];
        open_stream(path, gzipped)?
            .read_exact(&mut magic)
            .map_err(|_| PcapError::InvalidFormat {
                reason: "file too short to read magic number".to_string(),
            })?;

        // The magic bytes were consumed above, so parse from a fresh stream.
        let stream = open_stream(path, gzipped)?;
        let reader = match magic {
            [0xd4, 0xc3, 0xb2, 0xa1]
            | [0xa1, 0xb2, 0xc3, 0xd4]
            | [0x4d, 0x3c, 0xb2, 0xa1]
            | [0xa1, 0xb2, 0x3c, 0x4d] => {
                let legacy = LegacyPcapReader::new(BUFFER_SIZE, stream).map_err(|e| {
                    PcapError::InvalidFormat {
                        reason: format!("failed to parse PCAP header: {e}"),
                    }
                })?;
                Inner::Legacy(legacy)
            }
            [0x0a, 0x0d, 0x0d, 0x0a] => {
                let ng = PcapNGReader::new(BUFFER_SIZE, stream).map_err(|e| {
                    PcapError::InvalidFormat {
                        reason: format!("failed to parse PCAPNG header: {e}"),
                    }
                })?;
                Inner::Ng(ng)
            }
            _ => {
                return Err(PcapError::InvalidFormat {
                    reason: format!("unknown magic number: {magic:02x?}"),
                }
                .into())
            }
        };

        debug!(path = %path.display(), gzipped, "opened capture file");
        Ok(Self {
            inner: reader,
            frame_number: 0,
            link_type: LINKTYPE_ETHERNET,
            nanosecond: false,
        })
    }

    /// Link type of the capture (updated once the file header is read).
    pub fn link_type(&self) -> u16 {
        self.link_type
    }

    /// Number of frames returned so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }

    /// Read the next packet, or `None` at end of file.
    pub fn next_packet(&mut self) -> Result<Option<RawPacket>, Error> {
        loop {
            let step = match &mut self.inner {
                Inner::Legacy(reader) => match reader.next() {
                    Ok((offset, block)) => {
                        let out = match block {
                            PcapBlockOwned::LegacyHeader(header) => {
                                self.link_type = header.network.0 as u16;
                                self.nanosecond = header.is_nanosecond_precision();
                                None
                            }
                            PcapBlockOwned::Legacy(packet) => {
                                let fraction = if self.nanosecond {
                                    packet.ts_usec as i64 / 1000
                                } else {
                                    packet.ts_usec as i64
                                };
                                Some((
                                    packet.ts_sec as i64 * 1_000_000 + fraction,
                                    packet.origlen,
                                    packet.data.to_vec(),
                                ))
                            }
                            _ => None,
                        };
                        reader.consume(offset);
                        Step::Block(out)
                    }
                    Err(e) => Step::from_error(e),
                },
                Inner::Ng(reader) => match reader.next() {
                    Ok((offset, block)) => {
                        use pcap_parser::pcapng::Block;

                        let out = match block {
                            PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                                self.link_type = idb.linktype.0 as u16;
                                None
                            }
                            PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => Some((
                                ((epb.ts_high as i64) << 32) | epb.ts_low as i64,
                                epb.origlen,
                                epb.data.to_vec(),
                            )),
                            PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                                Some((0, spb.origlen, spb.data.to_vec()))
                            }
                            _ => None,
                        };
                        reader.consume(offset);
                        Step::Block(out)
                    }
                    Err(e) => Step::from_error(e),
                },
            };

            match step {
                Step::Block(Some((timestamp_us, original_length, data))) => {
                    self.frame_number += 1;
                    trace!(frame = self.frame_number, len = data.len(), "read frame");
                    return Ok(Some(RawPacket::new(
                        self.frame_number,
                        timestamp_us,
                        original_length,
                        self.link_type,
                        data,
                    )));
                }
                Step::Block(None) => continue,
                Step::Eof => return Ok(None),
                Step::Incomplete => self.refill()?,
                Step::Failed(reason) => {
                    return Err(PcapError::InvalidFormat {
                        reason: format!("parse error: {reason}"),
                    }
                    .into())
                }
            }
        }
    }

    fn refill(&mut self) -> Result<(), Error> {
        let result = match &mut self.inner {
            Inner::Legacy(reader) => reader.refill().map_err(|e| e.to_string()),
            Inner::Ng(reader) => reader.refill().map_err(|e| e.to_string()),
        };
        result.map_err(|reason| {
            PcapError::InvalidFormat {
                reason: format!("refill error: {reason}"),
            }
            .into()
        })
    }
}

/// Outcome of one reader step, detached from the reader's buffer.
enum Step {
    Block(Option<(i64, u32, Vec<u8>)>),
    Eof,
    Incomplete,
    Failed(String),
}

impl Step {
    fn from_error<I: std::fmt::Debug>(err: ParserError<I>) -> Self {
        match err {
            ParserError::Eof => Step::Eof,
            ParserError::Incomplete(_) => Step::Incomplete,
            other => Step::Failed(format!("{other:?}")),
        }
    }
}

impl Iterator for PcapReader {
    type Item = Result<RawPacket, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

fn open_stream(path: &Path, gzipped: bool) -> Result<Stream, Error> {
    let file = File::open(path).map_err(|_| PcapError::FileNotFound {
        path: path.display().to_string(),
    })?;
    let inner: Box<dyn Read + Send> = if gzipped {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(BufReader::with_capacity(BUFFER_SIZE, inner))
}

/// Check whether a file is gzipped, by extension or magic bytes.
fn is_gzip_file(path: &Path) -> Result<bool, Error> {
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
    {
        return Ok(true);
    }

    let mut file = File::open(path).map_err(|_| PcapError::FileNotFound {
        path: path.display().to_string(),
    })?;
    let mut magic = [0u8; 2];
    Ok(file.read_exact(&mut magic).is_ok() && magic == GZIP_MAGIC)
}
