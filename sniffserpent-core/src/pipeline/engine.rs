//! Capture engines.
//!
//! An engine pulls raw packets from a source and hands each one to the
//! session callback until the source ends or the stop flag is raised.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{CaptureError, Error, PcapError};
use crate::pcap::{PcapReader, RawPacket};

/// Where packets come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    /// A network interface, `None` for every interface.
    Interface(Option<String>),
    /// A pcap or pcapng file to replay.
    File(PathBuf),
}

impl CaptureSource {
    pub fn is_replay(&self) -> bool {
        matches!(self, CaptureSource::File(_))
    }
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSource::Interface(Some(name)) => write!(f, "interface {name}"),
            CaptureSource::Interface(None) => f.write_str("all interfaces"),
            CaptureSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Cooperative stop request shared between a session and its engine.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A packet source driven by a capture session.
pub trait CaptureEngine: Send + Sync {
    /// Deliver packets from `source` to `on_packet` until it is exhausted
    /// or `stop` is raised.
    ///
    /// `filter` is a BPF expression; engines that cannot compile one may
    /// ignore it since the session re-checks addresses on decoded frames.
    fn open(
        &self,
        source: &CaptureSource,
        filter: &str,
        on_packet: &mut dyn FnMut(RawPacket),
        stop: &StopFlag,
    ) -> Result<(), CaptureError>;
}

/// Replays capture files through [`PcapReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayEngine;

impl CaptureEngine for ReplayEngine {
    fn open(
        &self,
        source: &CaptureSource,
        _filter: &str,
        on_packet: &mut dyn FnMut(RawPacket),
        stop: &StopFlag,
    ) -> Result<(), CaptureError> {
        let CaptureSource::File(path) = source else {
            return Err(CaptureError::Engine {
                reason: format!("cannot replay from {source}"),
            });
        };
        let mut reader = PcapReader::open(path).map_err(|e| open_error(source, e))?;

        while !stop.is_requested() {
            match reader.next_packet() {
                Ok(Some(packet)) => on_packet(packet),
                Ok(None) => break,
                Err(e) => {
                    return Err(CaptureError::Engine {
                        reason: e.to_string(),
                    })
                }
            }
        }
        debug!(frames = reader.frame_count(), path = %path.display(), "replay finished");
        Ok(())
    }
}

fn open_error(source: &CaptureSource, err: Error) -> CaptureError {
    match err {
        Error::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            CaptureError::PermissionDenied {
                source_name: source.to_string(),
            }
        }
        Error::Pcap(PcapError::FileNotFound { path }) if is_unreadable(&path) => {
            CaptureError::PermissionDenied { source_name: path }
        }
        other => CaptureError::Engine {
            reason: other.to_string(),
        },
    }
}

/// An existing file we still failed to open.
fn is_unreadable(path: &str) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| meta.is_file())
        && std::fs::File::open(path)
            .is_err_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
}

#[cfg(feature = "live")]
pub use live::{list_interfaces, LiveEngine};

#[cfg(feature = "live")]
mod live {
    use tracing::{debug, warn};

    use super::{CaptureEngine, CaptureSource, StopFlag};
    use crate::error::CaptureError;
    use crate::filter::capture_interfaces;
    use crate::pcap::RawPacket;

    /// Pseudo-device capturing on every interface (Linux).
    const ANY_DEVICE: &str = "any";

    /// libpcap capture from a network interface.
    #[derive(Debug, Clone, Copy)]
    pub struct LiveEngine {
        snaplen: i32,
        timeout_ms: i32,
    }

    impl LiveEngine {
        pub fn new() -> Self {
            Self {
                snaplen: 65535,
                timeout_ms: 100,
            }
        }

        /// Read timeout, which bounds how long a stop request may wait.
        pub fn with_timeout_ms(mut self, timeout_ms: i32) -> Self {
            self.timeout_ms = timeout_ms;
            self
        }

        fn activate(
            &self,
            device: &str,
        ) -> Result<pcap::Capture<pcap::Active>, pcap::Error> {
            // Some interfaces refuse promiscuous mode
            pcap::Capture::from_device(device)
                .and_then(|c| {
                    c.promisc(true)
                        .snaplen(self.snaplen)
                        .timeout(self.timeout_ms)
                        .open()
                })
                .or_else(|_| {
                    pcap::Capture::from_device(device).and_then(|c| {
                        c.promisc(false)
                            .snaplen(self.snaplen)
                            .timeout(self.timeout_ms)
                            .open()
                    })
                })
        }
    }

    impl Default for LiveEngine {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CaptureEngine for LiveEngine {
        fn open(
            &self,
            source: &CaptureSource,
            filter: &str,
            on_packet: &mut dyn FnMut(RawPacket),
            stop: &StopFlag,
        ) -> Result<(), CaptureError> {
            let device = match source {
                CaptureSource::Interface(Some(name)) => name.clone(),
                CaptureSource::Interface(None) => default_device()?,
                CaptureSource::File(_) => {
                    return Err(CaptureError::Engine {
                        reason: format!("cannot capture live from {source}"),
                    })
                }
            };

            let mut cap = self
                .activate(&device)
                .map_err(|e| classify_error(&device, e))?;
            if !filter.is_empty() {
                cap.filter(filter, true)
                    .map_err(|e| CaptureError::Engine {
                        reason: format!("BPF filter error: {e}"),
                    })?;
            }
            let link_type = cap.get_datalink().0 as u16;
            debug!(device = %device, link_type, filter, "live capture opened");

            let mut frame_number = 0u64;
            while !stop.is_requested() {
                match cap.next_packet() {
                    Ok(packet) => {
                        frame_number += 1;
                        let ts = packet.header.ts;
                        let timestamp_us = ts.tv_sec as i64 * 1_000_000 + ts.tv_usec as i64;
                        on_packet(RawPacket::new(
                            frame_number,
                            timestamp_us,
                            packet.header.len,
                            link_type,
                            packet.data.to_vec(),
                        ));
                    }
                    Err(pcap::Error::TimeoutExpired) => continue,
                    Err(e) => {
                        warn!(device = %device, error = %e, "live capture stopped");
                        return Err(classify_error(&device, e));
                    }
                }
            }
            Ok(())
        }
    }

    fn default_device() -> Result<String, CaptureError> {
        let devices = pcap::Device::list().map_err(|e| classify_error("devices", e))?;
        if devices.iter().any(|d| d.name == ANY_DEVICE) {
            return Ok(ANY_DEVICE.to_string());
        }
        match pcap::Device::lookup() {
            Ok(Some(device)) => Ok(device.name),
            Ok(None) => Err(CaptureError::Engine {
                reason: "no capture device available".to_string(),
            }),
            Err(e) => Err(classify_error("devices", e)),
        }
    }

    fn classify_error(source_name: &str, err: pcap::Error) -> CaptureError {
        let message = err.to_string();
        if message.contains("Permission denied")
            || message.contains("Operation not permitted")
            || message.contains("permission")
        {
            CaptureError::PermissionDenied {
                source_name: source_name.to_string(),
            }
        } else {
            CaptureError::Engine { reason: message }
        }
    }

    /// Interfaces offered for live capture, with "All" when there are several.
    pub fn list_interfaces() -> Result<Vec<String>, CaptureError> {
        let devices = pcap::Device::list().map_err(|e| classify_error("devices", e))?;
        Ok(capture_interfaces(devices.into_iter().map(|d| d.name)))
    }
}
