//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sniffserpent_core::filter::{AddressFilter, ProtocolFilter, ALL_INTERFACES};
use sniffserpent_core::{CaptureSource, ConfigError};

/// Label shown for the Windows loopback adapter.
pub const LOOPBACK_LABEL: &str = "Loopback";

/// Device name behind [`LOOPBACK_LABEL`].
pub const LOOPBACK_DEVICE: &str = "\\Device\\NPF_Loopback";

/// Sniff network traffic and summarize it by protocol.
#[derive(Parser, Debug)]
#[command(name = "sniffserpent")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List network interfaces available for capture
    Interfaces,

    /// Replay a PCAP or PCAPNG file
    Replay {
        /// Capture file to replay
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Capture live traffic
    Live {
        /// Interface to capture on, "All" for every interface
        #[arg(short = 'i', long = "interface", value_name = "NAME")]
        interface: Option<String>,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

/// Options shared by replay and live capture.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    /// Protocols to leave out, comma separated
    #[arg(long = "exclude", value_name = "PROTO,...", conflicts_with = "only")]
    pub exclude: Option<String>,

    /// Capture only these protocols, comma separated
    #[arg(long = "only", value_name = "PROTO,...")]
    pub only: Option<String>,

    /// Keep packets to or from this IPv4 address
    #[arg(long = "ip", value_name = "A.B.C.D")]
    pub ip: Option<String>,

    /// Keep packets with this source or destination port
    #[arg(long = "port", value_name = "N")]
    pub port: Option<String>,

    /// Save the scan when it ends (.pcap for a capture file, otherwise text)
    #[arg(short = 'o', long = "save", value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Print the detailed summary of every packet when the scan ends
    #[arg(long = "details")]
    pub details: bool,
}

impl ScanArgs {
    pub fn protocol_filter(&self) -> Result<ProtocolFilter, ConfigError> {
        match (&self.exclude, &self.only) {
            (_, Some(only)) => ProtocolFilter::parse_only(only),
            (Some(exclude), None) => ProtocolFilter::parse_excluded(exclude),
            (None, None) => Ok(ProtocolFilter::new()),
        }
    }

    pub fn address_filter(&self) -> Result<AddressFilter, ConfigError> {
        AddressFilter::parse(self.ip.as_deref(), self.port.as_deref())
    }
}

/// Map an interface choice to a capture source.
pub fn interface_source(choice: Option<&str>) -> CaptureSource {
    match choice.map(str::trim) {
        None | Some("") => CaptureSource::Interface(None),
        Some(name) if name.eq_ignore_ascii_case(ALL_INTERFACES) => CaptureSource::Interface(None),
        Some(LOOPBACK_LABEL) => CaptureSource::Interface(Some(LOOPBACK_DEVICE.to_string())),
        Some(name) => CaptureSource::Interface(Some(name.to_string())),
    }
}

/// Name shown to the user for a device.
pub fn interface_label(device: &str) -> &str {
    if device == LOOPBACK_DEVICE {
        LOOPBACK_LABEL
    } else {
        device
    }
}
