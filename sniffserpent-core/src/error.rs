//! Error types for sniffserpent-core.
//!
//! - [`enum@Error`] - Main error enum that wraps all error types
//! - [`ConfigError`] - Invalid session configuration (filters, selections)
//! - [`CaptureError`] - Capture session and engine failures
//! - [`PcapError`] - Errors from reading or writing capture files
//! - [`ProtocolError`] - Errors from frame decoding
//!
//! All errors implement `std::error::Error` and can be converted to `anyhow::Error`.

use thiserror::Error;

/// Main error type for sniffserpent-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Session configuration rejected before capture started
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Capture session or engine failure
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Error reading or writing a capture file
    #[error("PCAP error: {0}")]
    Pcap(#[from] PcapError),

    /// Error during frame decoding
    #[error("Protocol parse error: {0}")]
    Protocol(#[from] ProtocolError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the user-supplied capture configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Every protocol was excluded
    #[error("you must choose at least one type for scan")]
    EmptyProtocolFilter,

    /// Address filter is not a dotted-quad IPv4 address
    #[error("invalid IP address '{value}', expected the format xxx.xxx.xxx.xxx")]
    InvalidAddress { value: String },

    /// Port filter is not a number in 0..=65535
    #[error("invalid port '{value}', expected a number between 0 and 65535")]
    InvalidPort { value: String },

    /// Protocol name outside the supported set
    #[error("unknown protocol '{name}'")]
    UnknownProtocol { name: String },
}

/// Errors raised by a capture session or its engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// A session is already running
    #[error("scan in progress")]
    AlreadyRunning,

    /// Operation is not allowed while a session is running
    #[error("cannot {action} while scan is in progress")]
    Busy { action: &'static str },

    /// The capture source could not be opened for lack of privilege
    #[error("permission denied opening {source_name}, run again with administrative privileges")]
    PermissionDenied { source_name: String },

    /// Generic engine failure
    #[error("capture failed: {reason}")]
    Engine { reason: String },

    /// Export requested with an empty registry
    #[error("no scan data to save")]
    NothingToSave,
}

/// Errors related to capture file reading and writing.
#[derive(Error, Debug)]
pub enum PcapError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Invalid PCAP format
    #[error("Invalid PCAP format: {reason}")]
    InvalidFormat { reason: String },

    /// Writing a capture file failed
    #[error("Failed to write capture file: {reason}")]
    Write { reason: String },
}

/// Errors related to frame decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// No parser accepts the link layer
    #[error("unsupported link type: {link_type}")]
    UnsupportedLinkType { link_type: u16 },

    /// Packet too short for protocol header
    #[error("{protocol}: packet too short (need {needed} bytes, have {have})")]
    PacketTooShort {
        protocol: &'static str,
        needed: usize,
        have: usize,
    },

    /// Link layer parsed with an error
    #[error("{protocol}: {reason}")]
    Malformed {
        protocol: &'static str,
        reason: String,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::EmptyProtocolFilter.to_string(),
            "you must choose at least one type for scan"
        );
        let err = ConfigError::InvalidPort {
            value: "70000".to_string(),
        };
        assert!(err.to_string().contains("70000"));
    }

    #[test]
    fn test_error_from_conversions() {
        let err: Error = CaptureError::AlreadyRunning.into();
        assert!(matches!(err, Error::Capture(CaptureError::AlreadyRunning)));
        assert_eq!(err.to_string(), "Capture error: scan in progress");

        let err: Error = ConfigError::EmptyProtocolFilter.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
