//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Terminal output of summaries and details

mod args;
mod output;

pub use args::{
    interface_label, interface_source, Args, Command, ScanArgs, LOOPBACK_DEVICE, LOOPBACK_LABEL,
};
pub use output::{write_details, TerminalSink};
