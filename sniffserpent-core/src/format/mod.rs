//! Formatting utilities shared by decoders and renderers.

mod address;

pub use address::{format_hw_addr, format_mac, format_proto_addr, MacAddr};
