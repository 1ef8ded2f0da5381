//! DHCP message summaries.

use super::common::{brief_prefix, header_section, payload_section, size_suffix};
use super::fit::fit_list;
use super::Summary;
use crate::frame::Frame;
use crate::protocol::{dhcp_message_type as message_type, DhcpMessage};

/// Message types that produce a record.
pub const ACCEPTED_TYPES: [u8; 6] = [
    message_type::DISCOVER,
    message_type::OFFER,
    message_type::REQUEST,
    message_type::ACK,
    message_type::RELEASE,
    message_type::INFORM,
];

/// Short type tag used in brief summaries.
fn brief_type(code: u8) -> Option<&'static str> {
    match code {
        message_type::DISCOVER => Some("Discover"),
        message_type::OFFER => Some("Offer"),
        message_type::REQUEST => Some("Request"),
        message_type::ACK => Some("Acknowledge"),
        message_type::RELEASE => Some("Release"),
        message_type::INFORM => Some("Info"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DhcpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> DhcpPacket<'a> {
    pub const NAME: &'static str = "DHCP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    /// True when the message type option names one of [`ACCEPTED_TYPES`].
    pub fn accepts(frame: &Frame) -> bool {
        frame
            .dhcp()
            .and_then(DhcpMessage::message_type)
            .is_some_and(|code| ACCEPTED_TYPES.contains(&code))
    }
}

impl Summary for DhcpPacket<'_> {
    fn brief_summary(&self) -> String {
        let mut out = brief_prefix(Self::NAME, self.frame);
        let tag = self
            .frame
            .dhcp()
            .and_then(DhcpMessage::message_type)
            .and_then(brief_type);
        if let Some(tag) = tag {
            out.push_str(&format!(" Type: {tag}"));
        }
        out.push_str(&size_suffix(self.frame));
        out
    }

    fn detailed_summary(&self) -> String {
        let mut out = header_section(Self::NAME, self.frame);
        if let Some(dhcp) = self.frame.dhcp() {
            out.push_str(&message_fields(dhcp));
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}

/// Append `"{label} {value}\n\n"` when the option is present.
fn push_opt<T: std::fmt::Display>(out: &mut String, label: &str, value: Option<T>) {
    if let Some(value) = value {
        out.push_str(&format!("{label} {value}\n\n"));
    }
}

fn message_fields(dhcp: &DhcpMessage) -> String {
    let mut out = String::new();
    let Some(code) = dhcp.message_type() else {
        return out;
    };

    match code {
        message_type::DISCOVER | message_type::REQUEST => {
            let is_request = code == message_type::REQUEST;
            out.push_str(if is_request {
                "DHCP Type: Request\n\n"
            } else {
                "DHCP Type: Discover\n\n"
            });
            push_opt(&mut out, "Host Name:", dhcp.hostname());
            if is_request {
                push_opt(&mut out, "Server ID:", dhcp.server_id());
            }
            push_opt(&mut out, "Requested Address:", dhcp.requested_addr());
            push_opt(&mut out, "Vendor Class ID:", dhcp.vendor_class_id());
            if let Some(params) = dhcp.param_req_list().filter(|p| !p.is_empty()) {
                out.push_str(&fit_list("Parameter Request list:", params));
            }
        }
        message_type::OFFER | message_type::ACK => {
            let is_offer = code == message_type::OFFER;
            out.push_str(if is_offer {
                "DHCP Type: Offer\n\n"
            } else {
                "DHCP Type: Acknowledge\n\n"
            });
            push_opt(&mut out, "Subnet Mask:", dhcp.subnet_mask());
            push_opt(&mut out, "Broadcast Address:", dhcp.broadcast_address());
            push_opt(&mut out, "Lease Time:", dhcp.lease_time());
            push_opt(&mut out, "Router Address:", dhcp.router());
            let address_label = if is_offer {
                "Offered Address:"
            } else {
                "Acknowledged Address:"
            };
            out.push_str(&format!("{address_label} {}\n\n", dhcp.yiaddr));
            let servers = dhcp.name_servers();
            if !servers.is_empty() {
                out.push_str(&fit_list("Server Name:", servers));
            }
        }
        message_type::RELEASE => {
            out.push_str("DHCP Type: Release\n\n");
            push_opt(&mut out, "Server ID:", dhcp.server_id());
        }
        message_type::INFORM => {
            out.push_str("DHCP Type: Information\n\n");
            push_opt(&mut out, "Host Name:", dhcp.hostname());
            push_opt(&mut out, "Vendor Class ID:", dhcp.vendor_class_id());
        }
        _ => {}
    }
    out
}
