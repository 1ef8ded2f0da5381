//! DNS query and response summaries.

use super::common::{brief_prefix, header_section, payload_section, size_suffix};
use super::fit::fit_str;
use super::Summary;
use crate::frame::Frame;
use crate::protocol::DnsMessage;

/// Mnemonic for a resource record type.
pub fn record_type_name(code: u16) -> Option<&'static str> {
    let name = match code {
        1 => "A",
        2 => "NS",
        5 => "CNAME",
        6 => "SOA",
        12 => "PTR",
        13 => "HINFO",
        15 => "MX",
        16 => "TXT",
        17 => "RP",
        18 => "AFSDB",
        24 => "SIG",
        25 => "KEY",
        28 => "AAAA",
        29 => "LOC",
        33 => "SRV",
        35 => "NAPTR",
        36 => "KX",
        37 => "CERT",
        39 => "DNAME",
        42 => "APL",
        43 => "DS",
        44 => "SSHFP",
        45 => "IPSECKEY",
        46 => "RRSIG",
        47 => "NSEC",
        48 => "DNSKEY",
        49 => "DHCID",
        50 => "NSEC3",
        51 => "NSEC3PARAM",
        52 => "TLSA",
        53 => "SMIMEA",
        55 => "HIP",
        59 => "CDS",
        60 => "CDNSKEY",
        61 => "OPENPGPKEY",
        62 => "CSYNC",
        63 => "ZONEMD",
        64 => "SVCB",
        65 => "HTTPS",
        108 => "EUI48",
        109 => "EUI64",
        249 => "TKEY",
        250 => "TSIG",
        255 => "ANY",
        256 => "URI",
        257 => "CAA",
        32768 => "TA",
        32769 => "DLV",
        _ => return None,
    };
    Some(name)
}

/// Mnemonic for a resource record class.
pub fn class_name(code: u16) -> Option<&'static str> {
    let name = match code {
        1 => "IN",
        2 => "CS",
        3 => "CH",
        4 => "HS",
        254 => "NONE",
        255 => "ANY",
        32769 => "DLV",
        _ => return None,
    };
    Some(name)
}

fn type_label(code: u16) -> String {
    record_type_name(code).map_or_else(|| code.to_string(), str::to_string)
}

fn class_label(code: u16) -> String {
    class_name(code).map_or_else(|| code.to_string(), str::to_string)
}

/// A frame carrying a DNS message over UDP or TCP.
#[derive(Debug, Clone, Copy)]
pub struct DnsPacket<'a> {
    frame: &'a Frame,
}

impl<'a> DnsPacket<'a> {
    pub const NAME: &'static str = "DNS";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Summary for DnsPacket<'_> {
    fn brief_summary(&self) -> String {
        let mut out = brief_prefix(Self::NAME, self.frame);
        if let Some(dns) = self.frame.dns() {
            let kind = if dns.is_response { "Response" } else { "Request" };
            out.push_str(&format!(" Type: {kind}"));

            let first_type = dns
                .answers
                .first()
                .map(|answer| answer.rtype)
                .or_else(|| dns.questions.first().map(|question| question.qtype));
            if let Some(code) = first_type {
                out.push_str(&format!(" {}", type_label(code)));
            }
        }
        out.push_str(&size_suffix(self.frame));
        out
    }

    fn detailed_summary(&self) -> String {
        let mut out = header_section(Self::NAME, self.frame);
        if let Some(dns) = self.frame.dns() {
            out.push_str(&format!("ID: {}\n\n", dns.id));
            out.push_str(&message_fields(dns));
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}

/// First answer of a response, or first question of a query.
fn message_fields(dns: &DnsMessage) -> String {
    let mut out = String::new();
    if dns.is_response {
        if let Some(answer) = dns.answers.first() {
            out.push_str("Type: Response\n\n");
            out.push_str(&fit_str("Response Name:", Some(&answer.name)));
            out.push_str(&format!(
                "Response Type: {}, Response Class: {}\n\n",
                type_label(answer.rtype),
                class_label(answer.rclass)
            ));
            out.push_str(&format!("Num Responses: {}\n\n", dns.answer_count));
            out.push_str(&fit_str("Response Data:", Some(&answer.data)));
        }
    } else if let Some(question) = dns.questions.first() {
        out.push_str("Type: Request\n\n");
        out.push_str(&fit_str("Request Name:", Some(&question.name)));
        out.push_str(&format!(
            "Request Type: {}, Request Class: {}\n\n",
            type_label(question.qtype),
            class_label(question.qclass)
        ));
        out.push_str(&format!("Num Requests: {}\n\n", dns.question_count));
    }
    out
}
