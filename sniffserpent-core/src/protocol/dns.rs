//! DNS protocol parser.

use std::net::{Ipv4Addr, Ipv6Addr};

use smallvec::SmallVec;

use super::tcp::IP_PROTO_TCP;
use super::{Layer, ParseContext, ParseResult, Protocol};

/// DNS well-known port.
pub const DNS_PORT: u16 = 53;

const HEADER_LEN: usize = 12;

/// Upper bound on compression pointer jumps while reading one name.
const MAX_POINTER_JUMPS: usize = 16;

/// Upper bound on questions decoded from one message.
const MAX_QUESTIONS: u16 = 32;

/// DNS record types with structured rdata.
pub mod record_type {
    pub const A: u16 = 1;
    pub const NS: u16 = 2;
    pub const CNAME: u16 = 5;
    pub const SOA: u16 = 6;
    pub const PTR: u16 = 12;
    pub const MX: u16 = 15;
    pub const TXT: u16 = 16;
    pub const AAAA: u16 = 28;
    pub const DNAME: u16 = 39;
}

/// A question section entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

/// A resource record from the answer section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: String,
    pub rtype: u16,
    pub rclass: u16,
    pub ttl: u32,
    /// Rendered record data (address, target name, text or hex).
    pub data: String,
}

/// Decoded DNS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsMessage {
    pub id: u16,
    pub is_response: bool,
    pub opcode: u8,
    pub rcode: u8,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsRecord>,
}

/// DNS protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct DnsProtocol;

impl Protocol for DnsProtocol {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        if context.has_port(DNS_PORT) {
            Some(100)
        } else {
            None
        }
    }

    fn parse<'a>(&self, data: &'a [u8], context: &ParseContext) -> ParseResult<'a> {
        // DNS over TCP carries a two-byte length prefix
        let msg = if context.hint("transport") == Some(IP_PROTO_TCP as u64) {
            if data.len() < 2 {
                return ParseResult::error("DNS/TCP length prefix missing".to_string(), data);
            }
            let len = u16::from_be_bytes([data[0], data[1]]) as usize;
            &data[2..(2 + len).min(data.len())]
        } else {
            data
        };

        match parse_message(msg) {
            Ok((message, consumed)) => {
                let offset = (data.len() - msg.len()) + consumed;
                ParseResult::success(Layer::Dns(message), &data[offset..], SmallVec::new())
            }
            Err(e) => ParseResult::error(format!("DNS parse error: {e}"), data),
        }
    }
}

fn be16(msg: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([msg[at], msg[at + 1]])
}

/// Parse a whole DNS message, returning it and the bytes consumed.
fn parse_message(msg: &[u8]) -> Result<(DnsMessage, usize), String> {
    if msg.len() < HEADER_LEN {
        return Err("header too short".to_string());
    }

    let flags = be16(msg, 2);
    let mut message = DnsMessage {
        id: be16(msg, 0),
        is_response: flags & 0x8000 != 0,
        opcode: ((flags >> 11) & 0x0f) as u8,
        rcode: (flags & 0x000f) as u8,
        question_count: be16(msg, 4),
        answer_count: be16(msg, 6),
        authority_count: be16(msg, 8),
        additional_count: be16(msg, 10),
        questions: Vec::new(),
        answers: Vec::new(),
    };

    if message.question_count > MAX_QUESTIONS {
        return Err(format!("implausible question count {}", message.question_count));
    }

    let mut pos = HEADER_LEN;
    for _ in 0..message.question_count {
        let (name, next) = read_name(msg, pos)?;
        if msg.len() < next + 4 {
            return Err("question section too short for QTYPE/QCLASS".to_string());
        }
        message.questions.push(DnsQuestion {
            name,
            qtype: be16(msg, next),
            qclass: be16(msg, next + 2),
        });
        pos = next + 4;
    }

    for _ in 0..message.answer_count {
        let (record, next) = read_record(msg, pos)?;
        message.answers.push(record);
        pos = next;
    }

    Ok((message, pos))
}

fn read_record(msg: &[u8], start: usize) -> Result<(DnsRecord, usize), String> {
    let (name, pos) = read_name(msg, start)?;
    if msg.len() < pos + 10 {
        return Err("resource record header truncated".to_string());
    }

    let rtype = be16(msg, pos);
    let rclass = be16(msg, pos + 2);
    let ttl = u32::from_be_bytes([msg[pos + 4], msg[pos + 5], msg[pos + 6], msg[pos + 7]]);
    let rdlength = be16(msg, pos + 8) as usize;
    let rdata_start = pos + 10;
    let end = rdata_start + rdlength;
    if msg.len() < end {
        return Err("resource record data truncated".to_string());
    }

    let rdata = &msg[rdata_start..end];
    let data = match rtype {
        record_type::A if rdlength == 4 => {
            Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3]).to_string()
        }
        record_type::AAAA if rdlength == 16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(rdata);
            Ipv6Addr::from(octets).to_string()
        }
        record_type::NS | record_type::CNAME | record_type::PTR | record_type::DNAME => {
            read_name(msg, rdata_start)?.0
        }
        record_type::SOA => read_name(msg, rdata_start)?.0,
        record_type::MX if rdlength > 2 => read_name(msg, rdata_start + 2)?.0,
        record_type::TXT => read_character_strings(rdata).join(", "),
        _ => hex::encode(rdata),
    };

    Ok((
        DnsRecord {
            name,
            rtype,
            rclass,
            ttl,
            data,
        },
        end,
    ))
}

/// Read the length-prefixed strings of a TXT record.
fn read_character_strings(rdata: &[u8]) -> Vec<String> {
    let mut strings = Vec::new();
    let mut pos = 0;
    while pos < rdata.len() {
        let len = rdata[pos] as usize;
        let end = (pos + 1 + len).min(rdata.len());
        strings.push(String::from_utf8_lossy(&rdata[pos + 1..end]).into_owned());
        pos = end;
    }
    strings
}

/// Read a possibly compressed domain name starting at `start`.
///
/// Returns the dotted name (without trailing dot, `.` for the root) and the
/// position right after the name in the original byte stream.
fn read_name(msg: &[u8], start: usize) -> Result<(String, usize), String> {
    let mut labels: Vec<String> = Vec::with_capacity(4);
    let mut pos = start;
    let mut resume_at = None;
    let mut jumps = 0;

    loop {
        let len = *msg
            .get(pos)
            .ok_or_else(|| "unexpected end of data while parsing domain name".to_string())?
            as usize;

        if len == 0 {
            pos += 1;
            break;
        }

        // Compression pointer (top 2 bits set)
        if len & 0xc0 == 0xc0 {
            let low = *msg
                .get(pos + 1)
                .ok_or_else(|| "truncated compression pointer".to_string())?
                as usize;
            jumps += 1;
            if jumps > MAX_POINTER_JUMPS {
                return Err("compression pointer loop".to_string());
            }
            resume_at.get_or_insert(pos + 2);
            pos = ((len & 0x3f) << 8) | low;
            continue;
        }

        if len > 63 {
            return Err(format!("invalid label length: {len}"));
        }
        let label = msg
            .get(pos + 1..pos + 1 + len)
            .ok_or_else(|| "label extends beyond data".to_string())?;
        labels.push(String::from_utf8_lossy(label).into_owned());
        pos += 1 + len;
    }

    let name = if labels.is_empty() {
        ".".to_string()
    } else {
        labels.join(".")
    };
    Ok((name, resume_at.unwrap_or(pos)))
}
