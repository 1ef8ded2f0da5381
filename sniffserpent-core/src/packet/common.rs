//! Summary sections shared by every protocol wrapper.

use std::fmt::Display;

use super::fit::fit_str;
use crate::frame::Frame;

/// Render an optional value, `None` when absent.
pub(crate) fn or_none<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

/// Source and destination endpoint, network layer first, MAC as fallback.
pub(crate) fn endpoints(frame: &Frame) -> Option<(String, String)> {
    if let (Some(src), Some(dst)) = (frame.src_ip(), frame.dst_ip()) {
        return Some((src.to_string(), dst.to_string()));
    }
    let eth = frame.ethernet()?;
    Some((eth.source.to_string(), eth.destination.to_string()))
}

/// `"{name} Packet: ({src}):({sport}) --> ({dst}):({dport})"`, or just the
/// name when the frame carries no transport ports.
pub(crate) fn brief_prefix(name: &str, frame: &Frame) -> String {
    match (frame.ports(), endpoints(frame)) {
        (Some((sport, dport)), Some((src, dst))) => {
            format!("{name} Packet: ({src}):({sport}) --> ({dst}):({dport})")
        }
        _ => format!("{name} Packet:"),
    }
}

pub(crate) fn size_suffix(frame: &Frame) -> String {
    format!(" | Size: {} bytes", frame.len())
}

/// Name line, ports (or MACs) and network info.
pub(crate) fn header_section(name: &str, frame: &Frame) -> String {
    let mut out = format!("{name} Packet:\n\n");
    match frame.ports() {
        Some((sport, dport)) => {
            out.push_str(&format!("Source Port: {sport}\n\n"));
            out.push_str(&format!("Destination Port: {dport}\n\n"));
        }
        None => out.push_str(&mac_lines(frame)),
    }
    out.push_str(&ip_info(frame));
    out
}

pub(crate) fn mac_lines(frame: &Frame) -> String {
    format!(
        "Source MAC: {}\n\nDestination MAC: {}\n\n",
        or_none(frame.src_mac()),
        or_none(frame.dst_mac())
    )
}

/// Network addresses, TTL or hop limit, checksum and frame size.
pub(crate) fn ip_info(frame: &Frame) -> String {
    let mut out = String::new();
    if let Some(ip) = frame.ipv4() {
        out.push_str(&fit_str("Source IP:", Some(ip.source)));
        out.push_str(&fit_str("Destination IP:", Some(ip.destination)));
        out.push_str(&format!("TTL: {}, DSCP: {}\n\n", ip.ttl, ip.tos));
    } else if let Some(ip) = frame.ipv6() {
        out.push_str(&fit_str("Source IP:", Some(ip.source)));
        out.push_str(&fit_str("Destination IP:", Some(ip.destination)));
        out.push_str(&format!(
            "Hop Limit: {}, Traffic Class: {}\n\n",
            ip.hop_limit, ip.traffic_class
        ));
    }
    if let Some(checksum) = checksum(frame) {
        out.push_str(&format!("Checksum: {checksum}\n\n"));
    }
    out.push_str(&format!("Packet Size: {} bytes\n\n", frame.len()));
    out
}

/// Checksum of the outermost layer that has one. IGMP reports its own.
fn checksum(frame: &Frame) -> Option<u16> {
    if frame.igmp().is_some() {
        return None;
    }
    frame
        .ipv4()
        .map(|ip| ip.checksum)
        .or_else(|| frame.tcp().map(|tcp| tcp.checksum))
        .or_else(|| frame.udp().map(|udp| udp.checksum))
        .or_else(|| frame.icmp().map(|icmp| icmp.checksum))
}

/// Hex dump of the undecoded tail, empty when nothing is left.
pub(crate) fn payload_section(frame: &Frame) -> String {
    if frame.payload().is_empty() {
        return String::new();
    }
    format!("Payload Data: {}\n\n", hex::encode(frame.payload()))
}
