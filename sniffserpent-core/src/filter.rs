//! User-facing capture filters.
//!
//! - [`ProtocolFilter`] - protocols excluded from a session
//! - [`AddressFilter`] - optional host and port restriction
//! - [`capture_interfaces`] - interface names offered for live capture

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use crate::classify::DispatchTable;
use crate::error::ConfigError;
use crate::frame::Frame;
use crate::packet::ProtocolTag;

/// Protocols left out of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolFilter {
    excluded: BTreeSet<ProtocolTag>,
}

impl ProtocolFilter {
    /// Capture every protocol.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the given tags.
    pub fn excluding<I: IntoIterator<Item = ProtocolTag>>(tags: I) -> Self {
        Self {
            excluded: tags.into_iter().collect(),
        }
    }

    /// Capture only the given tags.
    pub fn only<I: IntoIterator<Item = ProtocolTag>>(tags: I) -> Self {
        let keep: BTreeSet<_> = tags.into_iter().collect();
        Self::excluding(ProtocolTag::ALL.into_iter().filter(|tag| !keep.contains(tag)))
    }

    /// Parse a comma separated list of protocol names to exclude.
    pub fn parse_excluded(list: &str) -> Result<Self, ConfigError> {
        Ok(Self::excluding(parse_tags(list)?))
    }

    /// Parse a comma separated list of the only protocol names to keep.
    pub fn parse_only(list: &str) -> Result<Self, ConfigError> {
        Ok(Self::only(parse_tags(list)?))
    }

    pub fn exclude(&mut self, tag: ProtocolTag) {
        self.excluded.insert(tag);
    }

    pub fn excluded(&self) -> &BTreeSet<ProtocolTag> {
        &self.excluded
    }

    /// Build the dispatch table, failing if every protocol is excluded.
    pub fn dispatch_table(&self) -> Result<DispatchTable, ConfigError> {
        DispatchTable::excluding(&self.excluded)
    }
}

fn parse_tags(list: &str) -> Result<Vec<ProtocolTag>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse)
        .collect()
}

/// Host and port restriction, validated at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressFilter {
    ip: Option<Ipv4Addr>,
    port: Option<u16>,
}

impl AddressFilter {
    /// No restriction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Validate user input. Empty strings mean "no restriction".
    ///
    /// The address must be a dotted quad; the port must fit in 0..=65535.
    pub fn parse(ip: Option<&str>, port: Option<&str>) -> Result<Self, ConfigError> {
        let ip = match ip.map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => Some(parse_dotted_quad(text)?),
            None => None,
        };
        let port = match port.map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => Some(text.parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                value: text.to_string(),
            })?),
            None => None,
        };
        Ok(Self { ip, port })
    }

    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.ip
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn is_empty(&self) -> bool {
        self.ip.is_none() && self.port.is_none()
    }

    /// Capture filter in BPF syntax, empty when unrestricted.
    ///
    /// ```
    /// use sniffserpent_core::filter::AddressFilter;
    ///
    /// let filter = AddressFilter::parse(Some("10.0.0.1"), Some("443")).unwrap();
    /// assert_eq!(filter.bpf_expression(), "(src 10.0.0.1 or 10.0.0.1) and port 443");
    /// ```
    pub fn bpf_expression(&self) -> String {
        let host = self.ip.map(|ip| format!("(src {ip} or {ip})"));
        let port = self.port.map(|port| format!("port {port}"));
        host.into_iter().chain(port).collect::<Vec<_>>().join(" and ")
    }

    /// Apply the same restriction to an already decoded frame.
    ///
    /// The host matches either direction; the port matches either TCP/UDP port.
    pub fn matches(&self, frame: &Frame) -> bool {
        let host_ok = self.ip.map_or(true, |ip| {
            frame.ipv4().is_some_and(|hdr| hdr.source == ip || hdr.destination == ip)
        });
        let port_ok = self.port.map_or(true, |port| {
            frame
                .ports()
                .is_some_and(|(src, dst)| src == port || dst == port)
        });
        host_ok && port_ok
    }
}

/// Strict `a.b.c.d` with each octet 0..=255.
fn parse_dotted_quad(text: &str) -> Result<Ipv4Addr, ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        value: text.to_string(),
    };
    let octets: Vec<&str> = text.split('.').collect();
    if octets.len() != 4
        || octets
            .iter()
            .any(|o| o.is_empty() || o.len() > 3 || !o.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }
    text.parse().map_err(|_| invalid())
}

/// Name prefixes of the interfaces worth offering for capture.
pub const INTERFACE_PREFIXES: &[&str] = &[
    "eth",
    "wlan",
    "en",
    "enp",
    "wlp",
    "lo",
    "Ethernet",
    "Wi-Fi",
    "\\Device\\NPF_Loopback",
];

/// Choice meaning "capture on every listed interface".
pub const ALL_INTERFACES: &str = "All";

/// Keep the interfaces whose names start with a known prefix, in order.
/// [`ALL_INTERFACES`] is appended when two or more remain.
pub fn capture_interfaces<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut matched: Vec<String> = names
        .into_iter()
        .map(Into::into)
        .filter(|name| INTERFACE_PREFIXES.iter().any(|p| name.starts_with(p)))
        .collect();
    if matched.len() >= 2 {
        matched.push(ALL_INTERFACES.to_string());
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::*;

    #[test]
    fn test_protocol_filter_parse() {
        let filter = ProtocolFilter::parse_excluded("http, TLS,dns").expect("filter");
        assert_eq!(
            filter.excluded().iter().copied().collect::<Vec<_>>(),
            [ProtocolTag::Http, ProtocolTag::Tls, ProtocolTag::Dns]
        );
        assert_eq!(filter.dispatch_table().map(|t| t.len()), Ok(7));

        assert!(matches!(
            ProtocolFilter::parse_excluded("http,smtp"),
            Err(ConfigError::UnknownProtocol { name }) if name == "smtp"
        ));
    }

    #[test]
    fn test_protocol_filter_only() {
        let filter = ProtocolFilter::parse_only("arp").expect("filter");
        let table = filter.dispatch_table().expect("table");
        assert_eq!(table.tags().collect::<Vec<_>>(), [ProtocolTag::Arp]);
    }

    #[test]
    fn test_everything_excluded() {
        let filter = ProtocolFilter::excluding(ProtocolTag::ALL);
        assert_eq!(
            filter.dispatch_table().map(|t| t.len()),
            Err(ConfigError::EmptyProtocolFilter)
        );
    }

    #[test]
    fn test_address_filter_validation() {
        assert_eq!(AddressFilter::parse(None, Some("")), Ok(AddressFilter::none()));
        assert!(matches!(
            AddressFilter::parse(Some("10.0.0"), None),
            Err(ConfigError::InvalidAddress { .. })
        ));
        assert!(matches!(
            AddressFilter::parse(Some("10.0.0.256"), None),
            Err(ConfigError::InvalidAddress { .. })
        ));
        assert!(matches!(
            AddressFilter::parse(Some("+1.2.3.4"), None),
            Err(ConfigError::InvalidAddress { .. })
        ));
        assert!(matches!(
            AddressFilter::parse(None, Some("65536")),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert_eq!(
            AddressFilter::parse(None, Some("0")).map(|f| f.port()),
            Ok(Some(0))
        );
    }

    #[test]
    fn test_bpf_expression() {
        let ip_only = AddressFilter::parse(Some("192.168.1.1"), None).expect("filter");
        assert_eq!(ip_only.bpf_expression(), "(src 192.168.1.1 or 192.168.1.1)");

        let port_only = AddressFilter::parse(None, Some("53")).expect("filter");
        assert_eq!(port_only.bpf_expression(), "port 53");

        assert_eq!(AddressFilter::none().bpf_expression(), "");
    }

    #[test]
    fn test_address_filter_matches() {
        let frame = decode_frame(build_tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 40000, 22, 0x02));

        assert!(AddressFilter::none().matches(&frame));
        assert!(AddressFilter::parse(Some("10.0.0.2"), None).expect("f").matches(&frame));
        assert!(AddressFilter::parse(None, Some("40000")).expect("f").matches(&frame));
        assert!(!AddressFilter::parse(Some("10.0.0.3"), None).expect("f").matches(&frame));
        assert!(!AddressFilter::parse(Some("10.0.0.1"), Some("80")).expect("f").matches(&frame));

        let arp = decode_frame(build_arp_packet(1, [10, 0, 0, 1], [10, 0, 0, 2]));
        assert!(!AddressFilter::parse(None, Some("22")).expect("f").matches(&arp));
    }

    #[test]
    fn test_capture_interfaces() {
        let names = ["eth0", "docker0", "lo", "wlp3s0", "veth12"];
        assert_eq!(capture_interfaces(names), ["eth0", "lo", "wlp3s0", "All"]);

        assert_eq!(capture_interfaces(["lo", "bond0"]), ["lo"]);
        assert!(capture_interfaces(Vec::<String>::new()).is_empty());
    }
}
