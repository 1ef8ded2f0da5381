//! HTTP/1.x message parser using httparse.
//!
//! Works on a single segment: the start line must be complete and valid, and
//! whatever follows the header block is left as payload. Segments on HTTP
//! ports that do not begin with a request or status line are rejected so the
//! frame stays a plain TCP packet.

use httparse::{Request, Response, Status, EMPTY_HEADER};
use smallvec::SmallVec;

use super::{Layer, ParseContext, ParseResult, Protocol};

/// Ports treated as HTTP.
pub const HTTP_PORTS: [u16; 2] = [80, 8080];

/// Maximum number of headers to parse per message.
const MAX_HEADERS: usize = 64;

/// Header list with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders(Vec<(String, String)>);

impl HttpHeaders {
    fn from_parsed(headers: &[httparse::Header<'_>]) -> Self {
        HttpHeaders(
            headers
                .iter()
                .filter(|h| !h.name.is_empty())
                .map(|h| {
                    (
                        h.name.to_string(),
                        String::from_utf8_lossy(h.value).trim().to_string(),
                    )
                })
                .collect(),
        )
    }

    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decoded HTTP start line and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMessage {
    Request {
        method: String,
        path: String,
        /// Minor version (`1` for HTTP/1.1).
        version: u8,
        headers: HttpHeaders,
    },
    Response {
        version: u8,
        status: u16,
        reason: String,
        headers: HttpHeaders,
    },
}

impl HttpMessage {
    pub fn is_request(&self) -> bool {
        matches!(self, HttpMessage::Request { .. })
    }

    pub fn headers(&self) -> &HttpHeaders {
        match self {
            HttpMessage::Request { headers, .. } | HttpMessage::Response { headers, .. } => headers,
        }
    }

    /// Version string as it appears on the wire (`HTTP/1.1`).
    pub fn version(&self) -> String {
        let minor = match self {
            HttpMessage::Request { version, .. } | HttpMessage::Response { version, .. } => *version,
        };
        format!("HTTP/1.{minor}")
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers()
            .get("Content-Length")
            .and_then(|v| v.parse().ok())
    }
}

/// HTTP protocol parser.
#[derive(Debug, Clone, Copy)]
pub struct HttpProtocol;

impl Protocol for HttpProtocol {
    fn name(&self) -> &'static str {
        "http"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        if HTTP_PORTS.iter().any(|&port| context.has_port(port)) {
            Some(100)
        } else {
            None
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.starts_with(b"HTTP/") {
            parse_response(data)
        } else {
            parse_request(data)
        }
    }
}

/// Header block length, or the whole segment when the block is cut short.
fn consumed(status: Status<usize>, data: &[u8]) -> usize {
    match status {
        Status::Complete(len) => len,
        Status::Partial => data.len(),
    }
}

fn parse_request(data: &[u8]) -> ParseResult<'_> {
    let mut headers = [EMPTY_HEADER; MAX_HEADERS];
    let mut req = Request::new(&mut headers);

    let status = match req.parse(data) {
        Ok(status) => status,
        Err(e) => return ParseResult::error(format!("HTTP request parse error: {e}"), data),
    };

    // The start line must be complete for the segment to count as HTTP
    let (Some(method), Some(path), Some(version)) = (req.method, req.path, req.version) else {
        return ParseResult::error("incomplete HTTP request line".to_string(), data);
    };

    let message = HttpMessage::Request {
        method: method.to_string(),
        path: path.to_string(),
        version,
        headers: HttpHeaders::from_parsed(req.headers),
    };

    let header_len = consumed(status, data);
    ParseResult::success(Layer::Http(message), &data[header_len..], SmallVec::new())
}

fn parse_response(data: &[u8]) -> ParseResult<'_> {
    let mut headers = [EMPTY_HEADER; MAX_HEADERS];
    let mut resp = Response::new(&mut headers);

    let status = match resp.parse(data) {
        Ok(status) => status,
        Err(e) => return ParseResult::error(format!("HTTP response parse error: {e}"), data),
    };

    let (Some(version), Some(code)) = (resp.version, resp.code) else {
        return ParseResult::error("incomplete HTTP status line".to_string(), data);
    };

    let message = HttpMessage::Response {
        version,
        status: code,
        reason: resp.reason.unwrap_or_default().to_string(),
        headers: HttpHeaders::from_parsed(resp.headers),
    };

    let header_len = consumed(status, data);
    ParseResult::success(Layer::Http(message), &data[header_len..], SmallVec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_context() -> ParseContext {
        let mut ctx = ParseContext::new(1);
        ctx.insert_hint("src_port", 49152);
        ctx.insert_hint("dst_port", 80);
        ctx
    }

    #[test]
    fn test_parse_http_request() {
        let data = b"POST /login HTTP/1.1\r\n\
                     Host: example.com\r\n\
                     accept: text/html\r\n\
                     Referer: http://example.com/\r\n\
                     Content-Length: 30\r\n\r\n\
                     username=alice&password=s3cr3t";

        let result = HttpProtocol.parse(data, &http_context());
        assert!(result.is_ok(), "{:?}", result.error);
        assert_eq!(result.remaining, b"username=alice&password=s3cr3t");

        let Some(Layer::Http(message)) = result.layer else {
            panic!("expected HTTP layer");
        };
        let HttpMessage::Request { method, path, .. } = &message else {
            panic!("expected request");
        };
        assert_eq!(method, "POST");
        assert_eq!(path, "/login");
        assert_eq!(message.version(), "HTTP/1.1");
        assert_eq!(message.headers().get("Accept"), Some("text/html"));
        assert_eq!(message.headers().get("host"), Some("example.com"));
        assert_eq!(message.content_length(), Some(30));
    }

    #[test]
    fn test_parse_http_response() {
        let data = b"HTTP/1.0 404 Not Found\r\nServer: nginx\r\nContent-Length: 0\r\n\r\n";

        let result = HttpProtocol.parse(data, &http_context());
        let Some(Layer::Http(message)) = result.layer else {
            panic!("expected HTTP layer");
        };
        assert!(!message.is_request());
        assert_eq!(message.version(), "HTTP/1.0");
        let HttpMessage::Response { status, reason, .. } = &message else {
            panic!("expected response");
        };
        assert_eq!(*status, 404);
        assert_eq!(reason, "Not Found");
        assert_eq!(message.headers().get("SERVER"), Some("nginx"));
        assert!(result.remaining.is_empty());
    }

    #[test]
    fn test_headers_split_across_segments() {
        let data = b"GET /index.html HTTP/1.1\r\nHost: exa";

        let result = HttpProtocol.parse(data, &http_context());
        assert!(result.is_ok());
        assert!(result.remaining.is_empty());
        assert!(matches!(result.layer, Some(Layer::Http(HttpMessage::Request { .. }))));
    }

    #[test]
    fn test_binary_on_port_80_rejected() {
        let data = [0x16, 0x03, 0x01, 0x00, 0x05, 0x01, 0x02];
        let result = HttpProtocol.parse(&data, &http_context());
        assert!(!result.is_ok());
        assert!(result.layer.is_none());
    }

    #[test]
    fn test_truncated_request_line_rejected() {
        let data = b"GET /ind";
        assert!(!HttpProtocol.parse(data, &http_context()).is_ok());
    }

    #[test]
    fn test_can_parse_http_ports() {
        assert_eq!(HttpProtocol.can_parse(&http_context()), Some(100));
        let mut ctx = ParseContext::new(1);
        ctx.insert_hint("src_port", 8080);
        assert_eq!(HttpProtocol.can_parse(&ctx), Some(100));
        assert_eq!(HttpProtocol.can_parse(&ParseContext::new(1)), None);
    }
}
