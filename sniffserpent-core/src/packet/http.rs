//! HTTP request and response summaries.

use super::common::{brief_prefix, header_section, or_none, payload_section, size_suffix};
use super::fit::fit_str;
use super::Summary;
use crate::credentials::{extract_credentials, Credentials};
use crate::frame::Frame;
use crate::protocol::HttpMessage;

/// A frame carrying an HTTP/1.x start line.
#[derive(Debug, Clone, Copy)]
pub struct HttpPacket<'a> {
    frame: &'a Frame,
}

impl<'a> HttpPacket<'a> {
    pub const NAME: &'static str = "HTTP";

    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    /// Credentials found in the body of a request.
    pub fn credentials(&self) -> Option<Credentials> {
        match self.frame.http()? {
            HttpMessage::Request { .. } if !self.frame.payload().is_empty() => {
                extract_credentials(&String::from_utf8_lossy(self.frame.payload()))
            }
            _ => None,
        }
    }
}

impl Summary for HttpPacket<'_> {
    fn brief_summary(&self) -> String {
        let mut out = brief_prefix(Self::NAME, self.frame);
        if let Some(message) = self.frame.http() {
            let label = type_label(message, &self.credentials());
            out.push_str(&format!(" Type: {label}"));
        }
        out.push_str(&size_suffix(self.frame));
        out
    }

    fn detailed_summary(&self) -> String {
        let mut out = header_section(Self::NAME, self.frame);
        if let Some(message) = self.frame.http() {
            let headers = message.headers();
            match message {
                HttpMessage::Response { status, .. } => {
                    out.push_str("Type: Response\n\n");
                    out.push_str(&format!("HTTP Version: {}\n\n", message.version()));
                    out.push_str(&format!("Status Code: {status}\n\n"));
                    out.push_str(&format!(
                        "Content Length: {} bytes\n\n",
                        or_none(message.content_length())
                    ));
                    out.push_str(&fit_str("Server:", headers.get("Server")));
                }
                HttpMessage::Request { method, path, .. } => {
                    let credentials = self.credentials();
                    let url = format!("{}{path}", headers.get("Host").unwrap_or_default());

                    out.push_str(&format!("Type: {}\n\n", type_label(message, &credentials)));
                    out.push_str(&format!("HTTP Version: {}\n\n", message.version()));
                    out.push_str(&format!("Method: {method}\n\n"));
                    out.push_str(&fit_str("URL:", Some(url)));
                    if let Some(creds) = credentials {
                        out.push_str("Login Credentials:\n\n");
                        out.push_str(&fit_str("Username:", Some(creds.username)));
                        out.push_str(&fit_str("Password:", creds.password));
                    }
                    out.push_str(&fit_str("Accept:", headers.get("Accept")));
                    out.push_str(&fit_str("Referer:", headers.get("Referer")));
                }
            }
        }
        out.push_str(&payload_section(self.frame));
        out
    }
}

fn type_label(message: &HttpMessage, credentials: &Option<Credentials>) -> &'static str {
    match (message, credentials) {
        (HttpMessage::Response { .. }, _) => "Response",
        (HttpMessage::Request { .. }, Some(_)) => "Login Request",
        (HttpMessage::Request { .. }, None) => "Request",
    }
}
