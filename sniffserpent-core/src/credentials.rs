//! Plaintext login credential spotting in form-encoded request bodies.

use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// Field names that commonly carry a user name, checked in order.
pub const USERNAME_LABELS: &[&str] = &[
    "username", "Username", "UserName", "user", "User", "uname", "Uname", "usr", "Usr", "email",
    "Email", "login", "Login", "usrname", "Usrname", "uid", "Uid",
];

/// Field names that commonly carry a password, checked in order.
pub const PASSWORD_LABELS: &[&str] = &[
    "password", "Password", "pass", "Pass", "pwd", "Pwd", "passwd", "Passwd", "pswd", "psw",
    "secret", "Secret", "secure", "Secure", "key", "Key", "auth", "Auth",
];

/// A user name and, when one was found, its password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

struct LabelPattern {
    label: &'static str,
    upper: String,
    re: Regex,
}

fn compile(labels: &'static [&'static str]) -> Vec<LabelPattern> {
    labels
        .iter()
        .filter_map(|label| {
            let re = Regex::new(&format!("{}=([^&]+)", regex::escape(label))).ok()?;
            Some(LabelPattern {
                label,
                upper: label.to_uppercase(),
                re,
            })
        })
        .collect()
}

fn username_patterns() -> &'static [LabelPattern] {
    static PATTERNS: OnceLock<Vec<LabelPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(USERNAME_LABELS))
}

fn password_patterns() -> &'static [LabelPattern] {
    static PATTERNS: OnceLock<Vec<LabelPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile(PASSWORD_LABELS))
}

/// First `label=value` hit in `payload`, percent-decoded.
///
/// A label is only tried when it (or its upper-case form) occurs somewhere
/// in the payload.
fn first_match(patterns: &[LabelPattern], payload: &str) -> Option<String> {
    patterns
        .iter()
        .filter(|p| payload.contains(p.label) || payload.contains(p.upper.as_str()))
        .find_map(|p| p.re.captures(payload))
        .and_then(|caps| caps.get(1))
        .map(|value| percent_decode_str(value.as_str()).decode_utf8_lossy().into_owned())
}

/// Look for a user name, then a password, in a request body.
///
/// Returns `None` unless a user name is found.
///
/// ```
/// use sniffserpent_core::credentials::extract_credentials;
///
/// let creds = extract_credentials("username=alice&password=sECr3t").unwrap();
/// assert_eq!(creds.username, "alice");
/// assert_eq!(creds.password.as_deref(), Some("sECr3t"));
/// ```
pub fn extract_credentials(payload: &str) -> Option<Credentials> {
    let username = first_match(username_patterns(), payload)?;
    let password = first_match(password_patterns(), payload);
    Some(Credentials { username, password })
}
