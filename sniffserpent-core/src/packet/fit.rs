//! Label/value line wrapping for detailed summaries.

use std::fmt::Display;

/// Values at or above this many characters are broken into rows.
pub const WRAP_WIDTH: usize = 52;

/// Render `label value` as one detailed-summary item.
///
/// Trailing dots are stripped from the value. Long values move to their own
/// line and values of [`WRAP_WIDTH`] characters or more are split into rows
/// of that width. A missing value renders as `None`.
///
/// ```
/// use sniffserpent_core::packet::fit_str;
///
/// assert_eq!(fit_str("Source IP:", Some("192.168.1.1")), "Source IP: 192.168.1.1\n\n");
/// assert_eq!(fit_str::<&str>("Server:", None), "Server: None\n\n");
/// ```
pub fn fit_str<V: Display>(label: &str, value: Option<V>) -> String {
    let Some(value) = value else {
        return format!("{label} None\n\n");
    };
    let value = value.to_string();
    let value = value.trim_end_matches('.');
    let width = value.chars().count();

    if width >= WRAP_WIDTH {
        let chars: Vec<char> = value.chars().collect();
        let rows: Vec<String> = chars
            .chunks(WRAP_WIDTH)
            .map(|row| row.iter().collect())
            .collect();
        format!("{label}\n{}\n\n", rows.join("\n"))
    } else if label.chars().count() + 2 + width >= WRAP_WIDTH {
        format!("{label}\n{value}\n\n")
    } else {
        format!("{label} {value}\n\n")
    }
}

/// [`fit_str`] for list values, joined with `", "`.
pub fn fit_list<I>(label: &str, items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let joined = items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    fit_str(label, Some(joined))
}
