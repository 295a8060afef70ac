//! Encoders that turn request data and headers into option values.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::params::Params;

/// RFC 1738 form escaping: only alphanumerics and `-._` stay literal.
const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// Escape one key or value, writing spaces as `+`.
fn form_escape(input: &str) -> String {
    input
        .split(' ')
        .map(|part| utf8_percent_encode(part, FORM).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Converts caller-supplied data and headers into the string forms stored
/// in the option map.
pub trait OptionParser {
    /// Append `data` to `url` as a query string. `url` is returned unchanged
    /// when `data` is empty.
    fn parse_url(&self, url: &str, data: &Params) -> String;

    /// Form-encode `data` as `k1=v1&k2=v2`.
    fn parse_data(&self, data: &Params) -> String;

    /// Render `headers` as `"Key: Value"` lines.
    fn parse_headers(&self, headers: &Params) -> Vec<String>;
}

/// `application/x-www-form-urlencoded` implementation of `OptionParser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormOptionParser;

impl OptionParser for FormOptionParser {
    fn parse_url(&self, url: &str, data: &Params) -> String {
        if data.is_empty() {
            return url.to_string();
        }
        format!("{url}?{}", self.parse_data(data))
    }

    fn parse_data(&self, data: &Params) -> String {
        data.iter()
            .map(|(key, value)| format!("{}={}", form_escape(key), form_escape(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn parse_headers(&self, headers: &Params) -> Vec<String> {
        headers.iter().map(|(key, value)| format!("{key}: {value}")).collect()
    }
}
