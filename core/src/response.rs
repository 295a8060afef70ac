//! The successful outcome of a request.

use std::borrow::Cow;
use std::fmt;

use crate::response_info::ResponseInfo;

/// A raw response body paired with its transfer metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    body: Vec<u8>,
    info: ResponseInfo,
}

impl Response {
    pub fn new(body: Vec<u8>, info: ResponseInfo) -> Self {
        Self { body, info }
    }

    pub fn info(&self) -> &ResponseInfo {
        &self.info
    }

    /// The body exactly as the transport returned it.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text. Borrowed when it is valid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
