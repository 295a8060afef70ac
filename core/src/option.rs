//! Transport option keys and values.
//!
//! # Design
//! The option bag is a closed enumeration of keys mapped to a small tagged
//! union of values. Presence in the map is meaningful on its own: an option
//! that is absent and an option set to `false` are different states, and the
//! verb table in `request` relies on that distinction (it *unsets* the POST
//! flag for a GET rather than setting it to `false`).
//!
//! `Options` is a `BTreeMap` so transports apply options in a stable order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered option map handed to a transport on every dispatch.
pub type Options = BTreeMap<RequestOption, OptionValue>;

/// A transport-configurable setting.
///
/// The names follow the libcurl options they model so that anyone who has
/// driven curl can read an option map at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequestOption {
    /// Target URL, including any query string.
    Url,
    /// Method override sent on the request line.
    CustomRequest,
    /// Force a GET request.
    HttpGet,
    /// Force a POST request.
    Post,
    /// Request body as an already-encoded string.
    PostFields,
    /// Request headers as `"Key: Value"` lines.
    HttpHeader,
    /// Authentication scheme, e.g. `"basic"`.
    HttpAuth,
    /// Credentials as `"user:password"`.
    UserPwd,
    /// Verify the peer's TLS certificate.
    SslVerifyPeer,
    /// Verify that the certificate matches the host name.
    SslVerifyHost,
    /// Include the raw response head in the returned body.
    Header,
    /// Return the body instead of writing it to stdout.
    ReturnTransfer,
    /// Treat HTTP statuses >= 400 as transport errors.
    FailOnError,
    /// Follow `Location` redirects.
    FollowLocation,
    /// Maximum number of redirects to follow.
    MaxRedirs,
    /// Whole-request timeout in seconds.
    Timeout,
    /// Whole-request timeout in milliseconds.
    TimeoutMs,
    /// Connect timeout in seconds.
    ConnectTimeout,
    UserAgent,
    Referer,
    /// Raw `Cookie` header value.
    Cookie,
    /// Skip the response body (HEAD request).
    NoBody,
}

impl RequestOption {
    /// The value kind this option accepts.
    pub fn kind(self) -> ValueKind {
        match self {
            RequestOption::Url
            | RequestOption::CustomRequest
            | RequestOption::PostFields
            | RequestOption::HttpAuth
            | RequestOption::UserPwd
            | RequestOption::UserAgent
            | RequestOption::Referer
            | RequestOption::Cookie => ValueKind::Str,
            RequestOption::HttpGet
            | RequestOption::Post
            | RequestOption::SslVerifyPeer
            | RequestOption::SslVerifyHost
            | RequestOption::Header
            | RequestOption::ReturnTransfer
            | RequestOption::FailOnError
            | RequestOption::FollowLocation
            | RequestOption::NoBody => ValueKind::Bool,
            RequestOption::MaxRedirs
            | RequestOption::Timeout
            | RequestOption::TimeoutMs
            | RequestOption::ConnectTimeout => ValueKind::Int,
            RequestOption::HttpHeader => ValueKind::List,
        }
    }
}

impl fmt::Display for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Discriminant of an `OptionValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Bool,
    Int,
    List,
}

/// Value stored against a `RequestOption`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            OptionValue::Bool(_) => ValueKind::Bool,
            OptionValue::Int(_) => ValueKind::Int,
            OptionValue::Str(_) => ValueKind::Str,
            OptionValue::List(_) => ValueKind::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(l: Vec<String>) -> Self {
        OptionValue::List(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_only_match_their_own_kind() {
        let v = OptionValue::from("GET");
        assert_eq!(v.as_str(), Some("GET"));
        assert_eq!(v.as_bool(), None);
        assert_eq!(OptionValue::from(false).as_bool(), Some(false));
        assert_eq!(OptionValue::from(30i64).as_int(), Some(30));
        assert_eq!(
            OptionValue::from(vec!["A: b".to_string()]).as_list(),
            Some(&["A: b".to_string()][..])
        );
    }

    #[test]
    fn option_kinds_match_expected_values() {
        assert_eq!(RequestOption::Url.kind(), ValueKind::Str);
        assert_eq!(RequestOption::HttpGet.kind(), ValueKind::Bool);
        assert_eq!(RequestOption::Timeout.kind(), ValueKind::Int);
        assert_eq!(RequestOption::HttpHeader.kind(), ValueKind::List);
    }

    #[test]
    fn untagged_values_deserialize_from_plain_json() {
        let v: OptionValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, OptionValue::Bool(true));
        let v: OptionValue = serde_json::from_str("12").unwrap();
        assert_eq!(v, OptionValue::Int(12));
        let v: OptionValue = serde_json::from_str(r#""POST""#).unwrap();
        assert_eq!(v, OptionValue::Str("POST".to_string()));
        let v: OptionValue = serde_json::from_str(r#"["X: y"]"#).unwrap();
        assert_eq!(v, OptionValue::List(vec!["X: y".to_string()]));
    }
}
