//! Error types for request dispatch.
//!
//! # Design
//! A request ends in exactly one of two ways: a `Response`, or a
//! `RequestError`. Transport failures carry the transport's numeric code
//! (libcurl numbering for `UreqTransport`) and its human description. HTTP
//! error statuses are not errors at this layer unless the transport was
//! asked to fail on them.

use std::fmt;

/// The transport could not acquire its underlying resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeError(pub String);

impl fmt::Display for InitializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not initialize transport: {}", self.0)
    }
}

impl std::error::Error for InitializeError {}

/// Errors returned by the `Request` verb methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The transport resource could not be acquired.
    Initialize(String),

    /// The transport reported a non-zero error code for the transfer.
    Transfer { description: String, code: i32 },
}

impl RequestError {
    /// Transport error code, or 0 for initialization failures.
    pub fn code(&self) -> i32 {
        match self {
            RequestError::Initialize(_) => 0,
            RequestError::Transfer { code, .. } => *code,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            RequestError::Initialize(msg) => msg,
            RequestError::Transfer { description, .. } => description,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Initialize(msg) => {
                write!(f, "could not initialize transport: {msg}")
            }
            RequestError::Transfer { description, code } => {
                write!(f, "transfer failed ({code}): {description}")
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl From<InitializeError> for RequestError {
    fn from(e: InitializeError) -> Self {
        RequestError::Initialize(e.0)
    }
}
