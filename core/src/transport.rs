//! The transport boundary.
//!
//! # Design
//! `Request` never touches the network. It hands its option map to a
//! `Transport`, which owns the connection resource, performs the transfer
//! and reports the outcome as raw data: a body, a metadata map, and an error
//! code/description pair where code 0 means success.
//!
//! The resource is acquired lazily (first option set or send) and released
//! by `close`, which must be idempotent. Implementations should also release
//! it on drop.

use serde_json::Value;

use crate::error::InitializeError;
use crate::option::{OptionValue, Options, RequestOption};
use crate::response_info::Metadata;

pub trait Transport {
    /// Acquire a fresh resource, releasing any existing one first.
    fn initialize(&mut self) -> Result<(), InitializeError>;

    fn is_initialized(&self) -> bool;

    /// Apply one option. Returns `false` if the transport rejects it.
    fn set_option(&mut self, key: RequestOption, value: &OptionValue) -> Result<bool, InitializeError>;

    /// Apply every option in `options`, stopping at the first rejection.
    fn set_options(&mut self, options: &Options) -> Result<bool, InitializeError>;

    /// Apply `options` and execute the transfer.
    ///
    /// `Ok(None)` is the failure sentinel: either an option was rejected (the
    /// transfer is not attempted) or the transfer itself failed. Details are
    /// available from `error_code` / `error_description`.
    ///
    /// Options applied by earlier calls are not reset.
    fn send_request(&mut self, options: &Options) -> Result<Option<Vec<u8>>, InitializeError>;

    /// Body of the last successful transfer.
    fn response(&self) -> Option<&[u8]>;

    /// Metadata of the last transfer; empty when nothing is acquired.
    fn request_info(&self) -> Metadata;

    /// One metadata value of the last transfer.
    fn request_info_value(&self, key: &str) -> Option<Value> {
        self.request_info().get(key).cloned()
    }

    /// Error code of the last transfer, 0 on success or when unacquired.
    fn error_code(&self) -> i32;

    /// Error description of the last transfer, empty on success.
    fn error_description(&self) -> String;

    /// Generic message for the last error code, independent of the
    /// transfer that produced it.
    fn error(&self) -> String;

    /// Release the resource. Safe to call repeatedly.
    fn close(&mut self);

    /// Percent-encode `input`, keeping only RFC 3986 unreserved characters.
    fn url_encode(&self, input: &str) -> String;

    fn url_decode(&self, input: &str) -> String;

    /// Drop applied options and the last response, keeping the resource.
    fn reset(&mut self) -> Result<(), InitializeError>;
}
