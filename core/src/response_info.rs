//! Read-only view over transfer metadata.

use serde_json::{Map, Value};

/// Metadata reported by a transport after a transfer, keyed by the libcurl
/// `curl_getinfo` names (`http_code`, `total_time`, ...).
pub type Metadata = Map<String, Value>;

/// Typed accessors over a `Metadata` snapshot.
///
/// Every accessor returns `None` when the key is absent or holds a value of
/// another type; none of them panic. Use `get` or `list` for keys without a
/// named accessor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseInfo {
    info: Metadata,
}

impl ResponseInfo {
    pub fn new(info: Metadata) -> Self {
        Self { info }
    }

    /// Effective URL after redirects.
    pub fn url(&self) -> Option<&str> {
        self.str("url")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.str("content_type")
    }

    pub fn http_code(&self) -> Option<u16> {
        self.uint("http_code").and_then(|c| u16::try_from(c).ok())
    }

    pub fn header_size(&self) -> Option<u64> {
        self.uint("header_size")
    }

    pub fn cert_info(&self) -> Option<&Value> {
        self.info.get("certinfo")
    }

    pub fn ssl_verify_result(&self) -> Option<i64> {
        self.int("ssl_verify_result")
    }

    pub fn redirect_count(&self) -> Option<u64> {
        self.uint("redirect_count")
    }

    /// Total transfer time in seconds.
    pub fn total_time(&self) -> Option<f64> {
        self.float("total_time")
    }

    pub fn name_lookup_time(&self) -> Option<f64> {
        self.float("namelookup_time")
    }

    pub fn connect_time(&self) -> Option<f64> {
        self.float("connect_time")
    }

    pub fn pre_transfer_time(&self) -> Option<f64> {
        self.float("pretransfer_time")
    }

    pub fn start_transfer_time(&self) -> Option<f64> {
        self.float("starttransfer_time")
    }

    pub fn redirect_time(&self) -> Option<f64> {
        self.float("redirect_time")
    }

    /// Remote file time as a Unix timestamp, -1 when unknown.
    pub fn file_time(&self) -> Option<i64> {
        self.int("filetime")
    }

    pub fn request_size(&self) -> Option<u64> {
        self.uint("request_size")
    }

    pub fn download_size(&self) -> Option<f64> {
        self.float("size_download")
    }

    /// `Content-Length` of the download, -1 when unknown.
    pub fn download_content_length(&self) -> Option<f64> {
        self.float("download_content_length")
    }

    /// Average download speed in bytes per second.
    pub fn download_speed(&self) -> Option<f64> {
        self.float("speed_download")
    }

    pub fn upload_size(&self) -> Option<f64> {
        self.float("size_upload")
    }

    pub fn upload_content_length(&self) -> Option<f64> {
        self.float("upload_content_length")
    }

    pub fn upload_speed(&self) -> Option<f64> {
        self.float("speed_upload")
    }

    /// Raw value for any key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.info.get(key)
    }

    /// The full metadata map.
    pub fn list(&self) -> &Metadata {
        &self.info
    }

    fn str(&self, key: &str) -> Option<&str> {
        self.info.get(key).and_then(Value::as_str)
    }

    fn uint(&self, key: &str) -> Option<u64> {
        self.info.get(key).and_then(Value::as_u64)
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.info.get(key).and_then(Value::as_i64)
    }

    fn float(&self, key: &str) -> Option<f64> {
        self.info.get(key).and_then(Value::as_f64)
    }
}

impl From<Metadata> for ResponseInfo {
    fn from(info: Metadata) -> Self {
        Self::new(info)
    }
}
