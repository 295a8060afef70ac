//! A `Transport` that executes option maps with `ureq`.
//!
//! # Design
//! The "resource" is a `Handle`: the options applied so far plus the outcome
//! of the last transfer. A fresh `ureq::Agent` is configured from the
//! applied options on every send, so nothing from the agent outlives a
//! transfer.
//!
//! Error codes use the libcurl numbering so callers matching on
//! `RequestError::code` see familiar values.

use std::io::Write;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value};
use tracing::{debug, trace};
use ureq::tls::TlsConfig;
use ureq::{Agent, RequestBuilder, ResponseExt};

use crate::error::InitializeError;
use crate::option::{OptionValue, Options, RequestOption};
use crate::request::AUTH_BASIC;
use crate::response_info::Metadata;
use crate::transport::Transport;

pub const UNSUPPORTED_PROTOCOL: i32 = 1;
pub const FAILED_INIT: i32 = 2;
pub const URL_MALFORMAT: i32 = 3;
pub const COULDNT_RESOLVE_HOST: i32 = 6;
pub const COULDNT_CONNECT: i32 = 7;
pub const HTTP_RETURNED_ERROR: i32 = 22;
pub const OPERATION_TIMEDOUT: i32 = 28;
pub const SSL_CONNECT_ERROR: i32 = 35;
pub const BAD_FUNCTION_ARGUMENT: i32 = 43;
pub const TOO_MANY_REDIRECTS: i32 = 47;
pub const RECV_ERROR: i32 = 56;

/// Generic libcurl text for an error code.
pub fn strerror(code: i32) -> &'static str {
    match code {
        0 => "No error",
        UNSUPPORTED_PROTOCOL => "Unsupported protocol",
        FAILED_INIT => "Failed initialization",
        URL_MALFORMAT => "URL using bad/illegal format or missing URL",
        COULDNT_RESOLVE_HOST => "Couldn't resolve host name",
        COULDNT_CONNECT => "Couldn't connect to server",
        HTTP_RETURNED_ERROR => "HTTP response code said error",
        OPERATION_TIMEDOUT => "Timeout was reached",
        SSL_CONNECT_ERROR => "SSL connect error",
        BAD_FUNCTION_ARGUMENT => "A libcurl function was given a bad argument",
        TOO_MANY_REDIRECTS => "Number of redirects hit maximum amount",
        RECV_ERROR => "Failure when receiving data from the peer",
        _ => "Unknown error",
    }
}

/// Redirect limit used when `FollowLocation` is on and `MaxRedirs` is not set.
const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// RFC 3986 unreserved characters stay literal, everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

#[derive(Debug, Default)]
struct Handle {
    options: Options,
    response: Option<Vec<u8>>,
    info: Metadata,
    error: Option<TransferError>,
}

#[derive(Debug, Clone, PartialEq)]
struct TransferError {
    code: i32,
    description: String,
}

impl TransferError {
    fn new(code: i32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

struct Transfer {
    body: Vec<u8>,
    info: Metadata,
}

/// Blocking HTTP transport backed by `ureq`.
#[derive(Debug, Default)]
pub struct UreqTransport {
    handle: Option<Handle>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of this crate. `ureq` exposes no runtime version, so this
    /// stands in for the transport library version.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn handle_mut(&mut self) -> Result<&mut Handle, InitializeError> {
        if self.handle.is_none() {
            self.initialize()?;
        }
        self.handle
            .as_mut()
            .ok_or_else(|| InitializeError("handle missing after initialize".to_string()))
    }

    /// Apply `options`, returning the first rejected key.
    fn apply(&mut self, options: &Options) -> Result<Result<(), RequestOption>, InitializeError> {
        for (key, value) in options {
            if !self.set_option(*key, value)? {
                return Ok(Err(*key));
            }
        }
        Ok(Ok(()))
    }
}

impl Transport for UreqTransport {
    fn initialize(&mut self) -> Result<(), InitializeError> {
        if self.handle.is_some() {
            self.close();
        }
        trace!("acquiring transport handle");
        self.handle = Some(Handle::default());
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    fn set_option(&mut self, key: RequestOption, value: &OptionValue) -> Result<bool, InitializeError> {
        let handle = self.handle_mut()?;
        if value.kind() != key.kind() {
            trace!(option = %key, ?value, "rejected option value");
            return Ok(false);
        }
        handle.options.insert(key, value.clone());
        Ok(true)
    }

    fn set_options(&mut self, options: &Options) -> Result<bool, InitializeError> {
        Ok(self.apply(options)?.is_ok())
    }

    fn send_request(&mut self, options: &Options) -> Result<Option<Vec<u8>>, InitializeError> {
        {
            let handle = self.handle_mut()?;
            handle.response = None;
            handle.info = Metadata::new();
            handle.error = None;
        }

        if let Err(key) = self.apply(options)? {
            let handle = self.handle_mut()?;
            handle.error = Some(TransferError::new(
                BAD_FUNCTION_ARGUMENT,
                format!("invalid value for option {key}"),
            ));
            return Ok(None);
        }

        let handle = self.handle_mut()?;
        match perform(&handle.options) {
            Ok(transfer) => {
                handle.info = transfer.info;
                handle.response = Some(transfer.body);
                Ok(handle.response.clone())
            }
            Err((error, info)) => {
                debug!(code = error.code, description = %error.description, "transfer failed");
                handle.info = info;
                handle.error = Some(error);
                Ok(None)
            }
        }
    }

    fn response(&self) -> Option<&[u8]> {
        self.handle.as_ref().and_then(|h| h.response.as_deref())
    }

    fn request_info(&self) -> Metadata {
        self.handle
            .as_ref()
            .map(|h| h.info.clone())
            .unwrap_or_default()
    }

    fn request_info_value(&self, key: &str) -> Option<Value> {
        self.handle.as_ref().and_then(|h| h.info.get(key).cloned())
    }

    fn error_code(&self) -> i32 {
        self.handle
            .as_ref()
            .and_then(|h| h.error.as_ref())
            .map_or(0, |e| e.code)
    }

    fn error_description(&self) -> String {
        self.handle
            .as_ref()
            .and_then(|h| h.error.as_ref())
            .map(|e| e.description.clone())
            .unwrap_or_default()
    }

    fn error(&self) -> String {
        strerror(self.error_code()).to_string()
    }

    fn close(&mut self) {
        if self.handle.take().is_some() {
            trace!("released transport handle");
        }
    }

    fn url_encode(&self, input: &str) -> String {
        utf8_percent_encode(input, UNRESERVED).to_string()
    }

    fn url_decode(&self, input: &str) -> String {
        percent_decode_str(input).decode_utf8_lossy().into_owned()
    }

    fn reset(&mut self) -> Result<(), InitializeError> {
        match self.handle.as_mut() {
            Some(handle) => {
                *handle = Handle::default();
                Ok(())
            }
            None => self.initialize(),
        }
    }
}

impl Drop for UreqTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn flag(options: &Options, key: RequestOption) -> Option<bool> {
    options.get(&key).and_then(OptionValue::as_bool)
}

fn text(options: &Options, key: RequestOption) -> Option<&str> {
    options.get(&key).and_then(OptionValue::as_str)
}

fn int(options: &Options, key: RequestOption) -> Option<i64> {
    options.get(&key).and_then(OptionValue::as_int)
}

/// Request method implied by the options, in libcurl precedence order.
fn method(options: &Options) -> String {
    if let Some(custom) = text(options, RequestOption::CustomRequest) {
        return custom.to_ascii_uppercase();
    }
    if flag(options, RequestOption::NoBody) == Some(true) {
        return "HEAD".to_string();
    }
    if flag(options, RequestOption::HttpGet) == Some(true) {
        return "GET".to_string();
    }
    if flag(options, RequestOption::Post) == Some(true) || options.contains_key(&RequestOption::PostFields) {
        return "POST".to_string();
    }
    "GET".to_string()
}

/// Request headers implied by the options.
fn headers(options: &Options, has_body: bool) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    if let Some(lines) = options.get(&RequestOption::HttpHeader).and_then(OptionValue::as_list) {
        for line in lines {
            match line.split_once(':') {
                Some((name, value)) => headers.push((name.trim().to_string(), value.trim().to_string())),
                None => trace!(%line, "skipping header line without a colon"),
            }
        }
    }

    let mut push_unless_present = |name: &str, value: String| {
        if !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
            headers.push((name.to_string(), value));
        }
    };
    if let Some(agent) = text(options, RequestOption::UserAgent) {
        push_unless_present("User-Agent", agent.to_string());
    }
    if let Some(referer) = text(options, RequestOption::Referer) {
        push_unless_present("Referer", referer.to_string());
    }
    if let Some(cookie) = text(options, RequestOption::Cookie) {
        push_unless_present("Cookie", cookie.to_string());
    }
    if text(options, RequestOption::HttpAuth).is_some_and(|a| a.eq_ignore_ascii_case(AUTH_BASIC)) {
        if let Some(credentials) = text(options, RequestOption::UserPwd) {
            push_unless_present("Authorization", format!("Basic {}", STANDARD.encode(credentials)));
        }
    }
    if has_body {
        push_unless_present("Content-Type", "application/x-www-form-urlencoded".to_string());
    }
    headers
}

/// Redirects to follow. A negative `MaxRedirs` means no limit.
fn redirect_limit(options: &Options) -> u32 {
    if flag(options, RequestOption::FollowLocation) != Some(true) {
        return 0;
    }
    match int(options, RequestOption::MaxRedirs) {
        Some(n) if n < 0 => u32::MAX,
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
        None => DEFAULT_MAX_REDIRECTS,
    }
}

fn agent(options: &Options) -> Agent {
    let max_redirects = redirect_limit(options);

    let timeout = int(options, RequestOption::TimeoutMs)
        .and_then(|ms| u64::try_from(ms).ok())
        .map(Duration::from_millis)
        .or_else(|| {
            int(options, RequestOption::Timeout)
                .and_then(|s| u64::try_from(s).ok())
                .map(Duration::from_secs)
        })
        .filter(|d| !d.is_zero());
    let connect_timeout = int(options, RequestOption::ConnectTimeout)
        .and_then(|s| u64::try_from(s).ok())
        .map(Duration::from_secs)
        .filter(|d| !d.is_zero());

    let verify = flag(options, RequestOption::SslVerifyPeer) != Some(false)
        && flag(options, RequestOption::SslVerifyHost) != Some(false);

    let mut config = Agent::config_builder()
        .http_status_as_error(flag(options, RequestOption::FailOnError) == Some(true))
        .max_redirects(max_redirects)
        .timeout_global(timeout)
        .timeout_connect(connect_timeout);
    if !verify {
        config = config.tls_config(TlsConfig::builder().disable_verification(true).build());
    }
    config.build().new_agent()
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Map a `ureq` failure onto the libcurl error numbering.
fn classify(error: &ureq::Error) -> TransferError {
    use std::io::ErrorKind;

    let code = match error {
        ureq::Error::StatusCode(status) => {
            return TransferError::new(
                HTTP_RETURNED_ERROR,
                format!("The requested URL returned error: {status}"),
            )
        }
        ureq::Error::BadUri(_) => URL_MALFORMAT,
        ureq::Error::HostNotFound => COULDNT_RESOLVE_HOST,
        ureq::Error::ConnectionFailed => COULDNT_CONNECT,
        ureq::Error::Timeout(_) => OPERATION_TIMEDOUT,
        ureq::Error::Tls(_) => SSL_CONNECT_ERROR,
        ureq::Error::TooManyRedirects => TOO_MANY_REDIRECTS,
        ureq::Error::Io(e) => match e.kind() {
            ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable => COULDNT_CONNECT,
            ErrorKind::TimedOut => OPERATION_TIMEDOUT,
            _ => RECV_ERROR,
        },
        _ => FAILED_INIT,
    };
    TransferError::new(code, error.to_string())
}

fn seconds(d: Duration) -> f64 {
    d.as_secs_f64()
}

fn speed(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 / secs
    } else {
        0.0
    }
}

/// Execute one transfer described by `options`.
///
/// On failure the returned metadata still carries whatever was known (the
/// URL and elapsed time at minimum).
fn perform(options: &Options) -> Result<Transfer, (TransferError, Metadata)> {
    let mut info = Metadata::new();

    let Some(url) = text(options, RequestOption::Url) else {
        return Err((TransferError::new(URL_MALFORMAT, "No URL set"), info));
    };
    info.insert("url".to_string(), json!(url));

    let parsed = match url::Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Err((
                TransferError::new(URL_MALFORMAT, format!("URL rejected: {e}")),
                info,
            ))
        }
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err((
            TransferError::new(
                UNSUPPORTED_PROTOCOL,
                format!("Protocol \"{}\" not supported", parsed.scheme()),
            ),
            info,
        ));
    }

    let method = method(options);
    let body: &[u8] = match method.as_str() {
        "GET" | "HEAD" => &[],
        _ => text(options, RequestOption::PostFields).map_or(&[][..], str::as_bytes),
    };
    let headers = headers(options, !body.is_empty());
    let agent = agent(options);

    trace!(%method, %url, body_len = body.len(), "starting transfer");
    let started = Instant::now();
    let result = match method.as_str() {
        "GET" => with_headers(agent.get(url), &headers).call(),
        "HEAD" => with_headers(agent.head(url), &headers).call(),
        "DELETE" if body.is_empty() => with_headers(agent.delete(url), &headers).call(),
        "DELETE" => with_headers(agent.delete(url), &headers).force_send_body().send(body),
        "POST" => with_headers(agent.post(url), &headers).send(body),
        "PUT" => with_headers(agent.put(url), &headers).send(body),
        "PATCH" => with_headers(agent.patch(url), &headers).send(body),
        other => {
            let mut builder = ureq::http::Request::builder().method(other).uri(url);
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match builder.body(body) {
                Ok(request) => agent.run(request),
                Err(e) => {
                    info.insert("total_time".to_string(), json!(seconds(started.elapsed())));
                    return Err((TransferError::new(BAD_FUNCTION_ARGUMENT, e.to_string()), info));
                }
            }
        }
    };
    let first_byte = started.elapsed();

    let mut response = match result {
        Ok(response) => response,
        Err(e) => {
            if let ureq::Error::StatusCode(status) = &e {
                info.insert("http_code".to_string(), json!(status));
            }
            info.insert("total_time".to_string(), json!(seconds(first_byte)));
            return Err((classify(&e), info));
        }
    };

    let status = response.status().as_u16();
    if flag(options, RequestOption::FollowLocation) == Some(true)
        && response.status().is_redirection()
        && response.headers().contains_key("location")
    {
        info.insert("http_code".to_string(), json!(status));
        info.insert("total_time".to_string(), json!(seconds(first_byte)));
        return Err((
            TransferError::new(
                TOO_MANY_REDIRECTS,
                format!("Maximum ({}) redirects followed", redirect_limit(options)),
            ),
            info,
        ));
    }
    let mut head = format!("{:?} {}\r\n", response.version(), response.status());
    for (name, value) in response.headers() {
        head.push_str(&format!("{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes())));
    }
    head.push_str("\r\n");

    let content_type = response
        .headers()
        .get("content-type")
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let content_length = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(-1.0);
    let effective_url = response.get_uri().to_string();

    let mut downloaded = if method == "HEAD" {
        Vec::new()
    } else {
        match response.body_mut().read_to_vec() {
            Ok(bytes) => bytes,
            Err(e) => {
                info.insert("http_code".to_string(), json!(status));
                info.insert("total_time".to_string(), json!(seconds(started.elapsed())));
                return Err((classify(&e), info));
            }
        }
    };
    let total = started.elapsed();

    info.insert("url".to_string(), json!(effective_url));
    if let Some(content_type) = content_type {
        info.insert("content_type".to_string(), json!(content_type));
    }
    info.insert("http_code".to_string(), json!(status));
    info.insert("header_size".to_string(), json!(head.len()));
    info.insert("total_time".to_string(), json!(seconds(total)));
    info.insert("starttransfer_time".to_string(), json!(seconds(first_byte)));
    info.insert("size_download".to_string(), json!(downloaded.len() as f64));
    info.insert("download_content_length".to_string(), json!(content_length));
    info.insert("speed_download".to_string(), json!(speed(downloaded.len(), total)));
    info.insert("size_upload".to_string(), json!(body.len() as f64));
    info.insert("upload_content_length".to_string(), json!(body.len() as f64));
    info.insert("speed_upload".to_string(), json!(speed(body.len(), first_byte)));

    debug!(%method, url = %effective_url, status, bytes = downloaded.len(), "transfer complete");

    if flag(options, RequestOption::Header) == Some(true) {
        let mut with_head = head.into_bytes();
        with_head.append(&mut downloaded);
        downloaded = with_head;
    }

    if flag(options, RequestOption::ReturnTransfer) == Some(false) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(&downloaded).and_then(|()| stdout.flush()) {
            return Err((TransferError::new(RECV_ERROR, format!("failed writing body: {e}")), info));
        }
        downloaded = Vec::new();
    }

    Ok(Transfer { body: downloaded, info })
}
