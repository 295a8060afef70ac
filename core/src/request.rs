//! Stateful request builder and dispatcher.
//!
//! # Design
//! `Request` owns an option map that lives as long as the `Request` itself.
//! Verb methods mutate that map according to a fixed table, hand it to the
//! transport, and translate the transport's raw outcome into either a
//! `Response` or a `RequestError`.
//!
//! Two groups of options behave differently across calls:
//! - persistent: the defaults installed by `new`, authentication, and
//!   anything set through `set_option`. These stay until unset.
//! - request-scoped: URL, body and headers. Every verb call sets or clears
//!   them, so nothing leaks from one call into the next.
//!
//! The transport is closed after every dispatch, whatever the outcome.

use tracing::{debug, warn};

use crate::error::RequestError;
use crate::http::HttpMethod;
use crate::option::{OptionValue, Options, RequestOption};
use crate::params::Params;
use crate::parser::{FormOptionParser, OptionParser};
use crate::response::Response;
use crate::response_factory::{DefaultResponseFactory, ResponseFactory};
use crate::transport::Transport;

/// Value of `RequestOption::HttpAuth` for HTTP basic authentication.
pub const AUTH_BASIC: &str = "basic";

/// A reusable HTTP request over a `Transport`.
///
/// Calls must be serialized; every verb method takes `&mut self`.
#[derive(Debug)]
pub struct Request<T, P = FormOptionParser, F = DefaultResponseFactory> {
    transport: T,
    parser: P,
    factory: F,
    options: Options,
}

impl<T: Transport> Request<T> {
    /// Build a request with the form encoder and the default response
    /// factory.
    pub fn with_transport(transport: T) -> Self {
        Self::new(transport, FormOptionParser, DefaultResponseFactory)
    }
}

impl<T, P, F> Request<T, P, F>
where
    T: Transport,
    P: OptionParser,
    F: ResponseFactory,
{
    pub fn new(transport: T, parser: P, factory: F) -> Self {
        let mut request = Self {
            transport,
            parser,
            factory,
            options: Options::new(),
        };
        request.set_default_options();
        request
    }

    pub fn get(&mut self, url: &str, data: &Params, headers: &Params) -> Result<Response, RequestError> {
        self.request(HttpMethod::Get, url, data, headers)
    }

    pub fn post(&mut self, url: &str, data: &Params, headers: &Params) -> Result<Response, RequestError> {
        self.request(HttpMethod::Post, url, data, headers)
    }

    pub fn put(&mut self, url: &str, data: &Params, headers: &Params) -> Result<Response, RequestError> {
        self.request(HttpMethod::Put, url, data, headers)
    }

    pub fn patch(&mut self, url: &str, data: &Params, headers: &Params) -> Result<Response, RequestError> {
        self.request(HttpMethod::Patch, url, data, headers)
    }

    pub fn delete(&mut self, url: &str, data: &Params, headers: &Params) -> Result<Response, RequestError> {
        self.request(HttpMethod::Delete, url, data, headers)
    }

    /// Apply the option rules for `method` and dispatch.
    ///
    /// GET sends `data` as a query string and never as a body; every other
    /// method sends it form-encoded as the body.
    pub fn request(
        &mut self,
        method: HttpMethod,
        url: &str,
        data: &Params,
        headers: &Params,
    ) -> Result<Response, RequestError> {
        match method {
            HttpMethod::Get => {
                let url = self.parser.parse_url(url, data);
                self.unset_option(RequestOption::Post);
                self.set_option(RequestOption::CustomRequest, method.as_str());
                self.set_option(RequestOption::HttpGet, true);
                self.send(url, &Params::new(), headers)
            }
            HttpMethod::Post => {
                self.unset_option(RequestOption::HttpGet);
                self.set_option(RequestOption::CustomRequest, method.as_str());
                self.set_option(RequestOption::Post, true);
                self.send(url.to_string(), data, headers)
            }
            HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete => {
                self.unset_options(&[RequestOption::HttpGet, RequestOption::Post]);
                self.set_option(RequestOption::CustomRequest, method.as_str());
                self.send(url.to_string(), data, headers)
            }
        }
    }

    /// Set or overwrite an option.
    pub fn set_option(&mut self, key: RequestOption, value: impl Into<OptionValue>) {
        self.options.insert(key, value.into());
    }

    pub fn set_options<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = (RequestOption, OptionValue)>,
    {
        self.options.extend(options);
    }

    /// Remove an option. Removing an absent option does nothing.
    pub fn unset_option(&mut self, key: RequestOption) {
        self.options.remove(&key);
    }

    pub fn unset_options(&mut self, keys: &[RequestOption]) {
        for key in keys {
            self.unset_option(*key);
        }
    }

    pub fn is_option_set(&self, key: RequestOption) -> bool {
        self.options.contains_key(&key)
    }

    pub fn option_value(&self, key: RequestOption) -> Option<&OptionValue> {
        self.options.get(&key)
    }

    /// The option map as it will be handed to the transport.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_basic_authentication(&mut self, username: &str, password: &str) {
        self.set_option(RequestOption::HttpAuth, AUTH_BASIC);
        self.set_option(RequestOption::UserPwd, format!("{username}:{password}"));
    }

    pub fn unset_basic_authentication(&mut self) {
        self.unset_options(&[RequestOption::HttpAuth, RequestOption::UserPwd]);
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn set_default_options(&mut self) {
        self.set_options([
            (RequestOption::SslVerifyPeer, OptionValue::Bool(true)),
            (RequestOption::Header, OptionValue::Bool(false)),
            (RequestOption::ReturnTransfer, OptionValue::Bool(true)),
            (RequestOption::FailOnError, OptionValue::Bool(false)),
        ]);
    }

    fn set_data(&mut self, data: &Params) {
        if data.is_empty() {
            self.unset_option(RequestOption::PostFields);
        } else {
            let body = self.parser.parse_data(data);
            self.set_option(RequestOption::PostFields, body);
        }
    }

    fn set_headers(&mut self, headers: &Params) {
        if headers.is_empty() {
            self.unset_option(RequestOption::HttpHeader);
        } else {
            let lines = self.parser.parse_headers(headers);
            self.set_option(RequestOption::HttpHeader, lines);
        }
    }

    fn send(&mut self, url: String, data: &Params, headers: &Params) -> Result<Response, RequestError> {
        self.set_option(RequestOption::Url, url);
        self.set_data(data);
        self.set_headers(headers);
        self.execute()
    }

    fn execute(&mut self) -> Result<Response, RequestError> {
        debug!(
            method = ?self.option_value(RequestOption::CustomRequest),
            url = ?self.option_value(RequestOption::Url),
            "dispatching request"
        );

        let raw = match self.transport.send_request(&self.options) {
            Ok(raw) => raw,
            Err(e) => {
                self.transport.close();
                warn!(error = %e, "transport initialization failed");
                return Err(e.into());
            }
        };

        let info = self.transport.request_info();
        let code = self.transport.error_code();
        let description = self.transport.error_description();

        self.transport.close();

        if code > 0 {
            warn!(code, %description, "transfer failed");
            return Err(RequestError::Transfer { description, code });
        }

        Ok(self.factory.make(raw.unwrap_or_default(), info))
    }
}
