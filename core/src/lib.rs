//! Stateful HTTP request builder over a pluggable transport.
//!
//! # Overview
//! A `Request` accumulates transport options across its lifetime, applies
//! per-verb conventions (GET/POST/PUT/PATCH/DELETE), dispatches the option
//! map through a `Transport`, and turns the transport's raw outcome into a
//! `Response` or a `RequestError`.
//!
//! # Design
//! - `Request` never performs I/O itself. The `Transport` owns the
//!   connection resource and reports body, metadata and error code as plain
//!   data, keeping the option-derivation rules deterministic and testable
//!   with a fake transport.
//! - Options are a closed enum of keys with a tagged-union value, so the verb
//!   table is checked at compile time.
//! - Collaborators (`Transport`, `OptionParser`, `ResponseFactory`) are
//!   traits injected at construction; `UreqTransport`, `FormOptionParser`
//!   and `DefaultResponseFactory` are the stock implementations.
//!
//! ```no_run
//! use request_core::{Params, Request, UreqTransport};
//!
//! let mut request = Request::with_transport(UreqTransport::new());
//! let response = request.get(
//!     "http://localhost:3000/echo",
//!     &Params::from([("q", "rust")]),
//!     &Params::new(),
//! )?;
//! println!("{} -> {:?}", response, response.info().http_code());
//! # Ok::<(), request_core::RequestError>(())
//! ```

pub mod error;
pub mod http;
pub mod option;
pub mod params;
pub mod parser;
pub mod request;
pub mod response;
pub mod response_factory;
pub mod response_info;
pub mod transport;
pub mod ureq_transport;

pub use error::{InitializeError, RequestError};
pub use http::HttpMethod;
pub use option::{OptionValue, Options, RequestOption, ValueKind};
pub use params::Params;
pub use parser::{FormOptionParser, OptionParser};
pub use request::{Request, AUTH_BASIC};
pub use response::Response;
pub use response_factory::{DefaultResponseFactory, ResponseFactory};
pub use response_info::{Metadata, ResponseInfo};
pub use transport::Transport;
pub use ureq_transport::UreqTransport;
