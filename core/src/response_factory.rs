//! Construction of `Response` values from raw transport output.

use crate::response::Response;
use crate::response_info::{Metadata, ResponseInfo};

/// Builds the `Response` handed back by a successful dispatch.
pub trait ResponseFactory {
    fn make(&self, body: Vec<u8>, info: Metadata) -> Response;
}

/// Wraps the metadata in a `ResponseInfo` and pairs it with the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResponseFactory;

impl ResponseFactory for DefaultResponseFactory {
    fn make(&self, body: Vec<u8>, info: Metadata) -> Response {
        Response::new(body, ResponseInfo::new(info))
    }
}
