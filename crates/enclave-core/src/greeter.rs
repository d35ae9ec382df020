//! Catch-all greeting handler
//!
//! The handler is built explicitly and passed to the server; there is no
//! global route registry.

use bytes::Bytes;

use crate::{Request, Response, ResponseBuilder, StatusCode};

/// Fixed body returned for every request
pub const GREETING: &str = "Hello, Enclave Http server!\n";

/// A request handler invoked for every request the server accepts
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: &Request) -> Response;
}

/// Catch-all handler answering every method and path with a fixed greeting
///
/// The request has zero influence on the response. The content-type matches
/// what Go's `net/http` sniffs for this body, so the wire output is stable
/// across stacks.
#[derive(Debug, Clone)]
pub struct Greeter {
    status: StatusCode,
    body: Bytes,
}

impl Greeter {
    /// Create the greeter with the fixed greeting body
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::from_static(GREETING.as_bytes()),
        }
    }
}

impl Default for Greeter {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for Greeter {
    fn handle(&self, _req: &Request) -> Response {
        ResponseBuilder::new(self.status)
            .header("content-type", "text/plain; charset=utf-8")
            .body(self.body.clone())
            .build()
    }
}
