//! enclave-core: HTTP greeting server core
//!
//! A single catch-all handler served over HTTP/1.1 with tokio/hyper.
//! The binary crate wires this together; everything here is usable
//! from tests without a process boundary.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod greeter;
pub mod request;
pub mod response;
pub mod server;

// Re-exports
pub use error::{Error, Result};
pub use greeter::{Greeter, Handler, GREETING};
pub use request::{Method, Request};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use server::{Server, ServerConfig};
