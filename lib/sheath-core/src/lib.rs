//! Core types and traits for the sheath interception pipeline.
//!
//! This crate provides the foundational types used by sheath:
//! - [`Transport`] - the "request in, response or failure out" capability
//! - [`TransportFn`] - adapter letting a closure act as a [`Transport`]
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`RequestUrl`] - a URL that may still be relative
//! - [`Response`] - HTTP response type
//! - [`Method`] - HTTP method enum
//! - [`Error`] and [`Result`] - Error handling
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)

mod body;
mod error;
mod method;
pub mod prelude;
mod request;
mod request_url;
mod response;
mod transport;

pub use body::{from_json, to_json};
pub use error::{BoxError, Error, Result};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use request_url::{RequestUrl, join_path};
pub use response::Response;
pub use transport::{BoxFuture, Transport, TransportFn, transport_fn};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
