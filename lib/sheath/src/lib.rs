//! Request/response interception pipeline for HTTP clients.
//!
//! A [`Pipeline`] holds an ordered list of [`Interceptor`]s in front of a
//! terminal [`Transport`]. Each request goes through a chain built at
//! dispatch time: the first registered interceptor is the outermost one, so
//! it sees the request first and the response last.
//!
//! # Example
//!
//! ```no_run
//! use sheath::prelude::*;
//! use sheath::interceptors::{header, logging, try_base_url};
//!
//! # async fn run() -> sheath::Result<()> {
//! let pipeline = Pipeline::new()
//!     .with(try_base_url("https://api.example.com/v1")?)
//!     .with(header("Accept", "application/json"))
//!     .with(logging());
//!
//! let request = Request::try_builder(Method::Get, "users/42")?.build();
//! let response = pipeline.round_trip(request).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```
//!
//! Custom behavior is written with [`Interceptor::from_fn`],
//! [`Interceptor::new`] or, for existing tower middleware,
//! [`Interceptor::layer`].

mod config;
mod connector;
mod interceptor;
pub mod interceptors;
mod pipeline;
pub mod prelude;
mod service;
mod transport;

pub use config::{TransportConfig, TransportConfigBuilder};
pub use interceptor::{Interceptor, Next};
pub use pipeline::Pipeline;
pub use service::{ServiceTransport, TransportService};
pub use transport::HyperTransport;

// Re-export tower for layer composition
pub use tower;

// Re-export core types
pub use sheath_core::{
    BoxError, BoxFuture, Error, Method, Request, RequestBuilder, RequestUrl, Response, Result,
    Transport, TransportFn, from_json, join_path, to_json, transport_fn,
};

// Re-export http types for status codes and headers
pub use sheath_core::{StatusCode, header};
