//! Prelude module for convenient imports.
//!
//! ```ignore
//! use sheath::prelude::*;
//! ```

pub use crate::{
    Error, HyperTransport, Interceptor, Method, Next, Pipeline, Request, RequestBuilder,
    RequestUrl, Response, Result, StatusCode, Transport, TransportConfig, transport_fn,
};
pub use serde::{Deserialize, Serialize};
