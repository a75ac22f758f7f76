//! Prelude module for convenient imports.
//!
//! ```ignore
//! use sheath_core::prelude::*;
//! ```

pub use crate::{
    Error, Method, Request, RequestBuilder, RequestUrl, Response, Result, Transport, TransportFn,
    transport_fn,
};
