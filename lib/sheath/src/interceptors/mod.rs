//! Ready-made interceptors.
//!
//! | Factory | Effect |
//! |---------|--------|
//! | [`base_url`] / [`try_base_url`] | Resolves scheme-less request URLs against a base URL |
//! | [`header`] | Sets (or overwrites) a header |
//! | [`bearer_auth`] | Sets `Authorization: Bearer <token>` |
//! | [`logging`] / [`debug_logging`] | Logs each exchange with `tracing` |
//!
//! Interceptors run in registration order on the way out and in reverse order
//! on the way back:
//!
//! ```ignore
//! use sheath::Pipeline;
//! use sheath::interceptors::{bearer_auth, logging, try_base_url};
//!
//! let pipeline = Pipeline::new()
//!     .with(try_base_url("https://api.example.com/v1")?)
//!     .with(bearer_auth("my-token"))
//!     .with(logging());
//! ```
//!
//! Tower layers plug in through [`Interceptor::layer`](crate::Interceptor::layer).

mod base_url;
mod header;
mod logging;

pub use base_url::{base_url, resolve, try_base_url};
pub use header::{bearer_auth, header};
pub use logging::{LogLevel, debug_logging, logging, logging_at};
