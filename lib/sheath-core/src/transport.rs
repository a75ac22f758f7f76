//! The transport capability.
//!
//! A [`Transport`] turns a [`Request`] into a [`Response`] or an [`Error`].
//! The network client at the bottom of a pipeline is one, every
//! interceptor-wrapped layer is one, and so is a pipeline itself.
//!
//! [`TransportFn`] lets a plain closure play the part, which is how most
//! interceptors are written:
//!
//! ```
//! use std::collections::HashMap;
//! use bytes::Bytes;
//! use sheath_core::{Response, Transport, transport_fn};
//!
//! let echo = transport_fn(|request: sheath_core::Request| async move {
//!     Ok(Response::new(200, HashMap::new(), Bytes::from(request.url().to_string())))
//! });
//! # let _ = &echo as &dyn Transport;
//! ```
//!
//! [`Error`]: crate::Error

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Boxed future returned by [`Transport::round_trip`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Perform one HTTP exchange.
///
/// Implementations receive the request by value; whatever they hand on to
/// the next transport (including mutations) is what downstream code sees.
pub trait Transport: Send + Sync {
    /// Execute the request and return the response or the failure.
    ///
    /// # Errors
    ///
    /// Returns whatever error the transport, or any transport it delegates
    /// to, produced.
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        (**self).round_trip(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        (**self).round_trip(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        (**self).round_trip(request)
    }
}

/// Adapter turning a closure into a [`Transport`].
///
/// The closure returns a future that must own everything it needs, so clone
/// shared state (such as the next transport's `Arc`) into the `async move`
/// block.
#[derive(Clone, Copy)]
pub struct TransportFn<F> {
    f: F,
}

impl<F> TransportFn<F> {
    /// Wrap a closure.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for TransportFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportFn").finish_non_exhaustive()
    }
}

impl<F, Fut> Transport for TransportFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin((self.f)(request))
    }
}

/// Shorthand for [`TransportFn::new`].
pub const fn transport_fn<F, Fut>(f: F) -> TransportFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    TransportFn::new(f)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;

    use super::*;
    use crate::{Error, Method};

    fn get(url: &str) -> Request {
        Request::try_builder(Method::Get, url)
            .expect("valid URL")
            .build()
    }

    #[tokio::test]
    async fn transport_fn_delegates_response() {
        let transport = transport_fn(|request: Request| async move {
            Ok(Response::new(
                201,
                HashMap::new(),
                Bytes::from(request.url().to_string()),
            ))
        });

        let response = transport.round_trip(get("/ping")).await.expect("response");
        assert_eq!(response.status(), 201);
        assert_eq!(response.body(), &Bytes::from_static(b"/ping"));
    }

    #[tokio::test]
    async fn transport_fn_delegates_error() {
        let transport = transport_fn(|_: Request| async { Err(Error::Timeout) });

        let err = transport.round_trip(get("/")).await.expect_err("should fail");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn arc_and_box_forward() {
        let transport: Arc<dyn Transport> = Arc::new(transport_fn(|_: Request| async {
            Ok(Response::new(204, HashMap::new(), Bytes::new()))
        }));
        let boxed: Box<dyn Transport> = Box::new(Arc::clone(&transport));

        let response = boxed.round_trip(get("/")).await.expect("response");
        assert_eq!(response.status(), 204);
    }
}
