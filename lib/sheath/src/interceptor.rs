//! Interceptor factories.
//!
//! An [`Interceptor`] is a function from "the next transport" to "a new
//! transport". It closes over whatever it needs and returns a transport that
//! may inspect or mutate the request, call the next transport, and inspect or
//! mutate the response or error on the way back.
//!
//! Three ways to write one:
//!
//! - [`Interceptor::new`]: receive the next transport, return any
//!   [`Transport`] (usually a [`transport_fn`](crate::transport_fn) closure).
//! - [`Interceptor::from_fn`]: an async closure taking the request and a
//!   [`Next`] handle.
//! - [`Interceptor::layer`]: adapt any tower [`Layer`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use sheath_core::transport_fn;
use tower::{Layer, Service};

use crate::service::{ServiceTransport, TransportService};
use crate::{Error, Request, Response, Result, Transport};

type WrapFn = dyn Fn(Arc<dyn Transport>) -> Arc<dyn Transport> + Send + Sync;

/// A factory wrapping one transport with another.
///
/// Cloning is cheap; a clone wraps with the same function.
#[derive(Clone)]
pub struct Interceptor {
    wrap: Arc<WrapFn>,
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor").finish_non_exhaustive()
    }
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::identity()
    }
}

impl Interceptor {
    /// Create an interceptor from a wrapping function.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sheath::{Interceptor, Request, Transport, transport_fn};
    ///
    /// let tag = Interceptor::new(|next: Arc<dyn Transport>| {
    ///     transport_fn(move |mut request: Request| {
    ///         request.set_header("X-Tag", "1");
    ///         let next = Arc::clone(&next);
    ///         async move { next.round_trip(request).await }
    ///     })
    /// });
    /// # drop(tag);
    /// ```
    #[must_use]
    pub fn new<F, T>(wrap: F) -> Self
    where
        F: Fn(Arc<dyn Transport>) -> T + Send + Sync + 'static,
        T: Transport + 'static,
    {
        Self {
            wrap: Arc::new(move |next: Arc<dyn Transport>| -> Arc<dyn Transport> {
                Arc::new(wrap(next))
            }),
        }
    }

    /// An interceptor that hands the next transport back untouched.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            wrap: Arc::new(|next: Arc<dyn Transport>| next),
        }
    }

    /// Create an interceptor from an async closure receiving the request and
    /// a [`Next`] handle.
    ///
    /// # Example
    ///
    /// ```
    /// use sheath::{Interceptor, Request, Next};
    ///
    /// let strip_cookies = Interceptor::from_fn(|mut request: Request, next: Next| async move {
    ///     request.remove_header("Cookie");
    ///     next.run(request).await
    /// });
    /// # drop(strip_cookies);
    /// ```
    #[must_use]
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next: Arc<dyn Transport>| {
            let f = Arc::clone(&f);
            transport_fn(move |request: Request| f(request, Next::new(Arc::clone(&next))))
        })
    }

    /// Adapt a tower [`Layer`] into an interceptor.
    ///
    /// The layer wraps a [`TransportService`] around the next transport; the
    /// resulting service is driven through a [`ServiceTransport`].
    #[must_use]
    pub fn layer<L>(layer: L) -> Self
    where
        L: Layer<TransportService> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self::new(move |next| ServiceTransport::new(layer.layer(TransportService::new(next))))
    }

    /// Wrap `next`, producing the transport this interceptor contributes.
    #[must_use]
    pub fn wrap(&self, next: Arc<dyn Transport>) -> Arc<dyn Transport> {
        (self.wrap)(next)
    }
}

/// Handle on the rest of the chain, given to [`Interceptor::from_fn`] closures.
#[derive(Clone)]
pub struct Next {
    inner: Arc<dyn Transport>,
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

impl Next {
    pub(crate) fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    /// Hand the request to the rest of the chain.
    ///
    /// # Errors
    ///
    /// Returns whatever the rest of the chain failed with.
    pub async fn run(self, request: Request) -> Result<Response> {
        self.inner.round_trip(request).await
    }

    /// The transport behind this handle, for interceptors that call it more
    /// than once.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;

    use super::*;
    use crate::Method;

    fn ok_transport() -> Arc<dyn Transport> {
        Arc::new(transport_fn(|request: Request| async move {
            let mut headers = HashMap::new();
            if let Some(tag) = request.header("X-Tag") {
                headers.insert("X-Seen".to_string(), tag.to_string());
            }
            Ok(Response::new(200, headers, Bytes::new()))
        }))
    }

    fn get() -> Request {
        Request::try_builder(Method::Get, "/")
            .expect("valid URL")
            .build()
    }

    #[test]
    fn identity_returns_next() {
        let next = ok_transport();
        let wrapped = Interceptor::identity().wrap(Arc::clone(&next));
        assert!(Arc::ptr_eq(&next, &wrapped));
    }

    #[tokio::test]
    async fn from_fn_sees_request_and_response() {
        let interceptor = Interceptor::from_fn(|mut request: Request, next: Next| async move {
            request.set_header("X-Tag", "from-fn");
            let mut response = next.run(request).await?;
            response
                .headers_mut()
                .insert("X-After".to_string(), "1".to_string());
            Ok(response)
        });

        let response = interceptor
            .wrap(ok_transport())
            .round_trip(get())
            .await
            .expect("response");

        assert_eq!(response.header("X-Seen"), Some("from-fn"));
        assert_eq!(response.header("X-After"), Some("1"));
    }

    #[tokio::test]
    async fn next_can_be_called_twice() {
        let interceptor = Interceptor::from_fn(|request: Request, next: Next| async move {
            let first = next.transport().round_trip(request.clone()).await;
            if first.is_ok() {
                return first;
            }
            next.run(request).await
        });

        let response = interceptor
            .wrap(ok_transport())
            .round_trip(get())
            .await
            .expect("response");
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn tower_layer_is_adapted() {
        let interceptor = Interceptor::layer(tower::util::MapRequestLayer::new(
            |mut request: Request| {
                request.set_header("X-Tag", "tower");
                request
            },
        ));

        let response = interceptor
            .wrap(ok_transport())
            .round_trip(get())
            .await
            .expect("response");
        assert_eq!(response.header("X-Seen"), Some("tower"));
    }
}
