//! Bridges between [`Transport`] and tower's [`Service`].
//!
//! - [`TransportService`] exposes a transport as a tower service, so tower
//!   layers can wrap it.
//! - [`ServiceTransport`] drives a tower service through the [`Transport`]
//!   trait, so a tower stack can sit inside (or at the bottom of) a pipeline.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tower::{Service, ServiceExt};

use crate::{BoxFuture, Error, Request, Response, Result, Transport};

/// A [`Transport`] seen as a tower [`Service`].
///
/// Always ready; each call hands the request to the transport.
#[derive(Clone)]
pub struct TransportService {
    inner: Arc<dyn Transport>,
}

impl TransportService {
    /// Wrap a transport.
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for TransportService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportService").finish_non_exhaustive()
    }
}

impl Service<Request> for TransportService {
    type Response = Response;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Response>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.round_trip(request).await })
    }
}

/// A tower [`Service`] seen as a [`Transport`].
///
/// Tower services take `&mut self` and are not always `Sync`, so the service
/// sits behind a mutex: each round trip locks, clones the service, releases
/// the lock, then waits for readiness and calls the clone.
pub struct ServiceTransport<S> {
    inner: Mutex<S>,
}

impl<S> ServiceTransport<S> {
    /// Wrap a service.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            inner: Mutex::new(service),
        }
    }
}

impl<S> fmt::Debug for ServiceTransport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTransport").finish_non_exhaustive()
    }
}

impl<S> Transport for ServiceTransport<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        let service = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Box::pin(service.oneshot(request))
    }
}
