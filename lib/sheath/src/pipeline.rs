//! The interception pipeline.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use tower::Service;
use tracing::debug;

use crate::{
    BoxFuture, Error, HyperTransport, Interceptor, Request, Response, Result, Transport,
    TransportConfig,
};

/// An ordered list of interceptors in front of a terminal transport.
///
/// The chain is built on every [`round_trip`](Transport::round_trip) by
/// folding the interceptors over the terminal transport in reverse
/// registration order. The first registered interceptor is therefore the
/// outermost one: it sees the request first and the response last.
///
/// Registration takes `&mut self` and dispatch takes `&self`, so a pipeline
/// is configured up front and then shared (for example behind an [`Arc`])
/// across concurrent requests.
///
/// A `Pipeline` is itself a [`Transport`], so it can be the terminal
/// transport of another pipeline.
///
/// # Example
///
/// ```no_run
/// use sheath::{Method, Pipeline, Request, Transport};
/// use sheath::interceptors::{header, try_base_url};
///
/// # async fn run() -> sheath::Result<()> {
/// let pipeline = Pipeline::new()
///     .with(try_base_url("https://api.example.com/v1")?)
///     .with(header("Accept", "application/json"));
///
/// let request = Request::try_builder(Method::Get, "/users/42")?.build();
/// let response = pipeline.round_trip(request).await?;
/// # drop(response);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    interceptors: Vec<Interceptor>,
    transport: Option<Arc<dyn Transport>>,
    config: TransportConfig,
    default_transport: OnceLock<Arc<dyn Transport>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("interceptors", &self.interceptors.len())
            .field("custom_transport", &self.transport.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create an empty pipeline using the default terminal transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pipeline in front of `transport`.
    #[must_use]
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Some(Arc::new(transport)),
            ..Self::default()
        }
    }

    /// Configure the default terminal transport.
    ///
    /// Only used when no transport was set explicitly.
    #[must_use]
    pub fn with_config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self.default_transport = OnceLock::new();
        self
    }

    /// Replace the terminal transport.
    pub fn set_transport(&mut self, transport: impl Transport + 'static) {
        self.transport = Some(Arc::new(transport));
    }

    /// The explicitly configured terminal transport, if any.
    #[must_use]
    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.as_ref()
    }

    /// Append an interceptor to the end of the sequence.
    pub fn push(&mut self, interceptor: Interceptor) {
        self.interceptors.push(interceptor);
    }

    /// Builder form of [`Pipeline::push`].
    #[must_use]
    pub fn with(mut self, interceptor: Interceptor) -> Self {
        self.push(interceptor);
        self
    }

    /// Number of registered interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` when no interceptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Registered interceptors, in registration order.
    #[must_use]
    pub fn interceptors(&self) -> &[Interceptor] {
        &self.interceptors
    }

    /// Build the chain for one request.
    ///
    /// The result reflects the interceptors registered at the time of the
    /// call; later registrations do not affect it.
    #[must_use]
    pub fn chain(&self) -> Arc<dyn Transport> {
        self.interceptors
            .iter()
            .rev()
            .fold(self.terminal(), |next, interceptor| interceptor.wrap(next))
    }

    fn terminal(&self) -> Arc<dyn Transport> {
        if let Some(transport) = &self.transport {
            return Arc::clone(transport);
        }
        let transport = self.default_transport.get_or_init(|| {
            debug!(config = ?self.config, "building default transport");
            Arc::new(HyperTransport::with_config(self.config.clone()))
        });
        Arc::clone(transport)
    }
}

impl Extend<Interceptor> for Pipeline {
    fn extend<I: IntoIterator<Item = Interceptor>>(&mut self, iter: I) {
        self.interceptors.extend(iter);
    }
}

impl FromIterator<Interceptor> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Interceptor>>(iter: I) -> Self {
        Self {
            interceptors: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Transport for Pipeline {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        debug!(
            interceptors = self.interceptors.len(),
            method = %request.method(),
            url = %request.url(),
            "dispatching request"
        );
        let chain = self.chain();
        Box::pin(async move { chain.round_trip(request).await })
    }
}

impl Service<Request> for Pipeline {
    type Response = Response;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Response>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let chain = self.chain();
        Box::pin(async move { chain.round_trip(request).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;
    use sheath_core::transport_fn;
    use tower::ServiceExt;

    use super::*;
    use crate::Method;

    fn echo() -> impl Transport + 'static {
        transport_fn(|request: Request| async move {
            Ok(Response::new(
                200,
                request.headers().clone(),
                Bytes::from(request.url().to_string()),
            ))
        })
    }

    fn get(url: &str) -> Request {
        Request::try_builder(Method::Get, url)
            .expect("valid URL")
            .build()
    }

    fn tag(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Interceptor {
        let log = Arc::clone(log);
        Interceptor::from_fn(move |request: Request, next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().expect("log").push(name.to_string());
                next.run(request).await
            }
        })
    }

    #[test]
    fn new_pipeline_is_empty() {
        let pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.len(), 0);
        assert!(pipeline.transport().is_none());
    }

    #[test]
    fn registration_keeps_order_and_duplicates() {
        let identity = Interceptor::identity();
        let mut pipeline = Pipeline::new().with(identity.clone());
        pipeline.push(identity.clone());
        pipeline.extend([identity.clone(), identity]);
        assert_eq!(pipeline.len(), 4);
    }

    #[tokio::test]
    async fn zero_interceptors_reach_terminal() {
        let pipeline = Pipeline::with_transport(echo());
        let response = pipeline
            .round_trip(get("https://example.com/a"))
            .await
            .expect("response");
        assert_eq!(response.body(), &Bytes::from_static(b"https://example.com/a"));
    }

    #[tokio::test]
    async fn first_registered_runs_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline: Pipeline = [tag("a", &log), tag("b", &log), tag("c", &log)]
            .into_iter()
            .collect();
        pipeline.set_transport(echo());

        pipeline.round_trip(get("/")).await.expect("response");
        assert_eq!(*log.lock().expect("log"), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn chain_is_a_snapshot() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::with_transport(echo()).with(tag("before", &log));

        let chain = pipeline.chain();
        pipeline.push(tag("after", &log));

        chain.round_trip(get("/")).await.expect("response");
        assert_eq!(*log.lock().expect("log"), ["before"]);
    }

    #[tokio::test]
    async fn errors_are_returned_unchanged() {
        let pipeline = Pipeline::with_transport(transport_fn(|_: Request| async {
            Err(Error::connection("refused"))
        }))
        .with(Interceptor::identity());

        let err = pipeline.round_trip(get("/")).await.expect_err("should fail");
        assert!(matches!(err, Error::Connection(ref msg) if msg == "refused"));
    }

    #[tokio::test]
    async fn pipeline_is_a_tower_service() {
        let pipeline = Pipeline::with_transport(echo()).with(Interceptor::from_fn(
            |mut request: Request, next| async move {
                request.set_header("X-Via", "tower");
                next.run(request).await
            },
        ));

        let response = pipeline.oneshot(get("/")).await.expect("response");
        assert_eq!(response.header("x-via"), Some("tower"));
    }

    #[test]
    fn default_transport_is_built_once() {
        let pipeline = Pipeline::new().with_config(
            TransportConfig::builder()
                .timeout(std::time::Duration::from_secs(1))
                .build(),
        );
        let first = pipeline.terminal();
        let second = pipeline.terminal();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn debug_reports_shape() {
        let pipeline = Pipeline::with_transport(echo()).with(Interceptor::identity());
        let debug = format!("{pipeline:?}");
        assert!(debug.contains("interceptors: 1"));
        assert!(debug.contains("custom_transport: true"));
    }
}
