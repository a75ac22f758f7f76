//! Request/response logging with `tracing`.

use std::time::Instant;

use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Interceptor, Next, Request};

/// How much the logging interceptor records about each request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Method, URL and headers, at debug level.
    Debug,
    /// Method and URL, at info level.
    #[default]
    Info,
}

/// Interceptor logging each request and its outcome at info level.
///
/// Every exchange runs inside an `http_request` span. Non-2xx responses and
/// failures are logged at warn level, both with the elapsed time.
///
/// Register it last to log the request as the terminal transport sees it,
/// first to log it as the caller built it.
#[must_use]
pub fn logging() -> Interceptor {
    logging_at(LogLevel::Info)
}

/// Like [`logging`], with request headers at debug level.
#[must_use]
pub fn debug_logging() -> Interceptor {
    logging_at(LogLevel::Debug)
}

/// Logging interceptor at an explicit [`LogLevel`].
#[must_use]
pub fn logging_at(level: LogLevel) -> Interceptor {
    Interceptor::from_fn(move |request: Request, next: Next| {
        let method = request.method();
        let url = request.url().to_string();
        let span = span!(Level::INFO, "http_request", %method, %url);

        async move {
            let start = Instant::now();

            match level {
                LogLevel::Debug => {
                    debug!(
                        method = %method,
                        url = %url,
                        headers = ?request.headers(),
                        "sending request"
                    );
                }
                LogLevel::Info => info!(method = %method, url = %url, "sending request"),
            }

            let result = next.run(request).await;
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(response) if response.is_success() => {
                    info!(status = response.status(), elapsed_ms, "request completed");
                }
                Ok(response) => {
                    warn!(
                        status = response.status(),
                        elapsed_ms,
                        "request failed with HTTP error"
                    );
                }
                Err(err) => warn!(error = %err, elapsed_ms, "request failed"),
            }

            result
        }
        .instrument(span)
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use bytes::Bytes;
    use sheath_core::transport_fn;

    use super::*;
    use crate::{Error, Method, Response, Transport};

    fn get() -> Request {
        Request::try_builder(Method::Get, "https://example.com/health")
            .expect("valid URL")
            .build()
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[tokio::test]
    async fn response_passes_through() {
        let terminal: Arc<dyn Transport> = Arc::new(transport_fn(|_: Request| async {
            Ok(Response::new(503, HashMap::new(), Bytes::from_static(b"down")))
        }));

        let response = debug_logging()
            .wrap(terminal)
            .round_trip(get())
            .await
            .expect("response");
        assert_eq!(response.status(), 503);
        assert_eq!(response.body(), &Bytes::from_static(b"down"));
    }

    #[tokio::test]
    async fn error_passes_through() {
        let terminal: Arc<dyn Transport> =
            Arc::new(transport_fn(|_: Request| async { Err(Error::Timeout) }));

        let err = logging()
            .wrap(terminal)
            .round_trip(get())
            .await
            .expect_err("should fail");
        assert!(err.is_timeout());
    }
}
