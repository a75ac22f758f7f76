//! Header injection.

use std::sync::Arc;

use sheath_core::transport_fn;

use crate::{Interceptor, Request, Transport};

/// Interceptor setting `name: value` on every request.
///
/// Any existing header with the same name, compared case-insensitively, is
/// replaced. An empty `name` turns the interceptor into a passthrough. Values
/// are not validated; an empty value is set as-is.
///
/// # Example
///
/// ```
/// use sheath::Pipeline;
/// use sheath::interceptors::header;
///
/// let pipeline = Pipeline::new()
///     .with(header("Accept", "application/json"))
///     .with(header("X-Request-Source", "billing"));
/// # drop(pipeline);
/// ```
#[must_use]
pub fn header(name: impl Into<String>, value: impl Into<String>) -> Interceptor {
    let name: Arc<str> = Arc::from(name.into());
    let value: Arc<str> = Arc::from(value.into());

    if name.is_empty() {
        return Interceptor::identity();
    }

    Interceptor::new(move |next: Arc<dyn Transport>| {
        let name = Arc::clone(&name);
        let value = Arc::clone(&value);
        transport_fn(move |mut request: Request| {
            request.set_header(&*name, &*value);
            let next = Arc::clone(&next);
            async move { next.round_trip(request).await }
        })
    })
}

/// Interceptor adding `Authorization: Bearer <token>` to every request.
///
/// ```
/// use sheath::Pipeline;
/// use sheath::interceptors::bearer_auth;
///
/// let pipeline = Pipeline::new().with(bearer_auth("my-secret-token"));
/// # drop(pipeline);
/// ```
#[must_use]
pub fn bearer_auth(token: impl AsRef<str>) -> Interceptor {
    header("Authorization", format!("Bearer {}", token.as_ref()))
}
