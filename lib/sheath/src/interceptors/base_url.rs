//! Base URL resolution.
//!
//! Requests carrying a scheme are sent as-is. Every other request has its
//! path joined under the base path and takes the scheme and host of the
//! base, keeping its own query and fragment.

use std::sync::Arc;

use sheath_core::{RequestUrl, join_path, transport_fn};
use tracing::trace;

use crate::{Interceptor, Request, Result, Transport};

/// Interceptor resolving request URLs against `base`.
///
/// # Example
///
/// ```
/// use sheath::{Pipeline, RequestUrl};
/// use sheath::interceptors::base_url;
///
/// let base: RequestUrl = "http://base.example.com/am".parse().unwrap();
/// let pipeline = Pipeline::new().with(base_url(base));
/// # drop(pipeline);
/// ```
#[must_use]
pub fn base_url(base: impl Into<RequestUrl>) -> Interceptor {
    let base = Arc::new(base.into());
    Interceptor::new(move |next: Arc<dyn Transport>| {
        let base = Arc::clone(&base);
        transport_fn(move |mut request: Request| {
            if request.url().has_scheme() {
                trace!(url = %request.url(), "absolute URL, skipping base");
            } else {
                let resolved = resolve(&base, request.url());
                trace!(from = %request.url(), to = %resolved, "resolved against base");
                request.set_url(resolved);
            }
            let next = Arc::clone(&next);
            async move { next.round_trip(request).await }
        })
    })
}

/// Parse `base` and build a [`base_url`] interceptor.
///
/// A base with a scheme must also be a URL the transport can send to, so a
/// bad host fails here rather than on the first request.
///
/// # Errors
///
/// Returns [`Error::MalformedUrl`](crate::Error::MalformedUrl) when `base`
/// does not parse, and [`Error::InvalidUrl`](crate::Error::InvalidUrl) when
/// it parses but is not a valid absolute URL.
pub fn try_base_url(base: &str) -> Result<Interceptor> {
    let base = base.parse::<RequestUrl>()?;
    if base.has_scheme() {
        base.to_url()?;
    }
    Ok(base_url(base))
}

/// Resolve `reference` against `base` the way [`base_url`] does.
///
/// A reference with a scheme is returned unchanged. Otherwise the paths are
/// combined with [`join_path`]; the scheme comes from `base`, the authority
/// from `reference` when it has one and from `base` otherwise, and the query
/// and fragment from `reference`.
///
/// ```
/// use sheath::RequestUrl;
/// use sheath::interceptors::resolve;
///
/// let base: RequestUrl = "http://base.example.com/am".parse().unwrap();
/// let reference: RequestUrl = "../openidm?q=1".parse().unwrap();
/// assert_eq!(
///     resolve(&base, &reference).to_string(),
///     "http://base.example.com/openidm?q=1",
/// );
/// ```
#[must_use]
pub fn resolve(base: &RequestUrl, reference: &RequestUrl) -> RequestUrl {
    if reference.has_scheme() {
        return reference.clone();
    }

    let mut resolved = base.clone();
    resolved.set_path(join_path(base.path(), reference.path()));
    if reference.authority().is_some() {
        resolved.set_authority(reference.authority());
    }
    resolved.set_query(reference.query());
    resolved.set_fragment(reference.fragment());
    resolved
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};
    use bytes::Bytes;

    use super::*;
    use crate::{Error, Method, Response};

    const BASE: &str = "http://base.example.com/am";

    fn url(input: &str) -> RequestUrl {
        let_assert!(Ok(url) = input.parse::<RequestUrl>());
        url
    }

    fn echo_url() -> Arc<dyn Transport> {
        Arc::new(transport_fn(|request: Request| async move {
            Ok(Response::new(
                200,
                HashMap::new(),
                Bytes::from(request.url().to_string()),
            ))
        }))
    }

    #[test]
    fn resolves_against_base() {
        let base = url(BASE);
        let cases = [
            ("/oauth2", "http://base.example.com/am/oauth2"),
            ("/oauth2/json", "http://base.example.com/am/oauth2/json"),
            ("oauth2/json", "http://base.example.com/am/oauth2/json"),
            ("https://google.com", "https://google.com"),
            (
                "https://google.com?test=asfd#first",
                "https://google.com?test=asfd#first",
            ),
            ("../openidm", "http://base.example.com/openidm"),
            ("../openidm/query", "http://base.example.com/openidm/query"),
            ("../../openidm", "http://base.example.com/openidm"),
            ("../../../../openidm", "http://base.example.com/openidm"),
            (
                "../am/../other/openidm",
                "http://base.example.com/other/openidm",
            ),
            (
                "/../am/../other/openidm",
                "http://base.example.com/other/openidm",
            ),
            (
                "/oauth2/json?param1=value1&param2=value2#fragment",
                "http://base.example.com/am/oauth2/json?param1=value1&param2=value2#fragment",
            ),
        ];

        for (reference, expected) in cases {
            check!(resolve(&base, &url(reference)).to_string() == expected, "{reference}");
        }
    }

    #[test]
    fn base_query_and_fragment_are_dropped() {
        let base = url("https://api.example.com/v1?key=1#top");
        check!(resolve(&base, &url("/users")).to_string() == "https://api.example.com/v1/users");
    }

    #[test]
    fn trailing_slash_follows_reference() {
        let base = url("https://api.example.com/v1/");
        check!(resolve(&base, &url("users/")).to_string() == "https://api.example.com/v1/users/");
        check!(resolve(&base, &url("users")).to_string() == "https://api.example.com/v1/users");
    }

    #[test]
    fn empty_base_path_is_rooted() {
        let base = url("https://api.example.com");
        check!(resolve(&base, &url("users")).to_string() == "https://api.example.com/users");
        check!(resolve(&base, &url("")).to_string() == "https://api.example.com/");
    }

    #[test]
    fn network_path_reference_keeps_its_host() {
        let base = url(BASE);
        check!(
            resolve(&base, &url("//cdn.example.com/assets/app.js")).to_string()
                == "http://cdn.example.com/am/assets/app.js"
        );
    }

    #[test]
    fn bypass_is_idempotent() {
        let base = url(BASE);
        let absolute = url("https://google.com/search?q=rust");
        let once = resolve(&base, &absolute);
        let twice = resolve(&base, &once);
        check!(once == absolute);
        check!(twice == once);
    }

    #[test]
    fn invalid_base_is_rejected() {
        let_assert!(Err(err) = try_base_url(":no-scheme"));
        check!(err.to_string().contains("missing protocol scheme"));
    }

    #[test]
    fn base_with_unusable_host_is_rejected() {
        let_assert!(Err(Error::InvalidUrl(_)) = try_base_url("http://exa mple.com/am"));
        let_assert!(Err(Error::InvalidUrl(_)) = try_base_url("https://example.com:99999/v1"));
        check!(try_base_url("http://base.example.com/am").is_ok());
        check!(try_base_url("/api/v1").is_ok());
    }

    #[test]
    fn encoded_dot_segments_climb_like_dots() {
        let base = url(BASE);
        check!(resolve(&base, &url("%2e%2e/x")).to_string() == "http://base.example.com/x");
        check!(
            resolve(&base, &url("%2E/oauth2%2Ejson")).to_string()
                == "http://base.example.com/am/oauth2%2Ejson"
        );
    }

    #[tokio::test]
    async fn interceptor_rewrites_relative_request() {
        let transport = base_url(url(BASE)).wrap(echo_url());
        let request = Request::try_builder(Method::Get, "../openidm?x=1")
            .expect("valid URL")
            .build();

        let response = transport.round_trip(request).await.expect("response");
        check!(response.body() == &Bytes::from_static(b"http://base.example.com/openidm?x=1"));
    }

    #[tokio::test]
    async fn interceptor_leaves_absolute_request_alone() {
        let transport = base_url(url(BASE)).wrap(echo_url());
        let request = Request::try_builder(Method::Get, "https://google.com")
            .expect("valid URL")
            .build();

        let response = transport.round_trip(request).await.expect("response");
        check!(response.body() == &Bytes::from_static(b"https://google.com"));
    }
}
