//! The value travelling back out through a pipeline.
//!
//! The terminal transport produces a [`Response`] once the whole body has
//! been read. Interceptors may inspect it on the way out, rewrite its
//! headers, or build one themselves and skip the rest of the chain.

use std::collections::HashMap;

use bytes::Bytes;

/// Status, headers, and fully buffered body of one exchange.
///
/// Header names keep the case they were received with; lookups through
/// [`Response::header`] ignore it. Repeated headers arrive folded into a
/// single comma-separated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Build a response, typically from an interceptor answering on its own.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// All headers, names as received.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Headers, for interceptors rewriting the response on its way out.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.headers
    }

    /// Value of header `name`, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Buffered body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.status, 400..=499)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// [`Error::JsonDeserialization`](crate::Error::JsonDeserialization),
    /// naming the path of the offending field.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(&self.body)
    }

    /// Borrow the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Fails when the body is not valid UTF-8.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}
