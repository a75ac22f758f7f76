//! Request URLs that may be relative.
//!
//! [`url::Url`] only models absolute URLs, but a request entering a pipeline
//! is allowed to carry a bare path (`/users/1`, `../openidm`) that an
//! interceptor resolves later. [`RequestUrl`] keeps the five generic
//! components apart so such references survive untouched until then.
//!
//! # Example
//!
//! ```
//! use sheath_core::RequestUrl;
//!
//! let url: RequestUrl = "/oauth2/json?a=1#frag".parse().unwrap();
//! assert!(!url.has_scheme());
//! assert_eq!(url.path(), "/oauth2/json");
//! assert_eq!(url.query(), Some("a=1"));
//! assert_eq!(url.fragment(), Some("frag"));
//! assert_eq!(url.to_string(), "/oauth2/json?a=1#frag");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A URL split into scheme, authority, path, query and fragment.
///
/// Every component except the path is optional. Parsing follows the generic
/// syntax split of RFC 3986 and performs no normalization, so
/// `RequestUrl::to_string` reproduces the parsed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RequestUrl {
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl RequestUrl {
    /// Parse a URL or relative reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedUrl`] when the input starts with `:` or
    /// when the first path segment of a scheme-less reference holds a colon.
    pub fn parse(input: &str) -> Result<Self> {
        let (rest, fragment) = split_once_owned(input, '#');
        let (rest, query) = split_once_owned(rest, '?');

        let (scheme, rest) = match rest.find([':', '/']) {
            Some(0) if rest.starts_with(':') => {
                return Err(Error::malformed_url(input, "missing protocol scheme"));
            }
            Some(idx) if rest.as_bytes().get(idx) == Some(&b':') => {
                let (candidate, tail) = rest.split_once(':').unwrap_or((rest, ""));
                if !is_valid_scheme(candidate) {
                    return Err(Error::malformed_url(
                        input,
                        "first path segment contains a colon",
                    ));
                }
                (Some(candidate.to_ascii_lowercase()), tail)
            }
            _ => (None, rest),
        };

        let (authority, path) = match rest.strip_prefix("//") {
            Some(tail) => {
                let end = tail.find('/').unwrap_or(tail.len());
                let (authority, path) = tail.split_at(end);
                (Some(authority.to_string()), path)
            }
            None => (None, rest),
        };

        Ok(Self {
            scheme,
            authority,
            path: path.to_string(),
            query,
            fragment,
        })
    }

    /// Build a reference holding only a path.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Scheme, lowercased, if present.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Returns `true` when the URL carries a non-empty scheme.
    #[must_use]
    pub fn has_scheme(&self) -> bool {
        self.scheme.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` when the URL has both a scheme and an authority.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.has_scheme() && self.authority.is_some()
    }

    /// Authority (`user@host:port`), if present.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Host part of the authority, without userinfo and port.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        let authority = self.authority.as_deref()?;
        let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
        if host.starts_with('[') {
            return Some(host.split_inclusive(']').next().unwrap_or(host));
        }
        Some(host.split_once(':').map_or(host, |(h, _)| h))
    }

    /// Path, possibly empty.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Raw fragment, without the leading `#`.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Replace the scheme.
    pub fn set_scheme(&mut self, scheme: Option<&str>) {
        self.scheme = scheme.map(str::to_ascii_lowercase);
    }

    /// Replace the authority.
    pub fn set_authority(&mut self, authority: Option<&str>) {
        self.authority = authority.map(str::to_string);
    }

    /// Replace the path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Replace the raw query string.
    pub fn set_query(&mut self, query: Option<&str>) {
        self.query = query.map(str::to_string);
    }

    /// Replace the raw fragment.
    pub fn set_fragment(&mut self, fragment: Option<&str>) {
        self.fragment = fragment.map(str::to_string);
    }

    /// Append an encoded `name=value` pair to the query string.
    pub fn append_query_pair(&mut self, name: &str, value: &str) {
        let pair = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(name, value)
            .finish();
        match &mut self.query {
            Some(query) if !query.is_empty() => {
                query.push('&');
                query.push_str(&pair);
            }
            _ => self.query = Some(pair),
        }
    }

    /// Convert to an absolute [`url::Url`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for references without a scheme and
    /// [`Error::InvalidUrl`] when the absolute form does not parse.
    pub fn to_url(&self) -> Result<url::Url> {
        if !self.has_scheme() {
            return Err(Error::invalid_request(format!(
                "relative URL '{self}' cannot be sent without a base"
            )));
        }
        url::Url::parse(&self.to_string()).map_err(Error::InvalidUrl)
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        if let Some(authority) = &self.authority {
            write!(f, "//{authority}")?;
            if !self.path.is_empty() && !self.path.starts_with('/') {
                f.write_str("/")?;
            }
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl FromStr for RequestUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for RequestUrl {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<url::Url> for RequestUrl {
    fn from(url: url::Url) -> Self {
        Self::from(&url)
    }
}

impl From<&url::Url> for RequestUrl {
    fn from(url: &url::Url) -> Self {
        let authority = url
            .has_authority()
            .then(|| url[url::Position::BeforeUsername..url::Position::AfterPort].to_string());
        Self {
            scheme: Some(url.scheme().to_string()),
            authority,
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
        }
    }
}

/// Join `reference` under `base` and normalize the result.
///
/// Both paths are split on `/` and processed as one segment list: empty and
/// `.` segments are dropped, each `..` pops the previous segment and a `..`
/// with nothing left to pop is discarded. A dot written as `%2e` or `%2E`
/// counts as a dot. The result is always rooted. A trailing slash on
/// `reference` is kept.
///
/// ```
/// use sheath_core::join_path;
///
/// assert_eq!(join_path("/am", "/oauth2"), "/am/oauth2");
/// assert_eq!(join_path("/am", "oauth2/json"), "/am/oauth2/json");
/// assert_eq!(join_path("/am", "../openidm"), "/openidm");
/// assert_eq!(join_path("/am", "../../../../openidm"), "/openidm");
/// assert_eq!(join_path("/am", "%2e%2e/openidm"), "/openidm");
/// ```
#[must_use]
pub fn join_path(base: &str, reference: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(reference.split('/')) {
        match dot_count(segment) {
            Some(0 | 1) => {}
            Some(2) => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    let mut joined = String::with_capacity(base.len() + reference.len() + 1);
    for segment in &segments {
        joined.push('/');
        joined.push_str(segment);
    }
    if joined.is_empty() || (reference.ends_with('/') && !joined.ends_with('/')) {
        joined.push('/');
    }
    joined
}

/// Number of dots `segment` is made of, either literal or `%2e`, or `None`
/// when it holds anything else.
fn dot_count(segment: &str) -> Option<usize> {
    let mut rest = segment;
    let mut dots = 0;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('.') {
            rest = tail;
        } else if rest.get(..3).is_some_and(|head| head.eq_ignore_ascii_case("%2e")) {
            rest = rest.get(3..)?;
        } else {
            return None;
        }
        dots += 1;
    }
    Some(dots)
}

fn split_once_owned(input: &str, delimiter: char) -> (&str, Option<String>) {
    match input.split_once(delimiter) {
        Some((head, tail)) => (head, Some(tail.to_string())),
        None => (input, None),
    }
}

fn is_valid_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
