//! JSON encoding of request and response bodies.
//!
//! [`RequestBuilder::json`](crate::RequestBuilder::json) encodes with
//! [`to_json`]; [`Response::json`](crate::Response::json) decodes with
//! [`from_json`].

use bytes::Bytes;

use crate::{Error, Result};

/// Encode `value` as a JSON request body.
///
/// ```
/// use std::collections::BTreeMap;
///
/// let labels = BTreeMap::from([("team", "billing")]);
/// let body = sheath_core::to_json(&labels)?;
/// assert_eq!(body, br#"{"team":"billing"}"#.as_slice());
/// # Ok::<(), sheath_core::Error>(())
/// ```
///
/// # Errors
///
/// [`Error::JsonSerialization`] when `value` cannot be represented as JSON.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Decode a JSON body.
///
/// # Errors
///
/// [`Error::JsonDeserialization`] carrying the dotted path of the first
/// field that failed (`items[2].id`), or `.` when the body is not JSON at
/// all.
pub fn from_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| Error::json_deserialization(err.path().to_string(), err.inner().to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Page {
        items: Vec<Item>,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Item {
        id: u64,
    }

    #[test]
    fn map_keys_that_are_not_strings_fail_to_encode() {
        let by_pair = HashMap::from([((1, 2), "pair")]);
        let err = to_json(&by_pair).expect_err("tuple keys");
        assert!(matches!(err, Error::JsonSerialization(_)));
    }

    #[test]
    fn nested_failure_reports_its_path() {
        let err = from_json::<Page>(br#"{"items":[{"id":1},{"id":2},{"id":"x"}]}"#)
            .expect_err("string id");
        assert_path(&err, "items[2].id");
    }

    #[test]
    fn malformed_body_is_a_deserialization_error() {
        let err = from_json::<Page>(b"<html>502 Bad Gateway</html>").expect_err("not json");
        assert_path(&err, ".");
    }

    fn assert_path(err: &Error, expected: &str) {
        match err {
            Error::JsonDeserialization { path, .. } => assert_eq!(path, expected),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
