//! Request input extraction.
//!
//! `path` and `param`/`params` come from the query string; a form-encoded
//! body overrides them field by field. Empty values count as absent.

use serde_json::{Map, Value};
use thiserror::Error;
use url::form_urlencoded;

/// Raw request fields before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInput {
    pub path: Option<String>,
    pub param: Option<String>,
}

/// Strict `param` decoding failure.
#[derive(Debug, Error)]
#[error("invalid param: {0}")]
pub struct ParamError(#[from] serde_json::Error);

impl RequestInput {
    /// Extract from the raw query string and request body.
    pub fn extract(query: Option<&str>, body: &[u8]) -> Self {
        let mut input = Self::default();
        if let Some(query) = query {
            input.merge(Self::from_pairs(query.as_bytes()));
        }
        if !body.is_empty() {
            input.merge(Self::from_pairs(body));
        }
        input
    }

    fn from_pairs(encoded: &[u8]) -> Self {
        let mut path = None;
        let mut param = None;
        let mut params = None;

        for (name, value) in form_urlencoded::parse(encoded) {
            if value.is_empty() {
                continue;
            }
            let slot = match name.as_ref() {
                "path" => &mut path,
                "param" => &mut param,
                "params" => &mut params,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        Self {
            path,
            param: param.or(params),
        }
    }

    fn merge(&mut self, other: Self) {
        if other.path.is_some() {
            self.path = other.path;
        }
        if other.param.is_some() {
            self.param = other.param;
        }
    }

    /// Decode `param` as JSON. Missing params decode to `{}`.
    ///
    /// With `lenient` set, a string that is not valid JSON is passed through
    /// as a JSON string instead of failing.
    pub fn decode_param(&self, lenient: bool) -> Result<Value, ParamError> {
        let Some(raw) = self.param.as_deref() else {
            return Ok(Value::Object(Map::new()));
        };
        match serde_json::from_str(raw) {
            Ok(value) => Ok(value),
            Err(_) if lenient => Ok(Value::String(raw.to_string())),
            Err(e) => Err(ParamError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_only() {
        let input = RequestInput::extract(Some("path=foo%2Fbar&param=%7B%22id%22%3A1%7D"), b"");
        assert_eq!(input.path.as_deref(), Some("foo/bar"));
        assert_eq!(input.decode_param(false).unwrap(), json!({ "id": 1 }));
    }

    #[test]
    fn test_params_alias_and_precedence() {
        let input = RequestInput::extract(Some("path=a&params=2"), b"");
        assert_eq!(input.param.as_deref(), Some("2"));

        let input = RequestInput::extract(Some("path=a&params=2&param=1"), b"");
        assert_eq!(input.param.as_deref(), Some("1"));
    }

    #[test]
    fn test_body_overrides_query() {
        let input = RequestInput::extract(Some("path=q&param=1"), b"path=b&params=%5B2%5D");
        assert_eq!(input.path.as_deref(), Some("b"));
        assert_eq!(input.decode_param(false).unwrap(), json!([2]));

        let input = RequestInput::extract(Some("path=q&param=1"), b"other=x");
        assert_eq!(input.path.as_deref(), Some("q"));
        assert_eq!(input.param.as_deref(), Some("1"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let input = RequestInput::extract(Some("path=&param="), b"");
        assert_eq!(input, RequestInput::default());
        assert_eq!(input.decode_param(false).unwrap(), json!({}));
    }

    #[test]
    fn test_strict_and_lenient_decoding() {
        let input = RequestInput::extract(Some("path=a&param=%7Bid%3A1%7D"), b"");
        assert!(input.decode_param(false).is_err());
        assert_eq!(input.decode_param(true).unwrap(), json!("{id:1}"));
    }
}
