//! Query parameters of a single gateway request and their validation.

use std::collections::HashMap;

/// Raw query parameters as received from the caller.
///
/// Lives for one request only. Values are kept as strings; typed parsing
/// happens in the service layer once presence has been validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteRequest {
    params: HashMap<String, String>,
}

/// A required parameter was absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required parameter: {name} (required: {required})")]
pub struct MissingParameter {
    /// Name of the first missing parameter.
    pub name: String,
    /// Comma-separated list of every parameter the operation requires.
    pub required: String,
}

impl QuoteRequest {
    /// Wraps an already-decoded parameter map.
    #[must_use]
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Returns the value of `name`, if present. An empty string is present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns the value of a parameter that [`validate`] already confirmed.
    /// Falls back to the empty string so callers never need to unwrap.
    #[must_use]
    pub fn required(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QuoteRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Checks that every name in `required` is present, in order.
///
/// Only absence fails: a parameter given as `name=` (empty value) counts as
/// present.
///
/// # Errors
///
/// Returns [`MissingParameter`] naming the first absent parameter.
pub fn validate(params: &QuoteRequest, required: &[&str]) -> Result<(), MissingParameter> {
    match required.iter().find(|name| params.get(name).is_none()) {
        Some(name) => Err(MissingParameter {
            name: (*name).to_string(),
            required: required.join(", "),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const POOL_INFO: &[&str] = &["nodeUrl", "poolAddress"];

    #[test]
    fn first_missing_name_is_reported() {
        let req: QuoteRequest = [("poolAddress", "P")].into_iter().collect();
        let Err(err) = validate(&req, POOL_INFO) else {
            panic!("nodeUrl is missing");
        };
        assert_eq!(err.name, "nodeUrl");
        assert_eq!(err.required, "nodeUrl, poolAddress");
    }

    #[test]
    fn order_of_required_list_decides() {
        let req = QuoteRequest::default();
        let Err(err) = validate(&req, &["swapAmount", "nodeUrl"]) else {
            panic!("both missing");
        };
        assert_eq!(err.name, "swapAmount");
    }

    #[test]
    fn empty_string_counts_as_present() {
        let req: QuoteRequest = [("nodeUrl", "U"), ("poolAddress", "")]
            .into_iter()
            .collect();
        assert_eq!(validate(&req, POOL_INFO), Ok(()));
    }

    #[test]
    fn empty_required_list_always_passes() {
        assert_eq!(validate(&QuoteRequest::default(), &[]), Ok(()));
    }

    #[test]
    fn required_accessor_defaults_to_empty() {
        let req: QuoteRequest = [("token", "abc")].into_iter().collect();
        assert_eq!(req.required("token"), "abc");
        assert_eq!(req.required("limit"), "");
        assert_eq!(req.get("limit"), None);
    }

    #[test]
    fn error_message_names_parameter() {
        let err = MissingParameter {
            name: "poolAddress".to_string(),
            required: "nodeUrl, poolAddress".to_string(),
        };
        assert!(err.to_string().contains("poolAddress"));
    }
}
