//! Path parameter extraction.
//!
//! Route patterns name parameters with a leading `:`. When a request path
//! matches a pattern, the captured segments are handed to the handler as
//! [`PathParams`].

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::Error;

/// Named path parameters captured from the request path.
pub type PathParams = HashMap<String, String>;

/// Matches `path` against `pattern`, capturing `:name` segments.
///
/// Returns `None` when the segment counts differ or a static segment does
/// not match.
pub fn extract_path_params(pattern: &str, path: &str) -> Option<PathParams> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parses the path parameter `name` into `T`.
///
/// Fails with 400 Bad Request when the parameter is missing or does not
/// parse.
///
/// # Examples
///
/// ```
/// use waypost::extract::{extract_path_params, param};
///
/// let params = extract_path_params("/users/:id", "/users/42").unwrap();
/// let id: u64 = param(&params, "id").unwrap();
/// assert_eq!(id, 42);
/// ```
pub fn param<T: FromStr>(params: &PathParams, name: &str) -> Result<T, Error> {
    let raw = params
        .get(name)
        .ok_or_else(|| Error::bad_request(format!("missing path parameter '{}'", name)))?;

    raw.parse().map_err(|_| {
        Error::bad_request(format!("invalid value '{}' for path parameter '{}'", raw, name))
    })
}
