//! Gateway REST responses.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Error types that only affect the attribute named in the error address;
/// the rest of the request may still have succeeded.
pub const NON_CRITICAL_ERROR_TYPES: [u32; 4] = [
    6,   // parameter not available
    7,   // invalid value for parameter
    8,   // parameter not modifiable
    201, // parameter not modifiable, device is off
];

/// One `"error"` item of a gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: u32,
    pub address: String,
    pub description: String,
    pub non_critical: bool,
}

#[derive(Deserialize)]
struct RawApiError {
    #[serde(rename = "type")]
    kind: u32,
    #[serde(default)]
    address: String,
    #[serde(default)]
    description: String,
}

impl ApiError {
    pub fn new(kind: u32, address: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
            description: description.into(),
            non_critical: NON_CRITICAL_ERROR_TYPES.contains(&kind),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: api error {}: {}",
            self.address, self.kind, self.description
        )
    }
}

impl std::error::Error for ApiError {}

/// A gateway response with its success and error items separated.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Nested object built from the `"success"` items.
    pub success: Value,
    pub errors: Vec<ApiError>,
    pub body: Value,
}

impl ApiResponse {
    /// Split a response body into success values and errors.
    ///
    /// Only array bodies carry success or error items. Each success key is
    /// a slash separated path; its first component is dropped and the rest
    /// become nested object keys, so `{"/lights/1/state/on": true}` ends up
    /// as `success.lights.1.state.on`.
    pub fn from_body(status: u16, body: Value) -> Self {
        let mut success = Map::new();
        let mut errors = Vec::new();

        if let Value::Array(items) = &body {
            for item in items {
                if let Some(error) = item.get("error").filter(|e| e.is_object()) {
                    if let Ok(raw) = serde_json::from_value::<RawApiError>(error.clone()) {
                        errors.push(ApiError::new(raw.kind, raw.address, raw.description));
                    }
                }
                if let Some(Value::Object(values)) = item.get("success") {
                    for (path, value) in values {
                        insert_path(&mut success, path, value.clone());
                    }
                }
            }
        }

        Self {
            status,
            success: Value::Object(success),
            errors,
            body,
        }
    }

    /// Errors that invalidate the whole request.
    pub fn critical_errors(&self) -> impl Iterator<Item = &ApiError> {
        self.errors.iter().filter(|e| !e.non_critical)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.critical_errors().next().is_none()
    }
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let keys: Vec<&str> = path.split('/').collect();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut node = root;
    for key in parents.iter().skip(1) {
        let entry = node
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        node = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    node.insert(last.to_string(), value);
}
