//! Gateway client interface.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

use super::response::{ApiError, ApiResponse};

/// Errors returned by a gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway returned HTTP {status}")]
    Http { status: u16 },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("gateway request failed: {0}")]
    Transport(String),
}

/// Future returned by [`GatewayClient`] methods.
pub type GatewayFuture<'a> = BoxFuture<'a, Result<ApiResponse, GatewayError>>;

/// REST access to a Zigbee gateway.
///
/// Paths are relative to the authenticated API root, e.g. `/lights/1/state`.
pub trait GatewayClient: Send + Sync {
    fn get<'a>(&'a self, path: &'a str) -> GatewayFuture<'a>;

    fn put<'a>(&'a self, path: &'a str, body: Value) -> GatewayFuture<'a>;

    fn post<'a>(&'a self, path: &'a str, body: Value) -> GatewayFuture<'a>;

    fn delete<'a>(&'a self, path: &'a str, body: Option<Value>) -> GatewayFuture<'a>;
}

/// Turn a response into an error when the HTTP status or any critical API
/// error says the request failed.
pub fn check_response(response: ApiResponse) -> Result<ApiResponse, GatewayError> {
    if !(200..300).contains(&response.status) {
        return Err(GatewayError::Http {
            status: response.status,
        });
    }
    if let Some(error) = response.critical_errors().next() {
        return Err(GatewayError::Api(error.clone()));
    }
    Ok(response)
}

/// Connection lifecycle of a gateway event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Connecting { url: String },
    Connected { url: String },
    Disconnected { url: String, reason: String },
    Retrying { url: String, delay: Duration },
}

impl fmt::Display for GatewayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayEvent::Connecting { url } => write!(f, "connecting to {}", url),
            GatewayEvent::Connected { url } => write!(f, "connected to {}", url),
            GatewayEvent::Disconnected { url, reason } => {
                write!(f, "disconnected from {}: {}", url, reason)
            }
            GatewayEvent::Retrying { url, delay } => {
                write!(f, "reconnecting to {} in {}s", url, delay.as_secs())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records requests and answers with a canned body.
    struct MockGateway {
        body: Value,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl MockGateway {
        fn new(body: Value) -> Self {
            Self {
                body,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn respond<'a>(&'a self, method: &str, path: &'a str) -> GatewayFuture<'a> {
            self.requests
                .lock()
                .unwrap()
                .push((method.to_string(), path.to_string()));
            let response = ApiResponse::from_body(200, self.body.clone());
            Box::pin(async move { check_response(response) })
        }
    }

    impl GatewayClient for MockGateway {
        fn get<'a>(&'a self, path: &'a str) -> GatewayFuture<'a> {
            self.respond("GET", path)
        }

        fn put<'a>(&'a self, path: &'a str, _body: Value) -> GatewayFuture<'a> {
            self.respond("PUT", path)
        }

        fn post<'a>(&'a self, path: &'a str, _body: Value) -> GatewayFuture<'a> {
            self.respond("POST", path)
        }

        fn delete<'a>(&'a self, path: &'a str, _body: Option<Value>) -> GatewayFuture<'a> {
            self.respond("DELETE", path)
        }
    }

    #[tokio::test]
    async fn test_client_through_trait_object() {
        let gateway = MockGateway::new(json!([{"success": {"/lights/1/state/on": true}}]));
        let client: &dyn GatewayClient = &gateway;

        let response = client
            .put("/lights/1/state", json!({"on": true}))
            .await
            .unwrap();
        assert_eq!(response.success["lights"]["1"]["state"]["on"], json!(true));
        assert_eq!(
            gateway.requests.lock().unwrap().as_slice(),
            &[("PUT".to_string(), "/lights/1/state".to_string())]
        );
    }

    #[tokio::test]
    async fn test_critical_error_fails_request() {
        let gateway = MockGateway::new(json!([
            {"error": {"type": 1, "address": "/", "description": "unauthorized user"}}
        ]));
        let err = gateway.get("/config").await.unwrap_err();
        assert!(matches!(err, GatewayError::Api(ApiError { kind: 1, .. })));
    }

    #[test]
    fn test_non_critical_error_passes() {
        let response = ApiResponse::from_body(
            200,
            json!([{"error": {"type": 8, "address": "/sensors/2/config/on", "description": "not modifiable"}}]),
        );
        assert!(check_response(response).is_ok());
    }

    #[test]
    fn test_http_status_fails() {
        let response = ApiResponse::from_body(503, Value::Null);
        assert!(matches!(
            check_response(response),
            Err(GatewayError::Http { status: 503 })
        ));
    }

    #[test]
    fn test_event_display() {
        let event = GatewayEvent::Retrying {
            url: "ws://gateway:443".to_string(),
            delay: Duration::from_secs(5),
        };
        assert_eq!(event.to_string(), "reconnecting to ws://gateway:443 in 5s");
    }
}
