//! Connection-pooled HTTP client bound to one origin.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{StatusCode, Url};
use tokio::sync::Semaphore;
use tracing::debug;

use super::config::{ClientSettings, USER_AGENT};
use super::error::{FetchError, FetchResult};

/// Outcome of a single request, before redirects are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// 200 OK with the full body.
    Body(Bytes),
    /// A redirect status carrying the raw `Location` header.
    Redirect(String),
}

/// HTTP client for one origin.
///
/// Redirects are not followed here; the router resolves every hop again so
/// mirror rewriting applies to redirect targets too. Concurrent requests
/// are capped by a semaphore owned by this client alone.
pub struct OriginClient {
    name: String,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl OriginClient {
    /// Build a client for `name`.
    pub fn new(
        name: impl Into<String>,
        settings: &ClientSettings,
        accept_invalid_certs: bool,
    ) -> FetchResult<Self> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(settings.timeout)
            .pool_max_idle_per_host(settings.max_sockets)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| FetchError::ClientBuild {
                origin: name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name,
            client,
            permits: Arc::new(Semaphore::new(settings.max_sockets.max(1))),
            timeout: settings.timeout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permits currently free for new requests.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Issue one GET request.
    pub async fn get(&self, url: &Url) -> FetchResult<Response> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::Request {
                url: url.to_string(),
                reason: format!("origin client {} is closed", self.name),
            })?;

        debug!(origin = %self.name, url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status();
        if is_redirect(status) {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| FetchError::BadRedirect {
                    url: url.to_string(),
                })?;
            debug!(origin = %self.name, url = %url, status = status.as_u16(), location, "Redirect");
            return Ok(Response::Redirect(location.to_string()));
        }

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_error(url, e))?;
        debug!(origin = %self.name, url = %url, bytes = body.len(), "Response received");
        Ok(Response::Body(body))
    }

    fn map_error(&self, url: &Url, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl std::fmt::Debug for OriginClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginClient")
            .field("name", &self.name)
            .field("available_permits", &self.available_permits())
            .finish()
    }
}

/// Statuses followed as redirects.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> OriginClient {
        OriginClient::new("test", &ClientSettings::default(), false).unwrap()
    }

    #[test]
    fn test_redirect_statuses() {
        for code in [301, 302, 303, 307, 308] {
            assert!(is_redirect(StatusCode::from_u16(code).unwrap()));
        }
        for code in [200, 300, 304, 404] {
            assert!(!is_redirect(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn test_permits_follow_settings() {
        let settings = ClientSettings {
            max_sockets: 3,
            ..ClientSettings::default()
        };
        let client = OriginClient::new("test", &settings, false).unwrap();
        assert_eq!(client.available_permits(), 3);
        assert_eq!(client.name(), "test");
    }

    #[tokio::test]
    async fn test_get_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fw.ota"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/fw.ota", server.uri())).unwrap();
        let response = client().get(&url).await.unwrap();
        assert_eq!(response, Response::Body(Bytes::from_static(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn test_get_redirect_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
        let response = client().get(&url).await.unwrap();
        assert_eq!(response, Response::Redirect("/new".to_string()));
    }

    #[tokio::test]
    async fn test_get_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let err = client().get(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_redirect_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(301))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/moved", server.uri())).unwrap();
        let err = client().get(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::BadRedirect { .. }));
    }
}
