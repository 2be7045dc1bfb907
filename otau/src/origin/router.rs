//! URL to origin client routing.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use reqwest::Url;
use tracing::{debug, trace};

use super::client::{OriginClient, Response};
use super::config::{ClientSettings, OriginConfig};
use super::error::{FetchError, FetchResult};

/// A URL resolved to the client that should fetch it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub client: Arc<OriginClient>,
    /// Base URL of the origin the client is bound to.
    pub base: String,
    /// Path relative to `base`.
    pub path: String,
}

impl Resolved {
    /// The absolute URL to request.
    pub fn url(&self) -> FetchResult<Url> {
        let joined = format!("{}{}", self.base, self.path);
        Url::parse(&joined).map_err(|e| FetchError::InvalidUrl {
            url: joined,
            reason: e.to_string(),
        })
    }
}

/// A completed fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The URL the body was finally served from.
    pub url: Url,
    pub body: Bytes,
}

/// Routes URLs to reusable per-origin clients.
///
/// Known mirrors are matched by URL prefix in table order. Any other URL
/// gets a generic client keyed by its scheme, host and port. Clients are
/// created on first use and reused for the lifetime of the router.
#[derive(Debug)]
pub struct OriginRouter {
    origins: Vec<OriginConfig>,
    settings: ClientSettings,
    clients: DashMap<String, Arc<OriginClient>>,
}

impl OriginRouter {
    pub fn new(origins: Vec<OriginConfig>, settings: ClientSettings) -> Self {
        Self {
            origins,
            settings,
            clients: DashMap::new(),
        }
    }

    /// Number of clients created so far.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Map `url` to a client and a path relative to that client's origin.
    pub fn resolve(&self, url: &str) -> FetchResult<Resolved> {
        if let Some(origin) = self.origins.iter().find(|o| url.starts_with(&o.url_prefix)) {
            let path = origin.relative_path(url).unwrap_or_default().to_string();
            let client = self.client_for(format!("mirror:{}", origin.name), || {
                OriginClient::new(&origin.name, &self.settings, origin.accept_invalid_certs)
            })?;
            trace!(origin = %origin.name, path = %path, "Resolved to mirror");
            return Ok(Resolved {
                client,
                base: origin.base_url.trim_end_matches('/').to_string(),
                path,
            });
        }

        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.host_str().is_none() {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: "missing host".to_string(),
            });
        }

        let base = parsed.origin().ascii_serialization();
        let mut path = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            path.push('?');
            path.push_str(query);
        }

        let client = self.client_for(base.clone(), || {
            OriginClient::new(base.as_str(), &self.settings, false)
        })?;
        trace!(origin = %base, path = %path, "Resolved to host client");
        Ok(Resolved { client, base, path })
    }

    /// Fetch `url`, following redirects up to the configured hop limit.
    pub async fn fetch(&self, url: &str) -> FetchResult<Fetched> {
        let mut current = url.to_string();
        let mut hops = 0;

        loop {
            let resolved = self.resolve(&current)?;
            let target = resolved.url()?;

            match resolved.client.get(&target).await? {
                Response::Body(body) => return Ok(Fetched { url: target, body }),
                Response::Redirect(location) => {
                    if hops >= self.settings.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            url: url.to_string(),
                            limit: self.settings.max_redirects,
                        });
                    }
                    hops += 1;
                    let next = target.join(&location).map_err(|_| FetchError::BadRedirect {
                        url: target.to_string(),
                    })?;
                    debug!(from = %target, to = %next, hop = hops, "Following redirect");
                    current = next.to_string();
                }
            }
        }
    }

    fn client_for<F>(&self, key: String, build: F) -> FetchResult<Arc<OriginClient>>
    where
        F: FnOnce() -> FetchResult<OriginClient>,
    {
        if let Some(client) = self.clients.get(&key) {
            return Ok(Arc::clone(client.value()));
        }
        let client = self
            .clients
            .entry(key)
            .or_try_insert_with(|| build().map(Arc::new))?;
        Ok(Arc::clone(client.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::default_origins;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn router() -> OriginRouter {
        OriginRouter::new(default_origins(), ClientSettings::default())
    }

    #[test]
    fn test_resolve_mirror_rewrites_prefix() {
        let resolved = router()
            .resolve("https://github.com/Koenkk/zigbee-OTA/raw/master/images/IKEA/a.ota")
            .unwrap();
        assert_eq!(resolved.client.name(), "koenkk");
        assert_eq!(resolved.path, "/IKEA/a.ota");
        assert_eq!(
            resolved.url().unwrap().as_str(),
            "https://raw.githubusercontent.com/Koenkk/zigbee-OTA/master/images/IKEA/a.ota"
        );
    }

    #[test]
    fn test_mirror_client_reused() {
        let router = router();
        let a = router
            .resolve("https://otau.meethue.com/storage/a.bin")
            .unwrap();
        let b = router
            .resolve("https://otau.meethue.com/storage/b.bin")
            .unwrap();
        assert!(Arc::ptr_eq(&a.client, &b.client));
        assert_eq!(router.client_count(), 1);
    }

    #[test]
    fn test_unknown_host_gets_keyed_client() {
        let router = router();
        let a = router.resolve("https://example.com/fw/a.ota?x=1").unwrap();
        let b = router.resolve("https://example.com/fw/b.ota").unwrap();
        let c = router.resolve("https://other.example.org/c.ota").unwrap();

        assert_eq!(a.base, "https://example.com");
        assert_eq!(a.path, "/fw/a.ota?x=1");
        assert!(Arc::ptr_eq(&a.client, &b.client));
        assert!(!Arc::ptr_eq(&a.client, &c.client));
        assert_eq!(router.client_count(), 2);
    }

    #[test]
    fn test_invalid_url() {
        let err = router().resolve("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old.ota"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new.ota"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new.ota"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
            .mount(&server)
            .await;

        let fetched = router()
            .fetch(&format!("{}/old.ota", server.uri()))
            .await
            .unwrap();
        assert_eq!(fetched.body.as_ref(), b"payload");
        assert!(fetched.url.as_str().ends_with("/new.ota"));
    }

    #[tokio::test]
    async fn test_fetch_redirect_loop_is_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
            .mount(&server)
            .await;

        let err = router()
            .fetch(&format!("{}/loop", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooManyRedirects { limit: 5, .. }));
    }

    #[tokio::test]
    async fn test_fetch_through_custom_mirror() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/a.ota"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mirrored".to_vec()))
            .mount(&server)
            .await;

        let mirror = OriginConfig::new(
            "local",
            "https://mirror.invalid/firmware",
            format!("{}/images", server.uri()),
        );
        let router = OriginRouter::new(vec![mirror], ClientSettings::default());
        let fetched = router
            .fetch("https://mirror.invalid/firmware/a.ota")
            .await
            .unwrap();
        assert_eq!(fetched.body.as_ref(), b"mirrored");
    }
}
