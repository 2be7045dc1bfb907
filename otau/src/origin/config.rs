//! Known firmware mirrors.

use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default cap on concurrent requests per origin client.
pub const DEFAULT_MAX_SOCKETS: usize = 10;

/// Default limit on redirect hops for one fetch.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("otau/", env!("CARGO_PKG_VERSION"));

/// A known mirror: URLs starting with `url_prefix` are fetched from
/// `base_url` with the prefix replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginConfig {
    pub name: String,
    pub url_prefix: String,
    pub base_url: String,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

impl OriginConfig {
    pub fn new(
        name: impl Into<String>,
        url_prefix: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url_prefix: url_prefix.into(),
            base_url: base_url.into(),
            accept_invalid_certs: false,
        }
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// The path of `url` relative to this mirror, if the mirror serves it.
    pub fn relative_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.url_prefix.as_str())
    }

    /// The Koenkk zigbee-OTA repository, served from raw.githubusercontent.com.
    pub fn koenkk() -> Self {
        Self::new(
            "koenkk",
            "https://github.com/Koenkk/zigbee-OTA/raw/master/images",
            "https://raw.githubusercontent.com/Koenkk/zigbee-OTA/master/images",
        )
    }

    /// Philips Hue firmware storage.
    pub fn meethue() -> Self {
        Self::new(
            "meethue",
            "https://otau.meethue.com/storage",
            "https://otau.meethue.com/storage",
        )
        .with_accept_invalid_certs(true)
    }

    /// Third Reality firmware bucket.
    pub fn aws() -> Self {
        Self::new(
            "aws",
            "https://tr-zha.s3.amazonaws.com/firmware",
            "https://tr-zha.s3.amazonaws.com/firmware",
        )
    }
}

/// The built-in mirror table, in match order.
pub fn default_origins() -> Vec<OriginConfig> {
    vec![
        OriginConfig::koenkk(),
        OriginConfig::meethue(),
        OriginConfig::aws(),
    ]
}

/// Settings shared by every origin client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub max_sockets: usize,
    pub max_redirects: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_sockets: DEFAULT_MAX_SOCKETS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}
