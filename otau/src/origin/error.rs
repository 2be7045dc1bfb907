//! Transport errors.

use thiserror::Error;

/// Errors that can occur while fetching a URL through an origin client.
///
/// A fetch error aborts only the request (or download job) that raised it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or has no host.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client for an origin could not be created.
    #[error("failed to create HTTP client for {origin}: {reason}")]
    ClientBuild { origin: String, reason: String },

    /// The server answered with a status outside the accepted set.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Connection, TLS or protocol failure.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// No response within the client timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// A redirect response without a usable `Location` header.
    #[error("redirect from {url} has no valid location")]
    BadRedirect { url: String },

    /// The redirect chain exceeded the configured hop limit.
    #[error("too many redirects fetching {url} (limit {limit})")]
    TooManyRedirects { url: String, limit: usize },
}

/// Result type for origin operations.
pub type FetchResult<T> = Result<T, FetchError>;
