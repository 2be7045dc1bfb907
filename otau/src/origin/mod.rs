//! Origin routing and HTTP transport.
//!
//! Firmware URLs in the index point at a handful of well-known hosts. The
//! [`OriginRouter`] rewrites URLs of known mirrors onto their serving base
//! URL and hands out one connection-pooled [`OriginClient`] per origin, each
//! with its own concurrency cap and TLS policy.

mod client;
mod config;
mod error;
mod router;

pub use client::{is_redirect, OriginClient, Response};
pub use config::{
    default_origins, ClientSettings, OriginConfig, DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_SOCKETS,
    DEFAULT_TIMEOUT_SECS, USER_AGENT,
};
pub use error::{FetchError, FetchResult};
pub use router::{Fetched, OriginRouter, Resolved};
