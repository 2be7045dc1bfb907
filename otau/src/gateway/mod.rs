//! Zigbee gateway collaborator interface.
//!
//! Only the shapes the rest of the crate needs: parsed REST responses, the
//! client trait, and connection lifecycle events. Transport
//! implementations live outside this crate.

mod client;
mod response;

pub use client::{check_response, GatewayClient, GatewayError, GatewayEvent, GatewayFuture};
pub use response::{ApiError, ApiResponse, NON_CRITICAL_ERROR_TYPES};
