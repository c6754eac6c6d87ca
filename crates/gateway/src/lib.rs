#![warn(clippy::all)]

//! Proxy gateway between the catalog front-end and the backlog API.
//!
//! The gateway keeps the upstream credentials out of clients: requests
//! arrive without secrets, get the `X-Api-Key` header attached here, and
//! are forwarded to the configured upstream. Bodies pass through opaque.

pub mod config;
pub mod proxy;
pub mod routes;

pub use config::GatewayConfig;
pub use routes::{build_router, AppState};
