//! Route table and shared handler state.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{config::GatewayConfig, proxy};

/// State shared by every handler: the config plus one pooled HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub(crate) config: Arc<GatewayConfig>,
    pub(crate) http: reqwest::Client,
}

impl AppState {
    /// Build state around the given config with a fresh client pool.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

/// Assemble the gateway's route table.
pub fn build_router(state: AppState) -> Router {
    let games = get(proxy::proxy_games)
        .post(proxy::proxy_games)
        .put(proxy::proxy_games)
        .delete(proxy::proxy_games);

    Router::new()
        .route("/api/backlog", get(proxy::fetch_backlog))
        .route("/api/games", games.clone())
        .route("/api/games/*rest", games)
        .with_state(state)
}
