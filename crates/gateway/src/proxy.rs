//! Forwarding handlers for the games catalog and the raw backlog feed.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::routes::AppState;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Forward a `/api/games` request to the upstream catalog.
///
/// The upstream path is the incoming path with the `/api` prefix swapped
/// for the configured base URL; query strings are not forwarded. Upstream
/// failures are normalised into stable JSON bodies so clients never see
/// raw upstream error pages.
pub async fn proxy_games(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let Some((api_key, api_url)) = state.config.credentials() else {
        return misconfigured(&state);
    };

    match forward_games(&state.http, api_key, api_url, method, uri.path(), body).await {
        Ok(response) => response,
        Err(err) => {
            error!("upstream request failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to connect to backend API",
                    "details": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Relay the raw backlog payload from the upstream root endpoint.
pub async fn fetch_backlog(State(state): State<AppState>) -> Response {
    let Some((api_key, api_url)) = state.config.credentials() else {
        error!(
            "refusing backlog fetch: has_api_key={} has_api_url={}",
            state.config.has_api_key(),
            state.config.has_api_url()
        );
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server Misconfiguration: Missing Keys",
        )
            .into_response();
    };

    match forward_backlog(&state.http, api_key, api_url).await {
        Ok(response) => response,
        Err(err) => {
            error!("backlog fetch failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to connect to backend API",
            )
                .into_response()
        }
    }
}

fn misconfigured(state: &AppState) -> Response {
    error!(
        "refusing to proxy: has_api_key={} has_api_url={}",
        state.config.has_api_key(),
        state.config.has_api_url()
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Server misconfiguration: Missing API credentials",
            "details": {
                "hasApiKey": state.config.has_api_key(),
                "hasApiUrl": state.config.has_api_url(),
            },
        })),
    )
        .into_response()
}

async fn forward_games(
    http: &reqwest::Client,
    api_key: &str,
    api_url: &str,
    method: Method,
    raw_path: &str,
    body: Bytes,
) -> Result<Response, reqwest::Error> {
    let target = upstream_games_url(api_url, trailing_path(raw_path));

    let mut request = http
        .request(method.clone(), &target)
        .header(CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, api_key);
    if matches!(method, Method::POST | Method::PUT) && !body.is_empty() {
        request = request.body(body);
    }

    let response = request.send().await?;
    let status = response.status();
    info!("{method} {target} -> {status}");

    if status == StatusCode::NOT_FOUND {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Resource not found" })),
        )
            .into_response());
    }
    if !status.is_success() {
        return Ok((
            status,
            Json(json!({
                "error": format!("Backend API error: {}", status_text(status)),
            })),
        )
            .into_response());
    }

    if is_json(response.headers()) {
        let payload = response.bytes().await?;
        return Ok((status, [(CONTENT_TYPE, "application/json")], payload).into_response());
    }

    // Some upstream mutations answer with a bare text body.
    Ok((status, "Success").into_response())
}

async fn forward_backlog(
    http: &reqwest::Client,
    api_key: &str,
    api_url: &str,
) -> Result<Response, reqwest::Error> {
    let response = http
        .get(api_url)
        .header(CONTENT_TYPE, "application/json")
        .header(API_KEY_HEADER, api_key)
        .send()
        .await?;
    let status = response.status();
    info!("GET {api_url} -> {status}");

    if !status.is_success() {
        return Ok((status, format!("Upstream error: {}", status_text(status))).into_response());
    }

    let data = response.json::<Value>().await?;
    Ok((StatusCode::OK, Json(data)).into_response())
}

fn trailing_path(path: &str) -> &str {
    let rest = path.strip_prefix("/api/games").unwrap_or(path);
    rest.strip_prefix('/').unwrap_or(rest)
}

fn upstream_games_url(api_url: &str, path: &str) -> String {
    let base = api_url.trim_end_matches('/');
    if path.is_empty() {
        format!("{base}/games")
    } else {
        format!("{base}/games/{path}")
    }
}

fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false)
}
