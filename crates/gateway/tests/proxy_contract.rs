//! Gateway contract tests against a recording stub upstream.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Router,
};
use backlog_gateway::{build_router, AppState, GatewayConfig};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Clone, Debug)]
struct RecordedRequest {
    method: String,
    uri: String,
    api_key: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

type Recorder = Arc<Mutex<Vec<RecordedRequest>>>;

fn recording_upstream(
    recorder: Recorder,
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
) -> Router {
    Router::new().fallback(move |request: Request| {
        let recorder = recorder.clone();
        async move {
            let (parts, raw_body) = request.into_parts();
            let bytes = axum::body::to_bytes(raw_body, 64 * 1024)
                .await
                .unwrap_or_default();
            recorder.lock().push(RecordedRequest {
                method: parts.method.to_string(),
                uri: parts.uri.to_string(),
                api_key: header_value(&parts.headers, "x-api-key"),
                content_type: header_value(&parts.headers, "content-type"),
                body: bytes.to_vec(),
            });
            (status, [(CONTENT_TYPE, content_type)], body)
        }
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            eprintln!("test server stopped: {err}");
        }
    });
    addr
}

async fn spawn_gateway(api_key: Option<&str>, api_url: Option<String>) -> SocketAddr {
    let config = GatewayConfig::new(
        api_key.map(str::to_string),
        api_url,
        SocketAddr::from(([127, 0, 0, 1], 0)),
    );
    spawn(build_router(AppState::new(config))).await
}

async fn gateway_in_front_of(upstream: SocketAddr) -> SocketAddr {
    spawn_gateway(Some("secret-key"), Some(format!("http://{upstream}"))).await
}

#[tokio::test]
async fn missing_credentials_short_circuit_without_touching_upstream() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::OK,
        "application/json",
        "[]",
    ))
    .await;
    let gateway = spawn_gateway(None, Some(format!("http://{upstream}"))).await;

    let response = reqwest::get(format!("http://{gateway}/api/games"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(
        body["error"],
        json!("Server misconfiguration: Missing API credentials")
    );
    assert_eq!(body["details"]["hasApiKey"], json!(false));
    assert_eq!(body["details"]["hasApiUrl"], json!(true));
    assert!(recorder.lock().is_empty());
}

#[tokio::test]
async fn put_forwards_path_key_and_body() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::OK,
        "application/json",
        r#"{"SteamAppId":42,"Title":"Celeste","Completed":true,"Dropped":false}"#,
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let submitted = json!({
        "SteamAppId": 42,
        "Title": "Celeste",
        "Completed": true,
        "Dropped": false,
    });
    let response = reqwest::Client::new()
        .put(format!("http://{gateway}/api/games/42"))
        .json(&submitted)
        .send()
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::OK);
    let relayed: Value = response.json().await.expect("json body");
    assert_eq!(relayed["Title"], json!("Celeste"));

    let recorded = recorder.lock().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "PUT");
    assert_eq!(recorded[0].uri, "/games/42");
    assert_eq!(recorded[0].api_key.as_deref(), Some("secret-key"));
    assert_eq!(recorded[0].content_type.as_deref(), Some("application/json"));
    let forwarded: Value = serde_json::from_slice(&recorded[0].body).expect("forwarded body");
    assert_eq!(forwarded, submitted);
}

#[tokio::test]
async fn post_create_relays_upstream_record_and_status() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::CREATED,
        "application/json",
        r#"{"SteamAppId":2,"Title":"New","Completed":false,"Dropped":false}"#,
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::Client::new()
        .post(format!("http://{gateway}/api/games"))
        .json(&json!({"SteamAppId": 2, "Title": "New"}))
        .send()
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::CREATED);
    let relayed: Value = response.json().await.expect("json body");
    assert_eq!(relayed["SteamAppId"], json!(2));

    let recorded = recorder.lock().clone();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].uri, "/games");
    assert!(!recorded[0].body.is_empty());
}

#[tokio::test]
async fn query_strings_are_not_forwarded() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::OK,
        "application/json",
        "[]",
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::get(format!("http://{gateway}/api/games?title=Halo"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(recorder.lock()[0].uri, "/games");
}

#[tokio::test]
async fn encoded_title_segment_passes_through_unchanged() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::OK,
        "application/json",
        r#"{"SteamAppId":570940,"Title":"Dark Souls","Completed":false,"Dropped":false}"#,
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::get(format!("http://{gateway}/api/games/Dark%20Souls"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(recorder.lock()[0].uri, "/games/Dark%20Souls");
}

#[tokio::test]
async fn upstream_404_is_normalised() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::NOT_FOUND,
        "text/plain",
        "no such row",
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::get(format!("http://{gateway}/api/games/7"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "error": "Resource not found" }));
}

#[tokio::test]
async fn upstream_failure_maps_to_stable_error_body() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::SERVICE_UNAVAILABLE,
        "text/html",
        "<html>busy</html>",
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::get(format!("http://{gateway}/api/games"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(
        body,
        json!({ "error": "Backend API error: Service Unavailable" })
    );
}

#[tokio::test]
async fn non_json_success_becomes_a_marker_body() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::OK,
        "text/plain",
        "row deleted",
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::Client::new()
        .delete(format!("http://{gateway}/api/games/7"))
        .send()
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("text body"), "Success");

    let recorded = recorder.lock().clone();
    assert_eq!(recorded[0].method, "DELETE");
    assert!(recorded[0].body.is_empty());
}

#[tokio::test]
async fn unreachable_upstream_reports_connection_failure() {
    // Bind then immediately drop to find a port nobody listens on.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe")
        .local_addr()
        .expect("probe addr");
    let gateway = gateway_in_front_of(dead).await;

    let response = reqwest::get(format!("http://{gateway}/api/games"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["error"], json!("Failed to connect to backend API"));
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn backlog_feed_relays_parsed_json() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::OK,
        "application/json",
        r#"{"games":[{"SteamAppId":1,"Title":"One","Completed":false,"Dropped":false}]}"#,
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::get(format!("http://{gateway}/api/backlog"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["games"][0]["Title"], json!("One"));

    let recorded = recorder.lock().clone();
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].uri, "/");
    assert_eq!(recorded[0].api_key.as_deref(), Some("secret-key"));
}

#[tokio::test]
async fn backlog_misconfiguration_is_plain_text() {
    let gateway = spawn_gateway(Some("secret-key"), None).await;

    let response = reqwest::get(format!("http://{gateway}/api/backlog"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.text().await.expect("text body"),
        "Server Misconfiguration: Missing Keys"
    );
}

#[tokio::test]
async fn backlog_upstream_error_is_plain_text() {
    let recorder: Recorder = Recorder::default();
    let upstream = spawn(recording_upstream(
        recorder.clone(),
        StatusCode::BAD_GATEWAY,
        "text/plain",
        "flaky",
    ))
    .await;
    let gateway = gateway_in_front_of(upstream).await;

    let response = reqwest::get(format!("http://{gateway}/api/backlog"))
        .await
        .expect("gateway reachable");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.text().await.expect("text body"),
        "Upstream error: Bad Gateway"
    );
}
