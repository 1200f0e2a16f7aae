use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use echobench_common::{BenchmarkMessage, ErrorResponse, PopulateDefaults, SUCCESS_MARKER};
use echobench_server::{handle_invoke, say, AppState, Server, ServerConfig};
use std::time::{Duration, Instant};

// --- Test helpers ---

fn path(service: &str, schema: &str, operation: &str) -> Path<(String, String, String)> {
    Path((service.to_string(), schema.to_string(), operation.to_string()))
}

fn headers_with_request_id(id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", id.parse().unwrap());
    headers
}

/// Consume a response body into bytes.
async fn response_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn invoke(state: AppState, service: &str, schema: &str, operation: &str) -> Response {
    handle_invoke(
        State(state),
        path(service, schema, operation),
        headers_with_request_id("test-request"),
        Json(BenchmarkMessage::populated()),
    )
    .await
}

// --- Server struct ---

#[test]
fn test_server_config_custom() {
    use std::net::SocketAddr;
    let addr: SocketAddr = "0.0.0.0:9000".parse().unwrap();
    let config = ServerConfig { address: addr, delay: Duration::ZERO };
    assert_eq!(config.address.to_string(), "0.0.0.0:9000");
}

#[test]
fn test_server_creation_with_config() {
    use std::net::SocketAddr;
    let addr: SocketAddr = "0.0.0.0:9000".parse().unwrap();
    let server = Server::new(ServerConfig { address: addr, delay: Duration::from_millis(5) });
    assert_eq!(server.address(), addr);
}

// --- say ---

#[tokio::test]
async fn test_say_sets_marker_and_field2() {
    let reply = say(BenchmarkMessage::populated(), Duration::ZERO).await;
    assert_eq!(reply.field1, SUCCESS_MARKER);
    assert_eq!(reply.field2, 100);
    assert!(reply.has_success_marker());
}

#[tokio::test]
async fn test_say_echoes_other_fields() {
    let args = BenchmarkMessage::populated();
    let reply = say(args.clone(), Duration::ZERO).await;
    assert_eq!(reply.field3, args.field3);
    assert_eq!(reply.field22, args.field22);
    assert_eq!(reply.field129, args.field129);
    assert_eq!(reply.field5, args.field5);
}

#[tokio::test]
async fn test_say_honours_delay() {
    let start = Instant::now();
    say(BenchmarkMessage::default(), Duration::from_millis(20)).await;
    assert!(start.elapsed() >= Duration::from_millis(20));
}

// --- handle_invoke ---

#[tokio::test]
async fn test_invoke_registered_operation_returns_marked_reply() {
    let response = invoke(AppState::new(Duration::ZERO), "benchmark", "Hello", "Say").await;
    assert_eq!(response.status(), StatusCode::OK);

    let reply: BenchmarkMessage = serde_json::from_slice(&response_body(response).await).unwrap();
    assert!(reply.has_success_marker());
    assert_eq!(reply.field2, 100);
    assert_eq!(reply.field22, Some(100_000));
}

#[tokio::test]
async fn test_invoke_unknown_operation_returns_404() {
    for (service, schema, operation) in [
        ("other", "Hello", "Say"),
        ("benchmark", "Goodbye", "Say"),
        ("benchmark", "Hello", "Shout"),
    ] {
        let response = invoke(AppState::new(Duration::ZERO), service, schema, operation).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: ErrorResponse = serde_json::from_slice(&response_body(response).await).unwrap();
        assert_eq!(body.error, format!("No such operation: {service}/{schema}/{operation}"));
    }
}

#[tokio::test]
async fn test_invoke_without_request_id_still_succeeds() {
    let response = handle_invoke(
        State(AppState::new(Duration::ZERO)),
        path("benchmark", "Hello", "Say"),
        HeaderMap::new(),
        Json(BenchmarkMessage::default()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_run_signals_bound_address() {
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let server = Server::new(ServerConfig {
        address: "127.0.0.1:0".parse().unwrap(),
        delay: Duration::ZERO,
    });
    let handle = tokio::spawn(async move {
        server.run(ready_tx).await.ok();
    });

    let addr = tokio::time::timeout(Duration::from_secs(10), ready_rx)
        .await
        .expect("server did not bind in time")
        .expect("ready signal dropped");
    assert_ne!(addr.port(), 0);
    handle.abort();
}
