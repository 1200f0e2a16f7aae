use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use echobench_common::{
    BenchmarkMessage, ErrorResponse, OPERATION_NAME, REPLY_FIELD2, REQUEST_ID_HEADER, SCHEMA_NAME,
    SERVICE_NAME, SUCCESS_MARKER,
};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Simulated processing time per call.
    pub delay: Duration,
}

impl AppState {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub delay: Duration,
}

/// Stateless echo responder
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the server's configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Create the application router with the given state
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/:service/:schema/:operation", post(handle_invoke))
            .with_state(state)
    }

    /// Run the server, signalling `ready_tx` with the bound address once accepting connections
    pub async fn run(self, ready_tx: tokio::sync::oneshot::Sender<SocketAddr>) -> Result<(), Box<dyn std::error::Error>> {
        let state = AppState::new(self.config.delay);
        let app = Self::create_router(state);
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, delay_ms = self.config.delay.as_millis() as u64, "echo server bound");
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

/// The echo operation: mark the message as handled and hand it back.
///
/// Sleeps for `delay` when non-zero to mimic business processing, otherwise
/// yields once so the reply is not produced inline.
pub async fn say(mut args: BenchmarkMessage, delay: Duration) -> BenchmarkMessage {
    args.field1 = SUCCESS_MARKER.to_string();
    args.field2 = REPLY_FIELD2;
    if delay > Duration::ZERO {
        tokio::time::sleep(delay).await;
    } else {
        tokio::task::yield_now().await;
    }
    args
}

/// Handler for POST /:service/:schema/:operation — only `benchmark/Hello/Say` is registered.
pub async fn handle_invoke(
    State(state): State<AppState>,
    Path((service, schema, operation)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(args): Json<BenchmarkMessage>,
) -> Response {
    if service != SERVICE_NAME || schema != SCHEMA_NAME || operation != OPERATION_NAME {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("No such operation: {}/{}/{}", service, schema, operation),
        );
    }

    if let Some(request_id) = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
        tracing::trace!(request_id, "invoke {}/{}/{}", service, schema, operation);
    }

    let reply = say(args, state.delay).await;
    (StatusCode::OK, Json(reply)).into_response()
}
