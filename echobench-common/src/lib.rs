use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub mod message;

pub use message::{BenchmarkMessage, Fill, PopulateDefaults};

/// Service identifier the echo responder registers under.
pub const SERVICE_NAME: &str = "benchmark";
/// Schema (interface) identifier of the echo responder.
pub const SCHEMA_NAME: &str = "Hello";
/// Operation (method) identifier of the echo responder.
pub const OPERATION_NAME: &str = "Say";

/// Address the echo server listens on when none is given.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8972";

/// Header carrying a per-call request id, for correlating client and server logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Value of `field1` in a reply that was handled correctly.
pub const SUCCESS_MARKER: &str = "OK";
/// Value the echo responder writes into `field2` of every reply.
pub const REPLY_FIELD2: i32 = 100;

/// Error types for echobench operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("Reply missing success marker (field1 = {0:?})")]
    MissingSuccessMarker(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Call cancelled by run shutdown")]
    Cancelled,
}

impl BenchError {
    /// `true` for failures reported by the invoke capability itself.
    pub fn is_invocation_error(&self) -> bool {
        matches!(
            self,
            BenchError::NetworkError(_) | BenchError::HttpError(..) | BenchError::MalformedReply(_)
        )
    }

    /// `true` when the call went through but the reply lacked the success marker.
    pub fn is_application_error(&self) -> bool {
        matches!(self, BenchError::MissingSuccessMarker(_))
    }

    /// Short failure class used in log records.
    pub fn class(&self) -> &'static str {
        if self.is_invocation_error() {
            "invocation"
        } else if self.is_application_error() {
            "application"
        } else {
            "harness"
        }
    }
}

/// JSON error envelope returned by the server for all error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result type for echobench operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Synchronous request/reply call against a remote service.
///
/// The harness depends only on this contract; connection setup, discovery and
/// wire encoding belong to the implementor. A call resolves once the reply has
/// been written into `reply` or the call has failed.
pub trait Invoke: Send + Sync {
    fn invoke(
        &self,
        service: &str,
        schema: &str,
        operation: &str,
        args: &BenchmarkMessage,
        reply: &mut BenchmarkMessage,
    ) -> impl Future<Output = Result<()>> + Send;
}
