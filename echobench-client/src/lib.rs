use echobench_common::{BenchError, BenchmarkMessage, ErrorResponse, Invoke, Result, REQUEST_ID_HEADER};
use uuid::Uuid;

/// echobench client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Echo server address (`host:port`).
    pub address: String,
}

/// HTTP/JSON transport for the echo service.
///
/// One `Client` is shared by every worker; the underlying `reqwest::Client`
/// pools connections across them.
pub struct Client {
    pub config: ClientConfig,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build the URL for an operation on the configured server.
    pub fn build_invoke_url(&self, service: &str, schema: &str, operation: &str) -> String {
        format!("http://{}/{}/{}/{}", self.config.address, service, schema, operation)
    }
}

impl Invoke for Client {
    async fn invoke(
        &self,
        service: &str,
        schema: &str,
        operation: &str,
        args: &BenchmarkMessage,
        reply: &mut BenchmarkMessage,
    ) -> Result<()> {
        let url = self.build_invoke_url(service, schema, operation);

        let response = self
            .http_client
            .post(&url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .json(args)
            .send()
            .await
            .map_err(|e| BenchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(parse_error_response(status, response).await);
        }

        *reply = response
            .json::<BenchmarkMessage>()
            .await
            .map_err(|e| BenchError::MalformedReply(e.to_string()))?;

        Ok(())
    }
}

async fn parse_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> BenchError {
    let error_msg = response
        .json::<ErrorResponse>()
        .await
        .map(|r| r.error)
        .unwrap_or_else(|_| format!("Server returned status: {}", status));

    BenchError::HttpError(status.as_u16(), error_msg)
}
