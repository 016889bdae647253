//! Shared plumbing for the HTTP-backed providers.

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{LlmError, Result};

/// Transport timeout applied when the provider config sets none.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a client with a transport-level timeout.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    Client::builder()
        .timeout(timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
        .build()
        .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {}", e)))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-2xx response into the matching error variant.
pub async fn error_for_status(response: Response) -> LlmError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    classify(status, retry_after, &body)
}

fn classify(status: StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        429 => LlmError::RateLimited { retry_after },
        code @ (502 | 503 | 529) => LlmError::ServerOverloaded {
            status: code,
            message,
        },
        code => LlmError::ApiError {
            message,
            status_code: Some(code),
        },
    }
}

pub fn transport_error(provider: &str, err: reqwest::Error) -> LlmError {
    LlmError::Transport {
        provider: provider.to_string(),
        message: err.to_string(),
    }
}
