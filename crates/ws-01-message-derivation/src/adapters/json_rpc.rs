//! Minimal JSON-RPC 2.0 client over HTTP.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

/// Error object returned by the remote endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC call failures.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// No response within the per-call timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or HTTP-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Endpoint answered with an error object.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Remote(RpcErrorObject),

    /// Response body was not a usable JSON-RPC response.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

/// JSON-RPC client bound to one URL.
pub struct JsonRpcClient {
    http_client: reqwest::Client,
    url: String,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `url`, sharing the given HTTP connection pool.
    pub fn new(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make a JSON-RPC call bounded by `timeout`.
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
        timeout: Duration,
    ) -> Result<R, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .http_client
            .post(&self.url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Remote(error));
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("missing result".to_string()))
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> RpcError {
    if err.is_timeout() {
        RpcError::Timeout(timeout)
    } else {
        RpcError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "platform.getTx",
            params: serde_json::json!({ "txID": "abc" }),
            id: 7,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "platform.getTx");
        assert_eq!(value["params"]["txID"], "abc");
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_error_response_parses() {
        let body = r#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"not found"},"id":1}"#;
        let parsed: JsonRpcResponse<String> = serde_json::from_str(body).unwrap();
        assert!(parsed.result.is_none());
        assert_eq!(parsed.error.unwrap().code, -32000);
    }

    #[test]
    fn test_remote_error_display() {
        let err = RpcError::Remote(RpcErrorObject {
            code: -32000,
            message: "not found".into(),
        });
        assert_eq!(err.to_string(), "RPC error -32000: not found");
    }
}
