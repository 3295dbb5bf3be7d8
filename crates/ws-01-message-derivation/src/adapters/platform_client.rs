//! Platform Ledger Client Adapter
//!
//! Implements `LedgerClient` against a node's platform-chain JSON-RPC API
//! (`platform.getTx` with hex encoding).

use super::json_rpc::{JsonRpcClient, RpcError};
use crate::domain::FetchError;
use crate::ports::outbound::LedgerClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::formatting::decode_hex_checksummed;
use shared_types::{sha256, Id};
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the platform chain API under a node's base URL.
pub const PLATFORM_API_PATH: &str = "/ext/bc/P";

#[derive(Debug, Serialize)]
struct GetTxParams {
    #[serde(rename = "txID")]
    tx_id: String,
    encoding: &'static str,
}

#[derive(Debug, Deserialize)]
struct GetTxReply {
    tx: String,
}

/// HTTP ledger client for the platform chain.
pub struct PlatformLedgerClient {
    rpc: JsonRpcClient,
}

impl PlatformLedgerClient {
    /// Create a client for the node at `base_url` (e.g. `https://api.avax-test.network`).
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        let url = format!("{}{}", base_url.trim_end_matches('/'), PLATFORM_API_PATH);
        Self {
            rpc: JsonRpcClient::new(http_client, url),
        }
    }

    pub fn url(&self) -> &str {
        self.rpc.url()
    }
}

fn is_not_found(message: &str) -> bool {
    message.to_ascii_lowercase().contains("not found")
}

/// Decode a `platform.getTx` reply and check it hashes to `requested`.
fn decode_reply(requested: Id, reply: &GetTxReply) -> Result<Vec<u8>, FetchError> {
    let bytes = decode_hex_checksummed(&reply.tx)?;
    let received = Id(sha256(&bytes));
    if received != requested {
        return Err(FetchError::IdMismatch {
            requested,
            received,
        });
    }
    Ok(bytes)
}

#[async_trait]
impl LedgerClient for PlatformLedgerClient {
    async fn fetch_transaction(
        &self,
        tx_id: Id,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        debug!("[ws-01] Fetching transaction {} from {}", tx_id, self.url());

        let params = GetTxParams {
            tx_id: tx_id.to_string(),
            encoding: "hex",
        };
        let call = self.rpc.call::<_, GetTxReply>("platform.getTx", params, timeout);
        let reply = match tokio::time::timeout(timeout, call).await {
            Err(_) => return Err(FetchError::Timeout(timeout)),
            Ok(Ok(reply)) => reply,
            Ok(Err(RpcError::Timeout(t))) => return Err(FetchError::Timeout(t)),
            Ok(Err(RpcError::Remote(e))) if is_not_found(&e.message) => {
                return Err(FetchError::NotFound(tx_id))
            }
            Ok(Err(e)) => {
                warn!("[ws-01] platform.getTx failed for {}: {}", tx_id, e);
                return Err(FetchError::Transport(e.to_string()));
            }
        };

        let bytes = decode_reply(tx_id, &reply)?;
        debug!("[ws-01] Fetched {} bytes for {}", bytes.len(), tx_id);
        Ok(bytes)
    }
}
