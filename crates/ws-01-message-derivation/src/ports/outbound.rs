//! # Outbound Ports
//!
//! Traits for external dependencies (ledger access).

use crate::domain::FetchError;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Id;
use std::collections::HashMap;
use std::time::Duration;

/// Ledger client - outbound port.
///
/// Implementations return the signed transaction bytes exactly as stored.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch signed transaction bytes by ID, bounded by `timeout`.
    async fn fetch_transaction(&self, tx_id: Id, timeout: Duration)
        -> Result<Vec<u8>, FetchError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory ledger for testing.
#[derive(Default)]
pub struct MockLedgerClient {
    /// Stored transactions keyed by ID.
    pub transactions: RwLock<HashMap<Id, Vec<u8>>>,
    /// Error returned for every request when set.
    pub failure: Option<FetchError>,
}

impl MockLedgerClient {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store bytes under an explicit ID.
    pub fn insert(&self, tx_id: Id, bytes: Vec<u8>) {
        self.transactions.write().insert(tx_id, bytes);
    }

    /// Ledger that fails every request.
    pub fn failing(error: FetchError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn fetch_transaction(
        &self,
        tx_id: Id,
        _timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.transactions
            .read()
            .get(&tx_id)
            .cloned()
            .ok_or(FetchError::NotFound(tx_id))
    }
}
