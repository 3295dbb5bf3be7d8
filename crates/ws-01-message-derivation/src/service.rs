//! # Message Derivation Service
//!
//! Application service that implements the `MessageDerivationApi` trait.
//!
//! ## Architecture
//!
//! - Implements the inbound port (`MessageDerivationApi`)
//! - Uses the outbound port (`LedgerClient`) to fetch transaction bytes
//! - Delegates decoding and message construction to the domain layer

use crate::domain::{derive_message, DerivationError, DerivedMessage};
use crate::ports::inbound::MessageDerivationApi;
use crate::ports::outbound::LedgerClient;
use async_trait::async_trait;
use shared_types::Id;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default bound on a single ledger fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Message Derivation Service.
pub struct MessageDerivationService<L: LedgerClient> {
    ledger: L,
    network_id: u32,
    fetch_timeout: Duration,
}

impl<L: LedgerClient> MessageDerivationService<L> {
    /// Create a service that binds derived messages to `network_id`.
    pub fn new(ledger: L, network_id: u32) -> Self {
        Self {
            ledger,
            network_id,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}

#[async_trait]
impl<L: LedgerClient> MessageDerivationApi for MessageDerivationService<L> {
    #[instrument(skip(self), fields(network_id = self.network_id))]
    async fn derive_for_transaction(&self, tx_id: Id) -> Result<DerivedMessage, DerivationError> {
        let bytes = self
            .ledger
            .fetch_transaction(tx_id, self.fetch_timeout)
            .await?;
        debug!("[ws-01] Decoding {} transaction bytes", bytes.len());

        let derived = self.derive_from_bytes(&bytes)?;
        info!(
            "[ws-01] Derived conversion {} for subnet {} ({} validators)",
            derived.conversion_id,
            derived.subnet_id,
            derived.record.validators.len()
        );
        if let Ok(message_id) = derived.message.id() {
            debug!(
                declared_weight = ?derived.record.total_weight(),
                "[ws-01] Attestation message {} ({} bytes)",
                message_id,
                derived.bytes.len()
            );
        }
        Ok(derived)
    }

    fn derive_from_bytes(&self, tx_bytes: &[u8]) -> Result<DerivedMessage, DerivationError> {
        derive_message(tx_bytes, self.network_id)
    }

    fn network_id(&self) -> u32 {
        self.network_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::test_fixtures::*;
    use crate::domain::{FetchError, TxKind, UnsignedTx, FUJI_ID};
    use crate::ports::outbound::MockLedgerClient;

    fn service_with(unsigned: UnsignedTx) -> (MessageDerivationService<MockLedgerClient>, Id) {
        let tx = signed(unsigned);
        let ledger = MockLedgerClient::new();
        ledger.insert(tx.id(), tx.bytes().to_vec());
        (MessageDerivationService::new(ledger, FUJI_ID), tx.id())
    }

    #[tokio::test]
    async fn test_derive_for_conversion() {
        let (service, tx_id) = service_with(UnsignedTx::ConvertSubnetToL1(sample_conversion(
            vec![sample_validator(1, 10)],
        )));
        let derived = service.derive_for_transaction(tx_id).await.unwrap();
        assert_eq!(derived.tx_id, tx_id);
        assert_eq!(derived.message.network_id, FUJI_ID);
    }

    #[tokio::test]
    async fn test_same_tx_same_message() {
        let (service, tx_id) = service_with(UnsignedTx::ConvertSubnetToL1(sample_conversion(
            vec![sample_validator(1, 10), sample_validator(2, 5)],
        )));
        let a = service.derive_for_transaction(tx_id).await.unwrap();
        let b = service.derive_for_transaction(tx_id).await.unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[tokio::test]
    async fn test_wrong_kind_rejected() {
        let (service, tx_id) = service_with(UnsignedTx::Base(sample_base(5)));
        let err = service.derive_for_transaction(tx_id).await.unwrap_err();
        assert!(matches!(
            err,
            DerivationError::UnexpectedTransactionType(TxKind::Base)
        ));
    }

    #[tokio::test]
    async fn test_missing_tx_is_fetch_error() {
        let service = MessageDerivationService::new(MockLedgerClient::new(), FUJI_ID);
        let err = service.derive_for_transaction(Id([3; 32])).await.unwrap_err();
        assert!(matches!(err, DerivationError::Fetch(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_bytes_are_decode_error() {
        let ledger = MockLedgerClient::new();
        ledger.insert(Id([4; 32]), vec![0, 0, 0, 0, 0, 35, 1]);
        let service = MessageDerivationService::new(ledger, FUJI_ID);
        let err = service.derive_for_transaction(Id([4; 32])).await.unwrap_err();
        assert!(matches!(err, DerivationError::Decode(_)));
    }

    #[test]
    fn test_fetch_timeout_override() {
        let service = MessageDerivationService::new(MockLedgerClient::new(), FUJI_ID)
            .with_fetch_timeout(Duration::from_millis(250));
        assert_eq!(service.fetch_timeout, Duration::from_millis(250));
        assert_eq!(service.network_id(), FUJI_ID);
    }
}
