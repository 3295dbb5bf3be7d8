//! # Inbound Ports
//!
//! API trait defining what the message-derivation subsystem can do.

use crate::domain::{DerivationError, DerivedMessage};
use async_trait::async_trait;
use shared_types::Id;

/// Message derivation API - inbound port.
#[async_trait]
pub trait MessageDerivationApi: Send + Sync {
    /// Fetch a transaction by ID and derive its attestation message.
    async fn derive_for_transaction(&self, tx_id: Id) -> Result<DerivedMessage, DerivationError>;

    /// Derive the attestation message from raw signed transaction bytes.
    fn derive_from_bytes(&self, tx_bytes: &[u8]) -> Result<DerivedMessage, DerivationError>;

    /// Network the derived messages are bound to.
    fn network_id(&self) -> u32;
}
