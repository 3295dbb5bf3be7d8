//! # Inbound Ports
//!
//! API trait defining what the signature-aggregation subsystem can do.

use crate::domain::{AggregationError, SignedMessage};
use async_trait::async_trait;
use shared_types::Id;
use ws_01_message_derivation::UnsignedMessage;

/// Signature aggregation API - inbound port.
#[async_trait]
pub trait SignatureAggregationApi: Send + Sync {
    /// Collect a quorum signature over `message` from the validators of
    /// `destination_id`.
    ///
    /// `justification` is forwarded to every peer so it can check the
    /// statement independently. `quorum_numerator` is a percentage.
    async fn aggregate(
        &self,
        message: &UnsignedMessage,
        justification: &[u8],
        destination_id: Id,
        quorum_numerator: u64,
    ) -> Result<SignedMessage, AggregationError>;
}
