//! # Signer Runtime
//!
//! Wires the derivation and aggregation subsystems to their HTTP adapters
//! and runs one signing request end to end.

use crate::container::SignerConfig;
use anyhow::{Context, Result};
use prometheus::Registry;
use shared_types::Id;
use signer_telemetry::{encode_metrics, AggregationMetrics, TelemetryError};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use ws_01_message_derivation::{
    MessageDerivationApi, MessageDerivationService, PlatformLedgerClient,
};
use ws_02_signature_aggregation::{
    AggregationClient, BlsCryptoAggregator, HttpPeerNetwork, SignatureAggregationApi,
    SignedMessage,
};

/// Signer runtime holding shared clients and the metrics registry.
pub struct SignerRuntime {
    config: SignerConfig,
    http_client: reqwest::Client,
    registry: Registry,
    metrics: AggregationMetrics,
}

impl SignerRuntime {
    /// Validate `config` and build the shared clients.
    pub fn new(config: SignerConfig) -> Result<Self> {
        config.validate()?;
        let registry = Registry::new();
        let metrics = AggregationMetrics::new(&registry)?;
        Ok(Self {
            config,
            http_client: reqwest::Client::new(),
            registry,
            metrics,
        })
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn metrics_text(&self) -> Result<String, TelemetryError> {
        encode_metrics(&self.registry)
    }

    /// Derive the attestation for `tx_id` and collect a quorum signature.
    pub async fn sign(&self, tx_id: Id) -> Result<SignedMessage> {
        let run_id = Uuid::new_v4();
        let span = info_span!("signing_run", %run_id, %tx_id);
        self.sign_inner(tx_id).instrument(span).await
    }

    async fn sign_inner(&self, tx_id: Id) -> Result<SignedMessage> {
        let ledger = PlatformLedgerClient::new(self.http_client.clone(), self.config.endpoint());
        let deriver = MessageDerivationService::new(ledger, self.config.network_id())
            .with_fetch_timeout(self.config.fetch_timeout);

        let derived = deriver
            .derive_for_transaction(tx_id)
            .await
            .context("failed to get message from tx")?;
        info!(
            "Conversion {} for subnet {}",
            derived.conversion_id, derived.subnet_id
        );

        let network = HttpPeerNetwork::connect(
            self.config.peer_network_config(derived.subnet_id),
            self.http_client.clone(),
        )
        .await
        .context("failed to create peer network")?;

        let client = AggregationClient::new(network, BlsCryptoAggregator::new())
            .with_retry_policy(self.config.retry_policy())?
            .with_metrics(self.metrics.clone());

        client
            .aggregate(
                &derived.message,
                &derived.justification(),
                derived.subnet_id,
                self.config.quorum_numerator,
            )
            .await
            .context("failed to aggregate signatures")
    }
}

/// `0x`-prefixed lowercase hex.
pub fn format_signature(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
