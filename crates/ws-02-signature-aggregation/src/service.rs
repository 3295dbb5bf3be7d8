//! # Aggregation Client
//!
//! Application service that implements the `SignatureAggregationApi` trait.
//!
//! ## Retry Loop
//!
//! ```text
//! for attempt in 1..=max_attempts:
//!     validator set ──► canonical set ──► share requests ──► aggregate
//!         ok  → return signed message
//!         err → warn, back off, next attempt
//! all failed → QuorumNotReached { attempts, last }
//! ```
//!
//! Each attempt re-reads the validator set, so a set that changes between
//! attempts is picked up without restarting.

use crate::domain::{
    AggregationError, AttemptFailure, BitSetSignature, CanonicalValidatorSet, QuorumThreshold,
    SignedMessage,
};
use crate::ports::inbound::SignatureAggregationApi;
use crate::ports::outbound::{CryptoAggregator, PeerNetwork, ShareRequest};
use async_trait::async_trait;
use shared_types::Id;
use signer_telemetry::{AggregationMetrics, RunOutcome};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, instrument, warn, Instrument};
use ws_01_message_derivation::UnsignedMessage;

/// Default number of attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Default bound on one attempt's network phases.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Time past the attempt deadline that share collection may use to return.
const COLLECTION_GRACE: Duration = Duration::from_millis(100);

/// How the aggregation loop retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// At least one.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
    /// Deadline for one attempt, shared by the validator-set fetch and
    /// share collection.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::ZERO,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), AggregationError> {
        if self.max_attempts == 0 {
            return Err(AggregationError::InvalidRetryPolicy(
                "max_attempts must be at least 1",
            ));
        }
        if self.attempt_timeout.is_zero() {
            return Err(AggregationError::InvalidRetryPolicy(
                "attempt_timeout must be positive",
            ));
        }
        Ok(())
    }
}

/// Signature aggregation client.
pub struct AggregationClient<P: PeerNetwork, C: CryptoAggregator> {
    network: P,
    crypto: C,
    policy: RetryPolicy,
    metrics: Option<AggregationMetrics>,
}

impl<P: PeerNetwork, C: CryptoAggregator> AggregationClient<P, C> {
    pub fn new(network: P, crypto: C) -> Self {
        Self {
            network,
            crypto,
            policy: RetryPolicy::default(),
            metrics: None,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Result<Self, AggregationError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn with_metrics(mut self, metrics: AggregationMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn network(&self) -> &P {
        &self.network
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run attempts until one yields a quorum signature over `message`.
    pub async fn run(
        &self,
        message: &[u8],
        justification: &[u8],
        destination_id: Id,
        quorum: QuorumThreshold,
    ) -> Result<BitSetSignature, AggregationError> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let span = info_span!("aggregation_attempt", attempt, max_attempts);
            let started = Instant::now();
            let result = self
                .attempt(message, justification, destination_id, quorum)
                .instrument(span)
                .await;

            if let Some(metrics) = &self.metrics {
                metrics.record_attempt();
                metrics.observe_attempt_duration(started.elapsed().as_secs_f64());
            }

            match result {
                Ok(signature) => {
                    info!(
                        "[ws-02] Quorum reached on attempt {}/{} with {} signers",
                        attempt,
                        max_attempts,
                        signature.signers.count()
                    );
                    self.record_run(RunOutcome::Success);
                    return Ok(signature);
                }
                Err(failure) => {
                    warn!(
                        "[ws-02] Attempt {}/{} failed: {}",
                        attempt, max_attempts, failure
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_attempt_failure(failure.reason());
                    }
                    if attempt >= max_attempts {
                        self.record_run(RunOutcome::Exhausted);
                        return Err(AggregationError::QuorumNotReached {
                            attempts: attempt,
                            last: failure,
                        });
                    }
                }
            }

            if !self.policy.backoff.is_zero() {
                tokio::time::sleep(self.policy.backoff).await;
            }
        }
    }

    async fn attempt(
        &self,
        message: &[u8],
        justification: &[u8],
        destination_id: Id,
        quorum: QuorumThreshold,
    ) -> Result<BitSetSignature, AttemptFailure> {
        let timeout = self.policy.attempt_timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        let validators =
            tokio::time::timeout_at(deadline, self.network.validator_set(destination_id))
                .await
                .map_err(|_| AttemptFailure::Timeout(timeout))??;

        let set = CanonicalValidatorSet::new(&validators)?;
        if set.total_weight() == 0 {
            return Err(AttemptFailure::ZeroTotalWeight);
        }
        debug!(
            "[ws-02] {} canonical validators, total weight {}, quorum needs {}",
            set.len(),
            set.total_weight(),
            quorum.required_weight(set.total_weight())
        );

        let request = ShareRequest {
            message: message.to_vec(),
            justification: justification.to_vec(),
            targets: set.signing_node_ids(),
        };
        // The network gets what is left of the attempt as its collection
        // window, plus a short grace to hand back the shares it gathered.
        let window = deadline.saturating_duration_since(tokio::time::Instant::now());
        let shares = tokio::time::timeout_at(
            deadline + COLLECTION_GRACE,
            self.network.collect_shares(&request, window),
        )
        .await
        .map_err(|_| AttemptFailure::Timeout(timeout))??;
        debug!("[ws-02] Collected {} signature shares", shares.len());

        self.crypto.aggregate(message, &set, &shares, quorum)
    }

    fn record_run(&self, outcome: RunOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_run(outcome);
        }
    }
}

#[async_trait]
impl<P: PeerNetwork, C: CryptoAggregator> SignatureAggregationApi for AggregationClient<P, C> {
    #[instrument(skip(self, message, justification), fields(destination = %destination_id))]
    async fn aggregate(
        &self,
        message: &UnsignedMessage,
        justification: &[u8],
        destination_id: Id,
        quorum_numerator: u64,
    ) -> Result<SignedMessage, AggregationError> {
        let prepared = QuorumThreshold::new(quorum_numerator)
            .and_then(|quorum| Ok((quorum, message.encode()?)));
        let (quorum, bytes) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                self.record_run(RunOutcome::Aborted);
                return Err(e);
            }
        };

        let signature = self
            .run(&bytes, justification, destination_id, quorum)
            .await?;
        Ok(SignedMessage {
            unsigned: message.clone(),
            signature,
        })
    }
}
