//! # Outbound Ports
//!
//! Traits for external dependencies (peer network, crypto aggregator).

use crate::domain::{
    AttemptFailure, BitSetSignature, CanonicalValidatorSet, QuorumThreshold, SignatureShare,
    Validator,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Id, NodeId};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One round of signature requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareRequest {
    /// Unsigned message bytes to sign.
    pub message: Vec<u8>,
    pub justification: Vec<u8>,
    /// Validators to ask, in canonical order.
    pub targets: Vec<NodeId>,
}

/// Peer network - outbound port.
#[async_trait]
pub trait PeerNetwork: Send + Sync {
    /// Current validators of `subnet_id`, weights and keys included.
    async fn validator_set(&self, subnet_id: Id) -> Result<Vec<Validator>, AttemptFailure>;

    /// Ask every target for a share and return what arrived within `timeout`.
    async fn collect_shares(
        &self,
        request: &ShareRequest,
        timeout: Duration,
    ) -> Result<Vec<SignatureShare>, AttemptFailure>;
}

/// Crypto aggregator - outbound port.
pub trait CryptoAggregator: Send + Sync {
    /// Verify shares and combine them into a quorum-satisfying signature.
    fn aggregate(
        &self,
        message: &[u8],
        validators: &CanonicalValidatorSet,
        shares: &[SignatureShare],
        quorum: QuorumThreshold,
    ) -> Result<BitSetSignature, AttemptFailure>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted peer network.
///
/// Each `collect_shares` call pops the next scripted round; once the script
/// is empty, `default_round` is returned.
pub struct MockPeerNetwork {
    pub validators: Vec<Validator>,
    pub rounds: Mutex<VecDeque<Result<Vec<SignatureShare>, AttemptFailure>>>,
    pub default_round: Result<Vec<SignatureShare>, AttemptFailure>,
    /// Error returned by `validator_set` when set.
    pub validator_set_failure: Option<AttemptFailure>,
    /// Per-call delays before `validator_set` answers, consumed in order.
    pub validator_set_delays: Mutex<VecDeque<Duration>>,
    /// `collect_shares` never completes.
    pub stall_collection: bool,
    collect_calls: AtomicUsize,
    validator_set_calls: AtomicUsize,
}

impl MockPeerNetwork {
    /// Network whose every round returns no shares.
    pub fn new(validators: Vec<Validator>) -> Self {
        Self {
            validators,
            rounds: Mutex::new(VecDeque::new()),
            default_round: Ok(Vec::new()),
            validator_set_failure: None,
            validator_set_delays: Mutex::new(VecDeque::new()),
            stall_collection: false,
            collect_calls: AtomicUsize::new(0),
            validator_set_calls: AtomicUsize::new(0),
        }
    }

    /// Queue a round result.
    pub fn push_round(&self, round: Result<Vec<SignatureShare>, AttemptFailure>) {
        self.rounds.lock().push_back(round);
    }

    /// Result for every round after the script runs out.
    pub fn with_default_round(
        mut self,
        round: Result<Vec<SignatureShare>, AttemptFailure>,
    ) -> Self {
        self.default_round = round;
        self
    }

    pub fn with_validator_set_failure(mut self, failure: AttemptFailure) -> Self {
        self.validator_set_failure = Some(failure);
        self
    }

    /// Delay the next `validator_set` answers by `delay`.
    pub fn push_validator_set_delay(&self, delay: Duration) {
        self.validator_set_delays.lock().push_back(delay);
    }

    pub fn with_stalled_collection(mut self) -> Self {
        self.stall_collection = true;
        self
    }

    /// Number of `collect_shares` calls so far.
    pub fn collect_calls(&self) -> usize {
        self.collect_calls.load(Ordering::SeqCst)
    }

    pub fn validator_set_calls(&self) -> usize {
        self.validator_set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerNetwork for MockPeerNetwork {
    async fn validator_set(&self, _subnet_id: Id) -> Result<Vec<Validator>, AttemptFailure> {
        self.validator_set_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.validator_set_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match &self.validator_set_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(self.validators.clone()),
        }
    }

    async fn collect_shares(
        &self,
        _request: &ShareRequest,
        _timeout: Duration,
    ) -> Result<Vec<SignatureShare>, AttemptFailure> {
        self.collect_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_collection {
            futures::future::pending::<()>().await;
        }
        let scripted = self.rounds.lock().pop_front();
        scripted.unwrap_or_else(|| self.default_round.clone())
    }
}
