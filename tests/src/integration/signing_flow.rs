//! # Signing Flow
//!
//! Ledger transaction → WS-01 derivation → WS-02 aggregation → signed bytes,
//! with mock ports and real BLS keys.
//!
//! ## Scenarios
//!
//! 1. Weights A=10, B=20, C=70 at quorum 67: A+C succeeds on attempt 1
//! 2. A+B only: every attempt fails and the run stops after the limit
//! 3. Two failed rounds, then a quorum on attempt 3
//! 4. Random weights and signer subsets agree with the quorum inequality

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use prometheus::Registry;
    use rand::Rng;
    use shared_types::Id;
    use signer_runtime::format_signature;
    use signer_telemetry::{encode_metrics, AggregationMetrics, RunOutcome};
    use ws_01_message_derivation::{
        DerivationError, DerivedMessage, FetchError, MessageDerivationApi,
        MessageDerivationService, MockLedgerClient, FUJI_ID, MAINNET_ID,
    };
    use ws_02_signature_aggregation::{
        AggregationClient, AggregationError, AttemptFailure, BlsCryptoAggregator,
        CanonicalValidatorSet, MockPeerNetwork, QuorumThreshold, RetryPolicy,
        SignatureAggregationApi, SignedMessage,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    async fn derive(keys: &[SignerKey], network_id: u32) -> DerivedMessage {
        let tx = conversion_tx(keys);
        let ledger = MockLedgerClient::new();
        ledger.insert(tx.id(), tx.bytes().to_vec());
        MessageDerivationService::new(ledger, network_id)
            .derive_for_transaction(tx.id())
            .await
            .unwrap()
    }

    fn client(network: MockPeerNetwork) -> AggregationClient<MockPeerNetwork, BlsCryptoAggregator> {
        AggregationClient::new(network, BlsCryptoAggregator::new())
    }

    async fn aggregate(
        client: &AggregationClient<MockPeerNetwork, BlsCryptoAggregator>,
        derived: &DerivedMessage,
    ) -> Result<SignedMessage, AggregationError> {
        client
            .aggregate(
                &derived.message,
                &derived.justification(),
                derived.subnet_id,
                67,
            )
            .await
    }

    // =========================================================================
    // END-TO-END SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_quorum_on_first_attempt() {
        let keys = generate_keys(&mut rng(1), &[10, 20, 70]);
        let derived = derive(&keys, FUJI_ID).await;
        assert_eq!(derived.subnet_id, SUBNET_ID);

        let network = MockPeerNetwork::new(validators(&keys)).with_default_round(Ok(vec![
            keys[0].share(&derived.bytes),
            keys[2].share(&derived.bytes),
        ]));
        let client = client(network);

        let signed = aggregate(&client, &derived).await.unwrap();
        assert_eq!(client.network().collect_calls(), 1);

        let bytes = signed.encode().unwrap();
        assert!(bytes.starts_with(&derived.bytes));
        assert!(format_signature(&bytes).starts_with("0x"));

        let decoded = SignedMessage::decode(&bytes).unwrap();
        assert_eq!(decoded, signed);
        let set = CanonicalValidatorSet::new(&validators(&keys)).unwrap();
        assert!(decoded
            .verify(&set, QuorumThreshold::new(67).unwrap())
            .is_ok());
    }

    #[tokio::test]
    async fn test_insufficient_weight_exhausts_attempts() {
        let keys = generate_keys(&mut rng(2), &[10, 20, 70]);
        let derived = derive(&keys, FUJI_ID).await;

        let network = MockPeerNetwork::new(validators(&keys)).with_default_round(Ok(vec![
            keys[0].share(&derived.bytes),
            keys[1].share(&derived.bytes),
        ]));
        let client = client(network);

        let err = aggregate(&client, &derived).await.unwrap_err();
        assert_eq!(err.to_string(), "Quorum not reached after 100 attempts");
        assert!(matches!(
            err,
            AggregationError::QuorumNotReached {
                attempts: 100,
                last: AttemptFailure::InsufficientWeight {
                    signed: 30,
                    total: 100,
                    quorum_numerator: 67
                }
            }
        ));
        assert_eq!(client.network().collect_calls(), 100);
    }

    #[tokio::test]
    async fn test_quorum_on_third_attempt() {
        let keys = generate_keys(&mut rng(3), &[10, 20, 70]);
        let derived = derive(&keys, FUJI_ID).await;

        let network = MockPeerNetwork::new(validators(&keys)).with_default_round(Ok(vec![
            keys[1].share(&derived.bytes),
            keys[2].share(&derived.bytes),
        ]));
        network.push_round(Err(AttemptFailure::Network("peer reset".into())));
        network.push_round(Ok(vec![keys[0].share(&derived.bytes)]));

        let registry = Registry::new();
        let metrics = AggregationMetrics::new(&registry).unwrap();
        let client = client(network).with_metrics(metrics.clone());

        aggregate(&client, &derived).await.unwrap();
        assert_eq!(client.network().collect_calls(), 3);
        assert_eq!(metrics.attempts(), 3);
        assert_eq!(metrics.runs(RunOutcome::Success), 1);

        let text = encode_metrics(&registry).unwrap();
        assert!(text.contains("ws_aggregation_attempts_total 3"));
    }

    #[tokio::test]
    async fn test_shares_over_other_network_rejected() {
        let keys = generate_keys(&mut rng(4), &[50, 50]);
        let fuji = derive(&keys, FUJI_ID).await;
        let mainnet = derive(&keys, MAINNET_ID).await;
        assert_eq!(fuji.conversion_id, mainnet.conversion_id);

        let network = MockPeerNetwork::new(validators(&keys)).with_default_round(Ok(vec![
            keys[0].share(&mainnet.bytes),
            keys[1].share(&mainnet.bytes),
        ]));
        let client = client(network)
            .with_retry_policy(RetryPolicy {
                max_attempts: 2,
                ..RetryPolicy::default()
            })
            .unwrap();

        assert!(matches!(
            aggregate(&client, &fuji).await,
            Err(AggregationError::QuorumNotReached {
                attempts: 2,
                last: AttemptFailure::InsufficientWeight { signed: 0, .. }
            })
        ));
    }

    #[tokio::test]
    async fn test_shared_key_merges_weight() {
        let keys = generate_keys(&mut rng(5), &[40, 40]);
        let derived = derive(&keys, FUJI_ID).await;

        // The first key also backs a second node, lifting its weight to 60 of 100.
        let mut roster = validators(&keys);
        roster.push(keys[0].alias(shared_types::NodeId([0xEE; 20]), 20));

        let network = MockPeerNetwork::new(roster.clone())
            .with_default_round(Ok(vec![keys[0].share(&derived.bytes)]));
        let client = client(network)
            .with_retry_policy(RetryPolicy {
                max_attempts: 1,
                ..RetryPolicy::default()
            })
            .unwrap();

        let signed = client
            .aggregate(&derived.message, &derived.justification(), derived.subnet_id, 60)
            .await
            .unwrap();
        let set = CanonicalValidatorSet::new(&roster).unwrap();
        assert_eq!(set.len(), 2);
        assert!(signed
            .verify(&set, QuorumThreshold::new(60).unwrap())
            .is_ok());
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_aggregation() {
        let service = MessageDerivationService::new(
            MockLedgerClient::failing(FetchError::NotFound(Id([1; 32]))),
            FUJI_ID,
        );
        assert!(matches!(
            service.derive_for_transaction(Id([1; 32])).await,
            Err(DerivationError::Fetch(FetchError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_random_subsets_follow_quorum_inequality() {
        let mut rng = rng(6);
        for _ in 0..8 {
            let weights: Vec<u64> = (0..6).map(|_| rng.gen_range(1..1_000)).collect();
            let keys = generate_keys(&mut rng, &weights);
            let derived = derive(&keys, FUJI_ID).await;

            let signers: Vec<&SignerKey> = keys.iter().filter(|_| rng.gen_bool(0.6)).collect();
            let signed_weight: u64 = signers.iter().map(|k| k.validator.weight).sum();
            let total: u64 = weights.iter().sum();
            let expected = signed_weight * 100 >= total * 67;

            let network = MockPeerNetwork::new(validators(&keys)).with_default_round(Ok(signers
                .iter()
                .map(|k| k.share(&derived.bytes))
                .collect()));
            let client = client(network)
                .with_retry_policy(RetryPolicy {
                    max_attempts: 1,
                    ..RetryPolicy::default()
                })
                .unwrap();

            assert_eq!(aggregate(&client, &derived).await.is_ok(), expected);
        }
    }
}
