//! Aggregation fan-out, quorum accounting, and soft failures

#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use shared_crypto::BlsKeyPair;
use tokio_util::sync::CancellationToken;
use warp_attestation::{
    AttestationApi, AttestationError, MockSignatureClient, MockSignatureResponse,
    MockValidatorState, RegisteredValidator,
};

use super::{message, node, service_over, Fixture, HEIGHT};

/// Weights from the reference scenario: total 30003.
const WEIGHTS: [u64; 3] = [10_001, 10_002, 10_000];

#[tokio::test]
async fn test_two_of_three_meets_65_percent() {
    super::init_tracing();
    let fixture = Fixture::with_weights(&WEIGHTS);
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(fixture.signature(0)))
            .script(node(2), MockSignatureResponse::Sign(fixture.signature(1)))
            .script(node(3), MockSignatureResponse::Error),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 65, 100)
        .await
        .unwrap();

    // 19502 * 100 >= 30003 * 65, and validators 1+2 carry 20003.
    assert_eq!(result.signature_weight, 20_003);
    assert_eq!(result.total_weight, 30_003);
    let bitmap = &result.message.signature;
    assert_eq!(bitmap.num_signers(), 2);
    assert!(bitmap.has_signer(fixture.canonical_index(0)));
    assert!(bitmap.has_signer(fixture.canonical_index(1)));
    assert!(!bitmap.has_signer(fixture.canonical_index(2)));

    // Combination is point addition, so the combined signature matches the
    // direct aggregate of the two contributions regardless of arrival order.
    let expected =
        shared_crypto::BlsSignature::aggregate(&[fixture.signature(0), fixture.signature(1)])
            .unwrap();
    assert_eq!(bitmap.signature.to_bytes(), expected.to_bytes());
}

#[tokio::test]
async fn test_unanimous_quorum_sets_every_bit() {
    let fixture = Fixture::with_weights(&WEIGHTS);
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(fixture.signature(0)))
            .script(node(2), MockSignatureResponse::Sign(fixture.signature(1)))
            .script(node(3), MockSignatureResponse::Sign(fixture.signature(2))),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 100, 100)
        .await
        .unwrap();

    assert_eq!(result.signature_weight, 30_003);
    assert_eq!(result.total_weight, 30_003);
    assert_eq!(result.message.signature.num_signers(), 3);
}

#[tokio::test]
async fn test_no_replies_is_insufficient() {
    let fixture = Fixture::with_weights(&WEIGHTS);
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Error)
            .script(node(2), MockSignatureResponse::Error)
            .script(node(3), MockSignatureResponse::Error),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 1, 100)
        .await;

    assert!(matches!(
        result,
        Err(AttestationError::InsufficientWeight {
            accumulated: 0,
            total: 30_003,
        })
    ));
}

#[tokio::test]
async fn test_one_of_three_misses_35_percent() {
    let fixture = Fixture::with_weights(&WEIGHTS);
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(fixture.signature(0)))
            .script(node(2), MockSignatureResponse::Error)
            .script(node(3), MockSignatureResponse::Error),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 35, 100)
        .await;

    assert!(matches!(
        result,
        Err(AttestationError::InsufficientWeight {
            accumulated: 10_001,
            total: 30_003,
        })
    ));
}

#[tokio::test]
async fn test_two_of_three_misses_69_percent() {
    let fixture = Fixture::with_weights(&WEIGHTS);
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(fixture.signature(0)))
            .script(node(2), MockSignatureResponse::Sign(fixture.signature(1)))
            .script(node(3), MockSignatureResponse::Error),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 69, 100)
        .await;

    assert!(matches!(
        result,
        Err(AttestationError::InsufficientWeight {
            accumulated: 20_003,
            ..
        })
    ));
}

#[tokio::test]
async fn test_invalid_signature_never_blocks_quorum() {
    let fixture = Fixture::with_weights(&WEIGHTS);
    // Validator 1 responds with a signature from a key outside the set.
    let outsider = BlsKeyPair::generate().sign(&message().bytes());
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(outsider))
            .script(node(2), MockSignatureResponse::Sign(fixture.signature(1)))
            .script(node(3), MockSignatureResponse::Sign(fixture.signature(2))),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 64, 100)
        .await
        .unwrap();

    assert_eq!(result.signature_weight, 20_002);
    assert_eq!(result.message.signature.num_signers(), 2);
    assert!(!result
        .message
        .signature
        .has_signer(fixture.canonical_index(0)));
}

#[tokio::test]
async fn test_all_invalid_signatures_is_insufficient() {
    let fixture = Fixture::with_weights(&WEIGHTS);
    let outsider = BlsKeyPair::generate().sign(&message().bytes());
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(outsider.clone()))
            .script(node(2), MockSignatureResponse::Sign(outsider.clone()))
            .script(node(3), MockSignatureResponse::Sign(outsider)),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 1, 100)
        .await;

    assert!(matches!(
        result,
        Err(AttestationError::InsufficientWeight { accumulated: 0, .. })
    ));
}

#[tokio::test]
async fn test_invalid_and_failed_mix_still_aggregates() {
    let fixture = Fixture::with_weights(&WEIGHTS);
    let outsider = BlsKeyPair::generate().sign(&message().bytes());
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(outsider))
            .script(node(2), MockSignatureResponse::Error)
            .script(node(3), MockSignatureResponse::Sign(fixture.signature(2))),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 30, 100)
        .await
        .unwrap();

    assert_eq!(result.signature_weight, 10_000);
    assert_eq!(result.message.signature.num_signers(), 1);
    assert!(result
        .message
        .signature
        .has_signer(fixture.canonical_index(2)));
}

#[tokio::test]
async fn test_one_of_three_equal_weights_misses_two_thirds() {
    let fixture = Fixture::with_weights(&[100, 100, 100]);
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(fixture.signature(0)))
            .script(node(2), MockSignatureResponse::Error)
            .script(node(3), MockSignatureResponse::Error),
    );
    let service = service_over(fixture.state(), client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 2, 3)
        .await;

    assert!(matches!(
        result,
        Err(AttestationError::InsufficientWeight {
            accumulated: 100,
            total: 300,
        })
    ));
}

#[tokio::test]
async fn test_shared_key_merges_and_signs_once() {
    // Nodes 1 and 2 share a signing key; node 3 has its own.
    let shared = BlsKeyPair::generate();
    let solo = BlsKeyPair::generate();
    let mut roster = HashMap::new();
    roster.insert(node(1), RegisteredValidator::new(shared.public_key(), 100));
    roster.insert(node(2), RegisteredValidator::new(shared.public_key(), 250));
    roster.insert(node(3), RegisteredValidator::new(solo.public_key(), 50));
    let state = MockValidatorState {
        height: HEIGHT,
        roster,
        ..Default::default()
    };

    let shared_signature = shared.sign(&message().bytes());
    let solo_signature = solo.sign(&message().bytes());
    // The merged entry is asked once, through its lowest node id.
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(shared_signature))
            .script(node(3), MockSignatureResponse::Sign(solo_signature)),
    );
    let service = service_over(state, client);

    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 100, 100)
        .await
        .unwrap();

    assert_eq!(result.total_weight, 400);
    assert_eq!(result.signature_weight, 400);
    assert_eq!(result.message.signature.num_signers(), 2);
}

#[tokio::test]
async fn test_keyless_stake_raises_the_quorum_bar() {
    let mut fixture = Fixture::with_weights(&[100, 100]);
    fixture
        .roster
        .insert(node(9), RegisteredValidator::without_key(200));
    let client = Arc::new(
        MockSignatureClient::default()
            .script(node(1), MockSignatureResponse::Sign(fixture.signature(0)))
            .script(node(2), MockSignatureResponse::Sign(fixture.signature(1))),
    );
    let service = service_over(fixture.state(), Arc::clone(&client));

    // Every keyed validator signed, but 200 of 400 total misses 51%.
    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 51, 100)
        .await;
    assert!(matches!(
        result,
        Err(AttestationError::InsufficientWeight {
            accumulated: 200,
            total: 400,
        })
    ));

    // At 50% the same contributions clear the bar.
    let result = service
        .aggregate_signatures(CancellationToken::new(), &message(), 50, 100)
        .await
        .unwrap();
    assert_eq!(result.signature_weight, 200);
    assert_eq!(result.total_weight, 400);
}
