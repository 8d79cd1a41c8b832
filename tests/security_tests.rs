mod common;

use std::sync::Arc;
use std::time::Duration;

use chaum_pedersen_auth::{
    Error, GroupParameters, Prover, SecureRng, VerifierEngine, VerifierPolicy, Witness,
};
use num_bigint::BigUint;

fn big(v: u64) -> BigUint {
    BigUint::from(v)
}

/// Registers `user` with secret `x` and returns the prover.
async fn register(engine: &VerifierEngine, user: &str, x: u64) -> Prover {
    let prover = Prover::new(engine.params().clone(), Witness::new(&big(x)));
    let statement = prover.statement();
    engine
        .register(user, statement.y1().clone(), statement.y2().clone())
        .await
        .expect("registration should succeed");
    prover
}

#[tokio::test]
async fn end_to_end_alice_toy_group() {
    common::init_tracing();
    let engine = common::toy_engine();
    let prover = register(&engine, "alice", 6).await;
    let mut rng = SecureRng::new();

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    let s = prover.respond(nonce, &c);

    let session_id = engine.verify_authentication(&auth_id, &s).await.unwrap();
    assert!(!session_id.is_empty());
}

#[tokio::test]
async fn replay_after_success_is_unknown_auth_id() {
    common::init_tracing();
    let engine = common::toy_engine();
    let prover = register(&engine, "alice", 6).await;
    let mut rng = SecureRng::new();

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    let s = prover.respond(nonce, &c);

    engine.verify_authentication(&auth_id, &s).await.unwrap();
    let replay = engine.verify_authentication(&auth_id, &s).await;
    assert!(matches!(replay, Err(Error::UnknownAuthId(ref id)) if *id == auth_id));
}

#[tokio::test]
async fn forged_response_fails_and_cannot_be_retried() {
    common::init_tracing();
    let engine = common::toy_engine();
    let prover = register(&engine, "alice", 6).await;
    let mut rng = SecureRng::new();

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    let s = prover.respond(nonce, &c);
    let forged = (&s + 1u32) % engine.params().q();

    assert!(matches!(
        engine.verify_authentication(&auth_id, &forged).await,
        Err(Error::ProofMismatch)
    ));

    // Even the correct answer is refused now.
    assert!(matches!(
        engine.verify_authentication(&auth_id, &s).await,
        Err(Error::UnknownAuthId(_))
    ));
}

#[tokio::test]
async fn impostor_with_wrong_secret_is_rejected() {
    let engine = VerifierEngine::new(Arc::new(GroupParameters::demo256()));
    register(&engine, "alice", 123_456_789).await;
    let impostor = Prover::new(engine.params().clone(), Witness::new(&big(987_654_321)));
    let mut rng = SecureRng::new();

    let (commitment, nonce) = impostor.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    let s = impostor.respond(nonce, &c);

    assert!(matches!(
        engine.verify_authentication(&auth_id, &s).await,
        Err(Error::ProofMismatch)
    ));
}

#[tokio::test]
async fn double_registration_keeps_original_values() {
    let engine = common::toy_engine();
    engine.register("alice", big(2), big(3)).await.unwrap();

    let err = engine.register("alice", big(4), big(9)).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyRegistered(ref u) if u == "alice"));

    let stored = engine.state().get_user("alice").await.unwrap();
    assert_eq!(stored.statement.y1(), &big(2));
    assert_eq!(stored.statement.y2(), &big(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registration_has_one_winner() {
    let engine = common::toy_engine();
    let attempts = 32;

    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.register("alice", big(2), big(3)).await })
        })
        .collect();

    let mut successes = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(Error::AlreadyRegistered(_)) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(duplicates, attempts - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_verification_has_at_most_one_winner() {
    let engine = common::toy_engine();
    let prover = register(&engine, "alice", 6).await;
    let mut rng = SecureRng::new();

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    let s = prover.respond(nonce, &c);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = engine.clone();
            let auth_id = auth_id.clone();
            let s = s.clone();
            tokio::spawn(async move { engine.verify_authentication(&auth_id, &s).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(Error::UnknownAuthId(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn outstanding_challenges_are_capped_per_user() {
    let engine = common::toy_engine();
    let prover = register(&engine, "alice", 6).await;
    register(&engine, "bob", 3).await;
    let mut rng = SecureRng::new();

    let mut pending = Vec::new();
    for _ in 0..3 {
        let (commitment, nonce) = prover.commit(&mut rng);
        let issued = engine
            .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
            .await
            .unwrap();
        pending.push((issued, nonce));
    }

    let (commitment, _) = prover.commit(&mut rng);
    let err = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TooManyChallenges { limit: 3, .. }));

    // Bob has his own budget.
    engine
        .create_authentication_challenge("bob", big(8), big(4))
        .await
        .unwrap();

    // Each outstanding challenge can still be answered.
    for ((auth_id, c), nonce) in pending {
        let s = prover.respond(nonce, &c);
        engine.verify_authentication(&auth_id, &s).await.unwrap();
    }
}

#[tokio::test]
async fn expired_challenge_is_unknown() {
    let policy = VerifierPolicy {
        challenge_ttl: Some(Duration::ZERO),
        ..VerifierPolicy::default()
    };
    let engine = common::engine_with(GroupParameters::toy(), policy);
    let prover = register(&engine, "alice", 6).await;
    let mut rng = SecureRng::new();

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    let s = prover.respond(nonce, &c);

    assert!(matches!(
        engine.verify_authentication(&auth_id, &s).await,
        Err(Error::UnknownAuthId(_))
    ));
}

#[tokio::test]
async fn expired_session_is_not_returned() {
    let policy = VerifierPolicy {
        session_ttl: Some(Duration::ZERO),
        ..VerifierPolicy::default()
    };
    let engine = common::engine_with(GroupParameters::toy(), policy);
    let prover = register(&engine, "alice", 6).await;
    let mut rng = SecureRng::new();

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    let s = prover.respond(nonce, &c);
    let session_id = engine.verify_authentication(&auth_id, &s).await.unwrap();

    assert!(engine.session(&session_id).await.is_none());
    assert_eq!(engine.cleanup_expired().await, (0, 1));
}

#[tokio::test]
async fn unreduced_response_is_rejected() {
    let engine = common::toy_engine();
    let prover = register(&engine, "alice", 6).await;
    let mut rng = SecureRng::new();

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await
        .unwrap();
    // s + q satisfies both equations but is not in [0, q).
    let s = prover.respond(nonce, &c) + engine.params().q();

    assert!(matches!(
        engine.verify_authentication(&auth_id, &s).await,
        Err(Error::ProofMismatch)
    ));
}

#[tokio::test]
async fn identity_commitment_without_secret_fails() {
    // r1 = r2 = 1 is a valid subgroup element, but answering it requires x.
    let engine = common::toy_engine();
    register(&engine, "alice", 6).await;

    let (auth_id, c) = engine
        .create_authentication_challenge("alice", big(1), big(1))
        .await
        .unwrap();
    let c_mod_q = &c % engine.params().q();
    let guesses_right = c_mod_q == big(0);

    let result = engine.verify_authentication(&auth_id, &big(0)).await;
    assert_eq!(result.is_ok(), guesses_right);
}
