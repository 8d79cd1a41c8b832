//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chaum_pedersen_auth::{GroupParameters, VerifierEngine, VerifierPolicy};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Logs from the crate go to the test writer at DEBUG; HTTP/2 and tower noise
/// is filtered out. Subsequent calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("chaum_pedersen_auth=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

pub fn toy_engine() -> VerifierEngine {
    VerifierEngine::new(Arc::new(GroupParameters::toy()))
}

pub fn engine_with(params: GroupParameters, policy: VerifierPolicy) -> VerifierEngine {
    VerifierEngine::with_policy(Arc::new(params), policy)
}
