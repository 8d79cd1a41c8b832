//! Walkthrough of one Chaum-Pedersen login in the toy group, first with fixed
//! numbers so every step can be checked by hand, then through the verifier
//! engine with fresh randomness.

use std::sync::Arc;

use chaum_pedersen_auth::protocol::{compute_commitment, compute_response};
use chaum_pedersen_auth::{
    Commitment, GroupParameters, Prover, SecureRng, Statement, Verifier, VerifierEngine, Witness,
};
use num_bigint::BigUint;

fn by_hand(params: &GroupParameters) -> Result<(), Box<dyn std::error::Error>> {
    let (p, q, g, h) = (params.p(), params.q(), params.g(), params.h());
    println!("Group: p = {p}, q = {q}, g = {g}, h = {h}");

    let x = BigUint::from(6u32);
    let y1 = compute_commitment(g, &x, p);
    let y2 = compute_commitment(h, &x, p);
    println!("Peggy registers y1 = g^x = {y1}, y2 = h^x = {y2}");

    let k = BigUint::from(7u32);
    let r1 = compute_commitment(g, &k, p);
    let r2 = compute_commitment(h, &k, p);
    println!("Peggy commits r1 = g^k = {r1}, r2 = h^k = {r2}");

    let c = BigUint::from(4u32);
    println!("Victor challenges with c = {c}");

    let s = compute_response(&k, &c, &x, q);
    println!("Peggy answers s = (k - c*x) mod q = {s}");

    let statement = Statement::new(y1, y2);
    Verifier::new(params, &statement).verify_response(&Commitment::new(r1, r2), &c, &s)?;
    println!("Victor checks r1 = g^s * y1^c and r2 = h^s * y2^c: proof verified\n");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Chaum-Pedersen Authentication Walkthrough");
    println!("=========================================\n");

    let params = GroupParameters::toy();
    by_hand(&params)?;

    println!("Same flow through the verifier engine, with random k and c:");
    let engine = VerifierEngine::new(Arc::new(params.clone()));
    let prover = Prover::new(params, Witness::new(&BigUint::from(6u32)));
    let mut rng = SecureRng::new();

    let statement = prover.statement();
    engine
        .register("alice", statement.y1().clone(), statement.y2().clone())
        .await?;
    println!("  registered 'alice'");

    let (commitment, nonce) = prover.commit(&mut rng);
    let (auth_id, c) = engine
        .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
        .await?;
    println!("  challenge {auth_id}: c = {c}");

    let s = prover.respond(nonce, &c);
    let session_id = engine.verify_authentication(&auth_id, &s).await?;
    println!("  authenticated, session id {session_id}");

    match engine.verify_authentication(&auth_id, &s).await {
        Ok(_) => println!("  replay accepted (unexpected)"),
        Err(e) => println!("  replaying the same answer fails: {e}"),
    }

    Ok(())
}
