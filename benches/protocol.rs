use std::hint::black_box;

use chaum_pedersen_auth::protocol::validate;
use chaum_pedersen_auth::{GroupParameters, Prover, SecureRng, Verifier, Witness};
use criterion::{criterion_group, criterion_main, Criterion};

fn presets() -> [(&'static str, GroupParameters); 2] {
    [
        ("demo256", GroupParameters::demo256()),
        ("rfc5114", GroupParameters::rfc5114()),
    ]
}

fn bench_commitment(c: &mut Criterion) {
    for (name, params) in presets() {
        let mut rng = SecureRng::new();
        let x = rng.exponent(params.q());
        let prover = Prover::new(params, Witness::new(&x));

        c.bench_function(&format!("{name}_commit"), |b| {
            b.iter(|| prover.commit(black_box(&mut rng)))
        });
    }
}

fn bench_verification(c: &mut Criterion) {
    for (name, params) in presets() {
        let mut rng = SecureRng::new();
        let x = rng.exponent(params.q());
        let prover = Prover::new(params.clone(), Witness::new(&x));
        let statement = prover.statement().clone();

        let (commitment, nonce) = prover.commit(&mut rng);
        let challenge = rng.exponent(params.q());
        let s = prover.respond(nonce, &challenge);

        c.bench_function(&format!("{name}_verify_response"), |b| {
            b.iter(|| {
                Verifier::new(&params, &statement)
                    .verify_response(black_box(&commitment), black_box(&challenge), black_box(&s))
                    .unwrap()
            })
        });
    }
}

fn bench_parameter_validation(c: &mut Criterion) {
    let params = GroupParameters::rfc5114();
    c.bench_function("rfc5114_validate", |b| {
        b.iter(|| {
            validate(
                black_box(params.p()),
                black_box(params.q()),
                black_box(params.g()),
                black_box(params.h()),
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_commitment,
    bench_verification,
    bench_parameter_validation
);
criterion_main!(benches);
