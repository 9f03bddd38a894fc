use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use tasty_core::{DecryptionKey, EcGroup, Secp160r1, P192, P224, P256};

fn bench_curve<G: EcGroup>(c: &mut Criterion) {
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let scalar = G::random_scalar(&mut rng);
    c.bench_function(&format!("{:?}::mul_generator", G::ID), |b| {
        b.iter(|| black_box(G::mul_generator(black_box(&scalar))))
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    bench_curve::<Secp160r1>(c);
    bench_curve::<P192>(c);
    bench_curve::<P224>(c);
    bench_curve::<P256>(c);

    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let key = DecryptionKey::generate(1024).unwrap();
    let m = 42u32.into();
    c.bench_function("paillier::encrypt::1024", |b| {
        b.iter(|| black_box(key.encryption_key().encrypt(&mut rng, black_box(&m)).unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
