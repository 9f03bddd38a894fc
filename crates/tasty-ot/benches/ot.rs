use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::BigUint;
use tasty_common::{test_utils::test_party_pair, Phase};
use tasty_ot::{
    iknp::IknpConfig, naor_pinkas::NaorPinkasConfig, BaseOtKind, Iknp, NaorPinkas, TastyOt,
    TastyOtConfig,
};

fn naor_pinkas(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("naor_pinkas");
    for n in [16, 80] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let pairs = vec![[BigUint::from(1u8), BigUint::from(2u8)]; n];
            let choices = vec![false; n];
            b.to_async(&rt).iter(|| async {
                let (mut client, mut server) = test_party_pair(1 << 20);

                let sender =
                    NaorPinkas::new(NaorPinkasConfig::default(), 128, pairs.clone().into())
                        .unwrap();
                let receiver =
                    NaorPinkas::new(NaorPinkasConfig::default(), 128, choices.clone().into())
                        .unwrap();

                let sender = server.register(sender, Phase::Precompute).unwrap();
                let receiver = client.register(receiver, Phase::Precompute).unwrap();

                let (_, received) =
                    tokio::join!(sender.resolve(&mut server), receiver.resolve(&mut client));

                black_box(received.unwrap())
            })
        });
    }
}

fn iknp(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("iknp");
    for n in [1024, 8192] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let pairs = vec![[BigUint::from(1u8), BigUint::from(2u8)]; n];
            let choices = vec![true; n];
            b.to_async(&rt).iter(|| async {
                let (mut client, mut server) = test_party_pair(1 << 24);

                let sender = Iknp::new(IknpConfig::default(), 81, pairs.clone().into()).unwrap();
                let receiver =
                    Iknp::new(IknpConfig::default(), 81, choices.clone().into()).unwrap();

                let sender = server.register(sender, Phase::Precompute).unwrap();
                let receiver = client.register(receiver, Phase::Precompute).unwrap();

                let (_, received) =
                    tokio::join!(sender.resolve(&mut server), receiver.resolve(&mut client));

                black_box(received.unwrap())
            })
        });
    }
}

fn tasty_online(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("tasty_online");
    let n = 1024;
    group.bench_function(BenchmarkId::from_parameter(n), |b| {
        let pairs = vec![[BigUint::from(1u8), BigUint::from(2u8)]; n];
        let choices = vec![true; n];
        b.to_async(&rt).iter(|| async {
            let (mut client, mut server) = test_party_pair(1 << 24);
            let config = TastyOtConfig::builder()
                .base(BaseOtKind::Dummy)
                .build()
                .unwrap();
            let mut sender = TastyOt::new(server.role(), config.clone());
            let mut receiver = TastyOt::new(client.role(), config);

            let (sent, received) = tokio::join!(
                sender.precompute(&mut server, n),
                receiver.precompute(&mut client, n)
            );
            sent.unwrap();
            received.unwrap();

            let sent = sender.next_ots(&mut server, pairs.clone().into()).unwrap();
            let received = receiver
                .next_ots(&mut client, choices.clone().into())
                .unwrap();

            let (_, received) =
                tokio::join!(sent.resolve(&mut server), received.resolve(&mut client));

            black_box(received.unwrap())
        })
    });
}

criterion_group! {
    name = ot_benches;
    config = Criterion::default().sample_size(10);
    targets = naor_pinkas, iknp, tasty_online
}

criterion_main!(ot_benches);
