use num_bigint::BigUint;
use rstest::*;
use tasty_common::{channel::MemoryChannel, test_utils::test_party_pair, Party, Phase};
use tasty_core::CurveId;
use tasty_ot::{
    naor_pinkas::NaorPinkasConfig, paillier::PaillierOtConfig, BaseOtKind, OtError, TastyOt,
    TastyOtConfig,
};

fn init_tracing() {
    _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pairs(values: &[(u64, u64)]) -> Vec<[BigUint; 2]> {
    values
        .iter()
        .map(|(a, b)| [BigUint::from(*a), BigUint::from(*b)])
        .collect()
}

struct Setup {
    client: Party<MemoryChannel>,
    server: Party<MemoryChannel>,
    sender: TastyOt,
    receiver: TastyOt,
}

impl Setup {
    async fn new(config: TastyOtConfig, count: usize) -> Self {
        init_tracing();
        let (mut client, mut server) = test_party_pair(1 << 22);

        let mut sender = TastyOt::new(server.role(), config.clone());
        let mut receiver = TastyOt::new(client.role(), config);

        let (sent, received) = tokio::join!(
            sender.precompute(&mut server, count),
            receiver.precompute(&mut client, count)
        );
        sent.unwrap();
        received.unwrap();

        assert_eq!(sender.remaining(), count);
        assert_eq!(receiver.remaining(), count);

        Self {
            client,
            server,
            sender,
            receiver,
        }
    }

    async fn transfer(&mut self, pairs: Vec<[BigUint; 2]>, choices: Vec<bool>) -> Vec<BigUint> {
        let sent = self.sender.next_ots(&mut self.server, pairs.into()).unwrap();
        let received = self
            .receiver
            .next_ots(&mut self.client, choices.into())
            .unwrap();

        let (sent, received) = tokio::join!(
            sent.resolve(&mut self.server),
            received.resolve(&mut self.client)
        );

        assert!(sent.unwrap().is_empty());
        assert_eq!(self.sender.remaining(), self.receiver.remaining());

        received.unwrap()
    }
}

fn config(base: BaseOtKind, extension: bool) -> TastyOtConfig {
    TastyOtConfig::builder()
        .base(base)
        .extension(extension)
        .msg_bits(32)
        .build()
        .unwrap()
}

#[rstest]
#[case::dummy(BaseOtKind::Dummy, true)]
#[case::dummy_without_extension(BaseOtKind::Dummy, false)]
#[case::naor_pinkas(
    BaseOtKind::NaorPinkas(NaorPinkasConfig::builder().curve(CurveId::P192).build().unwrap()),
    true
)]
#[case::naor_pinkas_compressed(
    BaseOtKind::NaorPinkas(
        NaorPinkasConfig::builder().curve(CurveId::Secp224r1).compress().build().unwrap()
    ),
    false
)]
#[case::paillier(
    BaseOtKind::Paillier(PaillierOtConfig::builder().key_bits(512).build().unwrap()),
    true
)]
#[tokio::test]
async fn test_tasty_ot(#[case] base: BaseOtKind, #[case] extension: bool) {
    let mut setup = Setup::new(config(base, extension), 2).await;

    let received = setup
        .transfer(pairs(&[(5, 7), (9, 10)]), vec![false, true])
        .await;

    assert_eq!(received, vec![BigUint::from(5u32), BigUint::from(10u32)]);
    assert_eq!(setup.sender.remaining(), 0);
}

#[tokio::test]
async fn test_tasty_ot_extended_pool() {
    // 300 OTs exceed the security parameter and go through the extension.
    let config = TastyOtConfig::builder()
        .base(BaseOtKind::Dummy)
        .build()
        .unwrap();
    let mut setup = Setup::new(config, 300).await;

    let values: Vec<(u64, u64)> = (0..300).map(|i| (i, 1000 + i)).collect();
    let choices: Vec<bool> = (0..300).map(|i| i % 3 == 0).collect();

    let mut received = Vec::new();
    for (values, choices) in values.chunks(100).zip(choices.chunks(100)) {
        received.extend(setup.transfer(pairs(values), choices.to_vec()).await);
    }

    let expected: Vec<BigUint> = (0..300u64)
        .map(|i| BigUint::from(if i % 3 == 0 { 1000 + i } else { i }))
        .collect();
    assert_eq!(received, expected);
}

#[rstest]
#[case::above_security_parameter(81, 512)]
#[case::above_key_bits(300, 256)]
#[tokio::test]
async fn test_tasty_ot_paillier_extension(#[case] count: usize, #[case] key_bits: usize) {
    let config = config(
        BaseOtKind::Paillier(
            PaillierOtConfig::builder()
                .key_bits(key_bits)
                .build()
                .unwrap(),
        ),
        true,
    );
    let mut setup = Setup::new(config, count).await;

    let values: Vec<(u64, u64)> = (0..count as u64).map(|i| (i, (1 << 31) | i)).collect();
    let choices: Vec<bool> = (0..count).map(|i| i % 2 == 1).collect();

    let received = setup.transfer(pairs(&values), choices).await;

    let expected: Vec<BigUint> = (0..count as u64)
        .map(|i| BigUint::from(if i % 2 == 1 { (1 << 31) | i } else { i }))
        .collect();
    assert_eq!(received, expected);
    assert_eq!(setup.sender.remaining(), 0);
}

#[tokio::test]
async fn test_tasty_ot_pool_exhausted() {
    let mut setup = Setup::new(config(BaseOtKind::Dummy, true), 3).await;

    for i in 0..3 {
        let received = setup
            .transfer(pairs(&[(i, i + 1)]), vec![i % 2 == 1])
            .await;
        assert_eq!(received, vec![BigUint::from(i + i % 2)]);
    }

    let err = setup
        .sender
        .next_ots(&mut setup.server, pairs(&[(1, 2)]).into())
        .unwrap_err();
    assert!(matches!(
        err,
        OtError::PoolExhausted {
            requested: 1,
            available: 0
        }
    ));

    let err = setup
        .receiver
        .next_ots(&mut setup.client, vec![true].into())
        .unwrap_err();
    assert!(matches!(
        err,
        OtError::PoolExhausted {
            requested: 1,
            available: 0
        }
    ));
}

#[tokio::test]
async fn test_tasty_ot_oversized_request_keeps_pool() {
    let mut setup = Setup::new(config(BaseOtKind::Dummy, true), 2).await;

    assert!(matches!(
        setup
            .sender
            .next_ots(&mut setup.server, pairs(&[(1, 2); 3]).into()),
        Err(OtError::PoolExhausted {
            requested: 3,
            available: 2
        })
    ));
    assert!(matches!(
        setup
            .sender
            .next_ots(&mut setup.server, pairs(&[(1 << 40, 2)]).into()),
        Err(OtError::ValueTooLarge { bits: 32, .. })
    ));
    assert_eq!(setup.sender.remaining(), 2);

    let received = setup
        .transfer(pairs(&[(3, 4), (5, 6)]), vec![true, true])
        .await;
    assert_eq!(received, vec![BigUint::from(4u32), BigUint::from(6u32)]);
}

#[tokio::test]
async fn test_tasty_ot_rejects_foreign_role() {
    init_tracing();
    let (mut client, _server) = test_party_pair(1024);
    let mut sender = TastyOt::new(tasty_common::Role::Server, TastyOtConfig::default());

    assert!(matches!(
        sender.next_ots(&mut client, pairs(&[(1, 2)]).into()),
        Err(OtError::InvalidState(_))
    ));
    assert_eq!(client.engine().pending(Phase::Online), 0);
}
