mod common;

use pipe_core::{OrderedSet, OrderedSetKind, Word, debug};
use pipe_entities::{LtssmState, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use common::{LinkTest, default_test_config, random_words};

const BRING_UP_TICKS: u64 = 100_000;

fn linked(test: &mut LinkTest) {
    test.bring_up(BRING_UP_TICKS);
    // Tail of the peer's training burst may still be in flight
    test.run(100);
    test.link.take_received(Side::A);
    test.link.take_received(Side::B);
}

#[test]
fn test_scrambled_data_both_directions() {
    debug::setup_logging_verbose();
    let mut rng = StdRng::seed_from_u64(1);
    let mut test = LinkTest::new(default_test_config(), 0);
    linked(&mut test);

    let to_b = random_words(&mut rng, 500);
    let to_a = random_words(&mut rng, 300);
    test.link.send(Side::A, to_b.clone());
    test.link.send(Side::B, to_a.clone());
    test.run(600);

    assert_eq!(test.link.pending(Side::A), 0);
    assert_eq!(test.link.received(Side::B), to_b.as_slice());
    assert_eq!(test.link.received(Side::A), to_a.as_slice());
}

#[test]
fn test_data_is_scrambled_on_the_wire() {
    let mut test = LinkTest::new(default_test_config(), 0);
    linked(&mut test);

    let zeros = vec![Word::data_only(0); 16];
    test.link.send(Side::A, zeros.clone());
    let mut wire = vec![];
    for _ in 0..16 {
        test.link.tick();
        wire.extend(test.link.last_outputs(Side::A).serdes_tx);
    }
    assert_eq!(wire.len(), 16);
    assert!(wire.iter().any(|w| w.data != 0));
    // TX scrambler starts from its seed on U0 entry
    assert_eq!(wire[0].data, 0x8dbf6dbe);

    test.run(10);
    assert_eq!(test.link.received(Side::B), zeros.as_slice());
}

#[test]
fn test_data_queued_before_link_up() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut test = LinkTest::new(default_test_config(), 0);
    let data = random_words(&mut rng, 64);
    test.link.send(Side::B, data.clone());

    test.run(5000);
    assert_eq!(test.link.pending(Side::B), data.len());
    assert!(test.link.received(Side::A).is_empty());

    test.bring_up(BRING_UP_TICKS);
    test.run(200);
    assert_eq!(test.link.pending(Side::B), 0);
    assert!(test.link.received(Side::A).ends_with(&data));
}

#[test]
fn test_backpressure() {
    debug::setup_logging_verbose();
    let mut rng = StdRng::seed_from_u64(3);
    let mut test = LinkTest::new(default_test_config(), 0);
    linked(&mut test);

    let data = random_words(&mut rng, 400);
    test.link.send(Side::A, data.clone());
    let mut stalls = 0;
    while test.link.pending(Side::A) > 0 {
        let ready = rng.random_bool(0.6);
        stalls += !ready as usize;
        test.link.set_serdes_tx_ready(Side::A, ready);
        test.link.tick();
        assert!(!ready || test.link.last_outputs(Side::A).core_tx_ready);
        assert!(ready || !test.link.last_outputs(Side::A).core_tx_ready);
    }
    test.link.set_serdes_tx_ready(Side::A, true);
    test.run(10);

    assert!(stalls > 0);
    assert!(test.link.both_ready());
    assert_eq!(test.link.received(Side::B), data.as_slice());
}

#[test]
fn test_no_core_traffic_before_ready() {
    let mut test = LinkTest::new(default_test_config(), 0);
    test.link.send(Side::A, vec![Word::data_only(0x1234_5678); 4]);
    loop {
        test.link.tick();
        let out = *test.link.last_outputs(Side::B);
        if out.ready {
            break;
        }
        assert_eq!(out.core_rx, None);
        assert!(!out.core_tx_ready);
        assert!(test.link.cycle() < BRING_UP_TICKS);
    }
}

#[test]
fn test_scrambling_disabled_by_peer() {
    debug::setup_logging_verbose();
    let mut rng = StdRng::seed_from_u64(4);
    let mut no_scrambling = default_test_config();
    no_scrambling.scrambling = false;
    let mut test = LinkTest::with_configs(no_scrambling, default_test_config(), 0);
    linked(&mut test);

    assert!(!test.link.last_outputs(Side::B).peer_link_config.scrambling);
    assert!(test.link.last_outputs(Side::A).peer_link_config.scrambling);

    // B wants scrambling but A does not advertise it, so B sends plain words
    let data = random_words(&mut rng, 32);
    test.link.send(Side::B, data.clone());
    let mut wire = vec![];
    for _ in 0..40 {
        test.link.tick();
        wire.extend(test.link.last_outputs(Side::B).serdes_tx);
    }
    let swapped: Vec<Word> = data.iter().map(|w| w.swap_endianness()).collect();
    assert_eq!(wire, swapped);
    assert_eq!(test.link.received(Side::A), data.as_slice());
}

#[test]
fn test_without_endianness_swap() {
    let mut cfg = default_test_config();
    cfg.endianness_swap = false;
    cfg.scrambling = false;
    let mut test = LinkTest::new(cfg, 0);
    linked(&mut test);

    let w = Word::data_only(0x0403_0201);
    test.link.send(Side::A, [w]);
    test.link.tick();
    assert_eq!(test.link.last_outputs(Side::A).serdes_tx, Some(w));
    test.run(4);
    assert_eq!(test.link.received(Side::B), &[w]);
}

#[test]
fn test_data_resumes_after_recovery() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut test = LinkTest::new(default_test_config(), 0);
    test.bring_up(BRING_UP_TICKS);

    let set = OrderedSet::new(OrderedSetKind::Ts1);
    let ts_rx_count = test.config_a.config().training.ts_rx_count as usize;
    let ts1: Vec<Word> = (0..ts_rx_count * set.len()).map(|i| set.word(i % set.len())).collect();
    test.link.inject(Side::A, ts1);
    test.run_until_state(Side::A, LtssmState::RecoveryActive, 1000);
    test.link.tick();
    linked(&mut test);

    let data = random_words(&mut rng, 100);
    test.link.send(Side::A, data.clone());
    test.run(200);
    assert_eq!(test.link.received(Side::B), data.as_slice());
}
