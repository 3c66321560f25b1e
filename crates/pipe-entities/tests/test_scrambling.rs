mod common;

use pipe_core::symbols::{COM, K_CODES, SKP};
use pipe_core::{Symbol, Word, debug};
use pipe_entities::PipeUnitTrait;
use pipe_entities::scrambling::{Descrambler, LFSR_SEED, Scrambler, ScramblerInput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use common::{Recorder, random_words};

fn accepted(word: Word) -> ScramblerInput {
    ScramblerInput { word: Some(word), ready: true, enable: true }
}

/// Random word with random control lanes, none of them COM
fn random_mixed_word<R: Rng>(rng: &mut R) -> Word {
    let mut w = Word::data_only(rng.random());
    for lane in 0..Word::LANES {
        if rng.random_bool(0.25) {
            let k = K_CODES[rng.random_range(0..K_CODES.len())].symbol;
            if k != COM {
                w.set_symbol(lane, k);
            }
        }
    }
    w
}

#[test]
fn test_zero_input_reference() {
    let mut recorder = Recorder::new(Scrambler::new(LFSR_SEED));
    recorder.feed((0..8).map(|_| accepted(Word::data_only(0))));
    let out: Vec<u32> = recorder.outputs.iter().map(|o| o.unwrap().data).collect();
    assert_eq!(
        out,
        vec![0x14c017ff, 0x8202e7b2, 0xa6286e72, 0x8dbf6dbe, 0xe6a740be, 0xb2e2d32c, 0x2a770207, 0xe0be34cd]
    );
}

#[test]
fn test_descramble_inverts_scramble() {
    debug::setup_logging_verbose();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let data = random_words(&mut rng, 4096);

    let mut scrambler = Scrambler::new(LFSR_SEED);
    let mut descrambler = Descrambler::new(LFSR_SEED);
    for (i, w) in data.iter().enumerate() {
        let s = scrambler.tick(&accepted(*w));
        let d = descrambler.tick(&ScramblerInput { word: s, ready: true, enable: true });
        assert_eq!(d, Some(*w), "word {}", i);
    }
    assert_eq!(scrambler.state(), descrambler.state());
}

#[test]
fn test_inverse_with_stalls_and_control_lanes() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut scrambler = Scrambler::new(0x7dbd);
    let mut descrambler = Descrambler::new(0x7dbd);

    let mut sent = vec![];
    let mut received = vec![];
    let mut pending = random_mixed_word(&mut rng);
    for _ in 0..2000 {
        let ready = rng.random_bool(0.7);
        let s = scrambler.tick(&ScramblerInput { word: Some(pending), ready, enable: true });
        if ready {
            sent.push(pending);
            let d = descrambler.tick(&ScramblerInput { word: s, ready: true, enable: true });
            received.extend(d);
            pending = random_mixed_word(&mut rng);
        }
    }
    assert!(!sent.is_empty());
    assert_eq!(sent, received);
}

#[test]
fn test_control_lanes_never_scrambled() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut scrambler = Scrambler::new(LFSR_SEED);
    for _ in 0..1000 {
        let w = random_mixed_word(&mut rng);
        let out = scrambler.tick(&accepted(w)).unwrap();
        assert_eq!(out.ctrl, w.ctrl);
        for lane in 0..Word::LANES {
            if w.lane_is_ctrl(lane) {
                assert_eq!(out.lane_byte(lane), w.lane_byte(lane), "{} -> {}", w, out);
            }
        }
    }
}

#[test]
fn test_descrambler_resyncs_on_com() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut scrambler = Scrambler::new(LFSR_SEED);
    let mut descrambler = Descrambler::new(LFSR_SEED);

    // Knock the descrambler out of step
    for w in random_words(&mut rng, 5) {
        descrambler.tick(&accepted(w));
    }

    // A COM word, sent unscrambled, pulls the receiver back to the seed. The
    // transmitter restarts from the seed at the same point.
    let com = Word::from_symbols(&[COM, SKP, SKP, SKP]).unwrap();
    assert_eq!(descrambler.tick(&accepted(com)), Some(com));
    scrambler.reset();

    let data = random_words(&mut rng, 64);
    for w in &data {
        let s = scrambler.tick(&accepted(*w));
        assert_eq!(descrambler.tick(&ScramblerInput { word: s, ready: true, enable: true }), Some(*w));
    }
}

#[test]
fn test_disabled_holds_state() {
    let mut scrambler = Scrambler::new(LFSR_SEED);
    let mut descrambler = Descrambler::new(LFSR_SEED);
    let w = Word::from_symbols(&[COM, Symbol::data(1), Symbol::data(2), Symbol::data(3)]).unwrap();
    let off = ScramblerInput { word: Some(w), ready: true, enable: false };
    for _ in 0..10 {
        assert_eq!(scrambler.tick(&off), Some(w));
        assert_eq!(descrambler.tick(&off), Some(w));
    }
    assert_eq!(scrambler.state(), LFSR_SEED);
    assert_eq!(descrambler.state(), LFSR_SEED);
}
