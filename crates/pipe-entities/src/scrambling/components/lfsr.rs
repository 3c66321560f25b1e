//! USB3 scrambler, G(X) = X^16 + X^5 + X^4 + X^3 + 1
//! See USB 3.0 Appendix B. The LFSR is advanced 32 bits per word, so both the
//! next state and the 32-bit mask are given as parallel XOR equations over the
//! current state.

use pipe_core::Word;

/// Canonical LFSR seed
pub const LFSR_SEED: u16 = 0xffff;

/// Bits of the current state XORed into each bit of the next state
const ADVANCE_TAPS: [&[u8]; 16] = [
    &[0, 6, 8, 10],
    &[1, 7, 9, 11],
    &[2, 8, 10, 12],
    &[3, 6, 8, 9, 10, 11, 13],
    &[4, 6, 7, 8, 9, 11, 12, 14],
    &[5, 6, 7, 9, 12, 13, 15],
    &[0, 6, 7, 8, 10, 13, 14],
    &[1, 7, 8, 9, 11, 14, 15],
    &[0, 2, 8, 9, 10, 12, 15],
    &[1, 3, 9, 10, 11, 13],
    &[0, 2, 4, 10, 11, 12, 14],
    &[1, 3, 5, 11, 12, 13, 15],
    &[2, 4, 6, 12, 13, 14],
    &[3, 5, 7, 13, 14, 15],
    &[4, 6, 8, 14, 15],
    &[5, 7, 9, 15],
];

/// Bits of the current state XORed into each bit of the output mask
const MASK_TAPS: [&[u8]; 32] = [
    &[15],
    &[14],
    &[13],
    &[12],
    &[11],
    &[10],
    &[9],
    &[8],
    &[7],
    &[6],
    &[5],
    &[4, 15],
    &[3, 14, 15],
    &[2, 13, 14, 15],
    &[1, 12, 13, 14],
    &[0, 11, 12, 13],
    &[10, 11, 12, 15],
    &[9, 10, 11, 14],
    &[8, 9, 10, 13],
    &[7, 8, 9, 12],
    &[6, 7, 8, 11],
    &[5, 6, 7, 10],
    &[4, 5, 6, 9, 15],
    &[3, 4, 5, 8, 14],
    &[2, 3, 4, 7, 13, 15],
    &[1, 2, 3, 6, 12, 14],
    &[0, 1, 2, 5, 11, 13, 15],
    &[0, 1, 4, 10, 12, 14],
    &[0, 3, 9, 11, 13],
    &[2, 8, 10, 12],
    &[1, 7, 9, 11],
    &[0, 6, 8, 10],
];

#[inline]
fn xor_taps(state: u16, taps: &[u8]) -> u32 {
    taps.iter().fold(0, |acc, &t| acc ^ ((state >> t) & 1) as u32)
}

/// State after one word (32 shifts)
pub fn lfsr_advance(state: u16) -> u16 {
    ADVANCE_TAPS
        .iter()
        .enumerate()
        .fold(0, |acc, (i, taps)| acc | ((xor_taps(state, taps) as u16) << i))
}

/// 32-bit scrambling mask for the word emitted in `state`
pub fn lfsr_mask(state: u16) -> u32 {
    MASK_TAPS
        .iter()
        .enumerate()
        .fold(0, |acc, (i, taps)| acc | (xor_taps(state, taps) << i))
}

/// XOR the mask into the data lanes, control lanes pass unmodified
pub fn scramble_word(word: &Word, mask: u32) -> Word {
    Word {
        data: word.data ^ (mask & word.data_lane_mask()),
        ctrl: word.ctrl,
    }
}

#[derive(Debug, Clone)]
pub struct ScramblerLfsr {
    seed: u16,
    state: u16,
}

impl ScramblerLfsr {
    pub fn new(seed: u16) -> Self {
        ScramblerLfsr { seed, state: seed }
    }

    pub fn state(&self) -> u16 {
        self.state
    }

    pub fn mask(&self) -> u32 {
        lfsr_mask(self.state)
    }

    pub fn advance(&mut self) {
        self.state = lfsr_advance(self.state);
    }

    pub fn reset(&mut self) {
        self.state = self.seed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scrambler output for an all-zero data input starting from 0xffff
    const REFERENCE: [u32; 64] = [
        0x14c017ff, 0x8202e7b2, 0xa6286e72, 0x8dbf6dbe, 0xe6a740be, 0xb2e2d32c, 0x2a770207, 0xe0be34cd,
        0xb1245da7, 0x22bda19b, 0xd31d45d4, 0xee76ead7, 0xfa1ada2c, 0x3b362d28, 0x676f0e3a, 0x264c06cf,
        0xcd3ae9d3, 0xfc307627, 0xde038b94, 0xf65206d3, 0x9580884f, 0xf2666ac4, 0x35a10c9f, 0x27cf41e2,
        0x9e7e4074, 0x84fe58a5, 0xa9086009, 0x626f0bf1, 0xed5c4317, 0xd43f3948, 0xb30ef55a, 0x9b9d03c7,
        0x5c8e0d8b, 0xae779833, 0x3e0bac2d, 0x7a420bda, 0xa8cfd17c, 0x41ee121c, 0x7a383fc2, 0x01f4690d,
        0xc57231da, 0x0e93d7a0, 0x55a4afdc, 0x1672f0e7, 0x8438d568, 0x18cd00dd, 0x5930ca9e, 0x771b754c,
        0xcfedc531, 0x3d6e6491, 0x0429e8fe, 0xc4fc6ccf, 0x62da5e0b, 0xdfab5bba, 0x377db759, 0xc61ae35e,
        0x4ff51488, 0xcb56c88b, 0x634210d3, 0xf7b48a04, 0x01a00184, 0xee674983, 0xa48b2a3e, 0xd514af76,
    ];

    #[test]
    fn test_reference_vector() {
        let mut lfsr = ScramblerLfsr::new(LFSR_SEED);
        for (i, expected) in REFERENCE.iter().enumerate() {
            assert_eq!(lfsr.mask(), *expected, "word {}", i);
            lfsr.advance();
        }
    }

    #[test]
    fn test_tx_seed_follows_ts2() {
        // COM word resets, then the three data words of a TS2
        let mut state = LFSR_SEED;
        for _ in 0..3 {
            state = lfsr_advance(state);
        }
        assert_eq!(state, 0x7dbd);
        assert_eq!(lfsr_mask(0x7dbd), REFERENCE[3]);
    }

    #[test]
    fn test_ctrl_lanes_untouched() {
        let w = Word::new(0xbc00bc00, 0b1010);
        let s = scramble_word(&w, 0xffffffff);
        assert_eq!(s, Word::new(0xbcffbcff, 0b1010));
    }

    #[test]
    fn test_reset() {
        let mut lfsr = ScramblerLfsr::new(0x1234);
        lfsr.advance();
        assert_ne!(lfsr.state(), 0x1234);
        lfsr.reset();
        assert_eq!(lfsr.state(), 0x1234);
    }
}
