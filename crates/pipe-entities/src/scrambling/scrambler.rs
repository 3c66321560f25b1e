use pipe_core::{PipeUnit, Word};

use crate::PipeUnitTrait;

use super::components::lfsr::{ScramblerLfsr, scramble_word};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScramblerInput {
    pub word: Option<Word>,
    /// Downstream accepts the word
    pub ready: bool,
    /// Clock enable. While low the LFSR holds and words pass unmodified.
    pub enable: bool,
}

/// Transmit side scrambler. The mask is derived from the current state and
/// the LFSR advances once per accepted word.
#[derive(Debug, Clone)]
pub struct Scrambler {
    lfsr: ScramblerLfsr,
}

impl Scrambler {
    pub fn new(seed: u16) -> Self {
        Self {
            lfsr: ScramblerLfsr::new(seed),
        }
    }

    pub fn state(&self) -> u16 {
        self.lfsr.state()
    }
}

impl PipeUnitTrait for Scrambler {
    type Input = ScramblerInput;
    type Output = Option<Word>;

    fn unit(&self) -> PipeUnit {
        PipeUnit::Scrambler
    }

    fn tick(&mut self, input: &ScramblerInput) -> Option<Word> {
        let word = input.word?;
        if !input.enable {
            return Some(word);
        }
        let out = scramble_word(&word, self.lfsr.mask());
        if input.ready {
            self.lfsr.advance();
        }
        Some(out)
    }

    fn reset(&mut self) {
        self.lfsr.reset();
    }
}
