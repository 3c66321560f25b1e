use pipe_core::{PipeUnit, Word};

use crate::PipeUnitTrait;

use super::components::lfsr::{ScramblerLfsr, scramble_word};
use super::scrambler::ScramblerInput;

/// Receive side descrambler. Identical to the scrambler, except that every
/// accepted word carrying a COM returns the LFSR to its seed instead of advancing it.
#[derive(Debug, Clone)]
pub struct Descrambler {
    lfsr: ScramblerLfsr,
}

impl Descrambler {
    pub fn new(seed: u16) -> Self {
        Self {
            lfsr: ScramblerLfsr::new(seed),
        }
    }

    pub fn state(&self) -> u16 {
        self.lfsr.state()
    }
}

impl PipeUnitTrait for Descrambler {
    type Input = ScramblerInput;
    type Output = Option<Word>;

    fn unit(&self) -> PipeUnit {
        PipeUnit::Descrambler
    }

    fn tick(&mut self, input: &ScramblerInput) -> Option<Word> {
        let word = input.word?;
        if !input.enable {
            return Some(word);
        }
        let out = scramble_word(&word, self.lfsr.mask());
        if input.ready {
            if word.has_com() {
                self.lfsr.reset();
            } else {
                self.lfsr.advance();
            }
        }
        Some(out)
    }

    fn reset(&mut self) {
        self.lfsr.reset();
    }
}
