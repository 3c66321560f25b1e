pub mod components;
pub mod descrambler;
pub mod scrambler;

pub use components::lfsr::LFSR_SEED;
pub use descrambler::Descrambler;
pub use scrambler::{Scrambler, ScramblerInput};
