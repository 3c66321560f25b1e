pub mod components;
pub mod lfps_unit;

pub use lfps_unit::{LfpsInput, LfpsOutput, LfpsUnit};
