pub mod components;
pub mod training_unit;

pub use components::detector::{DetectorOutput, OrderedSetDetector};
pub use components::generator::{GeneratorInput, GeneratorOutput, OrderedSetGenerator};
pub use training_unit::{TrainingInput, TrainingOutput, TrainingUnit, TxSet};
