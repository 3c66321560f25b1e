use pipe_core::ordered_sets::LINK_CONFIG_WORD;
use pipe_core::{LinkConfig, OrderedSet, OrderedSetKind, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DetectorOutput {
    /// Asserted on the last word of the N-th consecutive matching set
    pub detected: bool,
    /// Asserted on every valid word that did not match
    pub error: bool,
}

/// Detects N consecutive repetitions of one ordered set in the received word stream.
/// Always ready. A single mismatching word restarts both the cursor and the
/// repetition count.
#[derive(Debug, Clone)]
pub struct OrderedSetDetector {
    set: OrderedSet,
    n_sets: u32,

    cursor: usize,
    reps: u32,
    link_config: LinkConfig,
}

impl OrderedSetDetector {
    pub fn new(kind: OrderedSetKind, n_sets: u32) -> Self {
        OrderedSetDetector {
            set: OrderedSet::new(kind),
            n_sets: n_sets.max(1),
            cursor: 0,
            reps: 0,
            link_config: LinkConfig::default(),
        }
    }

    pub fn kind(&self) -> OrderedSetKind {
        self.set.kind()
    }

    /// Link config of the last matching TS1/TS2 link config word
    pub fn link_config(&self) -> LinkConfig {
        self.link_config
    }

    pub fn tick(&mut self, word: Option<&Word>) -> DetectorOutput {
        let Some(word) = word else {
            return DetectorOutput::default();
        };

        if !self.set.matches(self.cursor, word) {
            if self.cursor != 0 || self.reps != 0 {
                tracing::trace!(
                    "{} mismatch at word {} after {} sets: {}",
                    self.set.kind().name(),
                    self.cursor,
                    self.reps,
                    word
                );
            }
            self.cursor = 0;
            self.reps = 0;
            return DetectorOutput { detected: false, error: true };
        }

        if self.set.kind().carries_link_config() && self.cursor == LINK_CONFIG_WORD {
            self.link_config = OrderedSet::decode_link_config(word);
        }

        let mut detected = false;
        if self.cursor == self.set.len() - 1 {
            self.cursor = 0;
            self.reps += 1;
            if self.reps == self.n_sets {
                detected = true;
                self.reps = 0;
            }
        } else {
            self.cursor += 1;
        }

        DetectorOutput { detected, error: false }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.reps = 0;
        self.link_config = LinkConfig::default();
    }
}
