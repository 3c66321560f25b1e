use pipe_core::{LinkConfig, OrderedSet, OrderedSetKind, Word};

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorInput {
    /// Start a burst. Ignored while a burst is in progress.
    pub start: bool,
    /// Consumer accepts the current word
    pub ready: bool,
    /// Inserted live into the link config symbol of TS1/TS2
    pub link_config: LinkConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneratorOutput {
    pub word: Option<Word>,
    /// First word of the burst
    pub first: bool,
    /// Last word of the burst
    pub last: bool,
    /// The last word was accepted this cycle
    pub done: bool,
}

/// Streams N repetitions of one ordered set. Stalls while the consumer is not ready.
#[derive(Debug, Clone)]
pub struct OrderedSetGenerator {
    set: OrderedSet,
    n_sets: u32,

    cursor: usize,
    reps: u32,
    running: bool,
}

impl OrderedSetGenerator {
    pub fn new(kind: OrderedSetKind, n_sets: u32) -> Self {
        OrderedSetGenerator {
            set: OrderedSet::new(kind),
            n_sets: n_sets.max(1),
            cursor: 0,
            reps: 0,
            running: false,
        }
    }

    pub fn kind(&self) -> OrderedSetKind {
        self.set.kind()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick(&mut self, input: &GeneratorInput) -> GeneratorOutput {
        if !(input.start || self.running) {
            return GeneratorOutput::default();
        }

        let word = self.set.word_with_config(self.cursor, input.link_config);
        let first = self.cursor == 0 && self.reps == 0;
        let last = self.cursor == self.set.len() - 1 && self.reps == self.n_sets - 1;
        let mut done = false;

        if input.ready {
            self.running = true;
            if self.cursor == self.set.len() - 1 {
                self.cursor = 0;
                self.reps += 1;
                if self.reps == self.n_sets {
                    self.reps = 0;
                    self.running = false;
                    done = true;
                    tracing::debug!("{} burst of {} sets sent", self.set.kind().name(), self.n_sets);
                }
            } else {
                self.cursor += 1;
            }
        }

        GeneratorOutput {
            word: Some(word),
            first,
            last,
            done,
        }
    }

    /// Abandon the current burst
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.reps = 0;
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(start: bool) -> GeneratorInput {
        GeneratorInput { start, ready: true, link_config: LinkConfig::default() }
    }

    #[test]
    fn test_idle_without_start() {
        let mut g = OrderedSetGenerator::new(OrderedSetKind::Ts1, 2);
        assert_eq!(g.tick(&ready(false)), GeneratorOutput::default());
    }

    #[test]
    fn test_burst_framing() {
        let mut g = OrderedSetGenerator::new(OrderedSetKind::Ts1, 2);
        let outs: Vec<GeneratorOutput> = (0..10).map(|i| g.tick(&ready(i == 0))).collect();
        assert!(outs[..8].iter().all(|o| o.word.is_some()));
        assert!(outs[8..].iter().all(|o| o.word.is_none()));
        assert!(outs[0].first);
        assert_eq!(outs.iter().filter(|o| o.first).count(), 1);
        assert!(outs[7].last && outs[7].done);
        assert_eq!(outs.iter().filter(|o| o.done).count(), 1);
        assert_eq!(outs[4].word, outs[0].word);
    }

    #[test]
    fn test_stall() {
        let mut g = OrderedSetGenerator::new(OrderedSetKind::Tseq, 1);
        let stalled = GeneratorInput { start: true, ready: false, link_config: LinkConfig::default() };
        let w0 = g.tick(&stalled);
        let w0_again = g.tick(&stalled);
        assert_eq!(w0, w0_again);
        assert!(!g.is_running());

        let mut done_at = None;
        for i in 0..20 {
            let input = GeneratorInput { start: false, ready: i % 2 == 0, link_config: LinkConfig::default() };
            let out = g.tick(&GeneratorInput { start: i == 0, ..input });
            if out.done {
                done_at = Some(i);
                break;
            }
        }
        // 8 words, accepted every other cycle
        assert_eq!(done_at, Some(14));
    }

    #[test]
    fn test_live_link_config() {
        let mut g = OrderedSetGenerator::new(OrderedSetKind::Ts2, 2);
        let mut input = ready(true);
        let mut words = vec![];
        for i in 0..8 {
            input.link_config.scrambling = i < 4;
            words.push(g.tick(&input).word.unwrap());
        }
        assert_eq!(words[1].lane_byte(1), 0);
        assert_eq!(words[5].lane_byte(1), 0b1000);
    }
}
