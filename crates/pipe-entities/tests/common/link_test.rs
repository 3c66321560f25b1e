use pipe_config::{PipeConfig, SharedConfig};
use pipe_core::{Cycle, Word};
use pipe_entities::{LinkEvent, LoopbackLink, LtssmState, Side};
use rand::Rng;

/// Creates a default config for testing. It can still be modified as needed
/// before passing it to the LinkTest constructor.
/// TSEQ bursts are shortened, everything else keeps its default.
pub fn default_test_config() -> PipeConfig {
    let mut cfg = PipeConfig::default();
    cfg.training.tseq_tx_count = 64;
    cfg
}

/// Random data words without control lanes
pub fn random_words<R: Rng>(rng: &mut R, n: usize) -> Vec<Word> {
    (0..n).map(|_| Word::data_only(rng.random())).collect()
}

/// Two pipes in loopback, with helpers for bringing the link up and
/// inspecting what happened
pub struct LinkTest {
    pub config_a: SharedConfig,
    pub config_b: SharedConfig,
    pub link: LoopbackLink,
}

impl LinkTest {
    pub fn new(config: PipeConfig, skew: Cycle) -> Self {
        Self::with_configs(config.clone(), config, skew)
    }

    pub fn with_configs(config_a: PipeConfig, config_b: PipeConfig, skew: Cycle) -> Self {
        let config_a = SharedConfig::from_config(config_a).unwrap();
        let config_b = SharedConfig::from_config(config_b).unwrap();
        let link = LoopbackLink::with_configs(config_a.clone(), config_b.clone(), skew);
        Self { config_a, config_b, link }
    }

    /// Runs until both sides are in U0, panics if that takes more than `max_ticks`
    pub fn bring_up(&mut self, max_ticks: u64) -> Cycle {
        match self.link.run_until_ready(max_ticks, None) {
            Some(cycle) => cycle,
            None => panic!(
                "link not up after {} cycles: A {}, B {}\nevents: {:#?}",
                max_ticks,
                self.link.state(Side::A),
                self.link.state(Side::B),
                self.link.events()
            ),
        }
    }

    pub fn run(&mut self, ticks: u64) {
        self.link.run(Some(ticks), None);
    }

    /// Runs until `side` is in `state`, panics after `max_ticks`
    pub fn run_until_state(&mut self, side: Side, state: LtssmState, max_ticks: u64) -> Cycle {
        for _ in 0..max_ticks {
            self.link.tick();
            if self.link.state(side) == state {
                return self.link.cycle();
            }
        }
        panic!("{:?} did not reach {} within {} cycles", side, state, max_ticks);
    }

    pub fn events_of(&self, side: Side) -> Vec<LinkEvent> {
        self.link.events().iter().filter(|e| e.side == side).copied().collect()
    }

    pub fn transitions_of(&self, side: Side) -> Vec<(LtssmState, LtssmState)> {
        self.events_of(side).iter().map(|e| (e.from, e.to)).collect()
    }

    pub fn has_transition(&self, side: Side, from: LtssmState, to: LtssmState) -> bool {
        self.events_of(side).iter().any(|e| e.from == from && e.to == to)
    }
}
