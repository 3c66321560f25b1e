use pipe_config::SharedConfig;
use pipe_core::{LinkConfig, OrderedSetKind, PipeUnit, PulseSynchronizer, Word};

use crate::PipeUnitTrait;

use super::components::detector::OrderedSetDetector;
use super::components::generator::{GeneratorInput, GeneratorOutput, OrderedSetGenerator};

/// Ordered set to transmit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxSet {
    Tseq,
    Ts1,
    Ts2,
}

impl TxSet {
    pub fn kind(self) -> OrderedSetKind {
        match self {
            TxSet::Tseq => OrderedSetKind::Tseq,
            TxSet::Ts1 => OrderedSetKind::Ts1,
            TxSet::Ts2 => OrderedSetKind::Ts2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingInput {
    /// Raw received word, observed whether or not training is active
    pub rx_word: Option<Word>,
    /// Set to transmit, None stops transmission
    pub tx_select: Option<TxSet>,
    pub tx_ready: bool,
    /// Our link config, inserted into TS1/TS2
    pub link_config: LinkConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainingOutput {
    pub rx_ts1: bool,
    pub rx_ts1_inv: bool,
    pub rx_ts2: bool,
    /// A received word did not continue any TS1/TS1_INV/TS2 sequence
    pub rx_error: bool,
    /// Link config of the peer, from its last detected TS1/TS2
    pub rx_link_config: LinkConfig,
    pub tx: GeneratorOutput,
}

/// Groups the ordered set detectors and generators used during training
pub struct TrainingUnit {
    ts1_det: OrderedSetDetector,
    ts1_inv_det: OrderedSetDetector,
    ts2_det: OrderedSetDetector,
    ts1_sync: PulseSynchronizer,
    ts1_inv_sync: PulseSynchronizer,
    ts2_sync: PulseSynchronizer,
    rx_link_config: LinkConfig,

    tseq_gen: OrderedSetGenerator,
    ts1_gen: OrderedSetGenerator,
    ts2_gen: OrderedSetGenerator,
    tx_select: Option<TxSet>,
}

impl TrainingUnit {
    pub fn new(config: &SharedConfig) -> Self {
        let cfg = config.config();
        let t = &cfg.training;
        Self {
            ts1_det: OrderedSetDetector::new(OrderedSetKind::Ts1, t.ts_rx_count),
            ts1_inv_det: OrderedSetDetector::new(OrderedSetKind::Ts1Inv, t.ts_rx_count),
            ts2_det: OrderedSetDetector::new(OrderedSetKind::Ts2, t.ts_rx_count),
            ts1_sync: PulseSynchronizer::new(),
            ts1_inv_sync: PulseSynchronizer::new(),
            ts2_sync: PulseSynchronizer::new(),
            rx_link_config: LinkConfig::default(),

            tseq_gen: OrderedSetGenerator::new(OrderedSetKind::Tseq, t.tseq_tx_count),
            ts1_gen: OrderedSetGenerator::new(OrderedSetKind::Ts1, t.ts1_tx_count),
            ts2_gen: OrderedSetGenerator::new(OrderedSetKind::Ts2, t.ts2_tx_count),
            tx_select: None,
        }
    }

    fn generator(&mut self, set: TxSet) -> &mut OrderedSetGenerator {
        match set {
            TxSet::Tseq => &mut self.tseq_gen,
            TxSet::Ts1 => &mut self.ts1_gen,
            TxSet::Ts2 => &mut self.ts2_gen,
        }
    }

    fn clear_generators(&mut self) {
        self.tseq_gen.clear();
        self.ts1_gen.clear();
        self.ts2_gen.clear();
    }

    fn tick_rx(&mut self, word: Option<&Word>) -> (bool, bool, bool, bool) {
        let ts1 = self.ts1_det.tick(word);
        let ts1_inv = self.ts1_inv_det.tick(word);
        let ts2 = self.ts2_det.tick(word);

        if ts1.detected {
            self.rx_link_config = self.ts1_det.link_config();
        }
        if ts2.detected {
            self.rx_link_config = self.ts2_det.link_config();
        }

        (
            self.ts1_sync.tick(ts1.detected),
            self.ts1_inv_sync.tick(ts1_inv.detected),
            self.ts2_sync.tick(ts2.detected),
            ts1.error && ts1_inv.error && ts2.error,
        )
    }

    fn tick_tx(&mut self, input: &TrainingInput) -> GeneratorOutput {
        if input.tx_select != self.tx_select {
            tracing::trace!("tx select {:?} -> {:?}", self.tx_select, input.tx_select);
            self.clear_generators();
            self.tx_select = input.tx_select;
        }

        match input.tx_select {
            Some(set) => self.generator(set).tick(&GeneratorInput {
                start: true,
                ready: input.tx_ready,
                link_config: input.link_config,
            }),
            None => GeneratorOutput::default(),
        }
    }
}

impl PipeUnitTrait for TrainingUnit {
    type Input = TrainingInput;
    type Output = TrainingOutput;

    fn unit(&self) -> PipeUnit {
        PipeUnit::Training
    }

    fn tick(&mut self, input: &TrainingInput) -> TrainingOutput {
        let (rx_ts1, rx_ts1_inv, rx_ts2, rx_error) = self.tick_rx(input.rx_word.as_ref());
        let tx = self.tick_tx(input);
        TrainingOutput {
            rx_ts1,
            rx_ts1_inv,
            rx_ts2,
            rx_error,
            rx_link_config: self.rx_link_config,
            tx,
        }
    }

    fn reset(&mut self) {
        self.ts1_det.reset();
        self.ts1_inv_det.reset();
        self.ts2_det.reset();
        self.ts1_sync.reset();
        self.ts1_inv_sync.reset();
        self.ts2_sync.reset();
        self.rx_link_config = LinkConfig::default();
        self.clear_generators();
        self.tx_select = None;
    }
}
