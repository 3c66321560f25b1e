use pipe_config::SharedConfig;
use pipe_core::{LinkConfig, PipeUnit, Word};

use crate::PipeUnitTrait;
use crate::lfps::{LfpsInput, LfpsUnit};
use crate::ltssm::{Ltssm, LtssmInputs, LtssmState, LtssmStatus};
use crate::ordered_set::{TrainingInput, TrainingUnit};
use crate::scrambling::{Descrambler, Scrambler, ScramblerInput};

use super::ready::ReadyHandle;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipeInputs {
    /// Aligned word from the transceiver, None when no word is valid
    pub serdes_rx: Option<Word>,
    pub serdes_rx_idle: bool,
    /// Transceiver accepts a TX word this cycle
    pub serdes_tx_ready: bool,
    /// Word offered by the device core
    pub core_tx: Option<Word>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipeOutputs {
    pub serdes_tx: Option<Word>,
    pub serdes_tx_idle: bool,
    pub serdes_tx_pattern: u32,
    pub serdes_rx_align: bool,
    pub serdes_rx_polarity: bool,
    pub serdes_tx_polarity: bool,
    /// Descrambled word for the device core, only while ready
    pub core_rx: Option<Word>,
    /// The offered core word is consumed this cycle
    pub core_tx_ready: bool,
    pub ready: bool,
    /// Link config advertised by the peer in its last TS1/TS2
    pub peer_link_config: LinkConfig,
    pub status: LtssmStatus,
}

/// One end of a USB3 link: LFPS, training, scrambling and LTSSM wired together
/// between the transceiver and the device core.
pub struct Usb3Pipe {
    name: &'static str,
    config: SharedConfig,
    lfps: LfpsUnit,
    training: TrainingUnit,
    scrambler: Scrambler,
    descrambler: Descrambler,
    ltssm: Ltssm,
    ready: ReadyHandle,
}

impl Usb3Pipe {
    pub fn new(config: SharedConfig, name: &'static str) -> Self {
        let cfg = config.config();
        tracing::debug!(
            "{}: sys_clk {} Hz, lfps_clk {} Hz, timers {}, scrambling {}",
            name,
            cfg.sys_clk_freq,
            cfg.lfps_clk_freq,
            cfg.with_timers,
            cfg.scrambling
        );
        Self {
            name,
            lfps: LfpsUnit::new(&config),
            training: TrainingUnit::new(&config),
            scrambler: Scrambler::new(cfg.scrambler.tx_seed),
            descrambler: Descrambler::new(cfg.scrambler.rx_seed),
            ltssm: Ltssm::new(&config).named(name),
            ready: ReadyHandle::new(),
            config,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> LtssmState {
        self.ltssm.state()
    }

    pub fn ltssm(&self) -> &Ltssm {
        &self.ltssm
    }

    /// Handle that follows the `ready` output, for readers on other threads
    pub fn ready_handle(&self) -> ReadyHandle {
        self.ready.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }
}

fn core_order(word: Word, swap: bool) -> Word {
    if swap { word.swap_endianness() } else { word }
}

impl PipeUnitTrait for Usb3Pipe {
    type Input = PipeInputs;
    type Output = PipeOutputs;

    fn unit(&self) -> PipeUnit {
        PipeUnit::Pipe
    }

    fn tick(&mut self, inputs: &PipeInputs) -> PipeOutputs {
        let cfg = self.config.config();
        let control = self.ltssm.control();
        let cycle = self.ltssm.cycle();
        let swap = cfg.endianness_swap;

        // Detectors see every received word so U0 can react to a peer TS1
        let training = self.training.tick(&TrainingInput {
            rx_word: inputs.serdes_rx,
            tx_select: control.ts_tx_select,
            tx_ready: inputs.serdes_tx_ready,
            link_config: cfg.link_config(),
        });

        let lfps = self.lfps.tick(&LfpsInput {
            rx_idle: inputs.serdes_rx_idle,
            tx_polling: control.lfps_tx_polling,
            tx_idle: control.lfps_tx_idle,
        });

        let status = self.ltssm.tick(&LtssmInputs {
            lfps_rx_polling: lfps.rx_polling,
            lfps_tx_count: lfps.tx_count,
            ts_rx_ts1: training.rx_ts1,
            ts_rx_ts1_inv: training.rx_ts1_inv,
            ts_rx_ts2: training.rx_ts2,
            ts_tx_done: training.tx.done,
        });

        let scrambling = cfg.scrambling && training.rx_link_config.scrambling;

        // TX: training words until U0, then the scrambled core stream
        let (serdes_tx, core_tx_ready) = if status.tx_ready {
            let core_tx_ready = inputs.serdes_tx_ready;
            let word = self.scrambler.tick(&ScramblerInput {
                word: inputs.core_tx.map(|w| core_order(w, swap)),
                ready: core_tx_ready,
                enable: scrambling,
            });
            (word, core_tx_ready)
        } else {
            self.scrambler.reset();
            (training.tx.word, false)
        };

        // RX: the descrambler follows training words so it is aligned on U0 entry
        let rx_word = self.descrambler.tick(&ScramblerInput {
            word: inputs.serdes_rx,
            ready: true,
            enable: (control.ts_rx_enable || status.rx_ready) && scrambling,
        });
        let core_rx = if status.ready { rx_word.map(|w| core_order(w, swap)) } else { None };

        if self.ready.publish(status.ready) != status.ready {
            if status.ready {
                tracing::info!(cycle = cycle, "{}: link ready, scrambling {}", self.name, scrambling);
            } else {
                tracing::info!(cycle = cycle, "{}: link not ready", self.name);
            }
        }

        PipeOutputs {
            serdes_tx,
            serdes_tx_idle: lfps.tx_idle,
            serdes_tx_pattern: lfps.tx_pattern,
            serdes_rx_align: control.serdes_rx_align,
            serdes_rx_polarity: control.serdes_rx_polarity,
            serdes_tx_polarity: cfg.tx_polarity,
            core_rx,
            core_tx_ready,
            ready: status.ready,
            peer_link_config: training.rx_link_config,
            status,
        }
    }

    fn reset(&mut self) {
        tracing::debug!("{}: reset", self.name);
        self.lfps.reset();
        self.training.reset();
        self.scrambler.reset();
        self.descrambler.reset();
        self.ltssm.reset();
        self.ready.publish(false);
    }
}
