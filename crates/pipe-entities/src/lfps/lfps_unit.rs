use pipe_config::SharedConfig;
use pipe_core::PipeUnit;

use crate::PipeUnitTrait;

use super::components::lfps_receiver::LfpsReceiver;
use super::components::lfps_transmitter::LfpsTransmitter;

#[derive(Debug, Clone, Copy, Default)]
pub struct LfpsInput {
    /// Electrical idle as reported by the transceiver, asynchronous
    pub rx_idle: bool,
    /// Request Polling LFPS transmission
    pub tx_polling: bool,
    /// Force electrical idle, overrides everything else on the TX side
    pub tx_idle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LfpsOutput {
    /// One-cycle pulse per detected Polling LFPS burst
    pub rx_polling: bool,
    pub tx_idle: bool,
    pub tx_pattern: u32,
    pub tx_count: u16,
}

/// Polling LFPS receiver and transmitter
pub struct LfpsUnit {
    rx: LfpsReceiver,
    tx: LfpsTransmitter,
}

impl LfpsUnit {
    pub fn new(config: &SharedConfig) -> Self {
        let cfg = config.config();
        Self {
            rx: LfpsReceiver::new(cfg.sys_clk_freq),
            tx: LfpsTransmitter::new(cfg.sys_clk_freq, cfg.lfps_clk_freq),
        }
    }
}

impl PipeUnitTrait for LfpsUnit {
    type Input = LfpsInput;
    type Output = LfpsOutput;

    fn unit(&self) -> PipeUnit {
        PipeUnit::Lfps
    }

    fn tick(&mut self, input: &LfpsInput) -> LfpsOutput {
        let rx_polling = self.rx.tick(input.rx_idle);
        let tx = self.tx.tick(input.tx_polling && !input.tx_idle);
        LfpsOutput {
            rx_polling,
            tx_idle: tx.idle || input.tx_idle,
            tx_pattern: tx.pattern,
            tx_count: tx.burst_count,
        }
    }

    fn reset(&mut self) {
        self.rx.reset();
        self.tx.reset();
    }
}
