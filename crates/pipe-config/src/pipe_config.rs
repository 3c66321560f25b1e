use std::sync::Arc;

use pipe_core::timing::{LFPS_PERIOD_MAX_NS, LFPS_PERIOD_MIN_NS, NS_PER_S, checked_us_to_cycles, us_to_cycles};
use pipe_core::{LinkConfig, MIN_SYS_CLK_FREQ, PipeErr, expect_nonzero};

/// Repetition counts for training ordered sets and LFPS bursts
#[derive(Debug, Clone)]
pub struct CfgTraining {
    /// TSEQ sets sent in Polling.RxEQ, USB 3.0 mandates 65536
    pub tseq_tx_count: u32,
    /// Minimum number of TS1 sets sent in Polling.Active and Recovery.Active
    pub ts1_tx_count: u32,
    /// Minimum number of TS2 sets sent in Polling.Configuration and Recovery.Configuration
    pub ts2_tx_count: u32,
    /// Consecutive TS1/TS2 sets required before a detection
    pub ts_rx_count: u32,
    /// Polling LFPS bursts sent before the peer's LFPS is considered
    pub lfps_tx_count: u16,
    /// Additional bursts sent once the peer's LFPS was seen
    pub lfps_tx_extra: u16,
}

impl Default for CfgTraining {
    fn default() -> Self {
        Self {
            tseq_tx_count: 65536,
            ts1_tx_count: 16,
            ts2_tx_count: 16,
            ts_rx_count: 8,
            lfps_tx_count: 16,
            lfps_tx_extra: 4,
        }
    }
}

/// LTSSM bounding timers, in microseconds
#[derive(Debug, Clone)]
pub struct CfgTimeouts {
    pub polling_lfps_us: u64,
    pub polling_active_us: u64,
    pub polling_configuration_us: u64,
    pub recovery_active_us: u64,
    pub recovery_configuration_us: u64,
}

impl Default for CfgTimeouts {
    fn default() -> Self {
        Self {
            polling_lfps_us: 360_000,
            polling_active_us: 12_000,
            polling_configuration_us: 12_000,
            recovery_active_us: 12_000,
            recovery_configuration_us: 6_000,
        }
    }
}

/// Reset values of the scrambler LFSRs. The TX seed is the canonical 0xffff
/// advanced over the three data words that follow the COMs of a TS2.
#[derive(Debug, Clone)]
pub struct CfgScrambler {
    pub tx_seed: u16,
    pub rx_seed: u16,
}

impl Default for CfgScrambler {
    fn default() -> Self {
        Self {
            tx_seed: 0x7dbd,
            rx_seed: 0xffff,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipeConfig {
    /// System clock in Hz, all units are clocked by it
    pub sys_clk_freq: u64,
    /// LFPS square wave frequency in Hz
    pub lfps_clk_freq: u64,
    /// If false, all LTSSM bounding timers are disabled
    pub with_timers: bool,
    /// Local scrambling request, advertised in the link config
    pub scrambling: bool,
    pub tx_polarity: bool,
    /// Reverse lane order towards the device core
    pub endianness_swap: bool,
    pub debug_log: Option<String>,

    pub training: CfgTraining,
    pub timeouts: CfgTimeouts,
    pub scrambler: CfgScrambler,
}

impl PipeConfig {
    pub fn new(sys_clk_freq: u64) -> Self {
        PipeConfig {
            sys_clk_freq,
            lfps_clk_freq: 25_000_000,
            with_timers: true,
            scrambling: true,
            tx_polarity: false,
            endianness_swap: true,
            debug_log: None,
            training: CfgTraining::default(),
            timeouts: CfgTimeouts::default(),
            scrambler: CfgScrambler::default(),
        }
    }

    /// Validate that all configuration fields are within their allowed ranges
    pub fn validate(&self) -> Result<(), PipeErr> {
        if self.sys_clk_freq < MIN_SYS_CLK_FREQ {
            return Err(PipeErr::ClockTooSlow {
                min_hz: MIN_SYS_CLK_FREQ,
                found_hz: self.sys_clk_freq,
            });
        }

        // The LFPS period must lie in 20..100 ns and needs at least two system clock cycles
        expect_nonzero!(self.lfps_clk_freq, "lfps_clk_freq")?;
        let period_ns = NS_PER_S / self.lfps_clk_freq;
        if !(LFPS_PERIOD_MIN_NS..=LFPS_PERIOD_MAX_NS).contains(&period_ns) || self.lfps_clk_freq * 2 > self.sys_clk_freq {
            return Err(PipeErr::InvalidValue {
                field: "lfps_clk_freq",
                value: self.lfps_clk_freq,
            });
        }

        let t = &self.training;
        expect_nonzero!(t.tseq_tx_count, "training.tseq_tx_count")?;
        expect_nonzero!(t.ts1_tx_count, "training.ts1_tx_count")?;
        expect_nonzero!(t.ts2_tx_count, "training.ts2_tx_count")?;
        expect_nonzero!(t.ts_rx_count, "training.ts_rx_count")?;
        expect_nonzero!(t.lfps_tx_count, "training.lfps_tx_count")?;

        let to = &self.timeouts;
        for (t_us, field) in [
            (to.polling_lfps_us, "timeouts.polling_lfps"),
            (to.polling_active_us, "timeouts.polling_active"),
            (to.polling_configuration_us, "timeouts.polling_configuration"),
            (to.recovery_active_us, "timeouts.recovery_active"),
            (to.recovery_configuration_us, "timeouts.recovery_configuration"),
        ] {
            if self.with_timers {
                expect_nonzero!(t_us, field)?;
            }
            // Timer limits are kept in cycles
            if checked_us_to_cycles(self.sys_clk_freq, t_us).is_none() {
                return Err(PipeErr::InvalidValue { field, value: t_us });
            }
        }

        // An all-zero LFSR never leaves zero
        expect_nonzero!(self.scrambler.tx_seed, "scrambler.tx_seed")?;
        expect_nonzero!(self.scrambler.rx_seed, "scrambler.rx_seed")?;

        Ok(())
    }

    /// Link config advertised in our TS1/TS2
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            reset: false,
            loopback: false,
            scrambling: self.scrambling,
        }
    }

    pub fn us_to_cycles(&self, t_us: u64) -> u64 {
        us_to_cycles(self.sys_clk_freq, t_us)
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self::new(MIN_SYS_CLK_FREQ)
    }
}

/// Validated, immutable configuration shared by all units of one or more pipes
#[derive(Debug, Clone)]
pub struct SharedConfig {
    cfg: Arc<PipeConfig>,
}

impl SharedConfig {
    /// Checks config for validity before returning the SharedConfig object
    pub fn from_config(cfg: PipeConfig) -> Result<Self, PipeErr> {
        cfg.validate()?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<PipeConfig> {
        Arc::clone(&self.cfg)
    }
}
