use pipe_config::{PipeConfig, SharedConfig};
use pipe_core::{Cycle, PipeUnit};

use crate::PipeUnitTrait;
use crate::ordered_set::TxSet;

use super::components::wait_timer::WaitTimer;
use super::ltssm_state::LtssmState;

/// Bounding timer limits in system clock cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LtssmTimeouts {
    pub polling_lfps: u64,
    pub polling_active: u64,
    pub polling_configuration: u64,
    pub recovery_active: u64,
    pub recovery_configuration: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LtssmParams {
    pub with_timers: bool,
    pub timeouts: LtssmTimeouts,
    /// LFPS bursts to send before looking at the peer
    pub lfps_tx_count: u16,
    /// Extra LFPS bursts sent after the peer's LFPS was first seen
    pub lfps_tx_extra: u16,
}

impl LtssmParams {
    pub fn from_config(cfg: &PipeConfig) -> Self {
        let to = &cfg.timeouts;
        LtssmParams {
            with_timers: cfg.with_timers,
            timeouts: LtssmTimeouts {
                polling_lfps: cfg.us_to_cycles(to.polling_lfps_us),
                polling_active: cfg.us_to_cycles(to.polling_active_us),
                polling_configuration: cfg.us_to_cycles(to.polling_configuration_us),
                recovery_active: cfg.us_to_cycles(to.recovery_active_us),
                recovery_configuration: cfg.us_to_cycles(to.recovery_configuration_us),
            },
            lfps_tx_count: cfg.training.lfps_tx_count,
            lfps_tx_extra: cfg.training.lfps_tx_extra,
        }
    }

    /// Bounding timer of a state, if it has one
    pub fn timeout(&self, state: LtssmState) -> Option<u64> {
        match state {
            LtssmState::PollingLfps => Some(self.timeouts.polling_lfps),
            LtssmState::PollingActive => Some(self.timeouts.polling_active),
            LtssmState::PollingConfiguration => Some(self.timeouts.polling_configuration),
            LtssmState::RecoveryActive => Some(self.timeouts.recovery_active),
            LtssmState::RecoveryConfiguration => Some(self.timeouts.recovery_configuration),
            _ => None,
        }
    }
}

/// Observations fed to the LTSSM each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LtssmInputs {
    /// Peer Polling LFPS detected (pulse)
    pub lfps_rx_polling: bool,
    /// Polling LFPS bursts sent so far
    pub lfps_tx_count: u16,
    pub ts_rx_ts1: bool,
    pub ts_rx_ts1_inv: bool,
    pub ts_rx_ts2: bool,
    /// Local ordered set burst completed (pulse)
    pub ts_tx_done: bool,
}

/// Control lines driven from the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LtssmControl {
    pub lfps_tx_polling: bool,
    pub lfps_tx_idle: bool,
    pub serdes_rx_align: bool,
    pub serdes_rx_polarity: bool,
    pub ts_rx_enable: bool,
    pub ts_tx_select: Option<TxSet>,
}

/// Per-cycle status, valid for the cycle the inputs were sampled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LtssmStatus {
    pub state: LtssmState,
    pub rx_ready: bool,
    pub tx_ready: bool,
    pub ready: bool,
    pub recovery: bool,
    pub exit_to_compliance: bool,
    pub exit_to_rx_detect: bool,
    /// (from, to) if the state changes at the end of this cycle
    pub transition: Option<(LtssmState, LtssmState)>,
    /// The transition was forced by a bounding timer
    pub timeout: bool,
}

/// Registers private to one state. Cleared on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Scratch {
    lfps_tx_target: u16,
    rx_lfps_seen: bool,
    rx_ts1_seen: bool,
    rx_ts1_inv_seen: bool,
    rx_ts2_seen: bool,
    timer: WaitTimer,
}

/// Link Training and Status State Machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ltssm {
    /// Prefix for log lines, tells the two ends of a link apart
    name: &'static str,
    params: LtssmParams,
    state: LtssmState,
    scratch: Scratch,
    /// Set when U0 is left for Recovery, cleared in U0 and Polling.Entry
    recovery: bool,
    /// Sticky until Polling.Active latches it again
    rx_polarity: bool,
    cycle: Cycle,
}

impl Ltssm {
    pub fn new(config: &SharedConfig) -> Self {
        Self::with_params(LtssmParams::from_config(&config.config()))
    }

    pub fn with_params(params: LtssmParams) -> Self {
        Ltssm {
            name: "ltssm",
            params,
            state: LtssmState::PollingEntry,
            scratch: Scratch::default(),
            recovery: false,
            rx_polarity: false,
            cycle: 0,
        }
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> LtssmState {
        self.state
    }

    pub fn params(&self) -> &LtssmParams {
        &self.params
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn rx_polarity(&self) -> bool {
        self.rx_polarity
    }

    /// Control outputs, a function of the current state only
    pub fn control(&self) -> LtssmControl {
        let s = self.state;
        LtssmControl {
            lfps_tx_polling: s == LtssmState::PollingLfps,
            lfps_tx_idle: s.is_exit(),
            serdes_rx_align: s.is_training(),
            serdes_rx_polarity: self.rx_polarity,
            ts_rx_enable: s.is_training(),
            ts_tx_select: s.tx_set(),
        }
    }

    /// Pure transition function: returns the machine as it will be after this
    /// cycle, plus the status outputs for this cycle.
    pub fn step(&self, i: &LtssmInputs) -> (Ltssm, LtssmStatus) {
        let mut next = *self;
        let sc = &mut next.scratch;

        let timer_wait = self.params.with_timers;
        let timed_out = match self.params.timeout(self.state) {
            Some(limit) => sc.timer.tick(timer_wait, limit),
            None => false,
        };

        // Exit conditions win over a timer expiring in the same cycle
        let mut expired = false;
        let mut rx_ready = self.state == LtssmState::U0;
        let tx_ready = self.state == LtssmState::U0;

        let target = match self.state {
            LtssmState::PollingEntry => {
                next.recovery = false;
                LtssmState::PollingLfps
            }

            LtssmState::PollingLfps => {
                let mut target = self.state;
                if timed_out {
                    expired = true;
                    target = LtssmState::PollingExitToCompliance;
                } else if i.lfps_tx_count >= sc.lfps_tx_target {
                    if i.lfps_rx_polling && !sc.rx_lfps_seen {
                        sc.rx_lfps_seen = true;
                        sc.lfps_tx_target = i.lfps_tx_count.wrapping_add(self.params.lfps_tx_extra);
                    } else if sc.rx_lfps_seen {
                        target = LtssmState::PollingRxEq;
                    }
                }
                target
            }

            // Generator bound, TSEQ reception is not checked
            LtssmState::PollingRxEq => {
                if i.ts_tx_done {
                    LtssmState::PollingActive
                } else {
                    self.state
                }
            }

            LtssmState::PollingActive => {
                let mut target = self.state;
                if i.ts_tx_done && (sc.rx_ts1_seen || sc.rx_ts1_inv_seen) {
                    if !next.recovery {
                        if sc.rx_ts1_seen {
                            next.rx_polarity = false;
                        }
                        if sc.rx_ts1_inv_seen {
                            next.rx_polarity = true;
                        }
                    }
                    target = LtssmState::PollingConfiguration;
                } else if timed_out {
                    expired = true;
                    target = LtssmState::PollingExitToRxDetect;
                }
                sc.rx_ts1_seen |= i.ts_rx_ts1;
                sc.rx_ts1_inv_seen |= i.ts_rx_ts1_inv;
                target
            }

            LtssmState::PollingConfiguration | LtssmState::RecoveryConfiguration => {
                let mut target = self.state;
                if i.ts_tx_done && sc.rx_ts2_seen {
                    rx_ready = true;
                    target = LtssmState::U0;
                } else if timed_out {
                    expired = true;
                    target = LtssmState::PollingExitToRxDetect;
                }
                sc.rx_ts2_seen |= i.ts_rx_ts2;
                target
            }

            LtssmState::U0 => {
                next.recovery = false;
                if i.ts_rx_ts1 {
                    next.recovery = true;
                    LtssmState::RecoveryActive
                } else if i.lfps_rx_polling {
                    LtssmState::PollingEntry
                } else {
                    self.state
                }
            }

            LtssmState::RecoveryActive => {
                let mut target = self.state;
                if i.ts_tx_done && (sc.rx_ts1_seen || sc.rx_ts2_seen) {
                    target = LtssmState::RecoveryConfiguration;
                } else if timed_out {
                    expired = true;
                    target = LtssmState::PollingExitToRxDetect;
                }
                sc.rx_ts1_seen |= i.ts_rx_ts1;
                sc.rx_ts2_seen |= i.ts_rx_ts2;
                target
            }

            LtssmState::PollingExitToCompliance | LtssmState::PollingExitToRxDetect => {
                if i.lfps_rx_polling {
                    LtssmState::PollingEntry
                } else {
                    self.state
                }
            }
        };

        let transition = if target != self.state {
            next.state = target;
            next.scratch = Scratch::default();
            if target == LtssmState::PollingLfps {
                next.scratch.lfps_tx_target = self.params.lfps_tx_count;
            }
            Some((self.state, target))
        } else {
            None
        };
        next.cycle += 1;

        let status = LtssmStatus {
            state: self.state,
            rx_ready,
            tx_ready,
            ready: rx_ready && tx_ready,
            recovery: self.recovery,
            exit_to_compliance: self.state == LtssmState::PollingExitToCompliance,
            exit_to_rx_detect: self.state == LtssmState::PollingExitToRxDetect,
            transition,
            timeout: expired,
        };
        (next, status)
    }
}

impl PipeUnitTrait for Ltssm {
    type Input = LtssmInputs;
    type Output = LtssmStatus;

    fn unit(&self) -> PipeUnit {
        PipeUnit::Ltssm
    }

    fn tick(&mut self, inputs: &LtssmInputs) -> LtssmStatus {
        let (next, status) = self.step(inputs);
        if let Some((from, to)) = status.transition {
            if status.timeout {
                tracing::warn!(cycle = self.cycle, "{}: {} timed out -> {}", self.name, from, to);
            } else if to == LtssmState::U0 || from == LtssmState::U0 {
                tracing::info!(cycle = self.cycle, "{}: {} -> {} (rx_polarity {})", self.name, from, to, next.rx_polarity);
            } else {
                tracing::info!(cycle = self.cycle, "{}: {} -> {}", self.name, from, to);
            }
        }
        if self.state == LtssmState::PollingLfps && next.scratch.rx_lfps_seen && !self.scratch.rx_lfps_seen {
            tracing::debug!(
                cycle = self.cycle,
                "{}: peer polling LFPS seen after {} bursts, sending {} more",
                self.name,
                inputs.lfps_tx_count,
                self.params.lfps_tx_extra
            );
        }
        if self.state == LtssmState::PollingActive
            && status.transition.is_some()
            && self.scratch.rx_ts1_seen
            && self.scratch.rx_ts1_inv_seen
        {
            tracing::warn!(cycle = self.cycle, "{}: both TS1 and TS1_INV latched, receive polarity inverted", self.name);
        }
        *self = next;
        status
    }

    fn reset(&mut self) {
        *self = Self::with_params(self.params).named(self.name);
    }
}
