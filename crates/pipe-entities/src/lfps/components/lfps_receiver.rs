use pipe_core::MultiReg;
use pipe_core::timing::{Lfps, POLLING_LFPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxPhase {
    /// Line active, waiting for the burst to end
    TBurst,
    /// Line idle, waiting for the repeat interval to elapse
    TRepeat,
}

/// Detects Polling LFPS on the transceiver's electrical idle output.
/// A burst that starts exactly when a full repeat interval of idle has elapsed
/// produces one `polling` pulse.
#[derive(Debug, Clone)]
pub struct LfpsReceiver {
    burst_cycles: u32,
    repeat_cycles: u32,

    idle_sync: MultiReg<bool>,
    phase: RxPhase,
    count: u32,
    found: bool,
}

impl LfpsReceiver {
    pub fn new(sys_clk_freq: u64) -> Self {
        Self::for_lfps(sys_clk_freq, &POLLING_LFPS)
    }

    /// Receiver for a repeating LFPS class. Classes without a repeat period
    /// are treated as repeating every two bursts.
    pub fn for_lfps(sys_clk_freq: u64, lfps: &Lfps) -> Self {
        let burst_cycles = lfps.burst.nominal_cycles(sys_clk_freq).max(1) as u32;
        let repeat_cycles = match lfps.repeat {
            Some(repeat) => repeat.nominal_cycles(sys_clk_freq) as u32,
            None => 2 * burst_cycles,
        };
        Self::with_cycles(burst_cycles, repeat_cycles)
    }

    /// The burst lasts at least one cycle and the repeat interval is longer than the burst
    pub fn with_cycles(burst_cycles: u32, repeat_cycles: u32) -> Self {
        let burst_cycles = burst_cycles.max(1);
        LfpsReceiver {
            burst_cycles,
            repeat_cycles: repeat_cycles.max(burst_cycles.saturating_add(1)),
            // The line is idle until the transceiver says otherwise
            idle_sync: MultiReg::new(true),
            phase: RxPhase::TBurst,
            count: 0,
            found: false,
        }
    }

    pub fn burst_cycles(&self) -> u32 {
        self.burst_cycles
    }

    pub fn repeat_cycles(&self) -> u32 {
        self.repeat_cycles
    }

    /// Feed the raw (unsynchronized) rx_idle line, returns the polling pulse
    pub fn tick(&mut self, rx_idle: bool) -> bool {
        let idle = self.idle_sync.tick(rx_idle);
        let mut polling = false;

        match self.phase {
            RxPhase::TBurst => {
                if self.count == 0 {
                    if !idle {
                        self.count = self.burst_cycles - 1;
                    } else {
                        self.count = self.repeat_cycles - self.burst_cycles - 1;
                        self.phase = RxPhase::TRepeat;
                    }
                } else {
                    self.count -= 1;
                }
                if self.found && !idle {
                    polling = true;
                    self.found = false;
                }
            }
            RxPhase::TRepeat => {
                if self.count == 0 || !idle {
                    // Activity before the interval elapsed restarts the search
                    self.found = self.count == 0;
                    self.count = self.burst_cycles - 1;
                    self.phase = RxPhase::TBurst;
                } else {
                    self.count -= 1;
                }
            }
        }

        if polling {
            tracing::trace!("polling LFPS burst detected");
        }
        polling
    }

    pub fn reset(&mut self) {
        *self = Self::with_cycles(self.burst_cycles, self.repeat_cycles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(rx: &mut LfpsReceiver, burst: u32, gap: u32, bursts: usize) -> usize {
        let mut pulses = 0;
        for _ in 0..bursts {
            pulses += (0..burst).filter(|_| rx.tick(false)).count();
            pulses += (0..gap).filter(|_| rx.tick(true)).count();
        }
        pulses
    }

    #[test]
    fn test_polling_cycles() {
        let rx = LfpsReceiver::new(125_000_000);
        assert_eq!(rx.burst_cycles(), 125);
        assert_eq!(rx.repeat_cycles(), 1250);
    }

    #[test]
    fn test_static_line_never_pulses() {
        let mut rx = LfpsReceiver::new(125_000_000);
        assert!((0..20_000).all(|_| !rx.tick(true)));
        let mut rx = LfpsReceiver::new(125_000_000);
        assert!((0..20_000).all(|_| !rx.tick(false)));
    }

    #[test]
    fn test_nominal_bursts() {
        let mut rx = LfpsReceiver::new(125_000_000);
        // The first burst only opens the repeat window
        assert_eq!(drive(&mut rx, 125, 1125, 20), 19);
    }

    #[test]
    fn test_degenerate_cycles_clamped() {
        let mut rx = LfpsReceiver::with_cycles(0, 0);
        assert_eq!(rx.burst_cycles(), 1);
        assert_eq!(rx.repeat_cycles(), 2);
        drive(&mut rx, 1, 1, 50);
        drive(&mut rx, 3, 7, 50);

        let rx = LfpsReceiver::with_cycles(125, 100);
        assert_eq!(rx.repeat_cycles(), 126);
    }

    #[test]
    fn test_wrong_repeat_interval() {
        let mut rx = LfpsReceiver::new(125_000_000);
        assert_eq!(drive(&mut rx, 125, 500, 20), 0);
        let mut rx = LfpsReceiver::new(125_000_000);
        assert_eq!(drive(&mut rx, 125, 3000, 20), 0);
    }
}
