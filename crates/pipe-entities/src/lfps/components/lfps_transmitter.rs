use pipe_core::assert_warn;
use pipe_core::timing::{LFPS_PERIOD_MAX_NS, LFPS_PERIOD_MIN_NS, NS_PER_S, POLLING_LFPS};

/// Parallel pattern word for a high LFPS half period (20-bit transceiver interface)
pub const LFPS_PATTERN_HIGH: u32 = 0x000f_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxPhase {
    Burst,
    Gap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LfpsTxOutput {
    /// Drive electrical idle
    pub idle: bool,
    /// Pattern word to serialize while not idle
    pub pattern: u32,
    /// Bursts started since polling was requested, wraps at 16 bits
    pub burst_count: u16,
}

/// Generates Polling LFPS: a square wave for `burst_cycles`, electrical idle
/// for the rest of `repeat_cycles`, repeated for as long as polling is requested.
#[derive(Debug, Clone)]
pub struct LfpsTransmitter {
    burst_cycles: u32,
    repeat_cycles: u32,
    half_period: u32,

    phase: Option<TxPhase>,
    count: u32,
    toggle_count: u32,
    pattern: bool,
    bursts: u16,
}

impl LfpsTransmitter {
    pub fn new(sys_clk_freq: u64, lfps_clk_freq: u64) -> Self {
        let burst_cycles = POLLING_LFPS.burst.nominal_cycles(sys_clk_freq) as u32;
        let repeat_cycles = POLLING_LFPS
            .repeat
            .map(|r| r.nominal_cycles(sys_clk_freq) as u32)
            .unwrap_or(2 * burst_cycles);

        // Whole cycles per half period keep the duty cycle at exactly 50%
        let half_period = ((sys_clk_freq + lfps_clk_freq) / (2 * lfps_clk_freq)).max(1) as u32;
        let period_ns = 2 * half_period as u64 * NS_PER_S / sys_clk_freq;
        assert_warn!(
            (LFPS_PERIOD_MIN_NS..=LFPS_PERIOD_MAX_NS).contains(&period_ns),
            "LFPS period {} ns for requested {} Hz is out of range",
            period_ns,
            lfps_clk_freq
        );

        Self::with_cycles(burst_cycles, repeat_cycles, half_period)
    }

    /// The burst lasts at least one cycle and is followed by at least one idle cycle
    pub fn with_cycles(burst_cycles: u32, repeat_cycles: u32, half_period: u32) -> Self {
        let burst_cycles = burst_cycles.max(1);
        LfpsTransmitter {
            burst_cycles,
            repeat_cycles: repeat_cycles.max(burst_cycles.saturating_add(1)),
            half_period: half_period.max(1),
            phase: None,
            count: 0,
            toggle_count: 0,
            pattern: false,
            bursts: 0,
        }
    }

    pub fn burst_cycles(&self) -> u32 {
        self.burst_cycles
    }

    pub fn repeat_cycles(&self) -> u32 {
        self.repeat_cycles
    }

    pub fn half_period(&self) -> u32 {
        self.half_period
    }

    fn start_burst(&mut self) {
        self.phase = Some(TxPhase::Burst);
        self.count = self.burst_cycles;
        self.toggle_count = self.half_period;
        self.pattern = true;
        self.bursts = self.bursts.wrapping_add(1);
    }

    pub fn tick(&mut self, polling: bool) -> LfpsTxOutput {
        if !polling {
            self.reset();
            return LfpsTxOutput::default();
        }

        let phase = match self.phase {
            Some(phase) => phase,
            None => {
                self.start_burst();
                TxPhase::Burst
            }
        };

        let out = LfpsTxOutput {
            idle: phase == TxPhase::Gap,
            pattern: if phase == TxPhase::Burst && self.pattern { LFPS_PATTERN_HIGH } else { 0 },
            burst_count: self.bursts,
        };

        if phase == TxPhase::Burst {
            self.toggle_count -= 1;
            if self.toggle_count == 0 {
                self.toggle_count = self.half_period;
                self.pattern = !self.pattern;
            }
        }

        self.count -= 1;
        if self.count == 0 {
            match phase {
                TxPhase::Burst => {
                    self.phase = Some(TxPhase::Gap);
                    self.count = self.repeat_cycles - self.burst_cycles;
                }
                TxPhase::Gap => self.start_burst(),
            }
        }

        out
    }

    pub fn reset(&mut self) {
        self.phase = None;
        self.count = 0;
        self.toggle_count = 0;
        self.pattern = false;
        self.bursts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_period() {
        assert_eq!(LfpsTransmitter::new(125_000_000, 25_000_000).half_period(), 3);
        assert_eq!(LfpsTransmitter::new(125_000_000, 50_000_000).half_period(), 1);
        assert_eq!(LfpsTransmitter::new(156_250_000, 20_000_000).half_period(), 4);
    }

    #[test]
    fn test_idle_when_not_polling() {
        let mut tx = LfpsTransmitter::new(125_000_000, 25_000_000);
        let out = tx.tick(false);
        assert_eq!(out, LfpsTxOutput::default());
    }

    #[test]
    fn test_burst_shape() {
        let mut tx = LfpsTransmitter::new(125_000_000, 25_000_000);
        let outs: Vec<LfpsTxOutput> = (0..2500).map(|_| tx.tick(true)).collect();

        assert!(outs[..125].iter().all(|o| !o.idle && o.burst_count == 1));
        assert!(outs[125..1250].iter().all(|o| o.idle && o.pattern == 0));
        assert!(outs[1250..1375].iter().all(|o| !o.idle && o.burst_count == 2));

        // Square wave: 3 cycles high, 3 cycles low
        let highs: Vec<bool> = outs[..12].iter().map(|o| o.pattern == LFPS_PATTERN_HIGH).collect();
        assert_eq!(highs, vec![true, true, true, false, false, false, true, true, true, false, false, false]);
    }

    #[test]
    fn test_degenerate_cycles_clamped() {
        let mut tx = LfpsTransmitter::with_cycles(0, 0, 0);
        assert_eq!((tx.burst_cycles(), tx.repeat_cycles(), tx.half_period()), (1, 2, 1));
        let outs: Vec<LfpsTxOutput> = (0..6).map(|_| tx.tick(true)).collect();
        let idle: Vec<bool> = outs.iter().map(|o| o.idle).collect();
        let counts: Vec<u16> = outs.iter().map(|o| o.burst_count).collect();
        assert_eq!(idle, vec![false, true, false, true, false, true]);
        assert_eq!(counts, vec![1, 1, 2, 2, 3, 3]);

        let tx = LfpsTransmitter::with_cycles(125, 125, 3);
        assert_eq!(tx.repeat_cycles(), 126);
    }

    #[test]
    fn test_restart_resets_count() {
        let mut tx = LfpsTransmitter::new(125_000_000, 25_000_000);
        for _ in 0..5000 {
            tx.tick(true);
        }
        tx.tick(false);
        assert_eq!(tx.tick(true).burst_count, 1);
    }
}
