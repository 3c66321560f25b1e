//! LFPS timing classes, see USB 3.0 Table 6-21
//! All durations are in nanoseconds to keep the cycle conversion exact.

pub const NS_PER_US: u64 = 1_000;
pub const NS_PER_MS: u64 = 1_000_000;
pub const NS_PER_S: u64 = 1_000_000_000;

/// Converts a duration to a whole number of clock cycles, rounding up.
/// None if the result does not fit in 64 bits.
pub fn checked_ns_to_cycles(clk_freq: u64, t_ns: u64) -> Option<u64> {
    let cycles = (t_ns as u128 * clk_freq as u128).div_ceil(NS_PER_S as u128);
    u64::try_from(cycles).ok()
}

pub fn checked_us_to_cycles(clk_freq: u64, t_us: u64) -> Option<u64> {
    checked_ns_to_cycles(clk_freq, t_us.checked_mul(NS_PER_US)?)
}

/// Like `checked_ns_to_cycles`, saturating at `u64::MAX`
pub fn ns_to_cycles(clk_freq: u64, t_ns: u64) -> u64 {
    checked_ns_to_cycles(clk_freq, t_ns).unwrap_or(u64::MAX)
}

pub fn us_to_cycles(clk_freq: u64, t_us: u64) -> u64 {
    checked_us_to_cycles(clk_freq, t_us).unwrap_or(u64::MAX)
}

/// Inverse of ns_to_cycles, used to report measured durations
pub fn cycles_to_ns(clk_freq: u64, cycles: u64) -> u64 {
    (cycles as u128 * NS_PER_S as u128 / clk_freq as u128) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfpsTiming {
    pub t_typ: Option<u64>,
    pub t_min: u64,
    pub t_max: u64,
}

impl LfpsTiming {
    pub const fn new(t_typ: Option<u64>, t_min: u64, t_max: u64) -> Self {
        LfpsTiming { t_typ, t_min, t_max }
    }

    /// Nominal duration: typical value if specified, otherwise the middle of the range
    pub fn nominal(&self) -> u64 {
        self.t_typ.unwrap_or((self.t_min + self.t_max) / 2)
    }

    pub fn contains(&self, t_ns: u64) -> bool {
        t_ns >= self.t_min && t_ns <= self.t_max
    }

    pub fn nominal_cycles(&self, clk_freq: u64) -> u64 {
        ns_to_cycles(clk_freq, self.nominal())
    }
}

/// One LFPS signal class: a burst duration and, for repeating classes, a repeat period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lfps {
    pub name: &'static str,
    pub burst: LfpsTiming,
    pub repeat: Option<LfpsTiming>,
    /// Number of bursts for classes sent a fixed number of times
    pub cycles: Option<u32>,
}

pub const POLLING_LFPS: Lfps = Lfps {
    name: "Polling",
    burst: LfpsTiming::new(Some(NS_PER_US), 600, 1_400),
    repeat: Some(LfpsTiming::new(Some(10 * NS_PER_US), 6 * NS_PER_US, 14 * NS_PER_US)),
    cycles: None,
};

pub const PING_LFPS: Lfps = Lfps {
    name: "Ping",
    burst: LfpsTiming::new(None, 40, 200),
    repeat: Some(LfpsTiming::new(Some(200 * NS_PER_MS), 160 * NS_PER_MS, 240 * NS_PER_MS)),
    cycles: Some(2),
};

pub const RESET_LFPS: Lfps = Lfps {
    name: "Reset",
    burst: LfpsTiming::new(Some(100 * NS_PER_MS), 80 * NS_PER_MS, 120 * NS_PER_MS),
    repeat: None,
    cycles: None,
};

pub const U1_EXIT_LFPS: Lfps = Lfps {
    name: "U1Exit",
    burst: LfpsTiming::new(None, 600, 2 * NS_PER_MS),
    repeat: None,
    cycles: None,
};

pub const U2_LFPS: Lfps = Lfps {
    name: "U2Exit",
    burst: LfpsTiming::new(None, 80 * NS_PER_US, 2 * NS_PER_MS),
    repeat: None,
    cycles: None,
};

pub const LOOPBACK_EXIT_LFPS: Lfps = U2_LFPS;

pub const U3_WAKEUP_LFPS: Lfps = Lfps {
    name: "U3Wakeup",
    burst: LfpsTiming::new(None, 80 * NS_PER_US, 10 * NS_PER_MS),
    repeat: None,
    cycles: None,
};

/// Allowed LFPS signal period, 20 to 100 ns (10 to 50 MHz)
pub const LFPS_PERIOD_MIN_NS: u64 = 20;
pub const LFPS_PERIOD_MAX_NS: u64 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_cycles() {
        let clk = 125_000_000;
        assert_eq!(POLLING_LFPS.burst.nominal_cycles(clk), 125);
        assert_eq!(POLLING_LFPS.repeat.unwrap().nominal_cycles(clk), 1250);
        assert_eq!(ns_to_cycles(clk, 1), 1);
        assert_eq!(ns_to_cycles(clk, 8), 1);
        assert_eq!(ns_to_cycles(clk, 9), 2);
    }

    #[test]
    fn test_timer_cycles() {
        assert_eq!(us_to_cycles(125_000_000, 360_000), 45_000_000);
        assert_eq!(us_to_cycles(125_000_000, 12_000), 1_500_000);
        assert_eq!(us_to_cycles(156_250_000, 6_000), 937_500);
    }

    #[test]
    fn test_conversion_overflow() {
        let clk = 125_000_000;
        assert_eq!(checked_us_to_cycles(clk, u64::MAX / NS_PER_US + 1), None);
        assert_eq!(checked_ns_to_cycles(clk, u64::MAX), None);
        assert_eq!(us_to_cycles(clk, 100_000_000_000_000_000), u64::MAX);
        assert_eq!(ns_to_cycles(clk, u64::MAX), u64::MAX);
        // 2^64 ns at 125 MHz is still 2.3e18 cycles
        assert_eq!(checked_us_to_cycles(clk, u64::MAX / NS_PER_US), Some((u64::MAX / NS_PER_US * NS_PER_US).div_ceil(8)));
    }

    #[test]
    fn test_ranges() {
        for lfps in [POLLING_LFPS, PING_LFPS, RESET_LFPS, U1_EXIT_LFPS, U2_LFPS, U3_WAKEUP_LFPS] {
            assert!(lfps.burst.t_min <= lfps.burst.t_max, "{}", lfps.name);
            assert!(lfps.burst.contains(lfps.burst.nominal()), "{}", lfps.name);
        }
        assert_eq!(PING_LFPS.burst.nominal(), 120);
        assert_eq!(cycles_to_ns(125_000_000, 1250), 10_000);
    }
}
