//! Clock domain crossing
//!
//! Signals that originate in another clock domain (or asynchronously, like the
//! transceiver's electrical idle detector) pass through these before use.

/// Two-stage synchronizer. The output lags the input by two ticks.
#[derive(Debug, Clone)]
pub struct MultiReg<T: Copy> {
    stages: [T; 2],
}

impl<T: Copy> MultiReg<T> {
    pub fn new(init: T) -> Self {
        MultiReg { stages: [init; 2] }
    }

    /// Currently synchronized value
    pub fn output(&self) -> T {
        self.stages[1]
    }

    pub fn tick(&mut self, input: T) -> T {
        let out = self.stages[1];
        self.stages[1] = self.stages[0];
        self.stages[0] = input;
        out
    }

    pub fn reset(&mut self, value: T) {
        self.stages = [value; 2];
    }
}

/// Carries single-cycle pulses across a domain boundary.
/// Each input pulse flips a toggle, the toggle is synchronized and every
/// observed edge becomes exactly one output pulse. Pulses arriving closer
/// together than the synchronizer latency may merge.
#[derive(Debug, Clone)]
pub struct PulseSynchronizer {
    toggle: bool,
    sync: MultiReg<bool>,
    last: bool,
}

impl PulseSynchronizer {
    pub fn new() -> Self {
        PulseSynchronizer {
            toggle: false,
            sync: MultiReg::new(false),
            last: false,
        }
    }

    pub fn tick(&mut self, pulse: bool) -> bool {
        if pulse {
            self.toggle = !self.toggle;
        }
        let synced = self.sync.tick(self.toggle);
        let out = synced != self.last;
        self.last = synced;
        out
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PulseSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
