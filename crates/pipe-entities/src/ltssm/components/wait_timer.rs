/// Counts cycles while `wait` is held. Done once `limit` cycles have elapsed,
/// cleared as soon as `wait` drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitTimer {
    count: u64,
}

impl WaitTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> u64 {
        self.count
    }

    pub fn tick(&mut self, wait: bool, limit: u64) -> bool {
        if !wait {
            self.count = 0;
            return false;
        }
        self.count = (self.count + 1).min(limit);
        self.count >= limit
    }
}
