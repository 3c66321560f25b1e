use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared view of a pipe's `ready` output. This is the only piece of pipe
/// state that may be read from outside the thread clocking it.
#[derive(Debug, Clone, Default)]
pub struct ReadyHandle {
    ready: Arc<AtomicBool>,
}

impl ReadyHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Publish the value computed for the current cycle. Returns the previous value.
    pub(crate) fn publish(&self, ready: bool) -> bool {
        self.ready.swap(ready, Ordering::AcqRel)
    }
}
