use std::cell::Cell;
use std::rc::Rc;

/// Wall-clock source in milliseconds since the Unix epoch.
///
/// Progression reads time through this trait so tests can drive it
/// deterministically. The browser implementation lives in the web crate.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Manually advanced clock. Clones share the same time value.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
