// Per-caller lock counters
//
// Debug builds count outstanding locks per caller id so an unlock without a
// matching lock is caught at the call site that made it. Release builds carry
// a zero-sized tracker that never fails.

use crate::error::{CallerId, LockViolation};

#[cfg(debug_assertions)]
#[derive(Debug)]
pub struct LockTracker {
    counts: [u32; 256],
}

#[cfg(debug_assertions)]
impl LockTracker {
    pub fn new() -> Self {
        Self { counts: [0; 256] }
    }

    pub fn acquire(&mut self, caller: CallerId) {
        self.counts[caller.0 as usize] += 1;
    }

    pub fn release(&mut self, caller: CallerId) -> Result<(), LockViolation> {
        let count = &mut self.counts[caller.0 as usize];
        if *count == 0 {
            return Err(LockViolation::CallerUnderflow(caller));
        }
        *count -= 1;
        Ok(())
    }

    pub fn outstanding(&self, caller: CallerId) -> Option<u32> {
        Some(self.counts[caller.0 as usize])
    }
}

#[cfg(not(debug_assertions))]
#[derive(Debug)]
pub struct LockTracker;

#[cfg(not(debug_assertions))]
impl LockTracker {
    pub fn new() -> Self {
        Self
    }

    #[inline(always)]
    pub fn acquire(&mut self, _caller: CallerId) {}

    #[inline(always)]
    pub fn release(&mut self, _caller: CallerId) -> Result<(), LockViolation> {
        Ok(())
    }

    pub fn outstanding(&self, _caller: CallerId) -> Option<u32> {
        None
    }
}

impl Default for LockTracker {
    fn default() -> Self {
        Self::new()
    }
}
