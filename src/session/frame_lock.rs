// Frame lock bookkeeping - depth counter and captured back buffer
//
// This is the state machine only; mutual exclusion comes from the session's
// critical section, which is entered once per acquire and left once per
// release.

use crate::error::LockViolation;
use crate::surface::IndexedBuffer;

/// Identity of the back buffer captured by the first lock of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveBuffer {
    /// Allocation generation; changes whenever the back buffer is recreated
    pub generation: u64,
    /// Address of the first pixel
    pub base: usize,
    /// Size in bytes
    pub len: usize,
}

impl ActiveBuffer {
    fn capture(buffer: &IndexedBuffer, generation: u64) -> Self {
        Self {
            generation,
            base: buffer.base_address(),
            len: buffer.len(),
        }
    }

    /// One past the last pixel
    pub fn end(&self) -> usize {
        self.base + self.len
    }
}

/// Lock depth and the buffer it guards
#[derive(Debug, Default)]
pub struct FrameLock {
    depth: usize,
    active: Option<ActiveBuffer>,
    buffer_end: Option<usize>,
}

impl FrameLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding locks
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Buffer captured by the most recent outermost lock
    ///
    /// Still reported after the depth drops back to zero; only teardown clears
    /// it.
    pub fn active(&self) -> Option<ActiveBuffer> {
        self.active
    }

    /// End address used for bounds checks; set only while locked
    pub fn buffer_end(&self) -> Option<usize> {
        self.buffer_end
    }

    /// Add one lock, capturing `buffer` when this is the outermost one
    ///
    /// A missing buffer is not an error here: the matching release reports
    /// the inconsistency.
    pub fn acquire(&mut self, buffer: Option<&IndexedBuffer>, generation: u64) {
        if self.depth == 0 {
            self.active = buffer.map(|b| ActiveBuffer::capture(b, generation));
            self.buffer_end = self.active.map(|a| a.end());
        }
        self.depth += 1;
    }

    /// Drop one lock
    ///
    /// # Returns
    /// `true` when this released the outermost lock and the frame should be
    /// presented
    pub fn release(&mut self) -> Result<bool, LockViolation> {
        if self.depth == 0 {
            return Err(LockViolation::DepthUnderflow);
        }
        if self.active.is_none() {
            return Err(LockViolation::Inconsistent);
        }

        self.depth -= 1;
        if self.depth == 0 {
            self.buffer_end = None;
            return Ok(true);
        }
        Ok(false)
    }

    /// Forget all locks without presenting
    ///
    /// # Returns
    /// The depth that was discarded
    pub fn reset(&mut self) -> usize {
        self.active = None;
        self.buffer_end = None;
        std::mem::take(&mut self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outermost_lock_captures_buffer() {
        let buffer = IndexedBuffer::new(8, 8).unwrap();
        let mut lock = FrameLock::new();

        lock.acquire(Some(&buffer), 3);
        let active = lock.active().unwrap();
        assert_eq!(active.generation, 3);
        assert_eq!(active.base, buffer.base_address());
        assert_eq!(lock.buffer_end(), Some(buffer.base_address() + 64));

        // Nested lock keeps the first capture
        lock.acquire(None, 4);
        assert_eq!(lock.active(), Some(active));
        assert_eq!(lock.depth(), 2);
    }

    #[test]
    fn test_release_reports_outermost() {
        let buffer = IndexedBuffer::new(4, 4).unwrap();
        let mut lock = FrameLock::new();
        lock.acquire(Some(&buffer), 1);
        lock.acquire(Some(&buffer), 1);

        assert_eq!(lock.release(), Ok(false));
        assert_eq!(lock.release(), Ok(true));
        assert_eq!(lock.depth(), 0);
        assert_eq!(lock.buffer_end(), None);
        assert!(lock.active().is_some());
    }

    #[test]
    fn test_release_without_lock() {
        let mut lock = FrameLock::new();
        assert_eq!(lock.release(), Err(LockViolation::DepthUnderflow));
    }

    #[test]
    fn test_release_without_buffer() {
        let mut lock = FrameLock::new();
        lock.acquire(None, 0);
        assert_eq!(lock.release(), Err(LockViolation::Inconsistent));
        assert_eq!(lock.depth(), 1);
    }

    #[test]
    fn test_reset() {
        let buffer = IndexedBuffer::new(4, 4).unwrap();
        let mut lock = FrameLock::new();
        lock.acquire(Some(&buffer), 1);
        lock.acquire(Some(&buffer), 1);

        assert_eq!(lock.reset(), 2);
        assert_eq!(lock.depth(), 0);
        assert!(lock.active().is_none());
        assert_eq!(lock.reset(), 0);
    }
}
