//! Reentrant critical section.
//!
//! A thread may enter any number of times; other threads block until it has
//! left as often as it entered. Unlike a guard-based mutex, entering and
//! leaving are separate calls, so the section can stay held between a frame
//! lock and its matching unlock.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
struct Owner {
    thread: Option<ThreadId>,
    recursion: usize,
}

#[derive(Debug, Default)]
pub struct CritSect {
    owner: Mutex<Owner>,
    released: Condvar,
}

impl CritSect {
    pub fn new() -> Self {
        Self::default()
    }

    fn owner(&self) -> MutexGuard<'_, Owner> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter, blocking while another thread is inside
    pub fn enter(&self) {
        let me = thread::current().id();
        let mut owner = self.owner();
        while owner.thread.is_some_and(|t| t != me) {
            owner = self
                .released
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        owner.thread = Some(me);
        owner.recursion += 1;
    }

    /// Leave once
    ///
    /// # Returns
    /// `false` if the calling thread is not inside
    pub fn leave(&self) -> bool {
        let me = thread::current().id();
        let mut owner = self.owner();
        if owner.thread != Some(me) {
            return false;
        }

        owner.recursion -= 1;
        if owner.recursion == 0 {
            owner.thread = None;
            drop(owner);
            self.released.notify_one();
        }
        true
    }

    /// Whether the calling thread is inside
    pub fn held_by_current_thread(&self) -> bool {
        self.owner().thread == Some(thread::current().id())
    }

    /// Times the owning thread has entered without leaving
    pub fn recursion(&self) -> usize {
        self.owner().recursion
    }
}
