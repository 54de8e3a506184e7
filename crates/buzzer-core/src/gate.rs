//! Binary gate - a single-token semaphore
//!
//! The player uses it twice: as the lifecycle lock (taken with a bounded
//! wait around start/stop) and as a cancellable sleep for the worker, which
//! waits on an empty gate for a note's duration unless someone gives it first.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub struct Gate {
    available: Mutex<bool>,
    cvar: Condvar,
}

impl Gate {
    /// Create a gate holding its token
    pub const fn new_available() -> Self {
        Self {
            available: Mutex::new(true),
            cvar: Condvar::new(),
        }
    }

    /// Create an empty gate
    pub const fn new_taken() -> Self {
        Self {
            available: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    /// Take the token, waiting at most `timeout` for it to become available
    ///
    /// Returns false on timeout.
    pub fn take(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut available = self.lock();
        while !*available {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            available = match self.cvar.wait_timeout(available, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        *available = false;
        true
    }

    /// Take the token only if it's available right now
    pub fn try_take(&self) -> bool {
        let mut available = self.lock();
        core::mem::replace(&mut *available, false)
    }

    /// Put the token back, waking one waiter. Giving a full gate is a no-op.
    pub fn give(&self) {
        *self.lock() = true;
        self.cvar.notify_one();
    }

    pub fn is_available(&self) -> bool {
        *self.lock()
    }

    // A panic while holding the flag can't leave it inconsistent
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.available
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_take_and_give() {
        let gate = Gate::new_available();
        assert!(gate.take(Duration::ZERO));
        assert!(!gate.is_available());
        assert!(!gate.take(Duration::from_millis(10)));
        gate.give();
        assert!(gate.is_available());
        assert!(gate.try_take());
        assert!(!gate.try_take());
    }

    #[test]
    fn test_give_is_binary() {
        let gate = Gate::new_taken();
        gate.give();
        gate.give();
        assert!(gate.try_take());
        assert!(!gate.try_take());
    }

    #[test]
    fn test_timeout_waits_full_duration() {
        let gate = Gate::new_taken();
        let start = Instant::now();
        assert!(!gate.take(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_give_wakes_waiter_early() {
        let gate = Arc::new(Gate::new_taken());
        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let taken = gate.take(Duration::from_secs(5));
                (taken, start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        gate.give();
        let (taken, elapsed) = waiter.join().unwrap();
        assert!(taken);
        assert!(elapsed < Duration::from_secs(5));
    }
}
