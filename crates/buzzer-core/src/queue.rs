//! Bounded FIFO of tone requests
//!
//! Producers block (up to a timeout) while the queue is full, the single
//! consumer blocks until a request arrives or the queue is closed.

use std::collections::TryReserveError;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::tone::ToneRequest;

/// Why a request didn't make it into the queue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendError {
    /// Still full when the timeout ran out
    Full,
    /// The queue was closed by a teardown
    Closed,
}

struct Inner {
    items: VecDeque<ToneRequest>,
    closed: bool,
}

pub struct ToneQueue {
    inner: Mutex<Inner>,
    capacity: usize,
    not_empty: Condvar,
    not_full: Condvar,
}

impl ToneQueue {
    /// Allocate a queue able to hold `capacity` requests
    ///
    /// The storage is reserved up front, so a failed allocation is reported
    /// here instead of on some later send.
    pub fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut items = VecDeque::new();
        items.try_reserve_exact(capacity)?;
        Ok(Self {
            inner: Mutex::new(Inner { items, closed: false }),
            capacity,
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        })
    }

    /// Push a request, waiting up to `timeout` for a free slot
    pub fn send_timeout(&self, request: ToneRequest, timeout: Duration) -> Result<(), SendError> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();
        loop {
            if inner.closed {
                return Err(SendError::Closed);
            }
            if inner.items.len() < self.capacity {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(SendError::Full);
            }
            inner = match self.not_full.wait_timeout(inner, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        inner.items.push_back(request);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Pop the oldest request, blocking until one arrives
    ///
    /// Returns `None` once the queue is closed, even if requests are pending.
    pub fn recv(&self) -> Option<ToneRequest> {
        let mut inner = self.lock();
        loop {
            if inner.closed {
                return None;
            }
            if let Some(request) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Some(request);
            }
            inner = self
                .not_empty
                .wait(inner)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Drop every pending request
    pub fn reset(&self) {
        self.lock().items.clear();
        self.not_full.notify_all();
    }

    /// Close the queue: pending requests are discarded and every waiter returns
    pub fn close(&self) {
        {
            let mut inner = self.lock();
            inner.closed = true;
            inner.items.clear();
        }
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
