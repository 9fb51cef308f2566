//! Bounded handoff queue between the SDK sample callback and the playback thread.
//!
//! Single producer (the SDK delivery callback) / single consumer (the
//! playback thread). Push never blocks: a full queue is the backpressure
//! signal the splitter reports back to the SDK. Pop blocks until a period is
//! available, so no extra signaling is needed between the two sides.
//!
//! `close()` exists for shutdown and tests; a closed queue refuses new
//! periods and lets the consumer drain what is left before `pop` returns
//! `None`.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Returned by [`PeriodQueue::try_push`] when the queue cannot accept a period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueFull;

/// Fixed-capacity ordered queue of period-sized byte chunks.
///
/// A single [`Condvar`] signals "state changed"; the closed flag lives under
/// the same mutex as the queue to avoid races between close and pop.
pub struct PeriodQueue {
    inner: Mutex<QueueInner>,
    cv: Condvar,
    max_periods: usize,
}

struct QueueInner {
    periods: VecDeque<Vec<u8>>,
    closed: bool,
}

impl PeriodQueue {
    pub fn new(max_periods: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                periods: VecDeque::with_capacity(max_periods),
                closed: false,
            }),
            cv: Condvar::new(),
            max_periods: max_periods.max(1),
        }
    }

    /// Capacity in periods.
    pub fn max_periods(&self) -> usize {
        self.max_periods
    }

    /// Current depth in periods (best-effort snapshot).
    pub fn len(&self) -> usize {
        let g = self.inner.lock().unwrap();
        g.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueue one period without blocking.
    ///
    /// Fails fast when the queue is at capacity (or closed), leaving the
    /// queue unchanged.
    pub fn try_push(&self, period: Vec<u8>) -> Result<(), QueueFull> {
        let mut g = self.inner.lock().unwrap();
        if g.closed || g.periods.len() >= self.max_periods {
            return Err(QueueFull);
        }
        g.periods.push_back(period);
        drop(g);
        self.cv.notify_all();
        Ok(())
    }

    /// Dequeue one period, blocking until one is available.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<Vec<u8>> {
        let mut g = self.inner.lock().unwrap();
        loop {
            if let Some(period) = g.periods.pop_front() {
                drop(g);
                self.cv.notify_all();
                return Some(period);
            }
            if g.closed {
                return None;
            }
            g = self.cv.wait(g).unwrap();
        }
    }

    /// Mark the queue closed and wake any blocked consumer.
    ///
    /// Idempotent; safe to call from a signal handler path.
    pub fn close(&self) {
        let mut g = self.inner.lock().unwrap();
        g.closed = true;
        drop(g);
        self.cv.notify_all();
    }
}
