//! Playback session flag shared between SDK callbacks and the playback thread.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether this process currently owns active playback.
///
/// Distinct from whether the output device is open: the session is flipped by
/// SDK notifications, the device follows. Reads may be momentarily stale on
/// other threads; the sink's lock absorbs the resulting races, so relaxed
/// ordering is enough here.
#[derive(Debug, Default)]
pub struct PlaybackSession {
    active: AtomicBool,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::Relaxed);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Relaxed);
    }
}
