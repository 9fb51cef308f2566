//! Playback thread: drains the period queue into the device sink.
//!
//! The only place blocking hardware writes happen. The thread runs for the
//! process lifetime under normal operation and exits when the queue is
//! closed; callers may drop the handle (daemon-style) so it never blocks
//! shutdown.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::queue::PeriodQueue;
use crate::sink::DeviceSink;

/// Spawn the playback thread.
pub fn spawn_playback_thread(queue: Arc<PeriodQueue>, sink: Arc<DeviceSink>) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Some(period) = queue.pop() {
            sink.write(&period);
        }
        tracing::debug!("playback thread exiting; queue closed");
    })
}
