//! Device sink: owns the lifetime of the open output handle.
//!
//! All hardware access goes through the [`PcmBackend`]/[`PcmWriter`] seam so
//! the lifecycle logic is testable without a sound card. A single mutex
//! serializes open, close, and write; the session flag gates whether the
//! device may be touched at all.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::config::SinkConfig;
use crate::session::PlaybackSession;

/// Blocking writer for interleaved S16LE periods on an open device.
///
/// Dropping the writer closes the device.
pub trait PcmWriter: Send {
    fn write_period(&mut self, data: &[u8]) -> Result<()>;
}

/// Opens output devices with the fixed sink parameters.
pub trait PcmBackend: Send + Sync {
    fn open(&self, config: &SinkConfig) -> Result<Box<dyn PcmWriter>>;
}

/// Mutex-guarded owner of the output device handle.
///
/// - `acquire` / `release` are idempotent.
/// - `write` re-checks the handle under the lock, so a concurrent `release`
///   can never leave it writing to a closed device.
/// - Hardware errors are logged and absorbed; they never reach callers.
pub struct DeviceSink {
    session: Arc<PlaybackSession>,
    backend: Box<dyn PcmBackend>,
    config: SinkConfig,
    handle: Mutex<Option<Box<dyn PcmWriter>>>,
}

impl DeviceSink {
    pub fn new(
        session: Arc<PlaybackSession>,
        backend: Box<dyn PcmBackend>,
        config: SinkConfig,
    ) -> Self {
        Self {
            session,
            backend,
            config,
            handle: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Whether a device handle is currently open (best-effort snapshot).
    pub fn is_open(&self) -> bool {
        self.handle.lock().unwrap().is_some()
    }

    /// Open the output device. No-op when the session is inactive.
    ///
    /// Reopening while already open replaces the handle (the old one is
    /// closed under the lock). On open failure the sink is forced closed so
    /// no partially-initialized handle is retained.
    pub fn acquire(&self) {
        if !self.session.is_active() {
            return;
        }
        match self.backend.open(&self.config) {
            Ok(pcm) => {
                let mut guard = self.handle.lock().unwrap();
                *guard = Some(pcm);
                drop(guard);
                tracing::info!(device = %self.config.device, "device acquired");
            }
            Err(err) => {
                tracing::warn!(device = %self.config.device, "unable to acquire device: {err:#}");
                self.release();
            }
        }
    }

    /// Close the output device. No-op when the session is inactive or the
    /// device is already closed. Safe to call while a write is in flight on
    /// another thread; the lock serializes the two.
    pub fn release(&self) {
        if !self.session.is_active() {
            return;
        }
        let mut guard = self.handle.lock().unwrap();
        if guard.take().is_some() {
            drop(guard);
            tracing::info!(device = %self.config.device, "device released");
        }
    }

    /// Write one chunk to the device.
    ///
    /// No-op when the session is inactive or the device is closed. Write
    /// errors are logged and swallowed; the next chunk proceeds normally.
    pub fn write(&self, data: &[u8]) {
        if !self.session.is_active() {
            return;
        }
        let mut guard = self.handle.lock().unwrap();
        // Re-check under the lock: release() may have closed the handle
        // after the session check.
        if let Some(pcm) = guard.as_mut() {
            if let Err(err) = pcm.write_period(data) {
                tracing::warn!(device = %self.config.device, "device write failed: {err:#}");
            }
        }
    }
}
