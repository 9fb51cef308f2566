//! Glue layer between a push-style Spotify Connect SDK and an ALSA output.
//!
//! ## Pipeline
//! 1. **Dispatch**: SDK notifications drive the session/device state machine
//!    ([`dispatch::EventDispatcher`]).
//! 2. **Split**: the SDK sample callback reassembles deliveries into whole
//!    periods and pushes them (non-blocking) into a bounded queue.
//! 3. **Playback**: a dedicated thread pops periods and performs the only
//!    blocking device writes.
//!
//! The SDK callback side never blocks; a full queue is reported back to the
//! SDK as backpressure. All hardware access goes through the trait seams in
//! [`sink`] and [`dispatch`] so the core stays testable without ALSA.

pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod events;
pub mod hooks;
pub mod playback;
pub mod queue;
pub mod session;
pub mod sink;
pub mod splitter;
pub mod volume;
