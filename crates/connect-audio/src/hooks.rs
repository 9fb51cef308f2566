//! Side-effect hooks fired around playback transitions.

/// Externally configured actions run before playback starts and after it
/// stops (e.g. powering ancillary equipment via HTTP).
///
/// Implementations must be fail-soft and must not block the calling SDK
/// notification thread for unbounded time; the dispatcher invokes them
/// inline.
pub trait PlaybackHooks: Send + Sync {
    fn before_playing(&self);
    fn after_playing(&self);
}

/// Hooks that do nothing, for setups without ancillary equipment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl PlaybackHooks for NoopHooks {
    fn before_playing(&self) {}

    fn after_playing(&self) {}
}
