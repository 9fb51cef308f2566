//! Event dispatch: maps SDK notifications onto session, device, and hooks.
//!
//! The SDK adapter (FFI layer, out of scope here) invokes one [`EventSink`]
//! method per callback category. [`EventDispatcher`] is the production sink:
//! it owns the shared context the original kept as process globals and
//! applies the notification state machine:
//!
//! - became-active: before-playing hook, activate session
//! - play: acquire device
//! - pause: after-playing hook, release device
//! - became-inactive: after-playing hook, release device, deactivate session
//! - play-token-lost: after-playing hook
//! - audio-flush: before-playing hook
//! - everything else: logged only
//!
//! All methods run on SDK-owned threads and must return quickly: sample
//! delivery uses only the non-blocking queue path, and hook/mixer/credential
//! failures are logged and absorbed so nothing stalls or unwinds into the
//! SDK dispatch thread.

use std::sync::{Arc, Mutex};

use crate::credentials::CredentialsStore;
use crate::events::{ConnectionEvent, PlaybackEvent};
use crate::hooks::PlaybackHooks;
use crate::queue::PeriodQueue;
use crate::session::PlaybackSession;
use crate::sink::DeviceSink;
use crate::splitter::{SampleDelivery, SampleSplitter};
use crate::volume;

/// A system mixer control accepting an integer percent.
pub trait MixerControl: Send {
    fn set_volume(&mut self, percent: u8) -> anyhow::Result<()>;
}

/// One method per SDK callback category; invoked by the SDK adapter from
/// SDK-owned threads.
pub trait EventSink: Send + Sync {
    fn connection_notify(&self, event: ConnectionEvent);
    fn connection_credentials(&self, blob: &str);
    fn debug_message(&self, message: &str);
    fn playback_notify(&self, event: PlaybackEvent);
    fn playback_data(&self, data: &[u8], num_samples: u32) -> SampleDelivery;
    fn playback_seek(&self, position_ms: u32);
    fn playback_volume(&self, volume: u16);
}

/// Production event sink owning the playback context.
pub struct EventDispatcher {
    session: Arc<PlaybackSession>,
    sink: Arc<DeviceSink>,
    splitter: Mutex<SampleSplitter>,
    hooks: Box<dyn PlaybackHooks>,
    credentials: Mutex<CredentialsStore>,
    mixer: Mutex<Box<dyn MixerControl>>,
    underruns: Mutex<UnderrunMonitor>,
}

impl EventDispatcher {
    pub fn new(
        session: Arc<PlaybackSession>,
        sink: Arc<DeviceSink>,
        queue: Arc<PeriodQueue>,
        hooks: Box<dyn PlaybackHooks>,
        credentials: CredentialsStore,
        mixer: Box<dyn MixerControl>,
    ) -> Self {
        let splitter = SampleSplitter::new(queue, sink.config());
        Self {
            session,
            sink,
            splitter: Mutex::new(splitter),
            hooks,
            credentials: Mutex::new(credentials),
            mixer: Mutex::new(mixer),
            underruns: Mutex::new(UnderrunMonitor::default()),
        }
    }
}

impl EventSink for EventDispatcher {
    fn connection_notify(&self, event: ConnectionEvent) {
        tracing::info!(event = event.name(), "connection notify");
    }

    fn connection_credentials(&self, blob: &str) {
        let mut store = self.credentials.lock().unwrap();
        match store.update_blob(blob) {
            Ok(()) => tracing::info!(path = %store.path().display(), "credentials updated"),
            Err(err) => tracing::warn!("failed to persist credentials: {err:#}"),
        }
    }

    fn debug_message(&self, message: &str) {
        tracing::debug!(sdk_message = message, "sdk debug");
        let action = self.underruns.lock().unwrap().observe(message);
        if action == UnderrunAction::ReleaseDevice {
            tracing::warn!("repeated underruns; releasing device");
            self.hooks.after_playing();
            self.sink.release();
        }
    }

    fn playback_notify(&self, event: PlaybackEvent) {
        tracing::info!(event = event.name(), "playback notify");
        match event {
            PlaybackEvent::Play => self.sink.acquire(),
            PlaybackEvent::Pause => {
                self.hooks.after_playing();
                self.sink.release();
            }
            PlaybackEvent::BecameActive => {
                self.hooks.before_playing();
                self.session.activate();
            }
            PlaybackEvent::BecameInactive => {
                self.hooks.after_playing();
                self.sink.release();
                self.session.deactivate();
            }
            PlaybackEvent::PlayTokenLost => self.hooks.after_playing(),
            PlaybackEvent::AudioFlush => self.hooks.before_playing(),
            PlaybackEvent::TrackChanged
            | PlaybackEvent::Next
            | PlaybackEvent::Prev
            | PlaybackEvent::ShuffleEnabled
            | PlaybackEvent::ShuffleDisabled
            | PlaybackEvent::RepeatEnabled
            | PlaybackEvent::RepeatDisabled => {}
        }
    }

    fn playback_data(&self, data: &[u8], num_samples: u32) -> SampleDelivery {
        self.splitter.lock().unwrap().on_samples(data, num_samples)
    }

    fn playback_seek(&self, position_ms: u32) {
        tracing::info!(position_ms, "playback seek");
    }

    fn playback_volume(&self, volume: u16) {
        let percent = volume::map_volume(volume);
        tracing::info!(raw = volume, percent, "playback volume");
        if let Err(err) = self.mixer.lock().unwrap().set_volume(percent) {
            tracing::warn!("failed to set mixer volume: {err:#}");
        }
    }
}

const UNDERRUN_RELEASE_THRESHOLD: u32 = 6;

/// Tracks consecutive underrun warnings in the SDK debug stream.
///
/// Armed by a "Requesting Bytes" message; a run of underruns after that
/// point means the device stopped consuming and the sink should be released
/// rather than left underrunning forever.
#[derive(Debug, Default)]
struct UnderrunMonitor {
    armed: bool,
    consecutive: u32,
}

#[derive(Debug, PartialEq, Eq)]
enum UnderrunAction {
    None,
    ReleaseDevice,
}

impl UnderrunMonitor {
    fn observe(&mut self, message: &str) -> UnderrunAction {
        if message.contains("Requesting Bytes") {
            self.armed = true;
            self.consecutive = 0;
        } else if message.contains("WARNING: Underrun") && self.armed {
            self.consecutive += 1;
            if self.consecutive >= UNDERRUN_RELEASE_THRESHOLD {
                self.armed = false;
                self.consecutive = 0;
                return UnderrunAction::ReleaseDevice;
            }
        }
        UnderrunAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkConfig;
    use crate::playback::spawn_playback_thread;
    use crate::sink::mock::{Journal, MockBackend};
    use std::thread;
    use std::time::{Duration, Instant};

    struct JournalHooks {
        journal: Arc<Journal>,
    }

    impl PlaybackHooks for JournalHooks {
        fn before_playing(&self) {
            self.journal.push("before-hook");
        }

        fn after_playing(&self) {
            self.journal.push("after-hook");
        }
    }

    struct RecordingMixer {
        percents: Arc<Mutex<Vec<u8>>>,
    }

    impl MixerControl for RecordingMixer {
        fn set_volume(&mut self, percent: u8) -> anyhow::Result<()> {
            self.percents.lock().unwrap().push(percent);
            Ok(())
        }
    }

    // 2 channels, 4-frame periods: period_bytes = 16, period_samples = 8.
    fn test_config() -> SinkConfig {
        SinkConfig {
            device: "mock".to_string(),
            channels: 2,
            rate: 44_100,
            period_frames: 4,
        }
    }

    struct Fixture {
        dispatcher: EventDispatcher,
        session: Arc<PlaybackSession>,
        sink: Arc<DeviceSink>,
        queue: Arc<PeriodQueue>,
        journal: Arc<Journal>,
        percents: Arc<Mutex<Vec<u8>>>,
        credentials_path: std::path::PathBuf,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let credentials_path = dir.path().join("credentials.json");
        let journal = Arc::new(Journal::default());
        let percents = Arc::new(Mutex::new(Vec::new()));
        let session = Arc::new(PlaybackSession::new());
        let sink = Arc::new(DeviceSink::new(
            session.clone(),
            Box::new(MockBackend::new(journal.clone())),
            test_config(),
        ));
        let queue = Arc::new(PeriodQueue::new(2));
        let dispatcher = EventDispatcher::new(
            session.clone(),
            sink.clone(),
            queue.clone(),
            Box::new(JournalHooks {
                journal: journal.clone(),
            }),
            CredentialsStore::open(&credentials_path),
            Box::new(RecordingMixer {
                percents: percents.clone(),
            }),
        );
        Fixture {
            dispatcher,
            session,
            sink,
            queue,
            journal,
            percents,
            credentials_path,
            _dir: dir,
        }
    }

    fn wait_until(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done() {
            assert!(Instant::now() < deadline, "timed out waiting for condition");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn full_playback_lifecycle() {
        let f = fixture();
        let worker = spawn_playback_thread(f.queue.clone(), f.sink.clone());

        f.dispatcher.playback_notify(PlaybackEvent::BecameActive);
        assert!(f.session.is_active());

        f.dispatcher.playback_notify(PlaybackEvent::Play);
        assert!(f.sink.is_open());

        // Three deliveries totalling exactly two periods (32 bytes).
        assert_eq!(
            f.dispatcher.playback_data(&[1u8; 12], 6).consumed_samples,
            6
        );
        assert_eq!(
            f.dispatcher.playback_data(&[2u8; 12], 6).consumed_samples,
            6
        );
        assert_eq!(f.dispatcher.playback_data(&[3u8; 8], 4).consumed_samples, 4);

        wait_until(|| f.journal.count("write:16") == 2);

        f.dispatcher.playback_notify(PlaybackEvent::Pause);
        assert!(!f.sink.is_open());

        f.queue.close();
        worker.join().unwrap();

        assert_eq!(
            f.journal.entries(),
            vec![
                "before-hook",
                "open",
                "write:16",
                "write:16",
                "after-hook",
                "close"
            ]
        );
    }

    #[test]
    fn became_inactive_with_closed_device_is_a_no_op() {
        let f = fixture();
        f.dispatcher.playback_notify(PlaybackEvent::BecameActive);

        f.dispatcher.playback_notify(PlaybackEvent::BecameInactive);

        assert!(!f.session.is_active());
        assert_eq!(f.journal.count("close"), 0);
    }

    #[test]
    fn play_before_became_active_leaves_device_closed() {
        let f = fixture();

        f.dispatcher.playback_notify(PlaybackEvent::Play);

        assert!(!f.sink.is_open());
        assert_eq!(f.journal.count("open"), 0);
    }

    #[test]
    fn play_token_lost_fires_after_hook_without_touching_the_device() {
        let f = fixture();
        f.dispatcher.playback_notify(PlaybackEvent::BecameActive);
        f.dispatcher.playback_notify(PlaybackEvent::Play);

        f.dispatcher.playback_notify(PlaybackEvent::PlayTokenLost);

        assert!(f.session.is_active());
        assert!(f.sink.is_open());
        assert_eq!(f.journal.count("after-hook"), 1);
    }

    #[test]
    fn informational_events_have_no_side_effects() {
        let f = fixture();
        f.dispatcher.playback_notify(PlaybackEvent::BecameActive);

        for event in [
            PlaybackEvent::TrackChanged,
            PlaybackEvent::Next,
            PlaybackEvent::Prev,
            PlaybackEvent::ShuffleEnabled,
            PlaybackEvent::RepeatDisabled,
        ] {
            f.dispatcher.playback_notify(event);
        }
        f.dispatcher
            .connection_notify(ConnectionEvent::TemporaryError);
        f.dispatcher.playback_seek(42_000);

        assert!(!f.sink.is_open());
        assert_eq!(f.journal.entries(), vec!["before-hook"]);
    }

    #[test]
    fn volume_change_applies_the_mapped_percent() {
        let f = fixture();

        f.dispatcher.playback_volume(65_535);
        f.dispatcher.playback_volume(0);

        assert_eq!(*f.percents.lock().unwrap(), vec![85, 0]);
    }

    #[test]
    fn credentials_are_persisted_synchronously() {
        let f = fixture();

        f.dispatcher.connection_credentials("reusable-blob");

        let text = std::fs::read_to_string(&f.credentials_path).unwrap();
        let record: crate::credentials::Credentials = serde_json::from_str(&text).unwrap();
        assert_eq!(record.blob.as_deref(), Some("reusable-blob"));
    }

    #[test]
    fn repeated_underruns_force_a_release() {
        let f = fixture();
        f.dispatcher.playback_notify(PlaybackEvent::BecameActive);
        f.dispatcher.playback_notify(PlaybackEvent::Play);
        assert!(f.sink.is_open());

        f.dispatcher.debug_message("Requesting Bytes: 4096");
        for _ in 0..5 {
            f.dispatcher.debug_message("WARNING: Underrun detected");
        }
        assert!(f.sink.is_open());

        f.dispatcher.debug_message("WARNING: Underrun detected");

        assert!(!f.sink.is_open());
        let entries = f.journal.entries();
        let after = entries.iter().position(|e| e == "after-hook").unwrap();
        let close = entries.iter().position(|e| e == "close").unwrap();
        assert!(after < close, "after-hook must run before the device closes");
    }

    #[test]
    fn underruns_without_arming_are_ignored() {
        let f = fixture();
        f.dispatcher.playback_notify(PlaybackEvent::BecameActive);
        f.dispatcher.playback_notify(PlaybackEvent::Play);

        for _ in 0..10 {
            f.dispatcher.debug_message("WARNING: Underrun detected");
        }

        assert!(f.sink.is_open());
    }

    #[test]
    fn requesting_bytes_rearms_and_resets_the_count() {
        let mut monitor = UnderrunMonitor::default();
        assert_eq!(monitor.observe("Requesting Bytes"), UnderrunAction::None);
        for _ in 0..5 {
            assert_eq!(
                monitor.observe("WARNING: Underrun"),
                UnderrunAction::None
            );
        }
        // A fresh request resets the run; five more stay below threshold.
        assert_eq!(monitor.observe("Requesting Bytes"), UnderrunAction::None);
        for _ in 0..5 {
            assert_eq!(
                monitor.observe("WARNING: Underrun"),
                UnderrunAction::None
            );
        }
        assert_eq!(
            monitor.observe("WARNING: Underrun"),
            UnderrunAction::ReleaseDevice
        );
        // Disarmed after the release until the next request.
        assert_eq!(monitor.observe("WARNING: Underrun"), UnderrunAction::None);
    }
}
