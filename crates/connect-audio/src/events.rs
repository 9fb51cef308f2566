//! Typed SDK notification enums with display names.

/// Connection-level SDK notifications. Informational only in this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    LoggedIn,
    LoggedOut,
    TemporaryError,
}

impl ConnectionEvent {
    pub fn name(self) -> &'static str {
        match self {
            ConnectionEvent::LoggedIn => "logged in",
            ConnectionEvent::LoggedOut => "logged out",
            ConnectionEvent::TemporaryError => "temporary connection error",
        }
    }
}

/// Playback-level SDK notifications driving the session/device state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    TrackChanged,
    Next,
    Prev,
    ShuffleEnabled,
    ShuffleDisabled,
    RepeatEnabled,
    RepeatDisabled,
    BecameActive,
    BecameInactive,
    PlayTokenLost,
    AudioFlush,
}

impl PlaybackEvent {
    pub fn name(self) -> &'static str {
        match self {
            PlaybackEvent::Play => "play",
            PlaybackEvent::Pause => "pause",
            PlaybackEvent::TrackChanged => "track changed",
            PlaybackEvent::Next => "next",
            PlaybackEvent::Prev => "prev",
            PlaybackEvent::ShuffleEnabled => "shuffle enabled",
            PlaybackEvent::ShuffleDisabled => "shuffle disabled",
            PlaybackEvent::RepeatEnabled => "repeat enabled",
            PlaybackEvent::RepeatDisabled => "repeat disabled",
            PlaybackEvent::BecameActive => "became active",
            PlaybackEvent::BecameInactive => "became inactive",
            PlaybackEvent::PlayTokenLost => "play token lost",
            PlaybackEvent::AudioFlush => "audio flush",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_distinct() {
        let names = [
            PlaybackEvent::Play,
            PlaybackEvent::Pause,
            PlaybackEvent::TrackChanged,
            PlaybackEvent::Next,
            PlaybackEvent::Prev,
            PlaybackEvent::ShuffleEnabled,
            PlaybackEvent::ShuffleDisabled,
            PlaybackEvent::RepeatEnabled,
            PlaybackEvent::RepeatDisabled,
            PlaybackEvent::BecameActive,
            PlaybackEvent::BecameInactive,
            PlaybackEvent::PlayTokenLost,
            PlaybackEvent::AudioFlush,
        ]
        .map(PlaybackEvent::name);
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
