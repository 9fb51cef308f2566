//! Diagnostic feed mode: push a raw PCM file through the event sink.
//!
//! Drives the same code paths the SDK would — became-active, play, repeated
//! sample deliveries throttled on the reported backlog, then pause and
//! became-inactive — so the whole pipeline can be exercised on real hardware
//! without the proprietary SDK attached.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use connect_audio::config::{SAMPLE_BYTES, SinkConfig};
use connect_audio::dispatch::EventSink;
use connect_audio::events::PlaybackEvent;

const BACKLOG_POLL: Duration = Duration::from_millis(50);

pub fn run(sink: &dyn EventSink, config: &SinkConfig, path: &Path) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let total_samples = data.len() / SAMPLE_BYTES;
    tracing::info!(
        path = %path.display(),
        samples = total_samples,
        "feeding raw pcm"
    );

    sink.playback_notify(PlaybackEvent::BecameActive);
    sink.playback_notify(PlaybackEvent::Play);

    let backlog_limit = (config.max_periods() * config.period_samples()) as u32;
    let mut offset = 0usize;
    while offset < data.len() {
        // Stay below the queue capacity so deliveries are never rejected.
        while sink.playback_data(&[], 0).queued_samples >= backlog_limit {
            thread::sleep(BACKLOG_POLL);
        }

        let chunk_samples = config
            .period_samples()
            .min((data.len() - offset) / SAMPLE_BYTES);
        if chunk_samples < config.channels {
            // Sub-frame tail: the splitter would truncate it away forever.
            break;
        }
        let chunk = &data[offset..offset + chunk_samples * SAMPLE_BYTES];
        let delivery = sink.playback_data(chunk, chunk_samples as u32);
        offset += delivery.consumed_samples as usize * SAMPLE_BYTES;
        if (delivery.consumed_samples as usize) < chunk_samples {
            thread::sleep(BACKLOG_POLL);
        }
    }

    // Let the queued periods drain before tearing the session down; a
    // sub-period remainder can never reach the device and is dropped with
    // the session.
    while sink.playback_data(&[], 0).queued_samples >= config.period_samples() as u32 {
        thread::sleep(BACKLOG_POLL);
    }

    sink.playback_notify(PlaybackEvent::Pause);
    sink.playback_notify(PlaybackEvent::BecameInactive);
    Ok(())
}
