//! HTTP side-effect hooks (home-automation calls around playback).
//!
//! The SDK fires its notifications on a shared dispatch thread, so the
//! actual HTTP requests run on a dedicated runner thread fed by a bounded
//! channel. Failures are logged and dropped; a full channel drops the hook
//! event rather than blocking.

use std::time::Duration;

use anyhow::{Context, Result};
use connect_audio::hooks::PlaybackHooks;
use crossbeam_channel::{Sender, bounded};

const HOOK_TIMEOUT: Duration = Duration::from_secs(5);
const HOOK_QUEUE_DEPTH: usize = 8;

#[derive(Clone, Copy, Debug)]
enum HookKind {
    Before,
    After,
}

/// Hooks that fire HTTP GETs from a background runner thread.
pub struct HttpHooks {
    tx: Sender<HookKind>,
}

impl HttpHooks {
    /// Spawn the runner thread. Unset URLs turn the matching hook into a
    /// no-op.
    pub fn spawn(before_url: Option<String>, after_url: Option<String>) -> Self {
        let (tx, rx) = bounded(HOOK_QUEUE_DEPTH);
        std::thread::spawn(move || {
            for kind in rx {
                let url = match kind {
                    HookKind::Before => before_url.as_deref(),
                    HookKind::After => after_url.as_deref(),
                };
                let Some(url) = url else { continue };
                match call_hook(url) {
                    Ok(()) => tracing::info!(url, ?kind, "hook request ok"),
                    Err(err) => tracing::warn!(url, ?kind, "hook request failed: {err:#}"),
                }
            }
        });
        Self { tx }
    }

    fn send(&self, kind: HookKind) {
        if self.tx.try_send(kind).is_err() {
            tracing::warn!(?kind, "hook queue full; dropping hook event");
        }
    }
}

impl PlaybackHooks for HttpHooks {
    fn before_playing(&self) {
        self.send(HookKind::Before);
    }

    fn after_playing(&self) {
        self.send(HookKind::After);
    }
}

fn call_hook(url: &str) -> Result<()> {
    let resp = ureq::get(url)
        .config()
        .timeout_per_call(Some(HOOK_TIMEOUT))
        .build()
        .call()
        .with_context(|| format!("request {url}"))?;
    if !resp.status().is_success() {
        anyhow::bail!("hook returned {}", resp.status());
    }
    Ok(())
}
