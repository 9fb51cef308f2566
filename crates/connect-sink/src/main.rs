//! connect-sink — glue between a Spotify Connect SDK and an ALSA output.
//!
//! Wires the event dispatcher, bounded period queue, and playback thread
//! from `connect-audio` to the real ALSA backends, HTTP hooks, and the JSON
//! credentials store.
//!
//! ## Modes
//! - `run`: build the event sink and wait for the (externally linked) SDK
//!   adapter to drive it.
//! - `feed <path>`: push a raw PCM file through the event sink; exercises
//!   the full pipeline without the SDK.

mod alsa_out;
mod cli;
mod feed;
mod http_hooks;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use connect_audio::config::SinkConfig;
use connect_audio::credentials::CredentialsStore;
use connect_audio::dispatch::EventDispatcher;
use connect_audio::playback;
use connect_audio::queue::PeriodQueue;
use connect_audio::session::PlaybackSession;
use connect_audio::sink::DeviceSink;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,connect_sink=info")),
        )
        .init();

    let config = SinkConfig {
        device: args.device.clone(),
        ..SinkConfig::default()
    };
    tracing::info!(
        device = %config.device,
        rate_hz = config.rate,
        channels = config.channels,
        period_frames = config.period_frames,
        queue_periods = config.max_periods(),
        "sink configuration"
    );

    let session = Arc::new(PlaybackSession::new());
    let sink = Arc::new(DeviceSink::new(
        session.clone(),
        Box::new(alsa_out::AlsaBackend),
        config.clone(),
    ));
    let queue = Arc::new(PeriodQueue::new(config.max_periods()));

    let mixer = alsa_out::AlsaMixer::open(args.mixer.clone()).context("select mixer control")?;
    let hooks = http_hooks::HttpHooks::spawn(args.before_url.clone(), args.after_url.clone());
    let credentials = CredentialsStore::open(&args.credentials);

    let dispatcher = EventDispatcher::new(
        session,
        sink.clone(),
        queue.clone(),
        Box::new(hooks),
        credentials,
        Box::new(mixer),
    );

    let _playback = playback::spawn_playback_thread(queue.clone(), sink);

    {
        let queue = queue.clone();
        let _ = ctrlc::set_handler(move || {
            queue.close();
            std::process::exit(130);
        });
    }

    match &args.cmd {
        cli::Command::Run => {
            tracing::info!("event sink ready; waiting for SDK callbacks");
            // The SDK adapter owns its own dispatch threads and drives
            // `dispatcher` through the EventSink trait; nothing to do here.
            let _dispatcher = dispatcher;
            loop {
                std::thread::park();
            }
        }
        cli::Command::Feed { path } => {
            feed::run(&dispatcher, &config, path)?;
            queue.close();
            Ok(())
        }
    }
}
