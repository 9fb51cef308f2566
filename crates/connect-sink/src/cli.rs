use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "connect-sink", version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// ALSA output device
    #[arg(short = 'D', long, default_value = "default")]
    pub device: String,

    /// ALSA mixer control for volume changes (default: first control with a
    /// playback volume)
    #[arg(short = 'm', long)]
    pub mixer: Option<String>,

    /// Path to the JSON credentials file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// URL requested before playback starts
    #[arg(long)]
    pub before_url: Option<String>,

    /// URL requested after playback stops
    #[arg(long)]
    pub after_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wire the event sink and wait for SDK callbacks
    Run,

    /// Push a raw 44.1 kHz stereo S16LE file through the whole pipeline
    /// (diagnostics; exercises the same paths the SDK drives)
    Feed {
        /// Path to raw PCM data
        path: PathBuf,
    },
}
