//! ALSA implementations of the hardware seams.
//!
//! Linux-only; other targets get stubs that fail at startup so the core
//! crate stays portable for development.

#[cfg(target_os = "linux")]
mod linux {
    use anyhow::{Context, Result, anyhow};
    use connect_audio::config::{SAMPLE_BYTES, SinkConfig};
    use connect_audio::dispatch::MixerControl;
    use connect_audio::sink::{PcmBackend, PcmWriter};

    use alsa::pcm::{Access, Format, HwParams, PCM};
    use alsa::{Direction, ValueOr};

    /// Opens blocking playback PCMs with the fixed sink parameters.
    pub struct AlsaBackend;

    impl PcmBackend for AlsaBackend {
        fn open(&self, config: &SinkConfig) -> Result<Box<dyn PcmWriter>> {
            let pcm = PCM::new(&config.device, Direction::Playback, false)
                .with_context(|| format!("open pcm {}", config.device))?;
            {
                let hwp = HwParams::any(&pcm).context("pcm hw params")?;
                hwp.set_channels(config.channels as u32)?;
                hwp.set_rate(config.rate, ValueOr::Nearest)?;
                hwp.set_format(Format::S16LE)?;
                hwp.set_access(Access::RWInterleaved)?;
                hwp.set_period_size_near(config.period_frames as i64, ValueOr::Nearest)?;
                hwp.set_buffer_size_near((config.period_frames * config.max_periods()) as i64)?;
                pcm.hw_params(&hwp).context("apply pcm hw params")?;
            }
            Ok(Box::new(AlsaWriter {
                pcm,
                channels: config.channels,
            }))
        }
    }

    struct AlsaWriter {
        pcm: PCM,
        channels: usize,
    }

    impl PcmWriter for AlsaWriter {
        fn write_period(&mut self, data: &[u8]) -> Result<()> {
            let samples: Vec<i16> = data
                .chunks_exact(SAMPLE_BYTES)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect();

            let io = self.pcm.io_i16().context("pcm io")?;
            let mut written_frames = 0usize;
            let total_frames = samples.len() / self.channels;
            let mut just_recovered = false;
            while written_frames < total_frames {
                match io.writei(&samples[written_frames * self.channels..]) {
                    Ok(frames) => {
                        written_frames += frames;
                        just_recovered = false;
                    }
                    // Underruns surface as EPIPE; recover once so the rest
                    // of the period still plays.
                    Err(err) if !just_recovered => {
                        self.pcm
                            .try_recover(err, true)
                            .context("pcm recover after write error")?;
                        just_recovered = true;
                    }
                    Err(err) => return Err(err).context("pcm write"),
                }
            }
            Ok(())
        }
    }

    /// System mixer control addressed by simple-element name.
    ///
    /// The mixer handle is reopened per call; volume events are rare and
    /// this keeps the type trivially `Send` for the dispatcher.
    pub struct AlsaMixer {
        control: String,
    }

    impl AlsaMixer {
        /// Resolve the mixer control now so a misconfigured name fails at
        /// startup instead of on the first volume event.
        pub fn open(control: Option<String>) -> Result<Self> {
            let mixer = alsa::mixer::Mixer::new("default", false).context("open mixer")?;
            let control = match control {
                Some(name) => name,
                None => first_playback_control(&mixer)
                    .ok_or_else(|| anyhow!("no mixer control with a playback volume"))?,
            };
            find_selem(&mixer, &control)?;
            tracing::info!(control = %control, "mixer control selected");
            Ok(Self { control })
        }
    }

    impl MixerControl for AlsaMixer {
        fn set_volume(&mut self, percent: u8) -> Result<()> {
            let mixer = alsa::mixer::Mixer::new("default", false).context("open mixer")?;
            let selem = find_selem(&mixer, &self.control)?;
            let (min, max) = selem.get_playback_volume_range();
            let value = min + (max - min) * i64::from(percent.min(100)) / 100;
            selem
                .set_playback_volume_all(value)
                .with_context(|| format!("set {} volume", self.control))?;
            Ok(())
        }
    }

    fn find_selem<'a>(
        mixer: &'a alsa::mixer::Mixer,
        control: &str,
    ) -> Result<alsa::mixer::Selem<'a>> {
        mixer
            .find_selem(&alsa::mixer::SelemId::new(control, 0))
            .ok_or_else(|| anyhow!("mixer control not found: {control}"))
    }

    fn first_playback_control(mixer: &alsa::mixer::Mixer) -> Option<String> {
        mixer
            .iter()
            .filter_map(alsa::mixer::Selem::new)
            .find(|selem| selem.has_playback_volume())
            .and_then(|selem| selem.get_id().get_name().ok().map(str::to_string))
    }
}

#[cfg(target_os = "linux")]
pub use linux::{AlsaBackend, AlsaMixer};

#[cfg(not(target_os = "linux"))]
mod stub {
    use anyhow::{Result, bail};
    use connect_audio::config::SinkConfig;
    use connect_audio::dispatch::MixerControl;
    use connect_audio::sink::{PcmBackend, PcmWriter};

    pub struct AlsaBackend;

    impl PcmBackend for AlsaBackend {
        fn open(&self, _config: &SinkConfig) -> Result<Box<dyn PcmWriter>> {
            bail!("ALSA output is only available on Linux");
        }
    }

    pub struct AlsaMixer;

    impl AlsaMixer {
        pub fn open(_control: Option<String>) -> Result<Self> {
            bail!("ALSA mixer is only available on Linux");
        }
    }

    impl MixerControl for AlsaMixer {
        fn set_volume(&mut self, _percent: u8) -> Result<()> {
            bail!("ALSA mixer is only available on Linux");
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub use stub::{AlsaBackend, AlsaMixer};
