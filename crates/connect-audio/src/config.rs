//! Output parameters and derived period sizes.

/// Bytes per sample (the SDK delivers signed 16-bit little-endian PCM).
pub const SAMPLE_BYTES: usize = 2;

/// Fixed output parameters for the device sink.
///
/// The SDK always delivers 44.1 kHz stereo; only the device identifier is
/// expected to vary between installs.
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// ALSA device identifier, e.g. `default` or `hw:0,0`.
    pub device: String,
    /// Interleaved channel count.
    pub channels: usize,
    /// Sample rate in Hz.
    pub rate: u32,
    /// Period length in frames (the atomic unit handed to the device).
    pub period_frames: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            channels: 2,
            rate: 44_100,
            // 0.25s per period
            period_frames: 44_100 / 4,
        }
    }
}

impl SinkConfig {
    /// Samples per period (frames times channels).
    pub fn period_samples(&self) -> usize {
        self.period_frames * self.channels
    }

    /// Bytes per period.
    pub fn period_bytes(&self) -> usize {
        self.period_samples() * SAMPLE_BYTES
    }

    /// Queue depth in periods, targeting 0.5s of buffered audio.
    pub fn max_periods(&self) -> usize {
        ((self.rate as usize / 2) / self.period_frames).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sizes_match_expected_layout() {
        let config = SinkConfig::default();
        assert_eq!(config.period_frames, 11_025);
        assert_eq!(config.period_samples(), 22_050);
        assert_eq!(config.period_bytes(), 44_100);
        assert_eq!(config.max_periods(), 2);
    }

    #[test]
    fn max_periods_never_zero() {
        let config = SinkConfig {
            period_frames: 1_000_000,
            ..SinkConfig::default()
        };
        assert_eq!(config.max_periods(), 1);
    }
}
