use std::sync::Arc;
use std::time::Duration;

/// Fully decoded PCM data for exactly one track.
///
/// Samples are interleaved `f32`. The duration is derived from the frame
/// count and the sample rate; catalog metadata never feeds into it.
/// Buffers are cheap to clone and never mutated after construction.
#[derive(Debug, Clone)]
pub struct DecodedBuffer {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedBuffer {
    /// Wrap interleaved samples. Trailing samples that do not form a whole
    /// frame are dropped.
    pub fn new(mut samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            samples: samples.into(),
            channels,
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn samples(&self) -> &Arc<[f32]> {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Authoritative length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    /// Index of the first interleaved sample of the frame playing at `secs`.
    /// Out-of-range positions clamp to the buffer bounds.
    pub fn sample_index_at(&self, secs: f64) -> usize {
        let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        let frame = (secs * self.sample_rate as f64) as usize;
        frame.min(self.frames()) * self.channels as usize
    }

    /// Peak amplitude per bucket, used to draw a waveform when the catalog
    /// has none. Returns an empty vector for an empty buffer.
    pub fn peaks(&self, buckets: usize) -> Vec<f32> {
        let frames = self.frames();
        if buckets == 0 || frames == 0 {
            return Vec::new();
        }

        let ch = self.channels as usize;
        let per_bucket = frames.div_ceil(buckets).max(1);
        self.samples
            .chunks(per_bucket * ch)
            .map(|chunk| chunk.iter().fold(0.0f32, |acc, s| acc.max(s.abs())))
            .collect()
    }
}
