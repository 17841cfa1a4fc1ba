/*!
 * In-memory PCM audio buffer.
 *
 * Samples are interleaved signed 16-bit little-endian values, the same
 * layout the codec backend produces with `-f s16le`. Every operation
 * returns a new buffer; nothing is edited in place.
 */

use crate::errors::AudioError;

// @const: Gain at the silent end of a fade, in decibels
const FADE_FLOOR_DB: f64 = -120.0;

/// Interleaved 16-bit PCM audio with its format
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Create a buffer, validating the format and sample alignment
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidBuffer("sample rate must be positive".to_string()));
        }
        if channels == 0 {
            return Err(AudioError::InvalidBuffer("channel count must be positive".to_string()));
        }
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::InvalidBuffer(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self { samples, sample_rate, channels })
    }

    /// An empty buffer with the given format
    pub fn empty(sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        Self::new(Vec::new(), sample_rate, channels)
    }

    /// A silent buffer lasting `duration_ms`
    pub fn silent(sample_rate: u32, channels: u16, duration_ms: u64) -> Result<Self, AudioError> {
        let frames = (duration_ms * sample_rate as u64 / 1000) as usize;
        Self::new(vec![0; frames * channels as usize], sample_rate, channels)
    }

    /// Decode raw `s16le` bytes
    pub fn from_le_bytes(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<Self, AudioError> {
        if bytes.len() % 2 != 0 {
            return Err(AudioError::InvalidBuffer(format!(
                "odd byte count {} for 16-bit samples",
                bytes.len()
            )));
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(samples, sample_rate, channels)
    }

    /// Raw `s16le` bytes for the encoder pipe
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in milliseconds, truncated
    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Frame index for a millisecond offset, clamped to the buffer end
    fn frame_at_ms(&self, ms: u64) -> usize {
        let frame = ms.saturating_mul(self.sample_rate as u64) / 1000;
        (frame as usize).min(self.frames())
    }

    /// Copy of the range `[start_ms, end_ms)`; bounds past the end are clamped
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioBuffer {
        let start = self.frame_at_ms(start_ms);
        let end = self.frame_at_ms(end_ms).max(start);
        let ch = self.channels as usize;
        AudioBuffer {
            samples: self.samples[start * ch..end * ch].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Ramp the first `duration_ms` up from silence
    pub fn fade_in(&self, duration_ms: u64) -> AudioBuffer {
        let ramp = self.frame_at_ms(duration_ms);
        self.apply_ramp(0, ramp, false)
    }

    /// Ramp the last `duration_ms` down to silence
    pub fn fade_out(&self, duration_ms: u64) -> AudioBuffer {
        let ramp = self.frame_at_ms(duration_ms);
        self.apply_ramp(self.frames() - ramp, ramp, true)
    }

    fn apply_ramp(&self, first_frame: usize, ramp_frames: usize, descending: bool) -> AudioBuffer {
        let mut samples = self.samples.clone();
        let ch = self.channels as usize;
        for i in 0..ramp_frames {
            let step = if descending { ramp_frames - 1 - i } else { i };
            let gain_db = FADE_FLOOR_DB - FADE_FLOOR_DB * step as f64 / ramp_frames as f64;
            let gain = 10f64.powf(gain_db / 20.0);
            let frame = first_frame + i;
            for sample in &mut samples[frame * ch..(frame + 1) * ch] {
                *sample = clamp_sample(*sample as f64 * gain);
            }
        }
        AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Play the audio `factor` times faster without pitch correction.
    ///
    /// The input is read as if recorded at `sample_rate * factor` and then
    /// resampled back to `sample_rate` with linear interpolation, so the
    /// result lasts `1/factor` as long and sounds higher.
    pub fn change_speed(&self, factor: f64) -> AudioBuffer {
        let frames = self.frames();
        let ch = self.channels as usize;
        if frames == 0 || factor <= 0.0 || !factor.is_finite() {
            return self.clone();
        }

        let out_frames = (frames as f64 / factor).floor() as usize;
        let mut samples = Vec::with_capacity(out_frames * ch);
        for i in 0..out_frames {
            let pos = i as f64 * factor;
            let idx = (pos.floor() as usize).min(frames - 1);
            let next = (idx + 1).min(frames - 1);
            let frac = pos - idx as f64;
            for c in 0..ch {
                let a = self.samples[idx * ch + c] as f64;
                let b = self.samples[next * ch + c] as f64;
                samples.push(clamp_sample(a + (b - a) * frac));
            }
        }

        AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// Join chunks in order; every chunk must share the given format
    pub fn concat<I>(sample_rate: u32, channels: u16, chunks: I) -> Result<AudioBuffer, AudioError>
    where
        I: IntoIterator<Item = AudioBuffer>,
    {
        let mut samples = Vec::new();
        for chunk in chunks {
            if chunk.sample_rate != sample_rate || chunk.channels != channels {
                return Err(AudioError::FormatMismatch {
                    expected_rate: sample_rate,
                    expected_channels: channels,
                    actual_rate: chunk.sample_rate,
                    actual_channels: chunk.channels,
                });
            }
            samples.extend_from_slice(&chunk.samples);
        }
        AudioBuffer::new(samples, sample_rate, channels)
    }
}

fn clamp_sample(value: f64) -> i16 {
    value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}
