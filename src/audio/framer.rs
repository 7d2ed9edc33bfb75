//! Fixed-duration framing of raw PCM audio.
//!
//! Slices a PCM byte buffer into chunks sized for real-time streaming.
//! Framing is side-effect free: the framer borrows the buffer and the
//! chunk sequence can be iterated any number of times.

use crate::defaults;
use crate::error::{Result, VoicewireError};
use std::time::Duration;

/// PCM stream parameters used for byte-rate arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Samples per second.
    pub sample_rate: u32,
    /// Bytes per sample (2 for 16-bit PCM).
    pub sample_width: u16,
    /// Interleaved channel count.
    pub channels: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            sample_width: defaults::SAMPLE_WIDTH_BYTES,
            channels: defaults::CHANNELS,
        }
    }
}

impl AudioFormat {
    /// Bytes covering one second of audio in this format.
    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate as usize * self.sample_width as usize * self.channels as usize
    }

    /// Bytes covering `duration_ms` of audio in this format.
    pub fn bytes_for_ms(&self, duration_ms: u32) -> usize {
        // Samples first, then scale by frame width, so 50ms at 16kHz is
        // exactly 800 samples rather than a rounded byte count.
        let samples = (self.sample_rate as u64 * duration_ms as u64) / 1000;
        samples as usize * self.sample_width as usize * self.channels as usize
    }
}

/// Splits a PCM buffer into fixed-duration chunks.
///
/// Every chunk spans `chunk_duration_ms` except the last, which is truncated
/// when the buffer is not an exact multiple. An empty buffer produces an
/// empty sequence; no chunk is ever empty.
#[derive(Debug)]
pub struct AudioFramer<'a> {
    data: &'a [u8],
    chunk_bytes: usize,
    chunk_duration: Duration,
}

impl<'a> AudioFramer<'a> {
    pub fn new(data: &'a [u8], format: AudioFormat, chunk_duration_ms: u32) -> Result<Self> {
        let chunk_bytes = format.bytes_for_ms(chunk_duration_ms);
        if chunk_bytes == 0 {
            return Err(VoicewireError::AudioFormat {
                message: format!(
                    "chunk of {}ms at {}Hz is empty",
                    chunk_duration_ms, format.sample_rate
                ),
            });
        }

        Ok(Self {
            data,
            chunk_bytes,
            chunk_duration: Duration::from_millis(chunk_duration_ms as u64),
        })
    }

    /// Iterate the chunk sequence. Restartable: each call starts over.
    pub fn frames(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.data.chunks(self.chunk_bytes)
    }

    /// Number of chunks `frames()` will yield.
    pub fn frame_count(&self) -> usize {
        self.data.len().div_ceil(self.chunk_bytes)
    }

    /// Size of a full (non-final) chunk in bytes.
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    /// Nominal duration of one chunk — the real-time pacing interval.
    pub fn chunk_duration(&self) -> Duration {
        self.chunk_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_16k_mono() -> AudioFormat {
        AudioFormat {
            sample_rate: 16000,
            sample_width: 2,
            channels: 1,
        }
    }

    #[test]
    fn test_bytes_for_ms() {
        let format = format_16k_mono();
        // 50ms at 16kHz mono 16-bit = 800 samples = 1600 bytes
        assert_eq!(format.bytes_for_ms(50), 1600);
        assert_eq!(format.bytes_per_second(), 32000);
    }

    #[test]
    fn test_bytes_for_ms_stereo() {
        let format = AudioFormat {
            sample_rate: 16000,
            sample_width: 2,
            channels: 2,
        };
        assert_eq!(format.bytes_for_ms(50), 3200);
    }

    #[test]
    fn test_frame_count_is_ceiling() {
        let data = vec![0u8; 1600 * 3 + 100];
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();
        assert_eq!(framer.frame_count(), 4);
        assert_eq!(framer.frames().count(), 4);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_chunk() {
        let data = vec![0u8; 1600 * 3];
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();
        assert_eq!(framer.frames().count(), 3);
        assert!(framer.frames().all(|chunk| chunk.len() == 1600));
    }

    #[test]
    fn test_final_chunk_is_truncated() {
        let data = vec![0u8; 1600 + 100];
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();
        let chunks: Vec<&[u8]> = framer.frames().collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 1600);
        assert_eq!(chunks[1].len(), 100);
    }

    #[test]
    fn test_concatenation_reconstructs_buffer() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();

        let rebuilt: Vec<u8> = framer.frames().flatten().copied().collect();
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn test_empty_buffer_yields_no_chunks() {
        let data: Vec<u8> = Vec::new();
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();
        assert_eq!(framer.frame_count(), 0);
        assert_eq!(framer.frames().count(), 0);
    }

    #[test]
    fn test_no_chunk_is_empty() {
        let data = vec![0u8; 4321];
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();
        assert!(framer.frames().all(|chunk| !chunk.is_empty()));
    }

    #[test]
    fn test_frames_is_restartable() {
        let data = vec![0u8; 3200];
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();
        let first: Vec<&[u8]> = framer.frames().collect();
        let second: Vec<&[u8]> = framer.frames().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_duration_chunk_is_rejected() {
        let data = vec![0u8; 100];
        let result = AudioFramer::new(&data, format_16k_mono(), 0);
        assert!(matches!(result, Err(VoicewireError::AudioFormat { .. })));
    }

    #[test]
    fn test_chunk_duration() {
        let data = vec![0u8; 1600];
        let framer = AudioFramer::new(&data, format_16k_mono(), 50).unwrap();
        assert_eq!(framer.chunk_duration(), Duration::from_millis(50));
        assert_eq!(framer.chunk_bytes(), 1600);
    }
}
