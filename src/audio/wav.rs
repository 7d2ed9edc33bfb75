//! WAV file loading and test-tone synthesis for the streaming harness.

use crate::audio::framer::AudioFormat;
use crate::error::{Result, VoicewireError};
use std::f32::consts::PI;
use std::io::Cursor;
use std::path::Path;

/// PCM audio held as 16-bit little-endian mono bytes.
#[derive(Debug, Clone)]
pub struct PcmAudio {
    pub format: AudioFormat,
    pub data: Vec<u8>,
}

impl PcmAudio {
    /// Duration of the buffer in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.data.len() as u64 * 1000) / self.format.bytes_per_second() as u64
    }
}

/// Read a WAV file into mono PCM bytes at the file's native sample rate.
///
/// Stereo input is folded to mono by averaging channel pairs. When
/// `max_secs` is given, only that much audio is kept — streaming a long
/// file through a live connection is pointless for a protocol check.
pub fn read_wav(path: &Path, max_secs: Option<u32>) -> Result<PcmAudio> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(VoicewireError::AudioFormat {
            message: format!(
                "expected 16-bit integer PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
        });
    }

    let raw_samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    // Fold stereo to mono
    let mono_samples: Vec<i16> = if spec.channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|pair| {
                let left = pair[0] as i32;
                let right = pair[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect()
    } else if spec.channels == 1 {
        raw_samples
    } else {
        return Err(VoicewireError::AudioFormat {
            message: format!("unsupported channel count: {}", spec.channels),
        });
    };

    let capped = match max_secs {
        Some(secs) => {
            let max_samples = spec.sample_rate as usize * secs as usize;
            if mono_samples.len() > max_samples {
                mono_samples[..max_samples].to_vec()
            } else {
                mono_samples
            }
        }
        None => mono_samples,
    };

    Ok(PcmAudio {
        format: AudioFormat {
            sample_rate: spec.sample_rate,
            sample_width: 2,
            channels: 1,
        },
        data: samples_to_bytes(&capped),
    })
}

/// Generate a sine tone as mono 16-bit PCM.
///
/// Useful as a synthetic harness source when no speech sample is at hand;
/// a recognizer may legitimately return an empty transcript for it.
pub fn sine_tone(frequency_hz: f32, duration_secs: f32, sample_rate: u32) -> PcmAudio {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    let amplitude = 16000.0;

    let samples: Vec<i16> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (amplitude * (2.0 * PI * frequency_hz * t).sin()) as i16
        })
        .collect();

    PcmAudio {
        format: AudioFormat {
            sample_rate,
            sample_width: 2,
            channels: 1,
        },
        data: samples_to_bytes(&samples),
    }
}

/// Wrap PCM bytes in a WAV container, in memory.
///
/// The REST endpoint takes whole WAV files rather than raw PCM.
pub fn pcm_to_wav_bytes(pcm: &PcmAudio) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: pcm.format.channels,
        sample_rate: pcm.format.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for pair in pcm.data.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for sample in samples {
            writer.write_sample(*sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 16000, 1, &[100, -100, 200, -200]);

        let pcm = read_wav(&path, None).unwrap();
        assert_eq!(pcm.format.sample_rate, 16000);
        assert_eq!(pcm.format.channels, 1);
        assert_eq!(pcm.data.len(), 8);
        assert_eq!(i16::from_le_bytes([pcm.data[0], pcm.data[1]]), 100);
    }

    #[test]
    fn test_read_stereo_wav_folds_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // Two frames: (100, 300) -> 200, (-100, -300) -> -200
        write_wav(&path, 16000, 2, &[100, 300, -100, -300]);

        let pcm = read_wav(&path, None).unwrap();
        assert_eq!(pcm.data.len(), 4);
        assert_eq!(i16::from_le_bytes([pcm.data[0], pcm.data[1]]), 200);
        assert_eq!(i16::from_le_bytes([pcm.data[2], pcm.data[3]]), -200);
    }

    #[test]
    fn test_read_wav_respects_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.wav");
        // 3 seconds at 100Hz sample rate
        let samples = vec![1i16; 300];
        write_wav(&path, 100, 1, &samples);

        let pcm = read_wav(&path, Some(1)).unwrap();
        // Capped to 1 second = 100 samples = 200 bytes
        assert_eq!(pcm.data.len(), 200);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let result = read_wav(Path::new("/nonexistent/audio.wav"), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"definitely not a wav file").unwrap();

        assert!(read_wav(&path, None).is_err());
    }

    #[test]
    fn test_sine_tone_length_and_format() {
        let pcm = sine_tone(440.0, 3.0, 16000);
        assert_eq!(pcm.format.sample_rate, 16000);
        // 3s * 16000 samples * 2 bytes
        assert_eq!(pcm.data.len(), 96000);
        assert_eq!(pcm.duration_ms(), 3000);
    }

    #[test]
    fn test_sine_tone_starts_at_zero_crossing() {
        let pcm = sine_tone(440.0, 0.1, 16000);
        assert_eq!(i16::from_le_bytes([pcm.data[0], pcm.data[1]]), 0);
    }

    #[test]
    fn test_sine_tone_is_not_silent() {
        let pcm = sine_tone(440.0, 0.1, 16000);
        let loud = pcm
            .data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .any(|sample| sample.unsigned_abs() > 8000);
        assert!(loud);
    }

    #[test]
    fn test_pcm_to_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.wav");

        let original = sine_tone(440.0, 0.05, 16000);
        let wav_bytes = pcm_to_wav_bytes(&original).unwrap();
        std::fs::write(&path, &wav_bytes).unwrap();

        let reloaded = read_wav(&path, None).unwrap();
        assert_eq!(reloaded.format, original.format);
        assert_eq!(reloaded.data, original.data);
    }
}
