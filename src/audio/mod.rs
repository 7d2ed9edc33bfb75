//! Audio handling: PCM framing, WAV file loading, and test-tone synthesis.

pub mod framer;
pub mod wav;

pub use framer::{AudioFormat, AudioFramer};
pub use wav::{PcmAudio, read_wav, sine_tone};
