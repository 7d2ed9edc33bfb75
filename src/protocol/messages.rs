//! Outbound JSON messages: audio envelopes and control signals.

use crate::defaults;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Audio payload carried by audio envelopes and the end-of-stream message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioPayload {
    /// Base64-encoded PCM bytes; empty for end-of-stream.
    pub data: String,
    pub encoding: String,
    pub sample_rate: u32,
}

impl AudioPayload {
    fn new(data: String, sample_rate: u32) -> Self {
        Self {
            data,
            encoding: defaults::AUDIO_ENCODING.to_string(),
            sample_rate,
        }
    }
}

/// One chunk of audio wrapped for transport.
///
/// Serializes as `{"audio":{"data":...,"encoding":"audio/wav","sample_rate":...}}`.
/// Note there is no `"type"` field — audio frames are the unmarked default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEnvelope {
    pub audio: AudioPayload,
}

impl AudioEnvelope {
    /// Base64-encode a PCM chunk into an envelope.
    pub fn from_pcm(pcm: &[u8], sample_rate: u32) -> Self {
        Self {
            audio: AudioPayload::new(STANDARD.encode(pcm), sample_rate),
        }
    }

    /// Serialize to the wire JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Control messages sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Ask the service to emit any pending transcript immediately.
    Flush,
    /// No more audio will follow. Carries an empty audio payload.
    EndOfStream { audio: AudioPayload },
}

impl ControlMessage {
    /// Build the end-of-stream message for a connection's sample rate.
    pub fn end_of_stream(sample_rate: u32) -> Self {
        ControlMessage::EndOfStream {
            audio: AudioPayload::new(String::new(), sample_rate),
        }
    }

    /// Serialize to the wire JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_json_format() {
        let json = ControlMessage::Flush.to_json().unwrap();
        assert_eq!(json, r#"{"type":"flush"}"#);
    }

    #[test]
    fn test_end_of_stream_json_format() {
        let json = ControlMessage::end_of_stream(16000).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"end_of_stream","audio":{"data":"","encoding":"audio/wav","sample_rate":16000}}"#
        );
    }

    #[test]
    fn test_audio_envelope_json_format() {
        // "hello" base64-encodes to "aGVsbG8="
        let envelope = AudioEnvelope::from_pcm(b"hello", 16000);
        let json = envelope.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"audio":{"data":"aGVsbG8=","encoding":"audio/wav","sample_rate":16000}}"#
        );
    }

    #[test]
    fn test_audio_envelope_has_no_type_field() {
        let envelope = AudioEnvelope::from_pcm(&[0u8; 4], 16000);
        let json = envelope.to_json().unwrap();
        assert!(!json.contains("\"type\""));
    }

    #[test]
    fn test_audio_envelope_encodes_raw_bytes() {
        let pcm = [0x01u8, 0x02, 0x03, 0xFF];
        let envelope = AudioEnvelope::from_pcm(&pcm, 8000);

        let decoded = STANDARD.decode(&envelope.audio.data).unwrap();
        assert_eq!(decoded, pcm);
        assert_eq!(envelope.audio.sample_rate, 8000);
    }

    #[test]
    fn test_control_message_roundtrip() {
        let eos = ControlMessage::end_of_stream(22050);
        let json = eos.to_json().unwrap();
        let parsed: ControlMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, eos);
    }

    #[test]
    fn test_empty_chunk_still_forms_envelope() {
        let envelope = AudioEnvelope::from_pcm(&[], 16000);
        assert_eq!(envelope.audio.data, "");
    }
}
