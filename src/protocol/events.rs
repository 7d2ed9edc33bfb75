//! Inbound frame decoding.
//!
//! The service sends JSON text frames tagged by a `"type"` field. Decoding
//! is closed over the known tags; anything else becomes [`InboundEvent::Unknown`]
//! so protocol extensions are observable instead of silently dropped. A frame
//! that fails to decode is a protocol error for that frame only, never for
//! the stream.

use crate::error::{Result, VoicewireError};
use serde::Deserialize;
use serde_json::Value;

/// Voice-activity signal reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechSignal {
    StartSpeech,
    EndSpeech,
    /// A signal type this client does not know about.
    Other(String),
}

impl SpeechSignal {
    fn from_wire(raw: &str) -> Self {
        match raw {
            "START_SPEECH" => SpeechSignal::StartSpeech,
            "END_SPEECH" => SpeechSignal::EndSpeech,
            other => SpeechSignal::Other(other.to_string()),
        }
    }
}

/// One decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A transcript segment. `is_final` defaults to true when the service
    /// omits it — segments arrive finalized after a flush or utterance end.
    Transcript { text: String, is_final: bool },
    /// A voice-activity signal.
    Signal(SpeechSignal),
    /// An error reported in-band by the service. The stream stays usable.
    ServiceError { code: String, message: String },
    /// A frame with an unrecognized `"type"` tag.
    Unknown { kind: String },
}

#[derive(Deserialize)]
struct DataPayload {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    is_final: Option<bool>,
}

#[derive(Deserialize)]
struct DataFrame {
    data: DataPayload,
}

#[derive(Deserialize)]
struct SignalPayload {
    signal_type: String,
}

#[derive(Deserialize)]
struct SignalFrame {
    data: SignalPayload,
}

#[derive(Deserialize)]
struct ErrorFrame {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl InboundEvent {
    /// Decode one inbound text frame.
    pub fn decode(raw: &str) -> Result<InboundEvent> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| VoicewireError::Protocol {
                message: format!("undecodable frame: {e}"),
            })?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| VoicewireError::Protocol {
                message: "frame has no type field".to_string(),
            })?
            .to_string();

        match kind.as_str() {
            "data" => {
                let frame: DataFrame =
                    serde_json::from_value(value).map_err(|e| VoicewireError::Protocol {
                        message: format!("malformed data frame: {e}"),
                    })?;
                Ok(InboundEvent::Transcript {
                    text: frame.data.transcript,
                    is_final: frame.data.is_final.unwrap_or(true),
                })
            }
            "events" => {
                let frame: SignalFrame =
                    serde_json::from_value(value).map_err(|e| VoicewireError::Protocol {
                        message: format!("malformed events frame: {e}"),
                    })?;
                Ok(InboundEvent::Signal(SpeechSignal::from_wire(
                    &frame.data.signal_type,
                )))
            }
            "error" => {
                let frame: ErrorFrame =
                    serde_json::from_value(value.clone()).unwrap_or(ErrorFrame {
                        code: None,
                        message: None,
                    });
                Ok(InboundEvent::ServiceError {
                    code: frame.code.unwrap_or_else(|| "unknown".to_string()),
                    message: frame.message.unwrap_or_else(|| value.to_string()),
                })
            }
            _ => Ok(InboundEvent::Unknown { kind }),
        }
    }

    /// The frame's tag, for logging.
    pub fn kind(&self) -> &str {
        match self {
            InboundEvent::Transcript { .. } => "data",
            InboundEvent::Signal(_) => "events",
            InboundEvent::ServiceError { .. } => "error",
            InboundEvent::Unknown { .. } => "unknown",
        }
    }
}
