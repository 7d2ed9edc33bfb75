//! voicewire - Streaming speech-to-text protocol client
//!
//! Real-time transcription over a WebSocket connection, with a synchronous
//! REST fallback and a CLI harness that drives the full protocol end to end.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod harness;
pub mod protocol;
pub mod rest;
pub mod stream;

// Audio framing
pub use audio::framer::{AudioFormat, AudioFramer};
pub use audio::wav::PcmAudio;

// Protocol types
pub use protocol::events::{InboundEvent, SpeechSignal};
pub use protocol::messages::{AudioEnvelope, ControlMessage};

// Streaming sessions (real client, diagnostic decorator, scripted mock)
pub use stream::client::{ConnectionParams, SttClient, TranscriptionStream};
pub use stream::diagnostic::DiagnosticSession;
pub use stream::session::{ScriptedSession, SpeechSession, StreamState};

// REST fallback
pub use rest::{RestClient, TranscribeResponse};

// Harness
pub use harness::{StreamReport, run_streaming};

// Error handling
pub use error::{Result, VoicewireError};

// Config
pub use config::Config;
