//! Error types for voicewire.

use crate::stream::session::StreamState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoicewireError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("API key is not set (set api.key in the config file or export SARVAM_API_KEY)")]
    MissingApiKey,

    // Connection errors — fatal to the current connection, retryable by the caller
    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Connection handshake timed out after {seconds}s")]
    HandshakeTimeout { seconds: u64 },

    // Streaming errors
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("{operation} is not valid while the stream is {state}")]
    InvalidState {
        operation: &'static str,
        state: StreamState,
    },

    #[error("Transport error: {message}")]
    Transport { message: String },

    // Audio errors
    #[error("Audio format error: {message}")]
    AudioFormat { message: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // REST transcription errors
    #[error("Transcription request failed with status {status}: {body}")]
    RestStatus { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoicewireError>;
