//! Default configuration constants for voicewire.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and what the streaming
/// endpoint expects unless told otherwise via the `sample_rate` parameter.
pub const SAMPLE_RATE: u32 = 16000;

/// Bytes per sample for 16-bit PCM.
pub const SAMPLE_WIDTH_BYTES: u16 = 2;

/// Default channel count (mono).
pub const CHANNELS: u16 = 1;

/// Default audio chunk duration in milliseconds.
///
/// 50ms chunks at 16kHz are 800 samples (1600 bytes) — small enough to keep
/// latency low, large enough to avoid flooding the socket with tiny frames.
pub const CHUNK_DURATION_MS: u32 = 50;

/// Streaming speech-to-text WebSocket endpoint.
pub const STT_WS_URL: &str = "wss://api.sarvam.ai/speech-to-text/ws";

/// Synchronous (non-streaming) speech-to-text REST endpoint.
pub const STT_REST_URL: &str = "https://api.sarvam.ai/speech-to-text";

/// HTTP header carrying the provider API key.
pub const API_KEY_HEADER: &str = "api-subscription-key";

/// Environment variable checked for the provider API key.
pub const API_KEY_ENV: &str = "SARVAM_API_KEY";

/// Default transcription model identifier.
pub const DEFAULT_MODEL: &str = "saarika:v2.5";

/// Default language code for transcription.
pub const DEFAULT_LANGUAGE: &str = "en-IN";

/// Encoding label attached to every outbound audio payload.
pub const AUDIO_ENCODING: &str = "audio/wav";

/// Bound on the WebSocket handshake, in seconds.
///
/// A connection that has not completed its handshake within this window is
/// reported as a connection failure rather than hanging indefinitely.
pub const HANDSHAKE_TIMEOUT_SECS: u64 = 30;

/// Grace period after a flush before sending end-of-stream, in milliseconds.
///
/// The service needs a moment to deliver the finalized transcript the flush
/// requested; ending the stream too early can lose it.
pub const FLUSH_GRACE_MS: u64 = 2000;

/// Grace period after end-of-stream before closing, in milliseconds.
pub const CLOSE_GRACE_MS: u64 = 5000;

/// Capacity of the decoded-event channel between the reader task and the caller.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Default cap on how much of an audio file the harness streams, in seconds.
pub const MAX_STREAM_SECS: u32 = 10;

/// Frequency of the generated test tone in Hz (A4).
pub const TONE_FREQUENCY_HZ: f32 = 440.0;

/// Duration of the generated test tone in seconds.
pub const TONE_DURATION_SECS: f32 = 3.0;
