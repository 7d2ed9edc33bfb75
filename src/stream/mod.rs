//! Streaming transcription: session trait, WebSocket client, and the
//! diagnostic decorator.
//!
//! One live connection per session. The caller owns the send side
//! (`push`/`flush`/`end_input`); a background reader task decodes inbound
//! frames and appends them to an event channel the caller drains:
//!
//! ```text
//! caller ──push/flush/end_input──▶ write half ──▶ service
//! caller ◀──next_event── channel ◀── reader task ◀── read half
//! ```

pub mod client;
pub mod diagnostic;
pub mod session;

pub use client::{ConnectionParams, SttClient, TranscriptionStream};
pub use diagnostic::DiagnosticSession;
pub use session::{ScriptedSession, SpeechSession, StreamState};
