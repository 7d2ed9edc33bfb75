//! Wire protocol for the streaming speech-to-text service.
//!
//! Outbound and inbound frames are JSON text messages dispatched on a
//! `"type"` field. The exact shapes are load-bearing: the service silently
//! ignores frames it does not recognize.

pub mod events;
pub mod messages;

pub use events::{InboundEvent, SpeechSignal};
pub use messages::{AudioEnvelope, ControlMessage};
