//! The speech session abstraction shared by the real client and its
//! diagnostic decorator, plus a scripted implementation for tests.

use crate::error::{Result, VoicewireError};
use crate::protocol::events::InboundEvent;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;

/// Lifecycle of one streaming connection.
///
/// Audio may be sent only in `Open`. `Closed` and `Failed` are terminal.
/// Flushing is not a separate state: a flush request leaves the stream
/// `Open` and only affects what the service delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Open,
    Closing,
    Closed,
    Failed,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamState::Connecting => "connecting",
            StreamState::Open => "open",
            StreamState::Closing => "closing",
            StreamState::Closed => "closed",
            StreamState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// One live transcription session.
///
/// This trait is the full public surface: the diagnostic decorator wraps it
/// without reaching into any implementation internals, and callers cannot
/// tell a wrapped session from a bare one.
#[async_trait]
pub trait SpeechSession: Send {
    /// Send one PCM chunk. Valid only while the stream is `Open`.
    ///
    /// Backpressure is applied by awaiting the transport send; there is no
    /// unbounded internal queue.
    async fn push(&mut self, pcm: &[u8]) -> Result<()>;

    /// Ask the service to emit any pending transcript now.
    ///
    /// Without a flush, a finalized segment for audio ending in silence may
    /// never be delivered. Does not change the stream state.
    async fn flush(&mut self) -> Result<()>;

    /// Signal that no more audio will follow and move to `Closing`.
    async fn end_input(&mut self) -> Result<()>;

    /// Await the next decoded event. `None` means end-of-stream: either a
    /// normal close or a transport failure (check `state()` to tell apart).
    async fn next_event(&mut self) -> Option<InboundEvent>;

    /// Take an already-delivered event without waiting.
    fn try_next_event(&mut self) -> Option<InboundEvent>;

    /// Current stream state.
    fn state(&self) -> StreamState;

    /// Release the connection. Idempotent; safe on every exit path.
    async fn close(&mut self) -> Result<()>;
}

/// Scripted in-memory session for testing consumers of [`SpeechSession`].
///
/// Replays a fixed event sequence and records what was pushed. The state
/// machine matches the real client's rules so invalid-use tests behave
/// identically against either implementation.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    events: VecDeque<InboundEvent>,
    state_override: Option<StreamState>,
    state: State,
    pub pushed: Vec<Vec<u8>>,
    pub flushes: usize,
    pub closes: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum State {
    #[default]
    Open,
    Closing,
    Closed,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue events to be replayed in order.
    pub fn with_events(mut self, events: impl IntoIterator<Item = InboundEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Pin the reported state, e.g. to exercise `Failed` handling.
    pub fn with_state(mut self, state: StreamState) -> Self {
        self.state_override = Some(state);
        self
    }

    fn effective_state(&self) -> StreamState {
        if let Some(state) = self.state_override {
            return state;
        }
        match self.state {
            State::Open => StreamState::Open,
            State::Closing => StreamState::Closing,
            State::Closed => StreamState::Closed,
        }
    }
}

#[async_trait]
impl SpeechSession for ScriptedSession {
    async fn push(&mut self, pcm: &[u8]) -> Result<()> {
        match self.effective_state() {
            StreamState::Open => {
                self.pushed.push(pcm.to_vec());
                Ok(())
            }
            state => Err(VoicewireError::InvalidState {
                operation: "push",
                state,
            }),
        }
    }

    async fn flush(&mut self) -> Result<()> {
        match self.effective_state() {
            StreamState::Open => {
                self.flushes += 1;
                Ok(())
            }
            state => Err(VoicewireError::InvalidState {
                operation: "flush",
                state,
            }),
        }
    }

    async fn end_input(&mut self) -> Result<()> {
        match self.effective_state() {
            StreamState::Open => {
                self.state = State::Closing;
                Ok(())
            }
            state => Err(VoicewireError::InvalidState {
                operation: "end_input",
                state,
            }),
        }
    }

    async fn next_event(&mut self) -> Option<InboundEvent> {
        self.events.pop_front()
    }

    fn try_next_event(&mut self) -> Option<InboundEvent> {
        self.events.pop_front()
    }

    fn state(&self) -> StreamState {
        self.effective_state()
    }

    async fn close(&mut self) -> Result<()> {
        self.closes += 1;
        self.state = State::Closed;
        Ok(())
    }
}
