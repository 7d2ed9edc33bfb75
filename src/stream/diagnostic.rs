//! Diagnostic decorator that logs everything a session does.
//!
//! Wraps any [`SpeechSession`] and records each inbound event and lifecycle
//! call through `tracing`, without touching behavior: return values pass
//! through untouched, errors are logged then re-raised, and end-of-stream
//! is forwarded as-is. A caller cannot distinguish a wrapped session from a
//! bare one except by the log output.

use crate::error::Result;
use crate::protocol::events::InboundEvent;
use crate::stream::session::{SpeechSession, StreamState};
use async_trait::async_trait;
use tracing::{debug, info, warn};

pub struct DiagnosticSession<S> {
    inner: S,
    events_seen: usize,
}

impl<S: SpeechSession> DiagnosticSession<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            events_seen: 0,
        }
    }

    /// Unwrap, returning the inner session.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn observe(&mut self, event: &InboundEvent) {
        self.events_seen += 1;
        match event {
            InboundEvent::Transcript { text, is_final } => {
                info!(seq = self.events_seen, %text, is_final, "transcript event");
            }
            InboundEvent::Signal(signal) => {
                info!(seq = self.events_seen, ?signal, "vad event");
            }
            InboundEvent::ServiceError { code, message } => {
                warn!(seq = self.events_seen, %code, %message, "service error event");
            }
            InboundEvent::Unknown { kind } => {
                warn!(seq = self.events_seen, %kind, "event of unknown type");
            }
        }
    }
}

#[async_trait]
impl<S: SpeechSession> SpeechSession for DiagnosticSession<S> {
    async fn push(&mut self, pcm: &[u8]) -> Result<()> {
        debug!(bytes = pcm.len(), "push");
        self.inner.push(pcm).await.inspect_err(|e| {
            warn!(error = %e, "push failed");
        })
    }

    async fn flush(&mut self) -> Result<()> {
        info!("flush requested");
        self.inner.flush().await.inspect_err(|e| {
            warn!(error = %e, "flush failed");
        })
    }

    async fn end_input(&mut self) -> Result<()> {
        info!("end of input");
        self.inner.end_input().await.inspect_err(|e| {
            warn!(error = %e, "end_input failed");
        })
    }

    async fn next_event(&mut self) -> Option<InboundEvent> {
        match self.inner.next_event().await {
            Some(event) => {
                self.observe(&event);
                Some(event)
            }
            None => {
                info!(
                    events_seen = self.events_seen,
                    state = %self.inner.state(),
                    "event stream ended"
                );
                None
            }
        }
    }

    fn try_next_event(&mut self) -> Option<InboundEvent> {
        let event = self.inner.try_next_event()?;
        self.observe(&event);
        Some(event)
    }

    fn state(&self) -> StreamState {
        self.inner.state()
    }

    async fn close(&mut self) -> Result<()> {
        info!(state = %self.inner.state(), "closing session");
        self.inner.close().await.inspect_err(|e| {
            warn!(error = %e, "close failed");
        })
    }
}
