//! End-to-end streaming scenario driver.
//!
//! Frames an audio buffer, paces it over a session at real-time cadence,
//! flushes, waits out the grace periods, ends the stream, and reports what
//! came back. This is the reference scenario for checking a provider
//! connection — and, driven by a scripted session, for testing the client
//! surface without a network.

use crate::audio::framer::AudioFramer;
use crate::audio::wav::PcmAudio;
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::protocol::events::{InboundEvent, SpeechSignal};
use crate::stream::session::SpeechSession;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// What a streaming run observed.
#[derive(Debug, Default)]
pub struct StreamReport {
    pub chunks_sent: usize,
    pub events_total: usize,
    pub transcripts: Vec<String>,
    pub signals: Vec<SpeechSignal>,
    pub service_errors: usize,
    pub unknown_events: usize,
}

impl StreamReport {
    /// All transcript segments joined into one string.
    pub fn transcript(&self) -> String {
        self.transcripts.join(" ")
    }

    /// True when at least one non-empty transcript segment arrived.
    pub fn has_transcript(&self) -> bool {
        self.transcripts.iter().any(|t| !t.trim().is_empty())
    }

    fn record(&mut self, event: InboundEvent) {
        self.events_total += 1;
        match event {
            InboundEvent::Transcript { text, .. } => {
                if !text.is_empty() {
                    self.transcripts.push(text);
                }
            }
            InboundEvent::Signal(signal) => self.signals.push(signal),
            InboundEvent::ServiceError { .. } => self.service_errors += 1,
            InboundEvent::Unknown { .. } => self.unknown_events += 1,
        }
    }
}

/// Drive the full scenario over an open session.
///
/// The session is left closed on return, including on error paths where the
/// stream itself is still answerable.
pub async fn run_streaming<S: SpeechSession>(
    session: &mut S,
    audio: &PcmAudio,
    chunk_duration_ms: u32,
    timings: &HarnessConfig,
) -> Result<StreamReport> {
    let framer = AudioFramer::new(&audio.data, audio.format, chunk_duration_ms)?;
    let pace = framer.chunk_duration();
    let mut report = StreamReport::default();

    info!(
        chunks = framer.frame_count(),
        duration_ms = audio.duration_ms(),
        "sending audio at real-time cadence"
    );

    let outcome: Result<()> = async {
        for chunk in framer.frames() {
            session.push(chunk).await?;
            report.chunks_sent += 1;

            // Pick up anything the service delivered while we were sending.
            while let Some(event) = session.try_next_event() {
                report.record(event);
            }

            tokio::time::sleep(pace).await;
        }

        debug!(chunks = report.chunks_sent, "all audio sent, flushing");
        session.flush().await?;
        drain_for(
            session,
            Duration::from_millis(timings.flush_grace_ms),
            &mut report,
        )
        .await;

        session.end_input().await?;
        drain_for(
            session,
            Duration::from_millis(timings.close_grace_ms),
            &mut report,
        )
        .await;
        Ok(())
    }
    .await;

    // Release the connection whether or not the scenario got all the way
    // through; the first failure is the one worth reporting.
    let closed = session.close().await;
    outcome?;
    closed?;

    info!(
        events = report.events_total,
        transcripts = report.transcripts.len(),
        "streaming scenario finished"
    );
    Ok(report)
}

/// Collect events until the grace period elapses or the stream ends.
async fn drain_for<S: SpeechSession>(
    session: &mut S,
    grace: Duration,
    report: &mut StreamReport,
) {
    let deadline = Instant::now() + grace;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        match tokio::time::timeout(remaining, session.next_event()).await {
            Ok(Some(event)) => report.record(event),
            // Stream ended before the grace period did.
            Ok(None) => return,
            Err(_) => return,
        }
    }
}
