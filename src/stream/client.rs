//! WebSocket client for the streaming transcription endpoint.
//!
//! `SttClient` is the connection factory; `TranscriptionStream` is one live
//! session. The caller keeps the write half and sends through `push`/
//! `flush`/`end_input`; a spawned reader task owns the read half, decodes
//! inbound frames, and hands events over a bounded channel. The two sides
//! share nothing but the split socket, so neither can block the other.

use crate::config::{Config, StreamConfig};
use crate::defaults;
use crate::error::{Result, VoicewireError};
use crate::protocol::events::InboundEvent;
use crate::protocol::messages::{AudioEnvelope, ControlMessage};
use crate::stream::session::{SpeechSession, StreamState};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Parameters rendered into the connection query string.
///
/// Immutable for the lifetime of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub language_code: String,
    pub model: String,
    pub sample_rate: u32,
    pub vad_signals: bool,
    pub flush_signal: bool,
}

impl ConnectionParams {
    pub fn from_config(stream: &StreamConfig) -> Self {
        Self {
            language_code: stream.language_code.clone(),
            model: stream.model.clone(),
            sample_rate: stream.sample_rate,
            vad_signals: stream.vad_signals,
            flush_signal: stream.flush_signal,
        }
    }

    /// Render the query string the service expects.
    ///
    /// Values are form-urlencoded, so a model id like `saarika:v2.5` goes
    /// out as `saarika%3Av2.5` and reserved characters in overridden
    /// language or model values cannot corrupt the query. `flush_signal`
    /// is only ever present as `"true"`; the service treats the
    /// parameter's presence as the switch.
    pub fn query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("language-code", &self.language_code)
            .append_pair("model", &self.model)
            .append_pair("vad_signals", if self.vad_signals { "true" } else { "false" })
            .append_pair("sample_rate", &self.sample_rate.to_string());
        if self.flush_signal {
            query.append_pair("flush_signal", "true");
        }
        query.finish()
    }

    pub fn endpoint_url(&self, base: &str) -> String {
        let authority = base.find("://").map(|idx| idx + 3).unwrap_or(0);
        let separator = if base[authority..].contains('/') { "" } else { "/" };
        format!("{base}{separator}?{}", self.query_string())
    }
}

/// Connection factory holding credentials and per-connection parameters.
#[derive(Debug, Clone)]
pub struct SttClient {
    api_key: String,
    ws_url: String,
    params: ConnectionParams,
    handshake_timeout: Duration,
}

impl SttClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            api_key,
            ws_url: config.api.ws_url.clone(),
            params: ConnectionParams::from_config(&config.stream),
            handshake_timeout: Duration::from_secs(config.stream.handshake_timeout_secs),
        })
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Open a streaming session.
    pub async fn stream(&self) -> Result<TranscriptionStream> {
        TranscriptionStream::connect(
            &self.ws_url,
            &self.api_key,
            &self.params,
            self.handshake_timeout,
        )
        .await
    }
}

/// One live streaming session over a WebSocket connection.
pub struct TranscriptionStream {
    sink: SplitSink<WsStream, Message>,
    events: mpsc::Receiver<InboundEvent>,
    reader: Option<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
    failed: Arc<AtomicBool>,
    state: StreamState,
    sample_rate: u32,
}

impl TranscriptionStream {
    /// Establish the connection and start the reader task.
    ///
    /// The handshake is bounded by `handshake_timeout`; a connection that
    /// cannot complete in time fails instead of hanging.
    pub async fn connect(
        ws_url: &str,
        api_key: &str,
        params: &ConnectionParams,
        handshake_timeout: Duration,
    ) -> Result<Self> {
        let endpoint = params.endpoint_url(ws_url);
        debug!(endpoint = %endpoint, "connecting");

        let mut request =
            endpoint
                .as_str()
                .into_client_request()
                .map_err(|e| VoicewireError::Connection {
                    message: format!("invalid endpoint {endpoint}: {e}"),
                })?;
        request.headers_mut().insert(
            defaults::API_KEY_HEADER,
            HeaderValue::from_str(api_key).map_err(|_| VoicewireError::Connection {
                message: "API key contains characters not allowed in a header".to_string(),
            })?,
        );

        let (socket, _response) = tokio::time::timeout(handshake_timeout, connect_async(request))
            .await
            .map_err(|_| VoicewireError::HandshakeTimeout {
                seconds: handshake_timeout.as_secs(),
            })?
            .map_err(|e| VoicewireError::Connection {
                message: e.to_string(),
            })?;

        debug!("connected");

        let (sink, stream) = socket.split();
        let (event_tx, event_rx) = mpsc::channel(defaults::EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let failed = Arc::new(AtomicBool::new(false));

        let reader = tokio::spawn(read_loop(
            stream,
            event_tx,
            shutdown_rx,
            Arc::clone(&failed),
        ));

        Ok(Self {
            sink,
            events: event_rx,
            reader: Some(reader),
            shutdown: shutdown_tx,
            failed,
            state: StreamState::Open,
            sample_rate: params.sample_rate,
        })
    }

    fn current_state(&self) -> StreamState {
        if self.failed.load(Ordering::SeqCst) {
            StreamState::Failed
        } else {
            self.state
        }
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        match self.current_state() {
            StreamState::Open => Ok(()),
            state => Err(VoicewireError::InvalidState { operation, state }),
        }
    }

    async fn send_text(&mut self, json: String) -> Result<()> {
        match self.sink.send(Message::Text(json.into())).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.failed.store(true, Ordering::SeqCst);
                Err(VoicewireError::Transport {
                    message: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl SpeechSession for TranscriptionStream {
    async fn push(&mut self, pcm: &[u8]) -> Result<()> {
        self.ensure_open("push")?;
        let envelope = AudioEnvelope::from_pcm(pcm, self.sample_rate);
        self.send_text(envelope.to_json()?).await
    }

    async fn flush(&mut self) -> Result<()> {
        self.ensure_open("flush")?;
        self.send_text(ControlMessage::Flush.to_json()?).await
    }

    async fn end_input(&mut self) -> Result<()> {
        self.ensure_open("end_input")?;
        self.send_text(ControlMessage::end_of_stream(self.sample_rate).to_json()?)
            .await?;
        self.state = StreamState::Closing;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<InboundEvent> {
        self.events.recv().await
    }

    fn try_next_event(&mut self) -> Option<InboundEvent> {
        self.events.try_recv().ok()
    }

    fn state(&self) -> StreamState {
        self.current_state()
    }

    async fn close(&mut self) -> Result<()> {
        if self.state == StreamState::Closed {
            return Ok(());
        }

        self.shutdown.send(true).ok();
        // Closing the receiver first unblocks a reader stuck on a full
        // event channel; buffered events can still be drained.
        self.events.close();
        // Close handshake is best effort — the socket may already be gone.
        self.sink.send(Message::Close(None)).await.ok();
        self.sink.close().await.ok();

        if let Some(reader) = self.reader.take() {
            reader.await.ok();
        }

        self.state = StreamState::Closed;
        debug!("connection released");
        Ok(())
    }
}

/// Reader task: decodes inbound frames until shutdown, close, or error.
///
/// Cancellation is cooperative: the shutdown signal is checked between
/// frame reads, never mid-frame. Dropping the event sender on exit is the
/// end-of-stream signal to the consumer.
async fn read_loop(
    mut socket: SplitStream<WsStream>,
    events: mpsc::Sender<InboundEvent>,
    mut shutdown: watch::Receiver<bool>,
    failed: Arc<AtomicBool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                // An error means the session handle is gone; stop either way.
                if changed.is_err() || *shutdown.borrow() {
                    debug!("reader task stopping");
                    break;
                }
            }
            frame = socket.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match InboundEvent::decode(&text) {
                        Ok(event) => {
                            trace!(kind = event.kind(), "decoded inbound frame");
                            if events.send(event).await.is_err() {
                                break;
                            }
                        }
                        // One undecodable frame never takes the stream down.
                        Err(e) => warn!(error = %e, "skipping inbound frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "service closed the stream");
                        break;
                    }
                    // Ping/pong are handled by the transport; binary frames are
                    // not part of this protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "transport error, stream failed");
                        failed.store(true, Ordering::SeqCst);
                        break;
                    }
                    None => {
                        debug!("socket ended");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ConnectionParams {
        ConnectionParams {
            language_code: "en-IN".to_string(),
            model: "saarika:v2.5".to_string(),
            sample_rate: 16000,
            vad_signals: true,
            flush_signal: false,
        }
    }

    #[test]
    fn test_query_string_without_flush_signal() {
        assert_eq!(
            params().query_string(),
            "language-code=en-IN&model=saarika%3Av2.5&vad_signals=true&sample_rate=16000"
        );
    }

    #[test]
    fn test_query_string_with_flush_signal() {
        let mut params = params();
        params.flush_signal = true;
        assert_eq!(
            params.query_string(),
            "language-code=en-IN&model=saarika%3Av2.5&vad_signals=true&sample_rate=16000&flush_signal=true"
        );
    }

    #[test]
    fn test_query_string_vad_disabled() {
        let mut params = params();
        params.vad_signals = false;
        assert!(params.query_string().contains("vad_signals=false"));
    }

    #[test]
    fn test_query_string_encodes_reserved_characters() {
        let mut params = params();
        params.model = "exp&model=x".to_string();
        params.language_code = "en IN".to_string();

        let query = params.query_string();
        assert!(query.contains("model=exp%26model%3Dx"));
        assert!(query.contains("language-code=en+IN"));
        // Exactly the expected parameters, nothing injected
        assert_eq!(query.matches('&').count(), 3);
    }

    #[test]
    fn test_endpoint_url() {
        let url = params().endpoint_url("wss://api.sarvam.ai/speech-to-text/ws");
        assert!(url.starts_with("wss://api.sarvam.ai/speech-to-text/ws?language-code="));
    }

    #[test]
    fn test_params_from_config() {
        let config = Config::default();
        let params = ConnectionParams::from_config(&config.stream);
        assert_eq!(params.language_code, "en-IN");
        assert_eq!(params.model, "saarika:v2.5");
        assert_eq!(params.sample_rate, 16000);
        assert!(params.vad_signals);
        assert!(params.flush_signal);
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = Config::default();
        assert!(matches!(
            SttClient::new(&config),
            Err(VoicewireError::MissingApiKey)
        ));
    }

    #[test]
    fn test_client_from_config_with_key() {
        let mut config = Config::default();
        config.api.key = "secret".to_string();
        let client = SttClient::new(&config).unwrap();
        assert_eq!(client.params().model, "saarika:v2.5");
    }
}
