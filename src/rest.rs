//! Synchronous (non-streaming) transcription over the REST endpoint.
//!
//! A whole WAV file goes up as a multipart form; the transcript comes back
//! in one response. This is the fallback path and the baseline the harness
//! compares streaming results against.

use crate::config::Config;
use crate::defaults;
use crate::error::{Result, VoicewireError};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Response body of the synchronous transcription endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeResponse {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

/// Client for the synchronous transcription endpoint.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    language_code: String,
    model: String,
}

impl RestClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self {
            http: reqwest::Client::new(),
            url: config.api.rest_url.clone(),
            api_key,
            language_code: config.stream.language_code.clone(),
            model: config.stream.model.clone(),
        })
    }

    /// Transcribe an in-memory WAV file.
    pub async fn transcribe(&self, wav_bytes: Vec<u8>, filename: &str) -> Result<TranscribeResponse> {
        debug!(bytes = wav_bytes.len(), %filename, "uploading for transcription");

        let file_part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name(filename.to_string())
            .mime_str("audio/wav")?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("language_code", self.language_code.clone())
            .text("model", self.model.clone());

        let response = self
            .http
            .post(&self.url)
            .header(defaults::API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VoicewireError::RestStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Transcribe a WAV file from disk.
    pub async fn transcribe_file(&self, path: &Path) -> Result<TranscribeResponse> {
        let wav_bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav");
        self.transcribe(wav_bytes, filename).await
    }
}
