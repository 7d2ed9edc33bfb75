use crate::defaults;
use crate::error::{Result, VoicewireError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub stream: StreamConfig,
    pub harness: HarnessConfig,
}

/// Provider endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Provider API key. Usually left empty here and supplied via the
    /// SARVAM_API_KEY environment variable.
    pub key: String,
    pub ws_url: String,
    pub rest_url: String,
}

/// Streaming connection parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    pub language_code: String,
    pub model: String,
    pub sample_rate: u32,
    /// Ask the service to emit voice-activity signals alongside transcripts.
    pub vad_signals: bool,
    /// Enable the connection-time flush flag; the mid-stream flush control
    /// message is always available regardless.
    pub flush_signal: bool,
    pub chunk_duration_ms: u32,
    pub handshake_timeout_secs: u64,
}

/// Harness pacing and grace periods
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    pub flush_grace_ms: u64,
    pub close_grace_ms: u64,
    pub max_stream_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            ws_url: defaults::STT_WS_URL.to_string(),
            rest_url: defaults::STT_REST_URL.to_string(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            language_code: defaults::DEFAULT_LANGUAGE.to_string(),
            model: defaults::DEFAULT_MODEL.to_string(),
            sample_rate: defaults::SAMPLE_RATE,
            vad_signals: true,
            flush_signal: true,
            chunk_duration_ms: defaults::CHUNK_DURATION_MS,
            handshake_timeout_secs: defaults::HANDSHAKE_TIMEOUT_SECS,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            flush_grace_ms: defaults::FLUSH_GRACE_MS,
            close_grace_ms: defaults::CLOSE_GRACE_MS,
            max_stream_secs: defaults::MAX_STREAM_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoicewireError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoicewireError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from an optional path, falling back to defaults
    ///
    /// An explicitly given path must exist; without one, defaults are used.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SARVAM_API_KEY → api.key
    /// - VOICEWIRE_WS_URL → api.ws_url
    /// - VOICEWIRE_REST_URL → api.rest_url
    /// - VOICEWIRE_LANGUAGE → stream.language_code
    /// - VOICEWIRE_MODEL → stream.model
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(defaults::API_KEY_ENV)
            && !key.is_empty()
        {
            self.api.key = key;
        }

        if let Ok(ws_url) = std::env::var("VOICEWIRE_WS_URL")
            && !ws_url.is_empty()
        {
            self.api.ws_url = ws_url;
        }

        if let Ok(rest_url) = std::env::var("VOICEWIRE_REST_URL")
            && !rest_url.is_empty()
        {
            self.api.rest_url = rest_url;
        }

        if let Ok(language) = std::env::var("VOICEWIRE_LANGUAGE")
            && !language.is_empty()
        {
            self.stream.language_code = language;
        }

        if let Ok(model) = std::env::var("VOICEWIRE_MODEL")
            && !model.is_empty()
        {
            self.stream.model = model;
        }

        self
    }

    /// Validate that the configuration values make sense
    pub fn validate(&self) -> Result<()> {
        if self.stream.sample_rate == 0 {
            return Err(VoicewireError::ConfigInvalidValue {
                key: "stream.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.stream.chunk_duration_ms == 0 {
            return Err(VoicewireError::ConfigInvalidValue {
                key: "stream.chunk_duration_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if !self.api.ws_url.starts_with("ws://") && !self.api.ws_url.starts_with("wss://") {
            return Err(VoicewireError::ConfigInvalidValue {
                key: "api.ws_url".to_string(),
                message: format!("expected a ws:// or wss:// URL, got {}", self.api.ws_url),
            });
        }

        if self.stream.handshake_timeout_secs == 0 {
            return Err(VoicewireError::ConfigInvalidValue {
                key: "stream.handshake_timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Return the API key, or an error if none is configured
    pub fn require_api_key(&self) -> Result<&str> {
        if self.api.key.is_empty() {
            Err(VoicewireError::MissingApiKey)
        } else {
            Ok(&self.api.key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stream.sample_rate, 16000);
        assert_eq!(config.stream.model, "saarika:v2.5");
        assert_eq!(config.stream.language_code, "en-IN");
        assert!(config.stream.vad_signals);
        assert!(config.stream.flush_signal);
        assert_eq!(config.api.ws_url, "wss://api.sarvam.ai/speech-to-text/ws");
    }

    #[test]
    fn test_default_config_has_no_api_key() {
        let config = Config::default();
        assert!(matches!(
            config.require_api_key(),
            Err(VoicewireError::MissingApiKey)
        ));
    }

    #[test]
    fn test_require_api_key_returns_key() {
        let mut config = Config::default();
        config.api.key = "secret".to_string();
        assert_eq!(config.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let result = Config::load(Path::new("/nonexistent/voicewire.toml"));
        match result {
            Err(VoicewireError::ConfigFileNotFound { path }) => {
                assert!(path.contains("voicewire.toml"));
            }
            other => panic!("expected ConfigFileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stream]\nlanguage_code = \"hi-IN\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.stream.language_code, "hi-IN");
        // Everything else keeps its default
        assert_eq!(config.stream.model, defaults::DEFAULT_MODEL);
        assert_eq!(config.api.ws_url, defaults::STT_WS_URL);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stream = not valid").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_zero_sample_rate() {
        let mut config = Config::default();
        config.stream.sample_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(VoicewireError::ConfigInvalidValue { key, .. }) if key == "stream.sample_rate"
        ));
    }

    #[test]
    fn test_validate_rejects_non_ws_url() {
        let mut config = Config::default();
        config.api.ws_url = "https://api.sarvam.ai/speech-to-text/ws".to_string();
        assert!(matches!(
            config.validate(),
            Err(VoicewireError::ConfigInvalidValue { key, .. }) if key == "api.ws_url"
        ));
    }

    #[test]
    fn test_env_override_applies_model() {
        // set_var is unsafe in edition 2024 because it races with other
        // threads reading the environment; the var name is test-unique.
        unsafe { std::env::set_var("VOICEWIRE_MODEL", "saarika:v3") };
        let config = Config::default().with_env_overrides();
        unsafe { std::env::remove_var("VOICEWIRE_MODEL") };

        assert_eq!(config.stream.model, "saarika:v3");
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
