//! TTS (Text-to-Speech) client.

use super::types::{AudioFormat, AudioOutput, TtsOptions, Voice};
use crate::config::ServiceConfig;
use crate::transport::HttpTransport;
use crate::{BoxStream, Error, ErrorContext, Result};
use bytes::Bytes;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

/// Client for the TTS service: streaming synthesis, whole-file synthesis and
/// the voice catalogue.
pub struct TtsClient {
    transport: HttpTransport,
    voices: OnceCell<Vec<Voice>>,
}

impl TtsClient {
    pub fn builder() -> TtsClientBuilder {
        TtsClientBuilder::new()
    }

    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
            voices: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        self.transport.config()
    }

    /// Format a request with `options` will produce.
    pub fn format_for(&self, options: &TtsOptions) -> AudioFormat {
        options.format.unwrap_or(self.config().format)
    }

    fn request_body(&self, text: &str, options: &TtsOptions) -> Result<serde_json::Value> {
        ensure_text(text)?;
        let voice = options
            .voice
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(self.config().default_voice.as_str());
        let mut body = serde_json::json!({
            "text": text,
            "voice": voice,
        });
        let format = self.format_for(options);
        if format != AudioFormat::Mp3 {
            body["format"] = serde_json::Value::String(format.extension().to_string());
        }
        Ok(body)
    }

    /// Start streaming synthesis. The returned stream is the response body as it
    /// arrives; a non-2xx status fails here, before any chunk is produced.
    pub async fn synthesize_stream(
        &self,
        text: &str,
        options: &TtsOptions,
    ) -> Result<BoxStream<'static, Bytes>> {
        let body = self.request_body(text, options)?;
        let request_id = Uuid::new_v4().to_string();
        info!(
            request_id = %request_id,
            voice = body["voice"].as_str().unwrap_or_default(),
            chars = text.chars().count(),
            "requesting speech stream"
        );
        self.transport
            .post_json_stream(&self.config().stream_path, &body, &request_id)
            .await
    }

    /// Synthesize the whole text and buffer the result, for saving to disk.
    pub async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<AudioOutput> {
        let body = self.request_body(text, options)?;
        let request_id = Uuid::new_v4().to_string();
        info!(
            request_id = %request_id,
            voice = body["voice"].as_str().unwrap_or_default(),
            "requesting speech download"
        );
        let data = self
            .transport
            .post_json_bytes(&self.config().download_path, &body, &request_id)
            .await?;
        debug!(request_id = %request_id, bytes = data.len(), "speech downloaded");
        Ok(AudioOutput {
            data,
            format: self.format_for(options),
        })
    }

    /// Voices offered by the service. Fetched once and kept for the client's lifetime.
    pub async fn voices(&self) -> Result<&[Voice]> {
        let voices = self
            .voices
            .get_or_try_init(|| self.fetch_voices())
            .await?;
        Ok(voices.as_slice())
    }

    /// Fetch the voice list again, ignoring the cached copy.
    pub async fn refresh_voices(&mut self) -> Result<&[Voice]> {
        self.voices = OnceCell::new();
        self.voices().await
    }

    async fn fetch_voices(&self) -> Result<Vec<Voice>> {
        let request_id = Uuid::new_v4().to_string();
        let voices: Vec<Voice> = self
            .transport
            .get_json(&self.config().voices_path, &request_id)
            .await?;
        info!(request_id = %request_id, count = voices.len(), "voices loaded");
        Ok(voices)
    }
}

/// Reject text with nothing to speak. Checked before any sink is opened or
/// request is sent.
pub(crate) fn ensure_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::validation_with_context(
            "nothing to speak: text is empty",
            ErrorContext::new()
                .with_field_path("request.text")
                .with_source("tts"),
        ));
    }
    Ok(())
}

pub struct TtsClientBuilder {
    config: ServiceConfig,
}

impl TtsClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
        }
    }

    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn default_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.default_voice = voice.into();
        self
    }

    pub fn format(mut self, format: AudioFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    pub fn stream_path(mut self, path: impl Into<String>) -> Self {
        self.config.stream_path = normalize_path(path.into());
        self
    }

    pub fn download_path(mut self, path: impl Into<String>) -> Self {
        self.config.download_path = normalize_path(path.into());
        self
    }

    pub fn voices_path(mut self, path: impl Into<String>) -> Self {
        self.config.voices_path = normalize_path(path.into());
        self
    }

    pub fn build(self) -> Result<TtsClient> {
        self.config.validate()?;
        TtsClient::new(&self.config)
    }
}

impl Default for TtsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_path(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}
