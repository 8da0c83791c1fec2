//! TTS (Text-to-Speech) types.

use crate::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fully buffered synthesis result.
#[derive(Debug, Clone)]
pub struct AudioOutput {
    pub data: Bytes,
    pub format: AudioFormat,
}

impl AudioOutput {
    pub fn default_file_name(&self) -> String {
        self.format.default_file_name()
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, &self.data).await?;
        Ok(())
    }
}

/// Supported audio formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Pcm => "audio/pcm",
        }
    }

    /// `audio.mp3`, `audio.wav`, ...
    pub fn default_file_name(&self) -> String {
        format!("audio.{}", self.extension())
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }

    /// Lenient lookup by name or MIME type; unknown names fall back to MP3.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "opus" | "audio/opus" => Self::Opus,
            "aac" | "audio/aac" => Self::Aac,
            "flac" | "audio/flac" => Self::Flac,
            "wav" | "audio/wav" => Self::Wav,
            "pcm" | "audio/pcm" => Self::Pcm,
            _ => Self::Mp3,
        }
    }
}

/// Options for one synthesis request.
#[derive(Debug, Clone, Default)]
pub struct TtsOptions {
    /// Voice short name; the configured default voice is used when unset.
    pub voice: Option<String>,
    /// Output format; the configured format is used when unset.
    pub format: Option<AudioFormat>,
}

impl TtsOptions {
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// A voice offered by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Voice {
    pub short_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl Voice {
    /// Label for pickers: the short name, with locale and gender when known.
    pub fn label(&self) -> String {
        match (&self.locale, &self.gender) {
            (Some(locale), Some(gender)) => format!("{} ({}, {})", self.short_name, locale, gender),
            (Some(locale), None) => format!("{} ({})", self.short_name, locale),
            _ => self.short_name.clone(),
        }
    }
}
