//! Service configuration: where the TTS service lives and how to talk to it.
//!
//! Defaults target a local service. A config file (`.yaml`, `.yml` or `.json`)
//! overrides the defaults and `TTS_*` environment variables override the file.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TTS_BASE_URL` | `base_url` |
//! | `TTS_DEFAULT_VOICE` | `default_voice` |
//! | `TTS_FORMAT` | `format` |
//! | `TTS_HTTP_TIMEOUT_SECS` | `request_timeout_secs` |
//! | `TTS_CONNECT_TIMEOUT_SECS` | `connect_timeout_secs` |
//! | `TTS_PROXY_URL` | `proxy_url` |
//! | `TTS_API_KEY` | `api_key` |

use crate::tts::AudioFormat;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_VOICE: &str = "en-US-AriaNeural";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Streaming synthesis endpoint (chunked response body).
    pub stream_path: String,
    /// Whole-file synthesis endpoint.
    pub download_path: String,
    pub voices_path: String,
    pub default_voice: String,
    pub format: AudioFormat,
    /// Applied to buffered requests only; a stream may legitimately run for minutes.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub proxy_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: "/tts/stream".to_string(),
            download_path: "/tts".to_string(),
            voices_path: "/voices".to_string(),
            default_voice: DEFAULT_VOICE.to_string(),
            format: AudioFormat::Mp3,
            request_timeout_secs: Some(60),
            connect_timeout_secs: 10,
            proxy_url: None,
            api_key: None,
        }
    }
}

impl ServiceConfig {
    /// Load from a YAML or JSON file, picked by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ctx = || {
            ErrorContext::new()
                .with_source("config")
                .with_details(path.display().to_string())
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(format!("cannot read config: {}", e), ctx())
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&raw).map_err(|e| match e {
                Error::Configuration { message, .. } => {
                    Error::configuration_with_context(message, ctx())
                }
                other => other,
            })
        } else {
            Self::from_yaml_str(&raw).map_err(|e| match e {
                Error::Configuration { message, .. } => {
                    Error::configuration_with_context(message, ctx())
                }
                other => other,
            })
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw)
            .map_err(|e| Error::configuration(format!("invalid YAML config: {}", e)))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| Error::configuration(format!("invalid JSON config: {}", e)))
    }

    /// Defaults, then `path` if given, then the process environment; validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let cfg = cfg.with_env_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `TTS_*` overrides read through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("TTS_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("TTS_DEFAULT_VOICE") {
            self.default_voice = v;
        }
        if let Some(v) = lookup("TTS_FORMAT") {
            self.format = AudioFormat::from_name(&v);
        }
        if let Some(v) = lookup("TTS_HTTP_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(parse_secs("TTS_HTTP_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("TTS_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = parse_secs("TTS_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TTS_PROXY_URL") {
            self.proxy_url = Some(v);
        }
        if let Some(v) = lookup("TTS_API_KEY") {
            self.api_key = Some(v);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL {:?}: {}", self.base_url, e),
                ErrorContext::new().with_field_path("config.base_url"),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                format!("unsupported URL scheme {:?}", url.scheme()),
                ErrorContext::new().with_field_path("config.base_url"),
            ));
        }
        for (field, path) in [
            ("config.stream_path", &self.stream_path),
            ("config.download_path", &self.download_path),
            ("config.voices_path", &self.voices_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::configuration_with_context(
                    format!("endpoint path {:?} must start with '/'", path),
                    ErrorContext::new().with_field_path(field),
                ));
            }
        }
        if self.default_voice.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "default voice must not be empty",
                ErrorContext::new().with_field_path("config.default_voice"),
            ));
        }
        if let Some(proxy) = &self.proxy_url {
            url::Url::parse(proxy).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL: {}", e),
                    ErrorContext::new().with_field_path("config.proxy_url"),
                )
            })?;
        }
        Ok(())
    }

    /// Full URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        Error::configuration_with_context(
            format!("{} must be a whole number of seconds, got {:?}", key, raw),
            ErrorContext::new().with_source("env"),
        )
    })
}
