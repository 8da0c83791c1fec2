use crate::config::ServiceConfig;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Proxy;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin reqwest wrapper shared by the TTS endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        // No whole-request timeout on the client: streamed bodies may run long.
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| Error::configuration(format!("invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn post(&self, path: &str, body: &serde_json::Value, request_id: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(self.config.endpoint(path))
            .header("x-request-id", request_id)
            .json(body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// POST a JSON body and return the response body as a chunk stream.
    ///
    /// The status is checked before any chunk is yielded; dropping the stream
    /// aborts the download.
    pub async fn post_json_stream(
        &self,
        path: &str,
        body: &serde_json::Value,
        request_id: &str,
    ) -> Result<BoxStream<'static, Bytes>> {
        let resp = self
            .post(path, body, request_id)
            .send()
            .await
            .map_err(TransportError::Http)?;
        let resp = Self::check_status(resp).await?;

        let byte_stream = resp
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }

    /// POST a JSON body and buffer the whole response.
    pub async fn post_json_bytes(
        &self,
        path: &str,
        body: &serde_json::Value,
        request_id: &str,
    ) -> Result<Bytes> {
        let mut req = self.post(path, body, request_id);
        if let Some(secs) = self.config.request_timeout_secs {
            req = req.timeout(Duration::from_secs(secs));
        }
        let resp = req.send().await.map_err(TransportError::Http)?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.bytes().await.map_err(TransportError::Http)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, request_id: &str) -> Result<T> {
        let mut req = self
            .client
            .get(self.config.endpoint(path))
            .header("x-request-id", request_id);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        if let Some(secs) = self.config.request_timeout_secs {
            req = req.timeout(Duration::from_secs(secs));
        }
        let resp = req.send().await.map_err(TransportError::Http)?;
        let resp = Self::check_status(resp).await?;
        let body = resp.bytes().await.map_err(TransportError::Http)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        };
        Err(Error::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
