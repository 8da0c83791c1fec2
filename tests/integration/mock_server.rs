//! Mock TTS service for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;
use tokio::sync::Mutex;
use tts_stream::{Player, TtsClient};

pub const STREAM_PATH: &str = "/tts/stream";
pub const DOWNLOAD_PATH: &str = "/tts";
pub const VOICES_PATH: &str = "/voices";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client pointed at the mock server
    pub fn client(&self) -> TtsClient {
        TtsClient::builder()
            .base_url(&self.base_url)
            .default_voice("en-US-AriaNeural")
            .build()
            .expect("mock client config is valid")
    }

    pub fn player(&self) -> Player {
        Player::new(self.client())
    }

    /// Streaming endpoint answering `body` for the given text/voice request
    pub async fn mock_stream(&self, text: &str, voice: &str, body: &[u8]) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", STREAM_PATH)
            .match_header("content-type", "application/json")
            .match_header("x-request-id", Matcher::Any)
            .match_body(Matcher::Json(serde_json::json!({"text": text, "voice": voice})))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(body)
            .create_async()
            .await
    }

    /// Whole-file endpoint
    pub async fn mock_download(&self, body: &[u8]) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", DOWNLOAD_PATH)
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(body)
            .create_async()
            .await
    }

    /// Voices endpoint expected to be hit exactly `hits` times
    pub async fn mock_voices(&self, body: &str, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", VOICES_PATH)
            .expect(hits)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for an error response
    pub async fn mock_error(&self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }
}

/// A few kilobytes of fake MP3: an ID3 header followed by frame-like filler.
pub fn fake_mp3(len: usize) -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    data.extend((0..len).map(|i| (i % 251) as u8));
    data
}
