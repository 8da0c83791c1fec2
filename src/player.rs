//! Playback sessions: one [`Feeder`] per attempt, wired between the TTS stream
//! and a caller-owned [`PlaybackTarget`].

use crate::feeder::{FeedReport, Feeder};
use crate::sink::PlaybackTarget;
use crate::tts::{ensure_text, AudioOutput, TtsClient, TtsOptions};
use crate::Result;
use futures::StreamExt;
use std::path::Path;
use tracing::info;

pub struct Player {
    client: TtsClient,
}

impl Player {
    pub fn new(client: TtsClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &TtsClient {
        &self.client
    }

    /// Speak `text` into `target` with a fresh feeder.
    pub async fn play<T: PlaybackTarget>(
        &self,
        text: &str,
        options: &TtsOptions,
        target: &mut T,
    ) -> Result<FeedReport> {
        self.play_with(Feeder::new(), text, options, target).await
    }

    /// Like [`play`](Self::play), with a feeder the caller has already taken a
    /// cancel handle or progress receiver from.
    ///
    /// The sink is opened before the request is sent, so a target that cannot
    /// play the format fails without any network traffic. If the request itself
    /// fails the feeder is dropped unstarted.
    pub async fn play_with<T: PlaybackTarget>(
        &self,
        feeder: Feeder,
        text: &str,
        options: &TtsOptions,
        target: &mut T,
    ) -> Result<FeedReport> {
        ensure_text(text)?;
        let format = self.client.format_for(options);
        let attached = feeder.attach(target, format)?;
        let cancel = attached.cancel_handle();

        let source = tokio::select! {
            biased;
            // Cancelled while connecting: the feeder sees the cancellation
            // before it ever polls this source and reports an abandoned feed.
            _ = cancel.cancelled() => futures::stream::pending().boxed(),
            source = self.client.synthesize_stream(text, options) => source?,
        };
        attached.feed(source).await
    }

    /// Synthesize `text` in one piece and save it to `path`.
    pub async fn download(
        &self,
        text: &str,
        options: &TtsOptions,
        path: impl AsRef<Path>,
    ) -> Result<AudioOutput> {
        let output = self.client.synthesize(text, options).await?;
        output.save(path.as_ref()).await?;
        info!(path = %path.as_ref().display(), bytes = output.data.len(), "audio saved");
        Ok(output)
    }
}
