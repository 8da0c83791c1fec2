//! Streaming playback feeder: moves encoded audio from a chunked download into a
//! playback sink that takes one write at a time.
//!
//! # Overview
//!
//! Chunks usually arrive faster than the sink can take them. The feeder hands a
//! chunk straight to the sink when it is idle, queues it otherwise, and releases
//! queued chunks in arrival order each time the sink reports it is ready. Once
//! the source is exhausted and the queue is drained, the sink is closed.
//!
//! ```text
//!  HTTP body ──▶ source.next() ──┬─ sink idle, queue empty ──▶ sink.accept()
//!                                └─ otherwise ──▶ PendingQueue ──(sink ready)──▶ sink.accept()
//!  source end + queue drained + sink idle ──▶ sink.close()
//! ```
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Feeder`] | One playback attempt; owns cancellation and progress |
//! | [`AttachedFeeder`] | A feeder with its sink constructed, ready to [`feed`](AttachedFeeder::feed) |
//! | [`FeederCore`] | The I/O-free state machine deciding every sink call |
//! | [`PendingQueue`] | FIFO of chunks waiting for the sink |
//! | [`FeederState`] | `Idle`, `Streaming`, `Draining`, `Closed`, `Failed` |
//!
//! ## Failure policy
//!
//! Any source or sink error moves the feeder to `Failed`, stops the download and
//! is returned exactly once. The feeder never retries and never closes a failed
//! sink; retrying is the caller building a new [`Feeder`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use tts_stream::feeder::Feeder;
//! use tts_stream::sink::MemoryTarget;
//! use tts_stream::tts::AudioFormat;
//! use futures::StreamExt;
//!
//! # async fn demo() -> tts_stream::Result<()> {
//! let chunks = vec![bytes::Bytes::from_static(b"ID3"), bytes::Bytes::from_static(b"...")];
//! let source = futures::stream::iter(chunks).map(Ok).boxed();
//!
//! let mut target = MemoryTarget::mp3();
//! let report = Feeder::new().start(source, &mut target, AudioFormat::Mp3).await?;
//! assert_eq!(report.chunks_delivered, 2);
//! # Ok(())
//! # }
//! ```

mod machine;
mod driver;
mod queue;
mod state;


pub use machine::{FeederCore, SinkCommand};
pub use driver::{AttachedFeeder, CancelHandle, ChunkSource, FeedProgress, FeedReport, Feeder};
pub use queue::PendingQueue;
pub use state::FeederState;

/// Feeder error taxonomy. Every variant is fatal to the feeder it occurs in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The playback target cannot play the stream. Not retryable.
    #[error("Unsupported playback sink: {0}")]
    UnsupportedSink(String),

    /// The chunk source failed mid-stream.
    #[error("Source error: {0}")]
    Source(String),

    /// The sink refused a write or failed to complete one.
    #[error("Sink rejected write: {0}")]
    SinkRejected(String),

    #[error("Feeder already started; build a new feeder per playback attempt")]
    AlreadyStarted,
}

impl FeedError {
    /// Classify an error raised by a sink operation.
    pub fn from_sink(err: crate::Error) -> Self {
        match err {
            crate::Error::Feed(e) => e,
            other => FeedError::SinkRejected(other.to_string()),
        }
    }

    /// Classify an error yielded by the chunk source.
    pub fn from_source(err: crate::Error) -> Self {
        FeedError::Source(err.to_string())
    }
}
