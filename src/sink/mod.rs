//! Playback sinks: the destinations a feeder writes encoded audio into.
//!
//! A sink takes one write at a time. [`PlaybackSink::accept`] starts a write and
//! returns immediately; [`PlaybackSink::ready`] resolves once that write is done.
//! A [`PlaybackTarget`] is what the caller owns (a file path, stdout, an
//! in-memory player buffer) and knows how to open a sink for a given format.
//!
//! | Target | Sink | Notes |
//! |--------|------|-------|
//! | [`FileTarget`] | [`FileSink`] over a staging `.part` file | destination replaced only on close |
//! | [`StdoutTarget`] | [`WriterSink`] over `tokio::io::Stdout` | pipe into an external player |
//! | [`MemoryTarget`] | [`MemorySink`] | plays only the formats it was built with |

mod memory;
mod writer;

pub use memory::{MemorySink, MemoryTarget, PlaybackBuffer};
pub use writer::{FileSink, FileTarget, StdoutTarget, WriterSink};

use crate::tts::AudioFormat;
use crate::Result;
use bytes::Bytes;

/// Destination accepting one pending write at a time.
#[async_trait::async_trait]
pub trait PlaybackSink: Send {
    /// Begin writing `chunk`. Must not be called again before [`ready`](Self::ready)
    /// has resolved for this write; sinks may reject such a call.
    fn accept(&mut self, chunk: Bytes) -> Result<()>;

    /// Resolve once the last accepted write has finished.
    ///
    /// Must be cancel-safe: the feeder may drop this future while waiting for the
    /// source and call it again later.
    async fn ready(&mut self) -> Result<()>;

    /// Signal end of stream. Called once, after the last write is acknowledged.
    async fn close(&mut self) -> Result<()>;
}

/// A caller-owned playable destination.
pub trait PlaybackTarget {
    type Sink: PlaybackSink;

    /// Construct a sink for `format`.
    ///
    /// Fails with [`FeedError::UnsupportedSink`](crate::feeder::FeedError::UnsupportedSink)
    /// when the target cannot play the format at all.
    fn open_sink(&mut self, format: AudioFormat) -> Result<Self::Sink>;
}
