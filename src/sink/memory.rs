use super::{PlaybackSink, PlaybackTarget};
use crate::feeder::FeedError;
use crate::tts::AudioFormat;
use crate::{Error, ErrorContext, Result};
use bytes::{Bytes, BytesMut};
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Debug, Default)]
struct BufferState {
    data: BytesMut,
    appends: usize,
    ended: bool,
}

/// Shared view of an in-memory playback buffer.
///
/// The target hands clones of this to the caller so a player can read what has
/// been appended so far while the feed is still running.
#[derive(Debug, Clone, Default)]
pub struct PlaybackBuffer {
    inner: Arc<Mutex<BufferState>>,
}

impl PlaybackBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far.
    pub fn bytes(&self) -> Bytes {
        self.with(|st| Bytes::copy_from_slice(&st.data))
    }

    pub fn len(&self) -> usize {
        self.with(|st| st.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of accepted writes.
    pub fn appends(&self) -> usize {
        self.with(|st| st.appends)
    }

    /// True once the feeder closed the sink.
    pub fn is_ended(&self) -> bool {
        self.with(|st| st.ended)
    }

    /// Reads still see the data after a writer panicked; only writes refuse.
    fn with<T>(&self, f: impl FnOnce(&BufferState) -> T) -> T {
        let st = self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("playback buffer poisoned, reading last written state");
            poisoned.into_inner()
        });
        f(&st)
    }

    fn update<T>(&self, f: impl FnOnce(&mut BufferState) -> Result<T>) -> Result<T> {
        let mut st = self.inner.lock().map_err(|_| {
            Error::runtime_with_context(
                "playback buffer poisoned",
                ErrorContext::new().with_source("memory_sink"),
            )
        })?;
        f(&mut st)
    }
}

/// In-memory playback target that only plays the formats it was built with.
#[derive(Debug, Clone)]
pub struct MemoryTarget {
    formats: Vec<AudioFormat>,
    buffer: PlaybackBuffer,
}

impl MemoryTarget {
    pub fn new(formats: impl IntoIterator<Item = AudioFormat>) -> Self {
        Self {
            formats: formats.into_iter().collect(),
            buffer: PlaybackBuffer::new(),
        }
    }

    /// Target playing MP3 only, like a browser media buffer opened for `audio/mpeg`.
    pub fn mp3() -> Self {
        Self::new([AudioFormat::Mp3])
    }

    pub fn supports(&self, format: AudioFormat) -> bool {
        self.formats.contains(&format)
    }

    pub fn buffer(&self) -> PlaybackBuffer {
        self.buffer.clone()
    }
}

impl PlaybackTarget for MemoryTarget {
    type Sink = MemorySink;

    fn open_sink(&mut self, format: AudioFormat) -> Result<MemorySink> {
        if !self.supports(format) {
            return Err(FeedError::UnsupportedSink(format!(
                "memory target cannot play {}",
                format.mime_type()
            ))
            .into());
        }
        Ok(MemorySink {
            buffer: self.buffer.clone(),
            pending: false,
        })
    }
}

/// Appends complete synchronously, so readiness is immediate.
#[derive(Debug)]
pub struct MemorySink {
    buffer: PlaybackBuffer,
    pending: bool,
}

#[async_trait::async_trait]
impl PlaybackSink for MemorySink {
    fn accept(&mut self, chunk: Bytes) -> Result<()> {
        if self.pending {
            return Err(FeedError::SinkRejected("append while previous append pending".into()).into());
        }
        self.buffer.update(|st| {
            if st.ended {
                return Err(FeedError::SinkRejected("append after end of stream".into()).into());
            }
            st.data.extend_from_slice(&chunk);
            st.appends += 1;
            Ok(())
        })?;
        self.pending = true;
        Ok(())
    }

    async fn ready(&mut self) -> Result<()> {
        self.pending = false;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.buffer.update(|st| {
            st.ended = true;
            Ok(())
        })
    }
}
