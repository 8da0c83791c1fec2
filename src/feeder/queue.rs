use bytes::Bytes;
use std::collections::VecDeque;

/// FIFO of chunks that arrived while the sink was busy.
///
/// Unbounded: the source is never throttled by queue depth. The high water mark
/// is kept so callers can see how far ahead of the sink the download ran.
#[derive(Debug, Default)]
pub struct PendingQueue {
    chunks: VecDeque<Bytes>,
    queued_bytes: usize,
    peak_len: usize,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: Bytes) {
        self.queued_bytes += chunk.len();
        self.chunks.push_back(chunk);
        self.peak_len = self.peak_len.max(self.chunks.len());
    }

    /// Remove the oldest chunk.
    pub fn pop(&mut self) -> Option<Bytes> {
        let chunk = self.chunks.pop_front()?;
        self.queued_bytes -= chunk.len();
        Some(chunk)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn queued_bytes(&self) -> usize {
        self.queued_bytes
    }

    pub fn peak_len(&self) -> usize {
        self.peak_len
    }

    /// Drop everything still queued. Used on failure and abandonment.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.queued_bytes = 0;
    }
}
