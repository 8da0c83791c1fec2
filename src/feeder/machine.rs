//! Event-driven feeder state machine.
//!
//! `FeederCore` performs no I/O. The driver reports what happened (a chunk
//! arrived, the source ended, the sink became ready, something failed) and the
//! core answers with at most one [`SinkCommand`] to execute. Because every event
//! is handled to completion before the next one, the "is the sink idle" decision
//! is always made against current state.

use super::queue::PendingQueue;
use super::state::FeederState;
use super::FeedError;
use bytes::Bytes;
use tracing::debug;

/// Operation the driver must perform on the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCommand {
    Accept(Bytes),
    Close,
}

#[derive(Debug, Default)]
pub struct FeederCore {
    state: FeederState,
    queue: PendingQueue,
    sink_busy: bool,
    source_exhausted: bool,
    abandoned: bool,
    chunks_delivered: u64,
    bytes_delivered: u64,
}

impl FeederCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FeederState {
        self.state
    }

    /// A write has been issued and its readiness has not arrived yet.
    pub fn sink_busy(&self) -> bool {
        self.sink_busy
    }

    /// The driver should keep pulling from the source.
    pub fn wants_chunks(&self) -> bool {
        !self.abandoned && self.state == FeederState::Streaming
    }

    /// The driver should keep awaiting sink readiness.
    pub fn wants_ready(&self) -> bool {
        !self.abandoned && self.state.is_active() && self.sink_busy
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Nothing more will happen: terminal state reached or the owner walked away.
    pub fn is_finished(&self) -> bool {
        self.abandoned || self.state.is_terminal()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn peak_queued(&self) -> usize {
        self.queue.peak_len()
    }

    pub fn chunks_delivered(&self) -> u64 {
        self.chunks_delivered
    }

    pub fn bytes_delivered(&self) -> u64 {
        self.bytes_delivered
    }

    /// `Idle -> Streaming`. A feeder is never reused.
    pub fn start(&mut self) -> Result<(), FeedError> {
        if self.state != FeederState::Idle || self.abandoned {
            return Err(FeedError::AlreadyStarted);
        }
        self.state = FeederState::Streaming;
        Ok(())
    }

    /// A chunk was pulled from the source.
    pub fn on_chunk(&mut self, chunk: Bytes) -> Option<SinkCommand> {
        if !self.wants_chunks() {
            return None;
        }
        if !self.sink_busy && self.queue.is_empty() {
            return Some(self.deliver(chunk));
        }
        debug!(len = chunk.len(), queued = self.queue.len() + 1, "sink busy, queueing chunk");
        self.queue.push(chunk);
        None
    }

    /// The source reported end-of-stream.
    pub fn on_source_end(&mut self) -> Option<SinkCommand> {
        if !self.wants_chunks() {
            return None;
        }
        self.source_exhausted = true;
        if self.queue.is_empty() && !self.sink_busy {
            self.state = FeederState::Closed;
            return Some(SinkCommand::Close);
        }
        self.state = FeederState::Draining;
        None
    }

    /// The sink finished the write issued by the last accept.
    ///
    /// Readiness without an outstanding write is ignored.
    pub fn on_ready(&mut self) -> Option<SinkCommand> {
        if self.abandoned || !self.state.is_active() || !self.sink_busy {
            return None;
        }
        self.sink_busy = false;
        if let Some(chunk) = self.queue.pop() {
            return Some(self.deliver(chunk));
        }
        if self.source_exhausted {
            self.state = FeederState::Closed;
            return Some(SinkCommand::Close);
        }
        None
    }

    /// Record a source or sink failure.
    ///
    /// Returns the error the first time the feeder fails; later failures, and
    /// failures after close or abandonment, are swallowed so the caller hears
    /// about exactly one.
    pub fn fail(&mut self, error: FeedError) -> Option<FeedError> {
        if self.abandoned || self.state.is_terminal() {
            return None;
        }
        self.state = FeederState::Failed;
        self.queue.clear();
        self.sink_busy = false;
        Some(error)
    }

    /// The owner no longer wants this playback. All later events are ignored.
    pub fn abandon(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.abandoned = true;
        self.queue.clear();
    }

    fn deliver(&mut self, chunk: Bytes) -> SinkCommand {
        self.sink_busy = true;
        self.chunks_delivered += 1;
        self.bytes_delivered += chunk.len() as u64;
        SinkCommand::Accept(chunk)
    }
}
