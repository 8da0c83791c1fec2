use super::machine::{FeederCore, SinkCommand};
use super::state::FeederState;
use super::FeedError;
use crate::sink::{PlaybackSink, PlaybackTarget};
use crate::tts::AudioFormat;
use crate::{BoxStream, Result};
use bytes::Bytes;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lazy, finite, fallible sequence of encoded audio chunks.
pub type ChunkSource = BoxStream<'static, Bytes>;

/// Snapshot of a running feed, published on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedProgress {
    pub state: FeederState,
    pub chunks_delivered: u64,
    pub bytes_delivered: u64,
    pub queued: usize,
    /// The first chunk has been handed to the sink; playback can begin.
    pub playback_started: bool,
}

/// Summary returned when a feed ends without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedReport {
    pub feed_id: Uuid,
    pub state: FeederState,
    pub chunks_delivered: u64,
    pub bytes_delivered: u64,
    pub peak_queued: usize,
    /// The owner cancelled before the feed finished.
    pub abandoned: bool,
}

/// Abandons a feed from outside the task driving it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Stop pulling from the source and make no further sink calls.
    ///
    /// A write already in flight may finish, but its readiness is ignored.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// One playback attempt.
///
/// Create it, take a [`CancelHandle`] and a progress receiver if needed, then
/// [`start`](Feeder::start) it. A feeder is consumed by starting and is never
/// reused; retrying means building a new one.
pub struct Feeder {
    id: Uuid,
    core: FeederCore,
    cancel: CancellationToken,
    progress: watch::Sender<FeedProgress>,
}

impl Feeder {
    pub fn new() -> Self {
        let (progress, _) = watch::channel(FeedProgress::default());
        Self {
            id: Uuid::new_v4(),
            core: FeederCore::new(),
            cancel: CancellationToken::new(),
            progress,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> FeederState {
        self.core.state()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedProgress> {
        self.progress.subscribe()
    }

    /// Open a sink on `target` and feed `source` into it.
    pub async fn start<T: PlaybackTarget>(
        self,
        source: ChunkSource,
        target: &mut T,
        format: AudioFormat,
    ) -> Result<FeedReport> {
        self.attach(target, format)?.feed(source).await
    }

    /// Construct the sink without touching any source yet.
    ///
    /// Fails with [`FeedError::UnsupportedSink`] if the target cannot play
    /// `format`; the caller should report that and not retry.
    pub fn attach<T: PlaybackTarget>(
        self,
        target: &mut T,
        format: AudioFormat,
    ) -> Result<AttachedFeeder<T::Sink>> {
        let sink = target.open_sink(format).map_err(|e| {
            warn!(feed_id = %self.id, format = %format.mime_type(), error = %e, "cannot open playback sink");
            e
        })?;
        Ok(AttachedFeeder { feeder: self, sink })
    }

    /// Feed `source` into an already constructed sink.
    pub async fn run<S: PlaybackSink>(self, source: ChunkSource, sink: S) -> Result<FeedReport> {
        AttachedFeeder { feeder: self, sink }.feed(source).await
    }

    fn publish(&self) {
        let core = &self.core;
        self.progress.send_if_modified(|p| {
            let next = FeedProgress {
                state: core.state(),
                chunks_delivered: core.chunks_delivered(),
                bytes_delivered: core.bytes_delivered(),
                queued: core.queued(),
                playback_started: core.chunks_delivered() > 0,
            };
            if *p == next {
                return false;
            }
            *p = next;
            true
        });
    }

    fn report(&self) -> FeedReport {
        FeedReport {
            feed_id: self.id,
            state: self.core.state(),
            chunks_delivered: self.core.chunks_delivered(),
            bytes_delivered: self.core.bytes_delivered(),
            peak_queued: self.core.peak_queued(),
            abandoned: self.core.is_abandoned(),
        }
    }
}

impl Default for Feeder {
    fn default() -> Self {
        Self::new()
    }
}

/// A feeder whose sink has been constructed.
pub struct AttachedFeeder<S> {
    feeder: Feeder,
    sink: S,
}

impl<S: PlaybackSink> AttachedFeeder<S> {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.feeder.cancel_handle()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedProgress> {
        self.feeder.subscribe()
    }

    /// Drive the feed to completion on the current task.
    ///
    /// Source pulls and sink readiness are multiplexed on this one task, so the
    /// state machine only ever sees one event at a time. Returns the first
    /// failure, if any; the sink is not closed after a failure.
    pub async fn feed(self, mut source: ChunkSource) -> Result<FeedReport> {
        let AttachedFeeder {
            mut feeder,
            mut sink,
        } = self;
        feeder.core.start()?;
        let id = feeder.id;
        let cancel = feeder.cancel.clone();
        info!(feed_id = %id, "feed started");
        feeder.publish();

        let mut failure: Option<FeedError> = None;
        let mut close_error = None;

        // While active, either the source is still live or a write is outstanding
        // (queued chunks imply a busy sink), so at least one branch is enabled.
        while !feeder.core.is_finished() {
            let wants_ready = feeder.core.wants_ready();
            let wants_chunks = feeder.core.wants_chunks();

            let command = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(feed_id = %id, "feed abandoned");
                    feeder.core.abandon();
                    None
                }
                ready = sink.ready(), if wants_ready => match ready {
                    Ok(()) => feeder.core.on_ready(),
                    Err(e) => {
                        failure = failure.or(feeder.core.fail(FeedError::from_sink(e)));
                        None
                    }
                },
                next = source.next(), if wants_chunks => match next {
                    Some(Ok(chunk)) => {
                        debug!(feed_id = %id, len = chunk.len(), "chunk received");
                        feeder.core.on_chunk(chunk)
                    }
                    Some(Err(e)) => {
                        failure = failure.or(feeder.core.fail(FeedError::from_source(e)));
                        None
                    }
                    None => {
                        debug!(feed_id = %id, "source exhausted");
                        feeder.core.on_source_end()
                    }
                },
            };

            match command {
                Some(SinkCommand::Accept(chunk)) => {
                    if let Err(e) = sink.accept(chunk) {
                        failure = failure.or(feeder.core.fail(FeedError::from_sink(e)));
                    }
                }
                Some(SinkCommand::Close) => {
                    if let Err(e) = sink.close().await {
                        close_error = Some(FeedError::from_sink(e));
                    }
                }
                None => {}
            }
            feeder.publish();
        }

        // Stop pulling: dropping the source cancels the underlying download.
        drop(source);

        if let Some(err) = failure.or(close_error) {
            warn!(feed_id = %id, state = %feeder.core.state(), error = %err, "feed failed");
            return Err(err.into());
        }

        let report = feeder.report();
        info!(
            feed_id = %id,
            state = %report.state,
            chunks = report.chunks_delivered,
            bytes = report.bytes_delivered,
            peak_queued = report.peak_queued,
            abandoned = report.abandoned,
            "feed finished"
        );
        Ok(report)
    }
}
