use super::{PlaybackSink, PlaybackTarget};
use crate::feeder::FeedError;
use crate::tts::AudioFormat;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::debug;

/// Sink over any async writer.
///
/// Each accepted chunk is written and flushed on its own task; the writer is
/// moved into that task and handed back when it finishes, which is what
/// [`ready`](PlaybackSink::ready) waits for.
pub struct WriterSink<W> {
    writer: Option<W>,
    pending: Option<JoinHandle<io::Result<W>>>,
    label: String,
}

impl<W> WriterSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer: Some(writer),
            pending: None,
            label: label.into(),
        }
    }

    fn context(&self) -> ErrorContext {
        ErrorContext::new()
            .with_source("writer_sink")
            .with_details(self.label.clone())
    }
}

#[async_trait::async_trait]
impl<W> PlaybackSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn accept(&mut self, chunk: Bytes) -> Result<()> {
        if self.pending.is_some() {
            return Err(FeedError::SinkRejected(format!(
                "{}: write already in flight",
                self.label
            ))
            .into());
        }
        let mut writer = self.writer.take().ok_or_else(|| {
            FeedError::SinkRejected(format!("{}: sink is closed", self.label))
        })?;
        debug!(sink = %self.label, len = chunk.len(), "writing chunk");
        self.pending = Some(tokio::spawn(async move {
            writer.write_all(&chunk).await?;
            writer.flush().await?;
            Ok(writer)
        }));
        Ok(())
    }

    async fn ready(&mut self) -> Result<()> {
        let Some(handle) = self.pending.as_mut() else {
            return Ok(());
        };
        let joined = handle.await;
        self.pending = None;
        let writer = joined
            .map_err(|e| {
                Error::runtime_with_context(format!("write task failed: {}", e), self.context())
            })?
            .map_err(|e| FeedError::SinkRejected(format!("{}: {}", self.label, e)))?;
        self.writer = Some(writer);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.ready().await?;
        if let Some(mut writer) = self.writer.take() {
            writer.shutdown().await?;
        }
        Ok(())
    }
}

/// Writes the stream into a file.
///
/// Audio is staged in a sibling `<name>.part` file and moved over the
/// destination when the feed closes. A feed that fails, is abandoned or never
/// starts leaves whatever was at the destination untouched.
#[derive(Debug, Clone)]
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn part_path(&self) -> Option<PathBuf> {
        let name = self.path.file_name()?;
        let mut part = name.to_os_string();
        part.push(".part");
        Some(self.path.with_file_name(part))
    }
}

impl PlaybackTarget for FileTarget {
    type Sink = FileSink;

    fn open_sink(&mut self, _format: AudioFormat) -> Result<FileSink> {
        let part_path = self.part_path().ok_or_else(|| {
            FeedError::UnsupportedSink(format!("{} is not a file path", self.path.display()))
        })?;
        // One blocking create of the staging file, so an unwritable directory
        // fails before any network traffic. The destination is not opened here.
        let file = std::fs::File::create(&part_path).map_err(|e| {
            FeedError::UnsupportedSink(format!("cannot open {}: {}", part_path.display(), e))
        })?;
        Ok(FileSink {
            inner: Some(WriterSink::new(
                tokio::fs::File::from_std(file),
                self.path.display().to_string(),
            )),
            part_path,
            path: self.path.clone(),
            committed: false,
        })
    }
}

/// Sink returned by [`FileTarget`]: a [`WriterSink`] over the staging file that
/// renames it into place on close and removes it if dropped unfinished.
pub struct FileSink {
    inner: Option<WriterSink<tokio::fs::File>>,
    part_path: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl FileSink {
    fn inner(&mut self) -> Result<&mut WriterSink<tokio::fs::File>> {
        self.inner.as_mut().ok_or_else(|| {
            FeedError::SinkRejected(format!("{}: sink is closed", self.path.display())).into()
        })
    }
}

#[async_trait::async_trait]
impl PlaybackSink for FileSink {
    fn accept(&mut self, chunk: Bytes) -> Result<()> {
        self.inner()?.accept(chunk)
    }

    async fn ready(&mut self) -> Result<()> {
        self.inner()?.ready().await
    }

    async fn close(&mut self) -> Result<()> {
        self.inner()?.close().await?;
        self.inner = None;
        tokio::fs::rename(&self.part_path, &self.path)
            .await
            .map_err(|e| {
                FeedError::SinkRejected(format!("cannot move audio to {}: {}", self.path.display(), e))
            })?;
        self.committed = true;
        debug!(path = %self.path.display(), "audio file committed");
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        self.inner = None;
        if std::fs::remove_file(&self.part_path).is_ok() {
            debug!(path = %self.part_path.display(), "discarded partial audio file");
        }
    }
}

/// Writes the stream to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutTarget;

impl PlaybackTarget for StdoutTarget {
    type Sink = WriterSink<tokio::io::Stdout>;

    fn open_sink(&mut self, _format: AudioFormat) -> Result<Self::Sink> {
        Ok(WriterSink::new(tokio::io::stdout(), "stdout"))
    }
}
