//! # tts-stream
//!
//! Streaming text-to-speech playback. Text goes to a TTS HTTP service; the
//! encoded audio comes back as a chunked response and is fed, in order and one
//! write at a time, into a playback sink while it is still downloading.
//!
//! ## Overview
//!
//! The heart of the crate is the [`feeder`]: a small state machine that sits
//! between a byte-chunk source and a sink that only accepts one pending write.
//! It buffers chunks that arrive while the sink is busy, releases them when the
//! sink reports readiness, and closes the sink once everything is flushed.
//! Around it live the collaborators a real application needs: an HTTP client
//! for the speech service, sinks for files, stdout and in-memory buffers, a
//! configuration layer, and a per-attempt [`Player`] session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tts_stream::{Player, ServiceConfig, TtsClient, TtsOptions};
//! use tts_stream::sink::FileTarget;
//!
//! #[tokio::main]
//! async fn main() -> tts_stream::Result<()> {
//!     let config = ServiceConfig::load(None)?;
//!     let player = Player::new(TtsClient::new(&config)?);
//!
//!     let mut target = FileTarget::new("hello.mp3");
//!     let options = TtsOptions::default().with_voice("en-US-AriaNeural");
//!     let report = player.play("Hello there", &options, &mut target).await?;
//!     println!("{} chunks streamed", report.chunks_delivered);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`feeder`] | Streaming playback feeder: state machine, driver, cancellation |
//! | [`sink`] | Playback sinks and targets (file, stdout, memory) |
//! | [`tts`] | Speech service client and audio types |
//! | [`transport`] | HTTP transport |
//! | [`config`] | Service configuration from files and environment |
//! | [`player`] | Per-attempt playback sessions |

pub mod config;
pub mod feeder;
pub mod player;
pub mod sink;
pub mod transport;
pub mod tts;

pub use config::ServiceConfig;
pub use feeder::{CancelHandle, FeedError, FeedProgress, FeedReport, Feeder, FeederState};
pub use player::Player;
pub use tts::{AudioFormat, TtsClient, TtsClientBuilder, TtsOptions, Voice};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
