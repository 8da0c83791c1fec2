//! TTS module: talks to the speech service that turns text into encoded audio.

mod client;
mod types;

pub(crate) use client::ensure_text;
pub use client::{TtsClient, TtsClientBuilder};
pub use types::{AudioFormat, AudioOutput, TtsOptions, Voice};
