//! Streaming playback end to end: mock service → client → feeder → sink

use crate::integration::mock_server::{fake_mp3, MockServerFixture};
use tts_stream::sink::{FileTarget, MemoryTarget};
use tts_stream::{AudioFormat, Feeder, FeederState, TtsOptions};

#[tokio::test]
async fn streams_speech_into_memory_buffer() {
    let fixture = MockServerFixture::new().await;
    let audio = fake_mp3(64 * 1024);
    let mock = fixture.mock_stream("Hello world", "en-US-AriaNeural", &audio).await;

    let player = fixture.player();
    let mut target = MemoryTarget::mp3();
    let buffer = target.buffer();
    let report = player
        .play("Hello world", &TtsOptions::default(), &mut target)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(report.state, FeederState::Closed);
    assert_eq!(report.bytes_delivered, audio.len() as u64);
    assert!(report.chunks_delivered >= 1);
    assert_eq!(&buffer.bytes()[..], &audio[..]);
    assert!(buffer.is_ended());
}

#[tokio::test]
async fn explicit_voice_is_sent() {
    let fixture = MockServerFixture::new().await;
    let audio = fake_mp3(128);
    let mock = fixture.mock_stream("Guten Tag", "de-DE-KatjaNeural", &audio).await;

    let mut target = MemoryTarget::mp3();
    let options = TtsOptions::default().with_voice("de-DE-KatjaNeural");
    fixture
        .player()
        .play("Guten Tag", &options, &mut target)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(target.buffer().len(), audio.len());
}

#[tokio::test]
async fn streams_speech_into_file() {
    let fixture = MockServerFixture::new().await;
    let audio = fake_mp3(4096);
    let _mock = fixture.mock_stream("Save me", "en-US-AriaNeural", &audio).await;

    let path = std::env::temp_dir().join(format!("tts-stream-play-{}.mp3", uuid::Uuid::new_v4()));
    let mut target = FileTarget::new(&path);
    fixture
        .player()
        .play("Save me", &TtsOptions::default(), &mut target)
        .await
        .unwrap();

    assert_eq!(tokio::fs::read(&path).await.unwrap(), audio);
    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn progress_reports_playback_start_and_close() {
    let fixture = MockServerFixture::new().await;
    let audio = fake_mp3(2048);
    let _mock = fixture.mock_stream("Progress", "en-US-AriaNeural", &audio).await;

    let feeder = Feeder::new();
    let progress = feeder.subscribe();
    let mut target = MemoryTarget::mp3();
    fixture
        .player()
        .play_with(feeder, "Progress", &TtsOptions::default(), &mut target)
        .await
        .unwrap();

    let last = progress.borrow().clone();
    assert_eq!(last.state, FeederState::Closed);
    assert!(last.playback_started);
    assert_eq!(last.bytes_delivered, audio.len() as u64);
    assert_eq!(last.queued, 0);
}

#[tokio::test]
async fn cancelled_before_start_is_abandoned_without_writes() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_stream("Never mind", "en-US-AriaNeural", &fake_mp3(512))
        .await;

    let feeder = Feeder::new();
    feeder.cancel_handle().cancel();
    let mut target = MemoryTarget::mp3();
    let report = fixture
        .player()
        .play_with(feeder, "Never mind", &TtsOptions::default(), &mut target)
        .await
        .unwrap();

    assert!(report.abandoned);
    assert_eq!(report.chunks_delivered, 0);
    assert!(target.buffer().is_empty());
    assert!(!target.buffer().is_ended());
}

#[tokio::test]
async fn download_saves_whole_file() {
    let fixture = MockServerFixture::new().await;
    let audio = fake_mp3(1000);
    let mock = fixture.mock_download(&audio).await;

    let path = std::env::temp_dir().join(format!("tts-stream-dl-{}.mp3", uuid::Uuid::new_v4()));
    let output = fixture
        .player()
        .download("Download me", &TtsOptions::default(), &path)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(output.format, AudioFormat::Mp3);
    assert_eq!(output.default_file_name(), "audio.mp3");
    assert_eq!(tokio::fs::read(&path).await.unwrap(), audio);
    let _ = tokio::fs::remove_file(&path).await;
}
