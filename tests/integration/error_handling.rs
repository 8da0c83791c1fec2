//! Error paths: remote failures, unsupported targets, empty text

use crate::integration::mock_server::{fake_mp3, MockServerFixture, STREAM_PATH, VOICES_PATH};
use tts_stream::sink::{FileTarget, MemoryTarget};
use tts_stream::{AudioFormat, Error, TtsClient, TtsOptions};

#[tokio::test]
async fn remote_error_fails_before_any_write() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error("POST", STREAM_PATH, 422, "voice not found")
        .await;

    let mut target = MemoryTarget::mp3();
    let err = fixture
        .player()
        .play("Hello", &TtsOptions::default(), &mut target)
        .await
        .unwrap_err();

    match err {
        Error::Remote { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "voice not found");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert!(target.buffer().is_empty());
    assert!(!target.buffer().is_ended());
}

#[tokio::test]
async fn remote_error_keeps_existing_output_file() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_error("POST", STREAM_PATH, 500, "boom").await;

    let path = std::env::temp_dir().join(format!("tts-stream-keep-{}.mp3", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, b"previous good audio").await.unwrap();

    let mut target = FileTarget::new(&path);
    let err = fixture
        .player()
        .play("Hello", &TtsOptions::default(), &mut target)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Remote { status: 500, .. }));
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"previous good audio");
    let mut part = path.clone().into_os_string();
    part.push(".part");
    assert!(!std::path::Path::new(&part).exists());
    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn empty_error_body_uses_status_reason() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_error("GET", VOICES_PATH, 503, "").await;

    let err = fixture.client().voices().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Remote { status: 503, ref message } if message == "Service Unavailable"
    ));
}

#[tokio::test]
async fn unsupported_target_never_contacts_service() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", STREAM_PATH)
            .expect(0)
            .create_async()
            .await
    };

    let client = TtsClient::builder()
        .base_url(&fixture.base_url)
        .format(AudioFormat::Opus)
        .build()
        .unwrap();
    let player = tts_stream::Player::new(client);
    let mut target = MemoryTarget::mp3();
    let err = player
        .play("Hello", &TtsOptions::default(), &mut target)
        .await
        .unwrap_err();

    assert!(err.is_unsupported_sink());
    mock.assert_async().await;
}

#[tokio::test]
async fn blank_text_is_rejected_locally() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_stream("   ", "en-US-AriaNeural", &fake_mp3(16))
        .await;

    let mut target = MemoryTarget::mp3();
    let err = fixture
        .player()
        .play("   ", &TtsOptions::default(), &mut target)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    let err = fixture
        .player()
        .download("", &TtsOptions::default(), std::env::temp_dir().join("never.mp3"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let client = TtsClient::builder()
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let err = client
        .synthesize("Hello", &TtsOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
