//! Voice catalogue

use crate::integration::mock_server::MockServerFixture;

const VOICES: &str = r#"[
    {"ShortName": "en-US-AriaNeural", "Gender": "Female", "Locale": "en-US"},
    {"ShortName": "en-GB-RyanNeural", "Gender": "Male", "Locale": "en-GB"},
    {"ShortName": "ja-JP-NanamiNeural"}
]"#;

#[tokio::test]
async fn lists_voices_and_caches_them() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_voices(VOICES, 1).await;

    let client = fixture.client();
    let first: Vec<String> = client
        .voices()
        .await
        .unwrap()
        .iter()
        .map(|v| v.short_name.clone())
        .collect();
    let second = client.voices().await.unwrap();

    assert_eq!(
        first,
        vec!["en-US-AriaNeural", "en-GB-RyanNeural", "ja-JP-NanamiNeural"]
    );
    assert_eq!(second.len(), 3);
    assert_eq!(second[1].label(), "en-GB-RyanNeural (en-GB, Male)");
    mock.assert_async().await;
}

#[tokio::test]
async fn refresh_fetches_again() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_voices(VOICES, 2).await;

    let mut client = fixture.client();
    assert_eq!(client.voices().await.unwrap().len(), 3);
    assert_eq!(client.refresh_voices().await.unwrap().len(), 3);
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_catalogue_is_not_an_error() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_voices("[]", 1).await;
    assert!(fixture.client().voices().await.unwrap().is_empty());
}
