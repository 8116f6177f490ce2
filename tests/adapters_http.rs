//! HTTP adapter tests against a canned local server.
//!
//! Run with: cargo test --test adapters_http

mod common;

use std::path::PathBuf;

use common::{Canned, CannedHttp};
use funnel::adapters::commerce::LemonSqueezy;
use funnel::adapters::social::{Pinterest, Youtube};
use funnel::adapters::{http_client, CommerceAdapter, ListingRequest, SocialUploader, UploadRequest};
use funnel::config::{HttpConfig, LemonSqueezyConfig, PinterestConfig, YoutubeConfig};
use funnel::FunnelError;

fn listing() -> ListingRequest {
    ListingRequest {
        name: "Roi Calc".into(),
        price: 29.0,
        description: "A simple roi-calc tool for general".into(),
        slug: "roi-calc".into(),
    }
}

fn lemonsqueezy(base: &str) -> LemonSqueezy {
    LemonSqueezy::new(
        LemonSqueezyConfig {
            api_base: base.to_string(),
            api_key: Some("test-key".into()),
            store_id: Some("777".into()),
        },
        http_client(&HttpConfig::default()).unwrap(),
    )
}

fn upload(video_path: PathBuf) -> UploadRequest {
    UploadRequest {
        video_path,
        title: "roi-calc - Free Calculator".into(),
        description: "🔥 Free Roi Calc".into(),
        tags: vec!["roicalc".into(), "profit".into()],
    }
}

#[tokio::test]
async fn test_lemonsqueezy_creates_listing() {
    let server = CannedHttp::bind().await;
    let adapter = lemonsqueezy(&server.base);
    let requests = server.serve(vec![Canned::json(
        201,
        r#"{"data":{"id":"4242","attributes":{"urls":{"checkout_url":"https://shop.test/4242"}}}}"#,
    )]);

    let listing = adapter.create_listing(&listing()).await.unwrap();
    assert_eq!(listing.external_id, "4242");
    assert_eq!(listing.checkout_url, "https://shop.test/4242");

    let requests = requests.await.unwrap();
    let request = requests[0].to_lowercase();
    assert!(request.starts_with("post /v1/products "));
    assert!(request.contains("authorization: bearer test-key"));
    assert!(request.contains("content-type: application/vnd.api+json"));
    assert!(requests[0].contains(r#""price":2900"#));
    assert!(requests[0].contains(r#""id":"777""#));
}

#[tokio::test]
async fn test_lemonsqueezy_rejection_carries_status_and_body() {
    let server = CannedHttp::bind().await;
    let adapter = lemonsqueezy(&server.base);
    let requests = server.serve(vec![Canned::json(
        422,
        r#"{"errors":[{"detail":"store not found"}]}"#,
    )]);

    let err = adapter.create_listing(&listing()).await.unwrap_err();
    match err {
        FunnelError::ExternalService {
            service,
            status,
            body,
        } => {
            assert_eq!(service, "lemonsqueezy");
            assert_eq!(status, 422);
            assert!(body.contains("store not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(requests.await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_youtube_resumable_upload() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"fake-video-bytes").unwrap();

    let server = CannedHttp::bind().await;
    let session = format!("{}/upload/session-1", server.base);
    let youtube = Youtube::new(
        YoutubeConfig {
            upload_base: server.base.clone(),
            access_token: Some("yt-token".into()),
            ..YoutubeConfig::default()
        },
        http_client(&HttpConfig::default()).unwrap(),
    );
    let requests = server.serve(vec![
        Canned::json(200, "").header("Location", &session),
        Canned::json(200, r#"{"id":"vid123","kind":"youtube#video"}"#),
    ]);

    let url = youtube.upload(&upload(video)).await.unwrap();
    assert_eq!(url, "https://youtube.com/watch?v=vid123");

    let requests = requests.await.unwrap();
    assert!(requests[0].starts_with("POST /upload/youtube/v3/videos?uploadType=resumable"));
    assert!(requests[0].contains(r#""title":"roi-calc - Free Calculator""#));
    assert!(requests[1].starts_with("PUT /upload/session-1 "));
    assert!(requests[1].ends_with("fake-video-bytes"));
}

#[tokio::test]
async fn test_youtube_missing_token_is_configuration_error() {
    let youtube = Youtube::new(
        YoutubeConfig::default(),
        http_client(&HttpConfig::default()).unwrap(),
    );

    let err = youtube
        .upload(&upload(PathBuf::from("unused.mp4")))
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::Configuration(ref m) if m.contains("YOUTUBE_ACCESS_TOKEN")));
}

#[tokio::test]
async fn test_youtube_missing_render_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("renders").join("roi-calc_youtube_1.mp4");
    let youtube = Youtube::new(
        YoutubeConfig {
            access_token: Some("yt-token".into()),
            ..YoutubeConfig::default()
        },
        http_client(&HttpConfig::default()).unwrap(),
    );

    let err = youtube.upload(&upload(video.clone())).await.unwrap_err();

    assert!(err.is_expected());
    let message = err.to_string();
    assert!(matches!(err, FunnelError::Configuration(_)));
    assert!(message.contains(&video.display().to_string()));
    assert!(message.contains("media.renderer"));
}

#[tokio::test]
async fn test_pinterest_creates_pin() {
    let server = CannedHttp::bind().await;
    let pinterest = Pinterest::new(
        PinterestConfig {
            api_base: server.base.clone(),
            access_token: Some("pin-token".into()),
            board_id: Some("board-9".into()),
            link: Some("https://tools.test/roi-calc".into()),
        },
        http_client(&HttpConfig::default()).unwrap(),
    );
    let requests = server.serve(vec![Canned::json(201, r#"{"id":"981"}"#)]);

    let url = pinterest.upload(&upload(PathBuf::from("clip.mp4"))).await.unwrap();
    assert_eq!(url, "https://www.pinterest.com/pin/981/");

    let requests = requests.await.unwrap();
    assert!(requests[0].starts_with("POST /v5/pins "));
    assert!(requests[0].contains(r#""board_id":"board-9""#));
    assert!(requests[0].contains(r#""link":"https://tools.test/roi-calc""#));
}

#[tokio::test]
async fn test_pinterest_server_error() {
    let server = CannedHttp::bind().await;
    let pinterest = Pinterest::new(
        PinterestConfig {
            api_base: server.base.clone(),
            access_token: Some("pin-token".into()),
            board_id: Some("board-9".into()),
            link: None,
        },
        http_client(&HttpConfig::default()).unwrap(),
    );
    let _requests = server.serve(vec![Canned::json(500, "boom")]);

    let err = pinterest
        .upload(&upload(PathBuf::from("clip.mp4")))
        .await
        .unwrap_err();
    assert!(matches!(err, FunnelError::ExternalService { status: 500, ref body, .. } if body == "boom"));
}
