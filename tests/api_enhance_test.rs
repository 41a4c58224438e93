//! Integration tests for POST /api/enhance.

mod common;

use axum::http::StatusCode;
use common::fixtures::{self, SKY};
use common::{assert_json_error, assert_png, decode_png_body, TestApp};
use image::ImageFormat;
use photoglow::models::AppConfig;
use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};

#[tokio::test]
async fn test_enhance_returns_png_download() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/enhance?filename=holiday.jpg", fixtures::gradient_png(24, 16))
        .await;

    assert_png(&response);
    assert_eq!(response.header("x-image-width"), Some("24"));
    assert_eq!(response.header("x-image-height"), Some("16"));
    assert_eq!(
        response.header("content-length"),
        Some(response.body.len().to_string().as_str())
    );

    let disposition = response.header("content-disposition").unwrap();
    assert!(
        disposition.starts_with("attachment; filename=\"holiday-enhanced.png\""),
        "unexpected Content-Disposition: {disposition}"
    );
}

#[tokio::test]
async fn test_enhance_without_filename_uses_photo() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/enhance", fixtures::png(4, 4, SKY))
        .await;

    assert_png(&response);
    assert!(response
        .header("content-disposition")
        .unwrap()
        .contains("filename=\"photo-enhanced.png\""));
}

#[tokio::test]
async fn test_enhance_warmth_only() {
    let app = TestApp::new();

    let response = app
        .post_bytes(
            "/api/enhance?preset=neutral&warmth=10",
            fixtures::png(2, 2, SKY),
        )
        .await;

    assert_png(&response);
    let pixels = decode_png_body(&response);
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(pixels.pixel(x, y), [113, 150, 187, 255]);
        }
    }
}

#[tokio::test]
async fn test_neutral_preset_is_identity() {
    let app = TestApp::new();
    let upload = fixtures::gradient_png(17, 9);
    let original = photoglow::services::decode_image(&upload, 1600)
        .unwrap()
        .buffer;

    let response = app.post_bytes("/api/enhance?preset=none", upload).await;

    assert_png(&response);
    assert_eq!(decode_png_body(&response), original);
}

#[tokio::test]
async fn test_etag_is_sha256_of_body() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/enhance", fixtures::gradient_png(8, 8))
        .await;

    assert_png(&response);
    let expected = format!("\"{}\"", hex::encode(Sha256::digest(&response.body)));
    assert_eq!(response.header("etag"), Some(expected.as_str()));
}

#[tokio::test]
async fn test_same_request_same_result() {
    let app = TestApp::new();
    let upload = fixtures::gradient_png(40, 30);

    let first = app
        .post_bytes("/api/enhance?preset=auto", upload.clone())
        .await;
    let second = app.post_bytes("/api/enhance?preset=auto", upload).await;

    assert_png(&first);
    assert_png(&second);
    assert_eq!(first.header("etag"), second.header("etag"));
}

#[tokio::test]
async fn test_out_of_range_settings_are_clamped() {
    let app = TestApp::new();
    let upload = fixtures::gradient_png(8, 8);

    let wild = app
        .post_bytes("/api/enhance?preset=neutral&brightness=1000", upload.clone())
        .await;
    let max = app
        .post_bytes("/api/enhance?preset=neutral&brightness=60", upload)
        .await;

    assert_png(&wild);
    assert_eq!(wild.body, max.body);
}

#[tokio::test]
async fn test_large_upload_is_downscaled() {
    let app = TestApp::with_config(AppConfig {
        max_dimension: 16,
        ..Default::default()
    });

    let response = app
        .post_bytes("/api/enhance", fixtures::gradient_png(64, 32))
        .await;

    assert_png(&response);
    assert_eq!(response.header("x-image-width"), Some("16"));
    assert_eq!(response.header("x-image-height"), Some("8"));
}

#[tokio::test]
async fn test_accepts_every_supported_format() {
    let app = TestApp::new();

    for format in [
        ImageFormat::Jpeg,
        ImageFormat::Gif,
        ImageFormat::Bmp,
        ImageFormat::WebP,
    ] {
        let response = app
            .post_bytes("/api/enhance", fixtures::gradient_as(format, 12, 10))
            .await;

        assert_png(&response);
        assert_eq!(
            response.header("x-image-width"),
            Some("12"),
            "width for {format:?}"
        );
        assert_eq!(
            response.header("x-image-height"),
            Some("10"),
            "height for {format:?}"
        );
    }
}

#[tokio::test]
async fn test_session_header_is_accepted() {
    let app = TestApp::new();

    let response = app
        .post_bytes_with_headers(
            "/api/enhance",
            &[("X-Session-Id", "tab-1")],
            fixtures::png(6, 6, SKY),
        )
        .await;

    assert_png(&response);
    assert_eq!(app.enhancer.jobs().active().await, 0);
}

#[tokio::test]
async fn test_newer_request_in_session_supersedes_older() {
    let app = TestApp::new();
    let upload = fixtures::gradient_png(1600, 1200);
    let headers = [("X-Session-Id", "slider-drag")];

    let (first, second) = tokio::join!(
        app.post_bytes_with_headers("/api/enhance?brightness=10", &headers, upload.clone()),
        app.post_bytes_with_headers("/api/enhance?brightness=20", &headers, upload),
    );

    assert_json_error(&first, StatusCode::CONFLICT);
    let json: serde_json::Value = first.json();
    assert!(json["error"].as_str().unwrap().contains("Superseded"));

    assert_png(&second);
    assert_eq!(second.header("x-image-width"), Some("1600"));
    assert_eq!(app.enhancer.jobs().active().await, 0);
}

#[tokio::test]
async fn test_empty_body_is_rejected() {
    let app = TestApp::new();

    let response = app.post_bytes("/api/enhance", Vec::new()).await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_image_is_unsupported() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/enhance", b"%PDF-1.7 definitely not a photo".to_vec())
        .await;

    assert_json_error(&response, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_corrupt_image_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/enhance", fixtures::truncated_png())
        .await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_config(AppConfig {
        max_upload_bytes: 1024,
        ..Default::default()
    });

    let response = app.post_bytes("/api/enhance", vec![0u8; 4096]).await;

    assert_json_error(&response, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unknown_preset_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/enhance?preset=vivid", fixtures::png(2, 2, SKY))
        .await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("vivid"));
}

#[tokio::test]
async fn test_non_numeric_setting_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_bytes("/api/enhance?brightness=lots", fixtures::png(2, 2, SKY))
        .await;

    assert_json_error(&response, StatusCode::BAD_REQUEST);
}
