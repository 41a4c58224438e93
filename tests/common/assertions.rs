//! Assertion helpers for tests.

use axum::http::StatusCode;
use photo_tone::PixelBuffer;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is a valid PNG image
pub fn assert_png(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_png(),
        "Expected PNG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..8.min(response.body.len())]
    );

    assert_eq!(
        response.header("content-type"),
        Some("image/png"),
        "Expected Content-Type: image/png"
    );
}

/// Assert an error response with the given status and JSON body
pub fn assert_json_error(response: &TestResponse, expected: StatusCode) {
    assert_status(response, expected);

    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(expected.as_u16() as u64),
        "Expected JSON status {}, got {:?}. Full response: {}",
        expected.as_u16(),
        json["status"],
        serde_json::to_string_pretty(&json).unwrap()
    );
    assert!(
        json["error"].as_str().is_some_and(|e| !e.is_empty()),
        "Error response should carry a message: {json}"
    );
}

/// Decode a PNG response body back into pixels
pub fn decode_png_body(response: &TestResponse) -> PixelBuffer {
    photoglow::services::decode_image(&response.body, u32::MAX)
        .expect("Response body should decode")
        .buffer
}
