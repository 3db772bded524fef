//! HTTP handlers: thin adapters between axum and the service layer.

pub mod auth_handlers;
pub mod health_handlers;
pub mod product_handlers;
pub mod user_handlers;

use crate::services::blob_service::BlobMeta;
use axum::{
    body::Body,
    http::{HeaderValue, header},
    response::Response,
};

/// Build a raw-bytes image response with sniffed content type.
pub(crate) fn image_response(meta: &BlobMeta, bytes: Vec<u8>) -> Response {
    let content_type = detect_content_type(&bytes);

    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(value) = HeaderValue::from_str(&meta.size_bytes.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    response
}

/// Sniff an image content type from the payload's magic bytes.
pub(crate) fn detect_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"BM") {
        "image/bmp"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::detect_content_type;

    #[test]
    fn sniffs_common_image_formats() {
        assert_eq!(
            detect_content_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]),
            "image/jpeg"
        );
        assert_eq!(
            detect_content_type(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            "image/png"
        );
        assert_eq!(detect_content_type(b"GIF89a...."), "image/gif");
        assert_eq!(detect_content_type(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(detect_content_type(b"BM\x00\x00"), "image/bmp");
        assert_eq!(detect_content_type(b"plain text"), "application/octet-stream");
        assert_eq!(detect_content_type(&[]), "application/octet-stream");
    }
}
