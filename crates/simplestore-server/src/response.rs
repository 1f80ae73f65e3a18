//! Status envelope and cache headers.
//!
//! Every response that is not a value body carries a compact JSON envelope
//! `{"status":"success"|"error","message":"..."}` followed by CRLF, served
//! with a strict no-cache directive. Value bodies and `304` responses use the
//! short-lived "light" cache directive instead.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

pub const MSG_UPDATED: &str = "updated";
pub const MSG_DELETED: &str = "deleted";
pub const MSG_NOT_FOUND: &str = "Not Found";
pub const MSG_BAD_REQUEST: &str = "Bad request";

const NO_CACHE: &str = "private, no-cache, no-store";
const LIGHT_CACHE: &str = "must-revalidate, max-age=1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

impl EnvelopeStatus {
    /// `error` for 4xx and 5xx, `success` otherwise.
    pub fn for_code(code: StatusCode) -> Self {
        if (400..=599).contains(&code.as_u16()) {
            Self::Error
        } else {
            Self::Success
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: EnvelopeStatus,
    pub message: String,
}

impl Envelope {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::for_code(code),
            message: message.into(),
        }
    }

    /// Compact JSON terminated by CRLF.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = serde_json::to_vec(self)?;
        out.extend_from_slice(b"\r\n");
        Ok(out)
    }
}

/// Build an envelope response for `code`.
pub fn envelope(code: StatusCode, message: &str) -> Response {
    let mut headers = HeaderMap::new();
    set_no_cache(&mut headers);
    let body = match Envelope::new(code, message).to_bytes() {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to encode envelope: {}", e);
            Vec::new()
        }
    };
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    (code, headers, Body::from(body)).into_response()
}

pub fn bad_request() -> Response {
    envelope(StatusCode::BAD_REQUEST, MSG_BAD_REQUEST)
}

pub fn not_found() -> Response {
    envelope(StatusCode::NOT_FOUND, MSG_NOT_FOUND)
}

/// `304`, zero length, light cache.
pub fn not_modified() -> Response {
    let mut headers = HeaderMap::new();
    set_light_cache(&mut headers);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(0u64));
    (StatusCode::NOT_MODIFIED, headers).into_response()
}

pub fn set_no_cache(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
}

pub fn set_light_cache(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(LIGHT_CACHE));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(EnvelopeStatus::for_code(StatusCode::OK), EnvelopeStatus::Success);
        assert_eq!(EnvelopeStatus::for_code(StatusCode::NOT_MODIFIED), EnvelopeStatus::Success);
        assert_eq!(EnvelopeStatus::for_code(StatusCode::BAD_REQUEST), EnvelopeStatus::Error);
        assert_eq!(EnvelopeStatus::for_code(StatusCode::NOT_FOUND), EnvelopeStatus::Error);
        assert_eq!(
            EnvelopeStatus::for_code(StatusCode::INTERNAL_SERVER_ERROR),
            EnvelopeStatus::Error
        );
    }

    #[test]
    fn envelope_wire_format() {
        let bytes = Envelope::new(StatusCode::OK, MSG_UPDATED).to_bytes().unwrap();
        assert_eq!(bytes, b"{\"status\":\"success\",\"message\":\"updated\"}\r\n");
        let bytes = Envelope::new(StatusCode::NOT_FOUND, MSG_NOT_FOUND).to_bytes().unwrap();
        assert_eq!(bytes, b"{\"status\":\"error\",\"message\":\"Not Found\"}\r\n");
    }

    #[test]
    fn envelope_response_headers() {
        let resp = envelope(StatusCode::OK, MSG_DELETED);
        assert_eq!(resp.status(), StatusCode::OK);
        let h = resp.headers();
        assert_eq!(h[header::CONTENT_TYPE], "application/json");
        assert_eq!(h[header::CONTENT_LENGTH], "42");
        assert_eq!(h[header::CACHE_CONTROL], "private, no-cache, no-store");
        assert_eq!(h[header::PRAGMA], "no-cache");
    }

    #[test]
    fn not_modified_headers() {
        let resp = not_modified();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "0");
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "must-revalidate, max-age=1");
    }
}
