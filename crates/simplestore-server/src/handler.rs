//! GET, HEAD, PUT and DELETE handlers.
//!
//! Each handler runs `parse key -> resolve -> execute -> respond` and never
//! lets an error escape: store failures become a status envelope. Missing
//! values and keys resolving outside the root answer `404` on the read and
//! delete paths; everything else unexpected answers `400`.

use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use httpdate::{fmt_http_date, parse_http_date};
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, error, warn};

use simplestore_store::{FileStore, StoreKey, CHUNK_SIZE};

use crate::mime::{content_type, GuessRegistry, MimeRegistry};
use crate::response::{
    bad_request, envelope, not_found, not_modified, set_light_cache, MSG_DELETED, MSG_UPDATED,
};

/// Shared, immutable state for all requests.
pub struct AppState {
    pub store: FileStore,
    pub mime: Box<dyn MimeRegistry>,
}

impl AppState {
    pub fn new(store: FileStore) -> Self {
        Self::with_registry(store, GuessRegistry)
    }

    pub fn with_registry(store: FileStore, mime: impl MimeRegistry + 'static) -> Self {
        Self {
            store,
            mime: Box::new(mime),
        }
    }
}

pub async fn get_value(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    read_value(&state, &uri, &headers, true).await
}

pub async fn head_value(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    read_value(&state, &uri, &headers, false).await
}

pub async fn put_value(State(state): State<Arc<AppState>>, uri: Uri, body: Body) -> Response {
    let Some(key) = parse_key(&uri) else {
        return bad_request();
    };

    let stream = body.into_data_stream().map_err(io::Error::other);
    let mut reader = StreamReader::new(stream);
    match state.store.replace(&key, &mut reader).await {
        Ok(written) => {
            debug!("PUT key={} ({} bytes)", key, written);
            envelope(StatusCode::OK, MSG_UPDATED)
        }
        Err(e) => {
            error!("Invalid request: PUT key={}: {}", key, e);
            bad_request()
        }
    }
}

pub async fn delete_value(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let Some(key) = parse_key(&uri) else {
        return bad_request();
    };

    match state.store.remove(&key).await {
        Ok(()) => envelope(StatusCode::OK, MSG_DELETED),
        Err(e) if e.is_not_found() => {
            debug!("DELETE key={}: {}", key, e);
            not_found()
        }
        Err(e) => {
            error!("Invalid request: DELETE key={}: {}", key, e);
            bad_request()
        }
    }
}

/// Shared GET/HEAD path. HEAD never opens the file.
async fn read_value(
    state: &AppState,
    uri: &Uri,
    request_headers: &HeaderMap,
    want_body: bool,
) -> Response {
    let Some(key) = parse_key(uri) else {
        return bad_request();
    };

    let lookup = if want_body {
        state.store.open(&key).await.map(|(file, meta)| (Some(file), meta))
    } else {
        state.store.stat(&key).await.map(|meta| (None, meta))
    };
    let (file, meta) = match lookup {
        Ok(found) => found,
        Err(e) if e.is_not_found() => {
            debug!("Invalid request: file not found: {}", e);
            return not_found();
        }
        Err(e) => {
            error!("Invalid request: key={}: {}", key, e);
            return bad_request();
        }
    };

    if is_not_modified(request_headers, meta.modified) {
        return not_modified();
    }

    let mut headers = HeaderMap::new();
    if let Some(mime) = content_type(state.mime.as_ref(), key.as_str()) {
        match HeaderValue::from_str(&mime) {
            Ok(value) => {
                headers.insert(header::CONTENT_TYPE, value);
            }
            Err(_) => warn!("Skipping unusable content type {:?}", mime),
        }
    }
    match http_date(meta.modified).and_then(|d| HeaderValue::from_str(&d).ok()) {
        Some(value) => {
            headers.insert(header::LAST_MODIFIED, value);
        }
        None => debug!("No Last-Modified for key={}: {:?} out of range", key, meta.modified),
    }
    set_light_cache(&mut headers);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.len));

    let body = match file {
        Some(file) => Body::from_stream(ReaderStream::with_capacity(file, CHUNK_SIZE)),
        None => Body::empty(),
    };
    (StatusCode::OK, headers, body).into_response()
}

/// Key from the percent-decoded request path.
fn parse_key(uri: &Uri) -> Option<StoreKey> {
    let path_info = match urlencoding::decode(uri.path()) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Invalid request: undecodable path {:?}: {}", uri.path(), e);
            return None;
        }
    };
    match StoreKey::parse(&path_info) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("Invalid request: {}", e);
            None
        }
    }
}

/// True when the client copy is current: last-modified (at the one-second
/// resolution of HTTP dates) is not after `If-Modified-Since`. Unparseable
/// dates are ignored.
fn is_not_modified(headers: &HeaderMap, modified: SystemTime) -> bool {
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_http_date(v).ok())
    else {
        return false;
    };
    truncate_to_secs(modified) <= since
}

/// Latest instant an HTTP date can express: 9999-12-31T23:59:59Z.
const MAX_HTTP_DATE_SECS: u64 = 253_402_300_799;

/// HTTP date for `t`, or `None` outside 1970..=9999.
fn http_date(t: SystemTime) -> Option<String> {
    let secs = t.duration_since(UNIX_EPOCH).ok()?.as_secs();
    (secs <= MAX_HTTP_DATE_SECS).then(|| fmt_http_date(t))
}

fn truncate_to_secs(t: SystemTime) -> SystemTime {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => UNIX_EPOCH + Duration::from_secs(d.as_secs()),
        Err(_) => t,
    }
}
