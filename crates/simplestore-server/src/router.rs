use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the store router. Every path below `base_path` is a key; the bare
/// prefix itself is routed too so an empty key gets a proper `400`.
pub fn build_router(state: Arc<AppState>, base_path: &str) -> Router {
    let verbs = get(handler::get_value)
        .head(handler::head_value)
        .put(handler::put_value)
        .delete(handler::delete_value);

    let store = Router::new()
        .route("/", verbs.clone())
        .route("/*key", verbs)
        .with_state(state);

    let app = if base_path.is_empty() {
        store
    } else {
        Router::new().nest(base_path, store)
    };
    app.layer(TraceLayer::new_for_http())
}
