//! Server-sent notification stream.
//!
//! Every completed mutation publishes a success/warning/error message; this
//! endpoint fans them out to connected consoles, replacing client-local
//! toast state with a shared feed.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::Extension,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/stream", get(stream_notifications))
}

/// GET /notifications/stream
pub async fn stream_notifications(
    Extension(services): Extension<Arc<AppServices>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.subscribe();
    // Lagged receivers drop missed messages rather than erroring the stream.
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(notification) => serde_json::to_string(&notification)
            .ok()
            .map(|data| Ok(SseEvent::default().event("notification").data(data))),
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
