use axum::{extract::Extension, Json};
use serde_json::json;

use crate::context::PrincipalContext;

/// GET /health — public liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /whoami — echo the authenticated identity.
pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Json<serde_json::Value> {
    Json(json!({
        "user_id": principal.user_id().to_string(),
        "name": principal.name(),
    }))
}
