use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use assetdesk_core::ItemNo;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route(
            "/:item_no",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/:item_no/ledger", get(get_item_ledger))
}

fn parse_item_no(raw: &str) -> Result<ItemNo, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            "item number must look like ITM-YY-NNNNN",
        )
    })
}

/// GET /items — one page of the active view, filtered and newest first.
pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    match services.browse(&principal, query.into_browse_request()).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// POST /items — create under a freshly allocated identifier.
pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    match services.add_item(&principal, body.into_draft()).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(dto::MutationResponse::from_outcome(outcome)),
        )
            .into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(item_no): Path<String>,
) -> axum::response::Response {
    let item_no = match parse_item_no(&item_no) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.item_details(&principal, &item_no).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(item_no): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    let item_no = match parse_item_no(&item_no) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services
        .edit_item(&principal, &item_no, body.into_patch())
        .await
    {
        Ok(outcome) => Json(dto::MutationResponse::from_outcome(outcome)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// DELETE /items/:item_no — soft delete; the identifier is never reissued.
pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(item_no): Path<String>,
) -> axum::response::Response {
    let item_no = match parse_item_no(&item_no) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.remove_item(&principal, &item_no).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// GET /items/:item_no/ledger — audit trail, newest first. Works for
/// soft-deleted items too.
pub async fn get_item_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(item_no): Path<String>,
) -> axum::response::Response {
    let item_no = match parse_item_no(&item_no) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.trail(&principal, &item_no).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
