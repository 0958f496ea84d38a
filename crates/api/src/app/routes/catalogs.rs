//! Reference catalog endpoints. Each catalog supports list and inline add,
//! the way the console's dropdowns do.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/departments", get(list_departments).post(create_department))
        .route("/conditions", get(list_conditions).post(create_condition))
        .route("/statuses", get(list_statuses).post(create_status))
        .route("/recipients", get(list_recipients).post(create_recipient))
        .route(
            "/purchase-orders",
            get(list_purchase_orders).post(create_purchase_order),
        )
        .route("/purchase-orders/linked", get(list_linked_purchase_orders))
}

pub async fn list_departments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.departments(&principal).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn create_department(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateDepartmentRequest>,
) -> axum::response::Response {
    match services.add_department(&principal, body.into_new()).await {
        Ok(dept) => (StatusCode::CREATED, Json(dept)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_conditions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.conditions(&principal).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn create_condition(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateConditionRequest>,
) -> axum::response::Response {
    match services.add_condition(&principal, body.into_new()).await {
        Ok(condition) => (StatusCode::CREATED, Json(condition)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_statuses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.statuses(&principal).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn create_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateStatusRequest>,
) -> axum::response::Response {
    match services.add_status(&principal, body.into_new()).await {
        Ok(status) => (StatusCode::CREATED, Json(status)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_recipients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.recipients(&principal).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn create_recipient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateRecipientRequest>,
) -> axum::response::Response {
    match services.add_recipient(&principal, body.into_new()).await {
        Ok(recipient) => (StatusCode::CREATED, Json(recipient)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_purchase_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.purchase_orders(&principal).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn create_purchase_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreatePurchaseOrderRequest>,
) -> axum::response::Response {
    match services.add_purchase_order(&principal, body.into_new()).await {
        Ok(po) => (StatusCode::CREATED, Json(po)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// GET /catalogs/purchase-orders/linked — purchase orders referenced by at
/// least one active item.
pub async fn list_linked_purchase_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.linked_purchase_orders(&principal).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
