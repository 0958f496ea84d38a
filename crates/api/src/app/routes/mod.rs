use axum::{routing::get, Router};

pub mod catalogs;
pub mod items;
pub mod notifications;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/items", items::router())
        .nest("/catalogs", catalogs::router())
        .nest("/notifications", notifications::router())
}
