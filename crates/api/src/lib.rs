//! `assetdesk-api` — HTTP surface of the asset inventory console.

pub mod app;
pub mod context;
pub mod middleware;
