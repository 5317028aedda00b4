pub mod auth;
pub mod clients;
mod common;
pub mod subscription;

use axum::{Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/plans", get(subscription::list_plans))
        .nest("/subscription", subscription::router())
        .nest("/clients", clients::router())
}
