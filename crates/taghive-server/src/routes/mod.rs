pub mod analyze;
pub mod history;
pub mod taxonomy;

use axum::{routing::get, Json, Router};

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/analyze", analyze::router())
        .nest("/history", history::router())
        .nest("/taxonomy", taxonomy::router())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
