use axum::{extract::State, routing::get, Json, Router};
use taghive_schema::HistoryEntry;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_history))
}

async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let runner = state.runner.lock().await;
    Json(runner.history().entries().to_vec())
}
