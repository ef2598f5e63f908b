use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze))
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeRequest>) -> Response {
    let mut runner = state.runner.lock().await;
    match runner.analyze(&body.text).await {
        Ok(report) => Json(report).into_response(),
        Err(warning) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "warning": warning.to_string() })),
        )
            .into_response(),
    }
}
