use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use taghive_core::{InputMode, TaxonomyPreset};
use taghive_schema::{CategoryEntry, Intent, Sentiment, ValidationMode};

use crate::state::AppState;

#[derive(Serialize)]
pub struct TaxonomyView {
    pub preset: TaxonomyPreset,
    pub validation: ValidationMode,
    pub input_mode: InputMode,
    pub categories: Vec<CategoryEntry>,
    pub intents: Vec<&'static str>,
    pub sentiments: Vec<&'static str>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_taxonomy))
}

async fn get_taxonomy(State(state): State<AppState>) -> Json<TaxonomyView> {
    Json(TaxonomyView {
        preset: state.preset,
        validation: state.validation,
        input_mode: state.input_mode,
        categories: state.taxonomy.entries().to_vec(),
        intents: Intent::ALL.iter().map(|i| i.as_str()).collect(),
        sentiments: Sentiment::PROMPT_ORDER.iter().map(|s| s.as_str()).collect(),
    })
}
