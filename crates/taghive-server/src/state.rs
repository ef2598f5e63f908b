use std::sync::Arc;

use taghive_core::{InputMode, SessionRunner, TaghiveConfig, Taxonomy, TaxonomyPreset};
use taghive_schema::ValidationMode;
use tokio::sync::Mutex;

/// Shared application state accessible from all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Submissions are serialized through this lock so history is only ever
    /// appended by one analysis at a time.
    pub runner: Arc<Mutex<SessionRunner>>,
    pub taxonomy: Arc<Taxonomy>,
    pub preset: TaxonomyPreset,
    pub validation: ValidationMode,
    pub input_mode: InputMode,
}

impl AppState {
    pub fn new(config: &TaghiveConfig, runner: SessionRunner) -> anyhow::Result<Self> {
        Ok(Self {
            taxonomy: Arc::new(config.taxonomy()?),
            preset: config.classifier.preset,
            validation: config.classifier.validation,
            input_mode: runner.input_mode(),
            runner: Arc::new(Mutex::new(runner)),
        })
    }
}
