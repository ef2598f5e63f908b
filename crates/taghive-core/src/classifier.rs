use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taghive_provider::{LlmProvider, LlmRequest, ResponseFormat};
use taghive_schema::validation::SCHEMA_NAME;
use taghive_schema::{ClassificationResult, ResponseSchema, SchemaValidationError, ValidationMode};

use crate::prompt::build_prompt;
use crate::taxonomy::Taxonomy;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("input text is empty")]
    InputEmpty,
    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaValidationError),
    #[error("llm service error: {0}")]
    Service(#[from] anyhow::Error),
}

impl ClassifyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClassifyError::InputEmpty => FailureKind::InputEmpty,
            ClassifyError::Schema(_) => FailureKind::Schema,
            ClassifyError::Service(_) => FailureKind::Service,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InputEmpty,
    Schema,
    Service,
}

/// Model selection and validation settings, fixed for the client's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub validation: ValidationMode,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 256,
            validation: ValidationMode::Lenient,
        }
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError>;
}

/// Classifies text by asking an LLM for a schema-conformant reply.
pub struct LlmClassifier {
    provider: Arc<dyn LlmProvider>,
    taxonomy: Arc<Taxonomy>,
    schema: ResponseSchema,
    config: ClassifierConfig,
}

impl LlmClassifier {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        taxonomy: Arc<Taxonomy>,
        config: ClassifierConfig,
    ) -> Self {
        let schema = ResponseSchema::new(config.validation, taxonomy.labels());
        Self {
            provider,
            taxonomy,
            schema,
            config,
        }
    }

    /// The exact request `classify` would send for `text`.
    pub fn request_for(&self, text: &str) -> LlmRequest {
        let prompt = build_prompt(&self.taxonomy, text);
        LlmRequest::simple(self.config.model.clone(), prompt)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
            .with_response_format(ResponseFormat::JsonSchema {
                name: SCHEMA_NAME.to_string(),
                schema: self.schema.json_schema(),
                strict: true,
            })
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::InputEmpty);
        }

        let request = self.request_for(text);
        tracing::debug!(model = %self.config.model, chars = text.chars().count(), "sending classification request");

        let response = self.provider.chat(request).await?;
        tracing::debug!(reply = %response.text, "received classification reply");

        Ok(self.schema.validate(&response.text)?)
    }
}
