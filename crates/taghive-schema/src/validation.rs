use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{ClassificationResult, Intent, Sentiment};

pub const SCHEMA_NAME: &str = "classification_result";

const CATEGORY_HINT: &str = "ระบุหมวดหมู่เดียวที่เกี่ยวข้องมากที่สุด";
const INTENT_HINT: &str = "ระบุเจตนาเดียวที่เกี่ยวข้องมากที่สุด";
const SENTIMENT_HINT: &str = "ระบุอารมณ์หลักของข้อความ";

/// How strictly the `category` field is checked.
///
/// `intent` and `sentiment` are always closed enumerations. `category` is
/// only required to be a non-empty string unless `Strict` is selected, in
/// which case it must match a taxonomy label.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Category,
    Intent,
    Sentiment,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Category => "category",
            Field::Intent => "intent",
            Field::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("reply is not a JSON object: {0}")]
    Malformed(String),
    #[error("missing required field `{field}`")]
    Missing { field: Field },
    #[error("field `{field}` must be a string")]
    NotAString { field: Field },
    #[error("field `{field}` must not be empty")]
    Empty { field: Field },
    #[error("field `{field}` has value \"{value}\" outside the allowed set")]
    NotAllowed { field: Field, value: String },
}

impl SchemaValidationError {
    /// The offending field, when the failure is attributable to one.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::Malformed(_) => None,
            Self::Missing { field }
            | Self::NotAString { field }
            | Self::Empty { field }
            | Self::NotAllowed { field, .. } => Some(*field),
        }
    }
}

/// Declared output shape of a classification reply.
#[derive(Debug, Clone, Default)]
pub struct ResponseSchema {
    mode: ValidationMode,
    categories: Vec<String>,
}

impl ResponseSchema {
    pub fn new<I, S>(mode: ValidationMode, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// JSON Schema sent to the service as the structured-output contract.
    pub fn json_schema(&self) -> Value {
        let mut category = json!({
            "type": "string",
            "description": CATEGORY_HINT,
        });
        if self.mode == ValidationMode::Strict {
            category["enum"] = json!(self.categories);
        }

        let intents: Vec<&str> = Intent::ALL.iter().map(|i| i.as_str()).collect();
        let sentiments: Vec<&str> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();

        json!({
            "type": "object",
            "properties": {
                "category": category,
                "intent": {
                    "type": "string",
                    "description": INTENT_HINT,
                    "enum": intents,
                },
                "sentiment": {
                    "type": "string",
                    "description": SENTIMENT_HINT,
                    "enum": sentiments,
                },
            },
            "required": ["category", "intent", "sentiment"],
            "additionalProperties": false,
        })
    }

    /// Parse a raw model reply into a result, rejecting anything off-schema.
    pub fn validate(&self, raw: &str) -> Result<ClassificationResult, SchemaValidationError> {
        let body = strip_code_fence(raw.trim());
        let value: Value = serde_json::from_str(body)
            .map_err(|e| SchemaValidationError::Malformed(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(SchemaValidationError::Malformed(
                "expected a JSON object".to_string(),
            ));
        };

        let category = required_str(&map, Field::Category)?;
        let intent = required_str(&map, Field::Intent)?;
        let sentiment = required_str(&map, Field::Sentiment)?;

        if category.trim().is_empty() {
            return Err(SchemaValidationError::Empty {
                field: Field::Category,
            });
        }
        if self.mode == ValidationMode::Strict && !self.categories.iter().any(|c| c == category) {
            return Err(SchemaValidationError::NotAllowed {
                field: Field::Category,
                value: category.to_string(),
            });
        }

        let intent = Intent::from_label(intent).ok_or_else(|| SchemaValidationError::NotAllowed {
            field: Field::Intent,
            value: intent.to_string(),
        })?;
        let sentiment =
            Sentiment::from_label(sentiment).ok_or_else(|| SchemaValidationError::NotAllowed {
                field: Field::Sentiment,
                value: sentiment.to_string(),
            })?;

        Ok(ClassificationResult {
            category: category.to_string(),
            intent,
            sentiment,
        })
    }
}

fn required_str(map: &Map<String, Value>, field: Field) -> Result<&str, SchemaValidationError> {
    match map.get(field.name()) {
        None | Some(Value::Null) => Err(SchemaValidationError::Missing { field }),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(SchemaValidationError::NotAString { field }),
    }
}

// Some OpenAI-compatible backends wrap JSON in a markdown fence even when a
// response format is requested.
fn strip_code_fence(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
