pub mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use validation::{Field, ResponseSchema, SchemaValidationError, ValidationMode};

/// One taxonomy bucket shown to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
    pub label: String,
    pub description: String,
}

impl CategoryEntry {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

/// What the author of a message is trying to do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    #[serde(rename = "ร้องเรียน/มีปัญหา")]
    Complaint,
    #[serde(rename = "สอบถาม")]
    Inquiry,
    #[serde(rename = "ข้อเสนอแนะ")]
    Suggestion,
    #[serde(rename = "แบ่งปันประสบการณ์")]
    SharingExperience,
    #[serde(rename = "ประชด/เสียดสี")]
    Sarcasm,
    #[serde(rename = "เจตนาอื่น ๆ")]
    Other,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Complaint,
        Intent::Inquiry,
        Intent::Suggestion,
        Intent::SharingExperience,
        Intent::Sarcasm,
        Intent::Other,
    ];

    /// Wire label, identical to what the model must answer with.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Complaint => "ร้องเรียน/มีปัญหา",
            Intent::Inquiry => "สอบถาม",
            Intent::Suggestion => "ข้อเสนอแนะ",
            Intent::SharingExperience => "แบ่งปันประสบการณ์",
            Intent::Sarcasm => "ประชด/เสียดสี",
            Intent::Other => "เจตนาอื่น ๆ",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == label)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Order used when listing the options in a prompt.
    pub const PROMPT_ORDER: [Sentiment; 3] =
        [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply that passed schema validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category: String,
    pub intent: Intent,
    pub sentiment: Sentiment,
}

/// Display row kept in the session history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub message: String,
    pub category: String,
    pub intent: Intent,
    pub sentiment: Sentiment,
}

impl HistoryEntry {
    pub fn new(message: impl Into<String>, result: ClassificationResult) -> Self {
        Self {
            message: message.into(),
            category: result.category,
            intent: result.intent,
            sentiment: result.sentiment,
        }
    }
}
