use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmMessage {
    pub role: String,
    pub content: String,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: text.into(),
        }
    }
}

/// Output contract requested from the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema {
        name: String,
        schema: serde_json::Value,
        #[serde(default)]
        strict: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<LlmMessage>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

fn default_max_tokens() -> u32 {
    256
}

impl LlmRequest {
    pub fn simple(model: String, user: String) -> Self {
        Self {
            model,
            messages: vec![LlmMessage::user(user)],
            max_tokens: default_max_tokens(),
            temperature: None,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Text of the last user turn.
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub stop_reason: Option<String>,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
            stop_reason: Some("end_turn".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_format_json_schema_serde() {
        let format = ResponseFormat::JsonSchema {
            name: "result".into(),
            schema: serde_json::json!({"type": "object"}),
            strict: true,
        };
        let json = serde_json::to_value(&format).unwrap();
        assert_eq!(json["type"], "json_schema");
        assert_eq!(json["name"], "result");
        assert_eq!(json["strict"], true);
    }

    #[test]
    fn llm_request_simple_has_no_sampling_overrides() {
        let req = LlmRequest::simple("model".into(), "hello".into());
        assert_eq!(req.messages.len(), 1);
        assert!(req.temperature.is_none());
        assert!(req.response_format.is_none());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn builder_helpers_set_fields() {
        let format = ResponseFormat::JsonSchema {
            name: "result".into(),
            schema: serde_json::json!({"type": "object"}),
            strict: true,
        };
        let req = LlmRequest::simple("model".into(), "hello".into())
            .with_temperature(0.0)
            .with_max_tokens(64)
            .with_response_format(format.clone());
        assert_eq!(req.temperature, Some(0.0));
        assert_eq!(req.max_tokens, 64);
        assert_eq!(req.response_format, Some(format));
    }

    #[test]
    fn last_user_text_skips_other_roles() {
        let req = LlmRequest {
            model: "m".into(),
            messages: vec![
                LlmMessage::user("first"),
                LlmMessage {
                    role: "assistant".into(),
                    content: "reply".into(),
                },
            ],
            max_tokens: 10,
            temperature: None,
            response_format: None,
        };
        assert_eq!(req.last_user_text(), Some("first"));
    }
}
