use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::models::ChatTurn;
use crate::error::AppError;

use super::CompletionProvider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Persona replies are conversational; cap length and keep sampling warm.
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.8;

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

// ============================================================================
// OpenAiProvider
// ============================================================================

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider with the given API key.
    ///
    /// The underlying `reqwest::Client` is configured with a 30-second timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");

        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for API-compatible services).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Build from environment: `OPENAI_API_KEY` (required), `OPENAI_MODEL`
    /// and `OPENAI_BASE_URL` (optional). Reads `.env` if present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "OPENAI_API_KEY is not configured. Add it to your environment variables."
                        .into(),
                )
            })?;

        let mut provider = Self::new(api_key);
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.trim().is_empty() {
                provider = provider.with_model(model);
            }
        }
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            if !base_url.trim().is_empty() {
                provider = provider.with_base_url(base_url);
            }
        }
        Ok(provider)
    }

    /// Map a non-success HTTP status to the error taxonomy.
    fn status_error(status: reqwest::StatusCode, body: &str) -> AppError {
        let detail = body.chars().take(300).collect::<String>();
        match status.as_u16() {
            401 | 403 => AppError::Auth(format!(
                "Completion service rejected the API key (HTTP {status}): {detail}"
            )),
            429 => AppError::Quota(format!(
                "Completion service quota exceeded (HTTP {status}): {detail}"
            )),
            _ => AppError::Upstream(format!("HTTP {status}: {detail}")),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AppError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: turns,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::debug!(
            model = %self.model,
            turns = turns.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid response body: {e}")))?;

        let reply = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(AppError::EmptyReply);
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Role;

    #[test]
    fn test_request_body_wire_shape() {
        let turns = vec![
            ChatTurn::system("You are role-playing as Ada."),
            ChatTurn::user("hello"),
        ];
        let body = ChatCompletionBody {
            model: "gpt-4o-mini",
            messages: &turns,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Hanji!"}}],"usage":{"total_tokens":12}}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Hanji!")
        );
    }

    #[test]
    fn test_response_with_null_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_status_mapping() {
        use reqwest::StatusCode;
        assert_eq!(
            OpenAiProvider::status_error(StatusCode::UNAUTHORIZED, "bad key").kind(),
            "auth"
        );
        assert_eq!(
            OpenAiProvider::status_error(StatusCode::FORBIDDEN, "").kind(),
            "auth"
        );
        assert_eq!(
            OpenAiProvider::status_error(StatusCode::TOO_MANY_REQUESTS, "").kind(),
            "quota"
        );
        assert_eq!(
            OpenAiProvider::status_error(StatusCode::INTERNAL_SERVER_ERROR, "").kind(),
            "upstream"
        );
    }

    #[test]
    fn test_builders_override_defaults() {
        let provider = OpenAiProvider::new("sk-test")
            .with_model("gpt-4o")
            .with_base_url("http://localhost:11434/v1");
        assert_eq!(provider.model, "gpt-4o");
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_turn_roles_serialize_for_wire() {
        let turn = ChatTurn { role: Role::Assistant, content: "hi".into() };
        assert_eq!(serde_json::to_value(&turn).unwrap()["role"], "assistant");
    }
}
