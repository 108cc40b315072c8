use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

const SYSTEM_PROMPT: &str = "You are an expert code reviewer. Review the provided code for bugs, \
performance issues, security vulnerabilities and best practices. Be concise and specific, \
and format your response in markdown with a section for each category.";

const GENERIC_API_ERROR: &str = "Failed to get a review from the AI service";

/// Outbound review call. One request per review, no retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, code: &str, credential: &str) -> Result<String>;
}

// Chat completion request format
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

impl ApiError {
    fn into_error(self) -> Error {
        Error::Api(
            self.message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_API_ERROR.to_string()),
        )
    }
}

// OpenAI-compatible chat completion client
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, code: &str, credential: &str) -> Result<String> {
        let prompt = format!("Please review this code:\n\n{code}");
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        debug!(%status, model = %self.model, "completion API responded");

        if !status.is_success() {
            // error body is best effort, fall back to a generic message
            let body = res.bytes().await.unwrap_or_default();
            return Err(match serde_json::from_slice::<ErrorEnvelope>(&body) {
                Ok(ErrorEnvelope { error: Some(err) }) => err.into_error(),
                _ => Error::Api(GENERIC_API_ERROR.to_string()),
            });
        }

        let body: ChatResponse = res.json().await?;
        if let Some(err) = body.error {
            return Err(err.into_error());
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Api("The AI service returned an empty review".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(reqwest::Client::new(), &server.base_url(), "test-model", 256)
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .body_contains("console.log(1)")
                    .body_contains("\"model\":\"test-model\"")
                    .body_contains("\"max_tokens\":256");
                then.status(200).json_body(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "## Bugs\nNone." } }]
                }));
            })
            .await;

        let review = client_for(&server)
            .complete("console.log(1)", "sk-test")
            .await
            .unwrap();

        assert_eq!(review, "## Bugs\nNone.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn forwards_provider_error_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(401).json_body(json!({
                    "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
                }));
            })
            .await;

        let err = client_for(&server).complete("x", "bad").await.unwrap_err();
        assert!(matches!(err, Error::Api(ref m) if m == "Incorrect API key provided"));
    }

    #[tokio::test]
    async fn generic_message_without_error_payload() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(502).body("bad gateway");
            })
            .await;

        let err = client_for(&server).complete("x", "sk").await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_API_ERROR);
    }

    #[tokio::test]
    async fn error_payload_on_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .json_body(json!({ "error": { "message": "model overloaded" } }));
            })
            .await;

        let err = client_for(&server).complete("x", "sk").await.unwrap_err();
        assert_eq!(err.to_string(), "model overloaded");
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        // nothing listens on port 9 locally
        let client = OpenAiClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "m", 1);
        let err = client.complete("x", "sk").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
