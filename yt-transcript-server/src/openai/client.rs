//! OpenAI HTTP client for making annotation requests.

use crate::error::{Result, ServerError};
use crate::openai::types::{ChatMessage, ChatRequest, ChatResponse};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// Default chat-completions endpoint.
pub const CHAT_COMPLETIONS_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Model used for annotation.
pub const CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Pins the response to the JSON shape overlay consumers parse.
const SYSTEM_PROMPT: &str = r#"Provide output in valid JSON. The data schema should be like this: { "transcript": {transcript string}, "keywords": { "": { "text": {}, "point_of_interest": {} } }, "questions": [] }"#;

/// Rate-limit retries: up to 3 extra attempts, delay doubling each time.
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// OpenAI HTTP client.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

struct OpenAiClientInner {
    endpoint: String,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, CHAT_COMPLETIONS_ENDPOINT)
    }

    /// Create a client against a custom endpoint (proxies, tests).
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(OpenAiClientInner {
                endpoint: endpoint.into(),
                api_key: api_key.into(),
                http: reqwest::Client::new(),
            }),
        }
    }

    /// Compile the annotation prompt around a transcript window.
    pub fn compile_message(transcript: &str) -> String {
        format!(
            "Process and enhance a provided transcript, then extract points of interest and generate follow-up questions. \n\
1. Clean Up Transcript: Read the provided transcript, correct any grammatical errors, and add necessary punctuation to ensure clarity and flow.\n\
2. Extract Points of Interest: Identify key phrases and points of interest such as names, technical terms, key logics and statements.\n\
3. Questions you may ask: Generate several follow up questions based on the transcript's content\n\
4. Map Points to Keywords: Choose a keyword or phrase from the transcript for each identified point of interest.\n\
5. Generate Response: Compile the cleaned transcript, keywords pair, and questions to a JSON response\n\
---\n\
{transcript}"
        )
    }

    /// Send a transcript for annotation and return the model's message
    /// content. HTTP 429 responses are retried with exponential backoff;
    /// any other failure maps to [`ServerError::Upstream`].
    pub async fn annotate(&self, transcript: &str) -> Result<String> {
        let request = ChatRequest {
            model: CHAT_MODEL.to_string(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(Self::compile_message(transcript)),
            ],
        };

        let mut attempt = 0u32;
        let mut delay = INITIAL_BACKOFF;
        loop {
            let response = self
                .inner
                .http
                .post(&self.inner.endpoint)
                .bearer_auth(&self.inner.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| ServerError::Upstream(format!("request failed: {e}")))?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RETRIES {
                attempt += 1;
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited by annotation API, backing off"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            if !response.status().is_success() {
                return Err(ServerError::Upstream(format!(
                    "annotation API returned status {}",
                    response.status()
                )));
            }

            let body: ChatResponse = response
                .json()
                .await
                .map_err(|e| ServerError::Upstream(format!("malformed response: {e}")))?;
            return body
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| ServerError::Upstream("response contained no choices".to_string()));
        }
    }
}
