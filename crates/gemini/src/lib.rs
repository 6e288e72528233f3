//! Generative-text service client.
//!
//! Thin wrapper over the hosted `generateContent` REST endpoint. One prompt
//! in, one completion out: no streaming, no retries, no conversation state.
//! The caller decides what the prompt looks like and what to do with the
//! reply; this crate only owns the wire format and the error taxonomy.

use std::time::Duration;

/// Default API endpoint.
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Upstream requests are cut off after this long rather than pinning a
/// connection for as long as the service cares to hang.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("failed to connect to the generative-text service: {0}")]
    Connect(reqwest::Error),
    #[error("generative-text request failed: {0}")]
    Http(reqwest::Error),
    #[error("generative-text service answered {status}: {body}")]
    Api { status: u16, body: String },
    #[error("the model returned an empty completion")]
    EmptyCompletion,
}

pub type GeminiResult<T> = std::result::Result<T, GeminiError>;

#[derive(Debug, serde::Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, serde::Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Client for the generative-text service.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for the given API key and model name.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` to the model and returns the completion text.
    ///
    /// # Errors
    ///
    /// - `Connect` when the service is unreachable
    /// - `Api` when the service answers a non-success status
    /// - `EmptyCompletion` when the reply carries no text
    /// - `Http` for other transport or decoding failures
    pub async fn generate_content(&self, prompt: &str) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    GeminiError::Connect(e)
                } else {
                    GeminiError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(GeminiError::Http)?;
        completion_text(parsed)
    }
}

/// Concatenated text of the first candidate's parts.
fn completion_text(response: GenerateContentResponse) -> GeminiResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GeminiError::EmptyCompletion);
    }
    Ok(text)
}
