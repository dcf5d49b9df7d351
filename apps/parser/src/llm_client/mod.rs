//! LLM client — the single point of entry for all hosted-model calls in the
//! pipeline. No other module may talk to the Anthropic API directly.
//!
//! Model and token budget are hardcoded so that extraction behavior does not
//! drift between deployments of the same build.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ParseError;

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all field-inference calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(1000);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Outcome of a single call attempt, as classified for the retry loop.
pub(crate) enum Attempt<T> {
    Ok(T),
    /// Worth retrying: rate limits, server errors, transport failures.
    Transient(ParseError),
    /// Retrying cannot help: auth failures, client errors.
    Fatal(ParseError),
}

/// Runs `op` up to `max_attempts` times with exponential backoff between
/// attempts (base, 2*base, 4*base, ...). Exhaustion surfaces the last
/// transient error.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    base_backoff: Duration,
    mut op: F,
) -> Result<T, ParseError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut last_error = None;

    for attempt in 0..max_attempts {
        if attempt > 0 {
            let delay = base_backoff * (1 << (attempt - 1));
            warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying LLM call");
            tokio::time::sleep(delay).await;
        }

        match op().await {
            Attempt::Ok(value) => return Ok(value),
            Attempt::Transient(e) => last_error = Some(e),
            Attempt::Fatal(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or(ParseError::RateLimited {
        retries: max_attempts,
    }))
}

/// Client for the Anthropic Messages API with bounded timeout, retry with
/// backoff, and a structured-JSON convenience helper.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Sends one prompt and returns the text content of the response.
    ///
    /// 429 and 5xx responses are retried with exponential backoff; running
    /// out of retries on a 429 surfaces as `RateLimited`. 401/403 map to
    /// `AuthError` immediately.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, ParseError> {
        let request_body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        retry_with_backoff(MAX_RETRIES, BASE_BACKOFF, || self.send_once(&request_body)).await
    }

    async fn send_once(&self, request_body: &MessagesRequest<'_>) -> Attempt<String> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request_body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return Attempt::Transient(ParseError::Http(e)),
        };

        let status = response.status();

        if status.as_u16() == 429 {
            warn!("LLM API rate limited (429)");
            return Attempt::Transient(ParseError::RateLimited {
                retries: MAX_RETRIES,
            });
        }

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "LLM API server error: {body}");
            return Attempt::Transient(ParseError::Internal(anyhow::anyhow!(
                "LLM API error (status {status}): {body}"
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            let error = if status.as_u16() == 401 || status.as_u16() == 403 {
                ParseError::AuthError(message)
            } else {
                ParseError::Internal(anyhow::anyhow!(
                    "LLM API error (status {status}): {message}"
                ))
            };
            return Attempt::Fatal(error);
        }

        let parsed: MessagesResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => return Attempt::Fatal(ParseError::Http(e)),
        };

        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "LLM call succeeded"
        );

        match parsed
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.clone())
        {
            Some(text) => Attempt::Ok(text),
            None => Attempt::Fatal(ParseError::MalformedResponse(
                "response contained no text block".to_string(),
            )),
        }
    }

    /// Calls the LLM and deserializes the text response as JSON. The prompt
    /// must instruct the model to return JSON only; stray markdown code
    /// fences are tolerated and stripped.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, ParseError> {
        let text = self.call(prompt, system).await?;
        let json = strip_code_fences(&text);
        serde_json::from_str(json)
            .map_err(|e| ParseError::MalformedResponse(format!("invalid JSON payload: {e}")))
    }
}

/// Strips a surrounding ```json ... ``` (or plain ```) fence, if any.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
