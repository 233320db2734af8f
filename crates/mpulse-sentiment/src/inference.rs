//! Client for a hosted model inference API (Hugging Face compatible).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SentimentError;

/// HTTP client for `POST {base_url}/models/{model}`.
#[derive(Clone)]
pub(crate) struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct InferenceRequest<'a, P: Serialize> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<P>,
    options: InferenceOptions,
}

/// Hosted models cold-start; block until loaded instead of failing with 503.
#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

impl InferenceClient {
    pub(crate) fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Runs `model` on `inputs` and decodes the JSON answer.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Inference`] on a non-2xx status or an
    /// undecodable body, and [`SentimentError::Http`] on transport failure.
    pub(crate) async fn run<P, T>(
        &self,
        model: &str,
        inputs: &str,
        parameters: Option<P>,
    ) -> Result<T, SentimentError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}/models/{model}", self.base_url);
        let mut request = self.client.post(&url).json(&InferenceRequest {
            inputs,
            parameters,
            options: InferenceOptions {
                wait_for_model: true,
            },
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SentimentError::Inference(format!(
                "{model} returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SentimentError::Inference(format!("{model} response parse error: {e}")))
    }
}

/// The first `max_chars` characters of `text`, never splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
