//! Abstractive summaries of a ticker's headlines via a hosted model.

use mpulse_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::inference::{truncate_chars, InferenceClient};

/// Returned for empty input without calling the model.
pub const EMPTY_SUMMARY: &str = "Not enough text to generate a summary.";

/// Characters of input text sent to the summarization model.
const SUMMARY_MAX_CHARS: usize = 1024;

#[derive(Serialize)]
struct SummaryParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

const PARAMETERS: SummaryParameters = SummaryParameters {
    max_length: 100,
    min_length: 25,
    do_sample: false,
};

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Joins headlines into the text fed to the summarizer.
#[must_use]
pub fn headline_digest<S: AsRef<str>>(headlines: &[S]) -> String {
    headlines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(". ")
}

#[derive(Clone)]
pub struct Summarizer {
    inference: InferenceClient,
    model: String,
}

impl Summarizer {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(
        inference_url: &str,
        token: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        Ok(Self {
            inference: InferenceClient::new(inference_url, token, timeout_secs)?,
            model: model.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SentimentError> {
        Self::new(
            &config.inference_url,
            config.hf_api_token.clone(),
            &config.summary_model,
            config.http_timeout_secs,
        )
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Summarize `text`, truncated to its first 1024 characters.
    ///
    /// Empty or whitespace-only text returns [`EMPTY_SUMMARY`].
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the model call fails or returns no summary.
    pub async fn summarize(&self, text: &str) -> Result<String, SentimentError> {
        if text.trim().is_empty() {
            return Ok(EMPTY_SUMMARY.to_string());
        }

        let outputs: Vec<SummaryOutput> = self
            .inference
            .run(
                &self.model,
                truncate_chars(text, SUMMARY_MAX_CHARS),
                Some(&PARAMETERS),
            )
            .await?;

        let summary = outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text.trim().to_string())
            .ok_or_else(|| {
                SentimentError::Inference(format!("{} returned no summary", self.model))
            })?;

        tracing::debug!(model = %self.model, chars = summary.len(), "generated summary");
        Ok(summary)
    }
}
