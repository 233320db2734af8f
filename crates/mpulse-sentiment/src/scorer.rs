//! Headline sentiment scoring: a financial-news lexicon and a hosted
//! pretrained classifier, both mapped to a compound score in `[-1.0, 1.0]`.

use mpulse_core::{AppConfig, SentimentBackend};
use serde::Deserialize;

use crate::error::SentimentError;
use crate::inference::{truncate_chars, InferenceClient};

/// Characters of a headline sent to the classifier.
const CLASSIFIER_MAX_CHARS: usize = 512;

/// Financial-news word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("gain", 0.4),
    ("gains", 0.4),
    ("surge", 0.6),
    ("surges", 0.6),
    ("soar", 0.6),
    ("soars", 0.6),
    ("jump", 0.5),
    ("jumps", 0.5),
    ("rally", 0.5),
    ("rallies", 0.5),
    ("rise", 0.3),
    ("rises", 0.3),
    ("climb", 0.3),
    ("climbs", 0.3),
    ("beat", 0.4),
    ("beats", 0.4),
    ("record", 0.3),
    ("profit", 0.4),
    ("profits", 0.4),
    ("growth", 0.4),
    ("strong", 0.4),
    ("upgrade", 0.5),
    ("upgraded", 0.5),
    ("outperform", 0.5),
    ("bullish", 0.6),
    ("buy", 0.3),
    ("wins", 0.4),
    ("win", 0.4),
    ("approval", 0.4),
    ("approved", 0.4),
    ("dividend", 0.3),
    ("buyback", 0.3),
    ("expands", 0.3),
    ("boost", 0.4),
    ("boosts", 0.4),
    ("optimistic", 0.5),
    ("positive", 0.4),
    ("high", 0.2),
    // Negative signals
    ("loss", -0.5),
    ("losses", -0.5),
    ("fall", -0.4),
    ("falls", -0.4),
    ("drop", -0.4),
    ("drops", -0.4),
    ("decline", -0.4),
    ("declines", -0.4),
    ("slump", -0.6),
    ("slumps", -0.6),
    ("plunge", -0.7),
    ("plunges", -0.7),
    ("crash", -0.8),
    ("tumble", -0.6),
    ("tumbles", -0.6),
    ("slip", -0.3),
    ("slips", -0.3),
    ("miss", -0.4),
    ("misses", -0.4),
    ("weak", -0.4),
    ("downgrade", -0.5),
    ("downgraded", -0.5),
    ("underperform", -0.5),
    ("bearish", -0.6),
    ("sell", -0.3),
    ("lawsuit", -0.5),
    ("probe", -0.4),
    ("fraud", -0.8),
    ("penalty", -0.5),
    ("fine", -0.3),
    ("fined", -0.4),
    ("default", -0.7),
    ("bankruptcy", -0.9),
    ("layoffs", -0.5),
    ("warns", -0.4),
    ("warning", -0.4),
    ("cut", -0.3),
    ("cuts", -0.3),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("risk", -0.2),
    ("low", -0.2),
];

/// Words that flip the weight of the next lexicon match.
const NEGATORS: &[&str] = &["not", "no", "never"];

fn lexicon_weight(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|&&(lex_word, _)| lex_word == word)
        .map(|&(_, weight)| weight)
}

/// Score a text string using the financial lexicon.
///
/// Splits text into lowercase words stripped of non-alphabetic edges and sums
/// matching weights. A negator ("not", "no", "never") flips the sign of the
/// next matched word. The result is clamped to `[-1.0, 1.0]`; empty or
/// unknown text scores `0.0`.
#[must_use]
pub fn lexicon_score(text: &str) -> f64 {
    let mut score = 0.0_f64;
    let mut negate = false;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if NEGATORS.contains(&w.as_str()) {
            negate = true;
            continue;
        }
        if let Some(weight) = lexicon_weight(&w) {
            score += if negate { -weight } else { weight };
            negate = false;
        }
    }
    score.clamp(-1.0, 1.0)
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Text-classification output: one list per input, or a flat list for a
/// single input depending on the serving stack.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierOutput {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifierOutput {
    fn into_labels(self) -> Vec<LabelScore> {
        match self {
            ClassifierOutput::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassifierOutput::Flat(labels) => labels,
        }
    }
}

/// Compound score of the highest-scoring label: positive is `+score`,
/// negative is `-score`, anything else is neutral.
fn compound_from_labels(labels: &[LabelScore]) -> Option<f64> {
    let top = labels.iter().max_by(|a, b| a.score.total_cmp(&b.score))?;
    let signed = match top.label.to_lowercase().as_str() {
        "positive" => top.score,
        "negative" => -top.score,
        _ => 0.0,
    };
    Some(signed.clamp(-1.0, 1.0))
}

/// Hosted pretrained sentiment classifier (FinBERT by default).
#[derive(Clone)]
pub struct Classifier {
    inference: InferenceClient,
    model: String,
}

impl Classifier {
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

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify one headline.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the request fails or the model returns
    /// no labels.
    pub async fn classify(&self, text: &str) -> Result<f64, SentimentError> {
        let output: ClassifierOutput = self
            .inference
            .run(
                &self.model,
                truncate_chars(text, CLASSIFIER_MAX_CHARS),
                None::<()>,
            )
            .await?;
        compound_from_labels(&output.into_labels())
            .ok_or_else(|| SentimentError::Inference(format!("{} returned no labels", self.model)))
    }
}

/// The configured scoring backend.
#[derive(Clone)]
pub enum Scorer {
    Lexicon,
    Classifier(Classifier),
}

impl Scorer {
    /// Builds the backend selected by `MPULSE_SENTIMENT_BACKEND`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the classifier HTTP client cannot
    /// be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SentimentError> {
        match config.sentiment_backend {
            SentimentBackend::Lexicon => Ok(Scorer::Lexicon),
            SentimentBackend::FinBert => {
                if config.hf_api_token.is_none() {
                    tracing::warn!(
                        model = %config.sentiment_model,
                        "HF_API_TOKEN not set; classifier calls will be anonymous"
                    );
                }
                Ok(Scorer::Classifier(Classifier::new(
                    &config.inference_url,
                    config.hf_api_token.clone(),
                    &config.sentiment_model,
                    config.http_timeout_secs,
                )?))
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Scorer::Lexicon => "lexicon",
            Scorer::Classifier(classifier) => classifier.model(),
        }
    }

    /// Compound score for `text`.
    ///
    /// A classifier failure falls back to the lexicon score for that text.
    pub async fn score(&self, text: &str) -> f64 {
        match self {
            Scorer::Lexicon => lexicon_score(text),
            Scorer::Classifier(classifier) => match classifier.classify(text).await {
                Ok(score) => score,
                Err(e) => {
                    tracing::warn!(
                        model = classifier.model(),
                        error = %e,
                        "classifier failed; using lexicon score"
                    );
                    lexicon_score(text)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, f64)]) -> Vec<LabelScore> {
        pairs
            .iter()
            .map(|&(label, score)| LabelScore {
                label: label.to_string(),
                score,
            })
            .collect()
    }

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_words_return_zero() {
        assert_eq!(lexicon_score("company holds annual general meeting"), 0.0);
    }

    #[test]
    fn positive_headline_scores_positive() {
        let score = lexicon_score("Reliance shares surge after record quarterly profit");
        assert!(score > 0.1, "expected good news, got {score}");
    }

    #[test]
    fn negative_headline_scores_negative() {
        let score = lexicon_score("Bank shares plunge as regulator opens fraud probe");
        assert!(score < -0.1, "expected bad news, got {score}");
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert!((lexicon_score("PROFIT!") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn negation_flips_next_match() {
        assert!((lexicon_score("Analysts see no growth this year") + 0.4).abs() < 1e-9);
        assert!((lexicon_score("not weak after all") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn negation_applies_once() {
        // "never" flips "miss" only; "gains" keeps its sign.
        let score = lexicon_score("never a miss, gains continue");
        assert!((score - 0.8).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn score_is_clamped() {
        let score = lexicon_score("surge soar rally jump bullish surge soar");
        assert!((score - 1.0).abs() < f64::EPSILON);
        let score = lexicon_score("crash plunge bankruptcy fraud default");
        assert!((score + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn top_label_maps_to_signed_score() {
        let positive = labels(&[("positive", 0.9), ("negative", 0.05), ("neutral", 0.05)]);
        assert_eq!(compound_from_labels(&positive), Some(0.9));

        let negative = labels(&[("neutral", 0.2), ("Negative", 0.7), ("positive", 0.1)]);
        assert_eq!(compound_from_labels(&negative), Some(-0.7));

        let neutral = labels(&[("neutral", 0.8), ("positive", 0.1)]);
        assert_eq!(compound_from_labels(&neutral), Some(0.0));

        assert_eq!(compound_from_labels(&[]), None);
    }

    #[test]
    fn classifier_output_accepts_both_shapes() {
        let nested: ClassifierOutput =
            serde_json::from_str(r#"[[{"label":"positive","score":0.6}]]"#).unwrap();
        assert_eq!(nested.into_labels().len(), 1);
        let flat: ClassifierOutput = serde_json::from_str(
            r#"[{"label":"negative","score":0.6},{"label":"neutral","score":0.4}]"#,
        )
        .unwrap();
        assert_eq!(flat.into_labels().len(), 2);
    }

    #[test]
    fn finbert_backend_builds_without_token() {
        let mut config = mpulse_core::load_app_config_from_env().expect("config");
        config.sentiment_backend = SentimentBackend::FinBert;
        config.hf_api_token = None;
        config.sentiment_model = "ProsusAI/finbert".to_string();

        let scorer = Scorer::from_app_config(&config).expect("scorer");
        assert!(matches!(scorer, Scorer::Classifier(_)));
        assert_eq!(scorer.name(), "ProsusAI/finbert");

        config.sentiment_backend = SentimentBackend::Lexicon;
        let scorer = Scorer::from_app_config(&config).expect("scorer");
        assert_eq!(scorer.name(), "lexicon");
    }
}
