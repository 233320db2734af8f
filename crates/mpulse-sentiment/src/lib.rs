//! Headline cleaning, sentiment scoring and summarization for Market Pulse.
//!
//! Fetched headlines are filtered by [`clean_headlines`], scored by a
//! [`Scorer`] (financial lexicon or hosted `FinBERT`) and optionally condensed
//! by a [`Summarizer`]. Storage is left to the caller.

pub mod cleaner;
pub mod error;
pub mod pipeline;
pub mod scorer;
pub mod summarizer;

mod inference;

pub use cleaner::{clean_headlines, is_relevant};
pub use error::SentimentError;
pub use pipeline::{analyze_articles, AnalysisReport, ScoredHeadline};
pub use scorer::{lexicon_score, Classifier, Scorer};
pub use summarizer::{headline_digest, Summarizer, EMPTY_SUMMARY};
