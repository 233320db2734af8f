//! Clean-then-score pass over freshly fetched headlines.

use mpulse_core::{NewsArticle, SentimentLabel};
use serde::Serialize;

use crate::cleaner::clean_headlines;
use crate::scorer::Scorer;

/// A kept headline with its compound score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredHeadline {
    pub article: NewsArticle,
    pub score: f64,
}

impl ScoredHeadline {
    #[must_use]
    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.score)
    }
}

/// Outcome of one analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Articles handed in, before cleaning.
    pub fetched: usize,
    /// Articles that survived cleaning.
    pub kept: usize,
    pub headlines: Vec<ScoredHeadline>,
}

impl AnalysisReport {
    /// Mean score of the kept headlines, `None` when nothing was kept.
    #[must_use]
    pub fn average_score(&self) -> Option<f64> {
        if self.headlines.is_empty() {
            return None;
        }
        let sum: f64 = self.headlines.iter().map(|h| h.score).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.headlines.len() as f64;
        Some(sum / count)
    }
}

/// Clean `articles`, then score every kept headline with `scorer`.
///
/// Scraping and storage are the caller's concern. Classifier failures fall
/// back per headline (see [`Scorer::score`]), so this never fails.
pub async fn analyze_articles(scorer: &Scorer, articles: Vec<NewsArticle>) -> AnalysisReport {
    let fetched = articles.len();
    let kept_articles = clean_headlines(articles);
    let kept = kept_articles.len();

    let mut headlines = Vec::with_capacity(kept);
    for article in kept_articles {
        let score = scorer.score(&article.title).await;
        headlines.push(ScoredHeadline { article, score });
    }

    tracing::info!(
        scorer = scorer.name(),
        fetched,
        kept,
        "scored headlines"
    );

    AnalysisReport {
        fetched,
        kept,
        headlines,
    }
}
