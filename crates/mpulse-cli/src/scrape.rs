//! `scrape`: fetch, clean, score and store headlines for one ticker.

use chrono::{NaiveDate, Utc};
use mpulse_core::{AppConfig, DateRange, NewsArticle, NewsSource, Ticker};
use mpulse_db::NewHeadline;
use mpulse_scraper::NewsClient;
use mpulse_sentiment::{analyze_articles, AnalysisReport, Scorer};

/// Which sources a scrape run calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceSelection {
    One(NewsSource),
    /// Every source the configured keys allow.
    All,
}

impl std::str::FromStr for SourceSelection {
    type Err = mpulse_core::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(SourceSelection::All);
        }
        s.parse().map(SourceSelection::One)
    }
}

impl SourceSelection {
    fn resolve(self, client: &NewsClient) -> Vec<NewsSource> {
        match self {
            SourceSelection::One(source) => vec![source],
            SourceSelection::All => NewsSource::ALL
                .into_iter()
                .filter(|&source| client.has_credentials(source))
                .collect(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ScrapeRequest {
    pub ticker: Ticker,
    pub sources: SourceSelection,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Run a scrape. With `pool` set the scored headlines are stored; without it
/// (dry run) they are only printed.
///
/// # Errors
///
/// Returns an error for an invalid date range, client construction failure,
/// a failing single source, or a database write failure. With
/// [`SourceSelection::All`], per-source failures are logged and skipped.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    pool: Option<&sqlx::SqlitePool>,
    request: &ScrapeRequest,
) -> anyhow::Result<()> {
    let range = DateRange::resolve(request.from, request.to, Utc::now().date_naive())?;
    let client = NewsClient::from_app_config(config)?;
    let scorer = Scorer::from_app_config(config)?;
    let ticker = &request.ticker;

    let sources = request.sources.resolve(&client);
    if sources.is_empty() {
        anyhow::bail!("no news source has credentials configured; see `mpulse-cli sources`");
    }

    let articles = collect(&client, request.sources, &sources, ticker, &range).await?;
    let report = analyze_articles(&scorer, articles).await;

    let Some(pool) = pool else {
        print_report(ticker, &report);
        println!(
            "dry-run: would store {} of {} headlines for {ticker}",
            report.kept, report.fetched
        );
        return Ok(());
    };

    let batch: Vec<NewHeadline<'_>> = report
        .headlines
        .iter()
        .map(|h| NewHeadline {
            ticker,
            article: &h.article,
            sentiment_score: h.score,
        })
        .collect();
    let written = mpulse_db::add_headlines(pool, &batch).await?;

    print_report(ticker, &report);
    println!(
        "stored {written} headlines for {ticker} ({} fetched, {} dropped by the cleaner)",
        report.fetched,
        report.fetched - report.kept
    );
    Ok(())
}

async fn collect(
    client: &NewsClient,
    selection: SourceSelection,
    sources: &[NewsSource],
    ticker: &Ticker,
    range: &DateRange,
) -> anyhow::Result<Vec<NewsArticle>> {
    if let SourceSelection::One(source) = selection {
        return Ok(client.fetch(source, ticker, range).await?);
    }

    let mut articles = Vec::new();
    for (source, result) in client.fetch_many(sources, ticker, range).await {
        match result {
            Ok(fetched) => articles.extend(fetched),
            Err(e) => tracing::warn!(
                ticker = %ticker,
                source = %source,
                error = %e,
                "source failed; skipping"
            ),
        }
    }
    Ok(articles)
}

fn print_report(ticker: &Ticker, report: &AnalysisReport) {
    if report.headlines.is_empty() {
        println!("no relevant headlines found for {ticker}");
        return;
    }

    println!("{:<8}{:<11}{:<12}HEADLINE", "SCORE", "SENTIMENT", "SOURCE");
    for h in &report.headlines {
        println!(
            "{:<8.3}{:<11}{:<12}{}",
            h.score,
            h.label().to_string(),
            h.article.source.as_str(),
            h.article.title
        );
    }
    if let Some(avg) = report.average_score() {
        println!();
        println!(
            "average sentiment: {avg:.3} ({})",
            mpulse_core::SentimentLabel::from_score(avg)
        );
    }
}
