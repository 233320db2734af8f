//! Read-side commands: stored headlines, daily trend and summaries.

use mpulse_core::{AppConfig, SentimentLabel, Ticker};
use mpulse_sentiment::{headline_digest, Summarizer};
use sqlx::SqlitePool;

const SUMMARY_HEADLINE_LIMIT: i64 = 50;

pub(crate) async fn run_headlines(
    pool: &SqlitePool,
    ticker: &Ticker,
    limit: i64,
) -> anyhow::Result<()> {
    let rows = mpulse_db::get_headlines(pool, ticker, limit.clamp(1, 500)).await?;
    if rows.is_empty() {
        println!(
            "no stored headlines for {ticker}; run `mpulse-cli scrape --ticker {ticker}` first"
        );
        return Ok(());
    }

    println!(
        "{:<12}{:<8}{:<11}{:<12}HEADLINE",
        "PUBLISHED", "SCORE", "SENTIMENT", "SOURCE"
    );
    for row in &rows {
        let published = row
            .published_at
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        println!(
            "{:<12}{:<8.3}{:<11}{:<12}{}",
            published,
            row.sentiment_score,
            SentimentLabel::from_score(row.sentiment_score).to_string(),
            row.source.as_deref().unwrap_or("-"),
            row.headline
        );
    }
    Ok(())
}

pub(crate) async fn run_trend(pool: &SqlitePool, ticker: &Ticker) -> anyhow::Result<()> {
    let days = mpulse_db::get_sentiment_over_time(pool, ticker).await?;
    if days.is_empty() {
        println!("no dated headlines stored for {ticker}");
        return Ok(());
    }

    println!("{:<12}{:<10}SENTIMENT", "DATE", "AVG");
    for day in &days {
        println!(
            "{:<12}{:<10.3}{}",
            day.day.to_string(),
            day.avg_sentiment,
            SentimentLabel::from_score(day.avg_sentiment)
        );
    }
    Ok(())
}

pub(crate) async fn run_tickers(pool: &SqlitePool) -> anyhow::Result<()> {
    let summaries = mpulse_db::list_ticker_summaries(pool).await?;
    if summaries.is_empty() {
        println!("no headlines stored yet");
        return Ok(());
    }

    println!(
        "{:<12}{:<11}{:<10}{:<11}LAST SCRAPED",
        "TICKER", "HEADLINES", "AVG", "SENTIMENT"
    );
    for s in &summaries {
        println!(
            "{:<12}{:<11}{:<10.3}{:<11}{}",
            s.ticker,
            s.headline_count,
            s.avg_sentiment,
            SentimentLabel::from_score(s.avg_sentiment).to_string(),
            s.last_scraped_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub(crate) async fn run_summary(
    config: &AppConfig,
    pool: &SqlitePool,
    ticker: &Ticker,
) -> anyhow::Result<()> {
    let rows = mpulse_db::get_headlines(pool, ticker, SUMMARY_HEADLINE_LIMIT).await?;
    let titles: Vec<&str> = rows.iter().map(|r| r.headline.as_str()).collect();

    let summarizer = Summarizer::from_app_config(config)?;
    let summary = summarizer.summarize(&headline_digest(&titles)).await?;

    println!("{ticker}: {} headlines", rows.len());
    if let Some(avg) = average(rows.iter().map(|r| r.sentiment_score)) {
        println!("average sentiment: {avg:.3} ({})", SentimentLabel::from_score(avg));
    }
    println!();
    println!("{summary}");
    Ok(())
}

fn average(scores: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = scores.fold((0.0, 0u32), |(sum, n), s| (sum + s, n + 1));
    (n > 0).then(|| sum / f64::from(n))
}
