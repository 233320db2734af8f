//! Database operations for the `headlines` table.

use chrono::{DateTime, NaiveDate, Utc};
use mpulse_core::{NewsArticle, Ticker};
use sqlx::SqlitePool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `headlines` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HeadlineRow {
    pub id: i64,
    pub ticker: String,
    pub headline: String,
    pub source_url: String,
    pub source: Option<String>,
    pub published_at: Option<NaiveDate>,
    pub sentiment_score: f64,
    pub scraped_at: DateTime<Utc>,
}

/// Mean sentiment of one publication day.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailySentimentRow {
    pub day: NaiveDate,
    pub avg_sentiment: f64,
}

/// Per-ticker rollup across everything stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TickerSummaryRow {
    pub ticker: String,
    pub headline_count: i64,
    pub avg_sentiment: f64,
    pub last_scraped_at: DateTime<Utc>,
}

/// A scored article ready to be appended for `ticker`.
#[derive(Debug, Clone, Copy)]
pub struct NewHeadline<'a> {
    pub ticker: &'a Ticker,
    pub article: &'a NewsArticle,
    pub sentiment_score: f64,
}

const INSERT_HEADLINE: &str = "INSERT INTO headlines \
         (ticker, headline, source_url, source, published_at, sentiment_score, scraped_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?)";

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Append one headline and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn add_headline(pool: &SqlitePool, new: NewHeadline<'_>) -> Result<i64, DbError> {
    let result = sqlx::query(INSERT_HEADLINE)
        .bind(new.ticker.as_str())
        .bind(&new.article.title)
        .bind(&new.article.url)
        .bind(new.article.source.as_str())
        .bind(new.article.published_at)
        .bind(new.sentiment_score)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Append a batch of headlines inside a single transaction.
///
/// Either every row is written or none is. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails.
pub async fn add_headlines(pool: &SqlitePool, batch: &[NewHeadline<'_>]) -> Result<usize, DbError> {
    if batch.is_empty() {
        return Ok(0);
    }

    let scraped_at = Utc::now();
    let mut tx = pool.begin().await?;

    for new in batch {
        sqlx::query(INSERT_HEADLINE)
            .bind(new.ticker.as_str())
            .bind(&new.article.title)
            .bind(&new.article.url)
            .bind(new.article.source.as_str())
            .bind(new.article.published_at)
            .bind(new.sentiment_score)
            .bind(scraped_at)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(batch.len())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Stored headlines for a ticker, most recently scraped first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_headlines(
    pool: &SqlitePool,
    ticker: &Ticker,
    limit: i64,
) -> Result<Vec<HeadlineRow>, DbError> {
    let rows = sqlx::query_as::<_, HeadlineRow>(
        "SELECT id, ticker, headline, source_url, source, published_at, \
                sentiment_score, scraped_at \
         FROM headlines \
         WHERE ticker = ? \
         ORDER BY scraped_at DESC, id DESC \
         LIMIT ?",
    )
    .bind(ticker.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Average sentiment per publication day for a ticker, oldest day first.
///
/// Rows without a publication date are excluded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_sentiment_over_time(
    pool: &SqlitePool,
    ticker: &Ticker,
) -> Result<Vec<DailySentimentRow>, DbError> {
    let rows = sqlx::query_as::<_, DailySentimentRow>(
        "SELECT date(published_at) AS day, AVG(sentiment_score) AS avg_sentiment \
         FROM headlines \
         WHERE ticker = ? AND published_at IS NOT NULL \
         GROUP BY day \
         HAVING day IS NOT NULL \
         ORDER BY day ASC",
    )
    .bind(ticker.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Number of stored headlines for a ticker.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_headlines(pool: &SqlitePool, ticker: &Ticker) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM headlines WHERE ticker = ?")
        .bind(ticker.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One rollup row per ticker, most recently scraped first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ticker_summaries(pool: &SqlitePool) -> Result<Vec<TickerSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, TickerSummaryRow>(
        "SELECT ticker, \
                COUNT(*) AS headline_count, \
                AVG(sentiment_score) AS avg_sentiment, \
                MAX(scraped_at) AS last_scraped_at \
         FROM headlines \
         GROUP BY ticker \
         ORDER BY last_scraped_at DESC, ticker ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
