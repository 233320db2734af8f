//! Store tests against an in-memory SQLite database with migrations applied.

use chrono::NaiveDate;
use mpulse_core::{AppConfig, NewsArticle, NewsSource, Ticker};
use mpulse_db::{NewHeadline, PoolConfig};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    // A single never-recycled connection keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    mpulse_db::run_migrations(&pool).await.expect("migrations");
    pool
}

fn ticker(raw: &str) -> Ticker {
    Ticker::parse(raw).expect("valid ticker")
}

fn article(title: &str, day: Option<(i32, u32, u32)>) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        url: format!("https://news.example.com/{}", title.replace(' ', "-")),
        published_at: day.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        source: NewsSource::NewsApi,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let mut app_config: AppConfig = mpulse_core::load_app_config_from_env().expect("config");
    app_config.db_max_connections = 42;
    app_config.db_min_connections = 7;
    app_config.db_acquire_timeout_secs = 9;

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn add_headline_round_trips_all_columns() {
    let pool = test_pool().await;
    let t = ticker("reliance");
    let a = article("Reliance posts record quarterly profit", Some((2024, 5, 2)));

    let id = mpulse_db::add_headline(
        &pool,
        NewHeadline {
            ticker: &t,
            article: &a,
            sentiment_score: 0.62,
        },
    )
    .await
    .expect("insert");
    assert!(id > 0);

    let rows = mpulse_db::get_headlines(&pool, &t, 50).await.expect("query");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, id);
    assert_eq!(row.ticker, "RELIANCE");
    assert_eq!(row.headline, a.title);
    assert_eq!(row.source_url, a.url);
    assert_eq!(row.source.as_deref(), Some("newsapi"));
    assert_eq!(row.published_at, a.published_at);
    assert!((row.sentiment_score - 0.62).abs() < f64::EPSILON);
}

#[tokio::test]
async fn get_headlines_is_scoped_to_ticker_and_newest_first() {
    let pool = test_pool().await;
    let tcs = ticker("TCS");
    let infy = ticker("INFY");
    let first = article("TCS wins large banking deal in Europe", None);
    let second = article("TCS shares slip after guidance cut", None);
    let other = article("Infosys expands its AI partnership program", None);

    for (t, a) in [(&tcs, &first), (&tcs, &second), (&infy, &other)] {
        mpulse_db::add_headline(
            &pool,
            NewHeadline {
                ticker: t,
                article: a,
                sentiment_score: 0.0,
            },
        )
        .await
        .expect("insert");
    }

    let rows = mpulse_db::get_headlines(&pool, &tcs, 50).await.expect("query");
    let titles: Vec<&str> = rows.iter().map(|r| r.headline.as_str()).collect();
    assert_eq!(titles, vec![second.title.as_str(), first.title.as_str()]);

    let limited = mpulse_db::get_headlines(&pool, &tcs, 1).await.expect("query");
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn add_headlines_writes_whole_batch() {
    let pool = test_pool().await;
    let t = ticker("HDFCBANK");
    let articles = [
        article("HDFC Bank raises deposit rates for seniors", Some((2024, 5, 1))),
        article("HDFC Bank loan growth beats street estimates", Some((2024, 5, 1))),
        article("HDFC Bank faces regulatory penalty over lapses", Some((2024, 5, 3))),
    ];
    let batch: Vec<NewHeadline<'_>> = articles
        .iter()
        .zip([0.2, 0.6, -0.7])
        .map(|(a, score)| NewHeadline {
            ticker: &t,
            article: a,
            sentiment_score: score,
        })
        .collect();

    let written = mpulse_db::add_headlines(&pool, &batch).await.expect("batch");
    assert_eq!(written, 3);
    assert_eq!(mpulse_db::count_headlines(&pool, &t).await.expect("count"), 3);
    assert_eq!(mpulse_db::add_headlines(&pool, &[]).await.expect("empty"), 0);
}

#[tokio::test]
async fn sentiment_over_time_averages_per_day_and_skips_undated() {
    let pool = test_pool().await;
    let t = ticker("AAPL");
    let articles = [
        article("Apple unveils new chips at developer event", Some((2024, 6, 10))),
        article("Apple faces antitrust probe in European Union", Some((2024, 6, 10))),
        article("Apple stock climbs to fresh all time high", Some((2024, 6, 11))),
        article("Apple supplier warns on weak handset demand", None),
    ];
    let batch: Vec<NewHeadline<'_>> = articles
        .iter()
        .zip([0.8, -0.4, 0.5, -0.9])
        .map(|(a, score)| NewHeadline {
            ticker: &t,
            article: a,
            sentiment_score: score,
        })
        .collect();
    mpulse_db::add_headlines(&pool, &batch).await.expect("batch");

    let days = mpulse_db::get_sentiment_over_time(&pool, &t)
        .await
        .expect("query");
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    assert!((days[0].avg_sentiment - 0.2).abs() < 1e-9);
    assert_eq!(days[1].day, NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
    assert!((days[1].avg_sentiment - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn rescraping_appends_duplicate_rows() {
    let pool = test_pool().await;
    let t = ticker("MSFT");
    let a = article("Microsoft cloud revenue tops expectations again", Some((2024, 4, 25)));
    let new = NewHeadline {
        ticker: &t,
        article: &a,
        sentiment_score: 0.4,
    };

    mpulse_db::add_headline(&pool, new).await.expect("first");
    mpulse_db::add_headline(&pool, new).await.expect("second");
    assert_eq!(mpulse_db::count_headlines(&pool, &t).await.expect("count"), 2);
}

#[tokio::test]
async fn ticker_summaries_roll_up_each_ticker() {
    let pool = test_pool().await;
    let wipro = ticker("WIPRO");
    let itc = ticker("ITC");
    let a = article("Wipro announces buyback at a premium price", None);
    let b = article("Wipro loses key client in retail vertical", None);
    let c = article("ITC hotel demerger record date announced today", None);

    for (t, art, score) in [(&wipro, &a, 0.6), (&wipro, &b, -0.2), (&itc, &c, 0.1)] {
        mpulse_db::add_headline(
            &pool,
            NewHeadline {
                ticker: t,
                article: art,
                sentiment_score: score,
            },
        )
        .await
        .expect("insert");
    }

    let summaries = mpulse_db::list_ticker_summaries(&pool).await.expect("query");
    assert_eq!(summaries.len(), 2);
    let wipro_row = summaries
        .iter()
        .find(|s| s.ticker == "WIPRO")
        .expect("wipro row");
    assert_eq!(wipro_row.headline_count, 2);
    assert!((wipro_row.avg_sentiment - 0.2).abs() < 1e-9);
}
