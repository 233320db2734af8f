use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use chrono::NaiveDate;
use mpulse_core::{NewsArticle, NewsSource, SourceKeys};
use mpulse_db::NewHeadline;
use mpulse_scraper::Endpoints;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

/// Nothing listens on the discard port; any outbound call fails fast.
const DEAD_UPSTREAM: &str = "http://127.0.0.1:9";

async fn test_pool() -> SqlitePool {
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

fn test_state(pool: SqlitePool, keys: SourceKeys) -> AppState {
    let news = NewsClient::new(2, "mpulse-test", 0, 0, keys)
        .expect("news client")
        .with_endpoints(Endpoints::single(DEAD_UPSTREAM));
    let summarizer =
        Summarizer::new(DEAD_UPSTREAM, None, "test/summarizer", 2).expect("summarizer");
    AppState {
        pool,
        news: Arc::new(news),
        scorer: Arc::new(Scorer::Lexicon),
        summarizer: Arc::new(summarizer),
    }
}

async fn test_app() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let app = build_app(
        test_state(pool.clone(), SourceKeys::default()),
        AuthState::disabled(),
        default_rate_limit_state(),
    );
    (app, pool)
}

async fn seed(pool: &SqlitePool, ticker: &str, rows: &[(&str, Option<(i32, u32, u32)>, f64)]) {
    let ticker = Ticker::parse(ticker).expect("ticker");
    for &(title, day, score) in rows {
        let article = NewsArticle {
            title: title.to_string(),
            url: format!("https://news.example.com/{}", title.len()),
            published_at: day.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            source: NewsSource::Finnhub,
        };
        mpulse_db::add_headline(
            pool,
            NewHeadline {
                ticker: &ticker,
                article: &article,
                sentiment_score: score,
            },
        )
        .await
        .expect("seed headline");
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).expect("request")).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn post_scrape(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/scrape")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 50);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(1_000)), 200);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("not_configured", StatusCode::SERVICE_UNAVAILABLE),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, expected) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), expected, "code {code}");
    }
}

#[tokio::test]
async fn root_and_status_keep_their_plain_bodies() {
    let (app, _pool) = test_app().await;

    let (status, json) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to the Stock Scraper API!");

    let (status, json) = get(app, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "API is running");
}

#[tokio::test]
async fn health_reports_database_ok() {
    let (app, _pool) = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-health")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["data"]["database"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-health");
}

#[tokio::test]
async fn results_return_labelled_headlines_for_ticker() {
    let (app, pool) = test_app().await;
    seed(
        &pool,
        "RELIANCE",
        &[
            ("Reliance Jio adds record subscribers in April", Some((2024, 5, 2)), 0.5),
            ("Reliance retail arm faces supply disruption", None, -0.3),
        ],
    )
    .await;
    seed(&pool, "TCS", &[("TCS signs new deal with UK bank", None, 0.2)]).await;

    let (status, json) = get(app, "/api/v1/results/reliance?limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["ticker"], "RELIANCE");
    let results = json["data"]["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["headline"], "Reliance retail arm faces supply disruption");
    assert_eq!(results[0]["sentiment"], "Bad News");
    assert_eq!(results[1]["sentiment"], "Good News");
    assert_eq!(results[1]["published_at"], "2024-05-02");
}

#[tokio::test]
async fn results_reject_invalid_ticker() {
    let (app, _pool) = test_app().await;
    let (status, json) = get(app, "/api/v1/results/bad%20ticker!").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn daily_sentiment_is_ordered_by_day() {
    let (app, pool) = test_app().await;
    seed(
        &pool,
        "INFY",
        &[
            ("Infosys wins large deal from European client", Some((2024, 5, 3)), 0.6),
            ("Infosys shares slip after cautious guidance", Some((2024, 5, 1)), -0.4),
            ("Infosys expands partnership with cloud provider", Some((2024, 5, 1)), 0.3),
        ],
    )
    .await;

    let (status, json) = get(app, "/api/v1/sentiment/INFY/daily").await;
    assert_eq!(status, StatusCode::OK);
    let days = json["data"]["days"].as_array().expect("days array");
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2024-05-01");
    assert!((days[0]["avg_sentiment"].as_f64().unwrap() + 0.05).abs() < 1e-9);
    assert_eq!(days[0]["sentiment"], "Neutral");
    assert_eq!(days[1]["date"], "2024-05-03");
}

#[tokio::test]
async fn summary_without_headlines_skips_the_model() {
    let (app, _pool) = test_app().await;
    let (status, json) = get(app, "/api/v1/summary/WIPRO").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["headline_count"], 0);
    assert_eq!(json["data"]["summary"], mpulse_sentiment::EMPTY_SUMMARY);
    assert!(json["data"]["average_sentiment"].is_null());
}

#[tokio::test]
async fn summary_model_failure_is_an_upstream_error() {
    let (app, pool) = test_app().await;
    seed(&pool, "ITC", &[("ITC hotels demerger gets final approval", None, 0.4)]).await;

    let (status, json) = get(app, "/api/v1/summary/ITC").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn stocks_without_fmp_key_are_not_configured() {
    let (app, _pool) = test_app().await;
    let (status, json) = get(app, "/api/v1/stocks/in").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn scrape_accepts_valid_request() {
    let (app, _pool) = test_app().await;
    let (status, json) = send(
        app,
        post_scrape(&json!({
            "ticker": "tcs",
            "source": "Yahoo",
            "from_date": "2024-05-01",
            "to_date": "2024-05-31"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["data"]["ticker"], "TCS");
    assert_eq!(json["data"]["source"], "yahoo");
    assert_eq!(json["data"]["from_date"], "2024-05-01");
    assert_eq!(json["data"]["status"], "accepted");
}

#[tokio::test]
async fn scrape_rejects_unknown_source_and_inverted_range() {
    let (app, _pool) = test_app().await;

    let (status, json) = send(
        app.clone(),
        post_scrape(&json!({"ticker": "TCS", "source": "reuters"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");

    let (status, json) = send(
        app,
        post_scrape(&json!({
            "ticker": "TCS",
            "source": "finnhub",
            "from_date": "2024-06-01",
            "to_date": "2024-05-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("cannot be after"));
}

#[tokio::test]
async fn scrape_rejects_source_without_key() {
    let (app, _pool) = test_app().await;
    let (status, json) = send(
        app,
        post_scrape(&json!({"ticker": "AAPL", "source": "newsapi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("newsapi"));
}

#[tokio::test]
async fn protected_routes_require_bearer_token_when_enabled() {
    let pool = test_pool().await;
    let auth = AuthState::from_keys("secret-token", false).expect("auth");
    let app = build_app(
        test_state(pool, SourceKeys::default()),
        auth,
        default_rate_limit_state(),
    );

    let (status, _) = get(app.clone(), "/api/v1/results/TCS").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        app.clone(),
        Request::builder()
            .uri("/api/v1/results/TCS")
            .header("authorization", "Bearer secret-token")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK, "health stays public");
}

#[tokio::test]
async fn rate_limit_rejects_requests_over_the_window() {
    let pool = test_pool().await;
    let app = build_app(
        test_state(pool, SourceKeys::default()),
        AuthState::disabled(),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (first, _) = get(app.clone(), "/api/v1/results/TCS").await;
    let (second, json) = get(app, "/api/v1/results/TCS").await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn rate_limit_shares_one_budget_across_unknown_tokens() {
    let pool = test_pool().await;
    let app = build_app(
        test_state(pool, SourceKeys::default()),
        AuthState::disabled(),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let mut statuses = Vec::new();
    for i in 0..3 {
        let (status, _) = send(
            app.clone(),
            Request::builder()
                .uri("/api/v1/results/TCS")
                .header("authorization", format!("Bearer junk-{i}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        statuses.push(status);
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
}

#[tokio::test]
async fn rate_limit_counts_rejected_tokens_but_not_against_valid_callers() {
    let pool = test_pool().await;
    let app = build_app(
        test_state(pool, SourceKeys::default()),
        AuthState::from_keys("secret-token", false).expect("auth"),
        RateLimitState::new(1, Duration::from_secs(60)),
    );
    let with_token = |token: &str| {
        Request::builder()
            .uri("/api/v1/results/TCS")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request")
    };

    let (first_guess, _) = send(app.clone(), with_token("guess-1")).await;
    let (second_guess, _) = send(app.clone(), with_token("guess-2")).await;
    let (valid, _) = send(app, with_token("secret-token")).await;

    assert_eq!(first_guess, StatusCode::UNAUTHORIZED);
    assert_eq!(second_guess, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(valid, StatusCode::OK);
}

#[tokio::test]
async fn scrape_job_stores_cleaned_and_scored_headlines() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/company-news"))
        .and(query_param("symbol", "TCS"))
        .and(query_param("token", "finnhub-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "headline": "TCS profit surges on strong deal wins",
                "url": "https://news.example.com/tcs-profit",
                "datetime": 1_714_608_000
            },
            {
                "headline": "TCS cricket team lifts corporate trophy",
                "url": "https://news.example.com/tcs-cricket",
                "datetime": 1_714_608_000
            },
            {
                "headline": "TCS slips",
                "url": "https://news.example.com/tcs-short",
                "datetime": 1_714_608_000
            }
        ])))
        .expect(1)
        .mount(&upstream)
        .await;

    let pool = test_pool().await;
    let keys = SourceKeys {
        finnhub_api_key: Some("finnhub-key".to_string()),
        ..SourceKeys::default()
    };
    let news = NewsClient::new(5, "mpulse-test", 0, 0, keys)
        .expect("news client")
        .with_endpoints(Endpoints::single(&upstream.uri()));
    let state = AppState {
        news: Arc::new(news),
        ..test_state(pool.clone(), SourceKeys::default())
    };
    let ticker = Ticker::parse("TCS").expect("ticker");
    let range = mpulse_core::DateRange::new(
        NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
        NaiveDate::from_ymd_opt(2024, 5, 31).expect("date"),
    )
    .expect("range");

    scrape::run_scrape_job(
        state,
        uuid::Uuid::new_v4(),
        ticker.clone(),
        NewsSource::Finnhub,
        range,
    )
    .await;

    let rows = mpulse_db::get_headlines(&pool, &ticker, 50)
        .await
        .expect("stored rows");
    assert_eq!(rows.len(), 1, "cleaner drops are not stored");
    let row = &rows[0];
    assert_eq!(row.headline, "TCS profit surges on strong deal wins");
    assert_eq!(row.source_url, "https://news.example.com/tcs-profit");
    assert_eq!(row.source.as_deref(), Some("finnhub"));
    assert_eq!(row.published_at, NaiveDate::from_ymd_opt(2024, 5, 2));
    let expected = mpulse_sentiment::lexicon_score(&row.headline);
    assert!(expected > 0.1);
    assert!((row.sentiment_score - expected).abs() < 1e-9);
}
