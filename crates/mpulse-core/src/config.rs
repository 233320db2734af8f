use crate::app_config::{AppConfig, Environment, SentimentBackend, SourceKeys};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates with `KEY=` work.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = or_default("DATABASE_URL", "sqlite://mpulse.db?mode=rwc");
    let env = parse_environment(&or_default("MPULSE_ENV", "development"))?;
    let bind_addr = parse_addr("MPULSE_BIND_ADDR", "127.0.0.1:8000")?;
    let log_level = or_default("MPULSE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("MPULSE_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("MPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("MPULSE_HTTP_TIMEOUT_SECS", "15")?;
    let http_user_agent = or_default("MPULSE_HTTP_USER_AGENT", DEFAULT_USER_AGENT);
    let http_max_retries = parse_u32("MPULSE_HTTP_MAX_RETRIES", "2")?;
    let http_backoff_base_ms = parse_u64("MPULSE_HTTP_BACKOFF_BASE_MS", "500")?;

    let source_keys = SourceKeys {
        serper_api_key: optional("SERPER_API_KEY"),
        newsapi_api_key: optional("NEWSAPI_API_KEY"),
        fmp_api_key: optional("FMP_API_KEY"),
        finnhub_api_key: optional("FINNHUB_API_KEY"),
        marketaux_api_token: optional("MARKETAUX_API_TOKEN"),
    };

    let sentiment_backend =
        parse_sentiment_backend(&or_default("MPULSE_SENTIMENT_BACKEND", "lexicon"))?;
    let inference_url = or_default(
        "MPULSE_INFERENCE_URL",
        "https://api-inference.huggingface.co",
    );
    let hf_api_token = optional("HF_API_TOKEN");
    let sentiment_model = or_default("MPULSE_SENTIMENT_MODEL", "ProsusAI/finbert");
    let summary_model = or_default("MPULSE_SUMMARY_MODEL", "sshleifer/distilbart-cnn-6-6");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_backoff_base_ms,
        source_keys,
        sentiment_backend,
        inference_url,
        hf_api_token,
        sentiment_model,
        summary_model,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MPULSE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_sentiment_backend(s: &str) -> Result<SentimentBackend, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "lexicon" => Ok(SentimentBackend::Lexicon),
        "finbert" => Ok(SentimentBackend::FinBert),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MPULSE_SENTIMENT_BACKEND".to_string(),
            reason: format!("expected \"lexicon\" or \"finbert\", got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
