use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which scorer turns a headline into a compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBackend {
    /// Local word-weight lexicon, no network.
    Lexicon,
    /// Hosted pretrained financial classifier.
    FinBert,
}

impl std::fmt::Display for SentimentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentBackend::Lexicon => write!(f, "lexicon"),
            SentimentBackend::FinBert => write!(f, "finbert"),
        }
    }
}

/// Per-provider credentials. Every key is optional; adapters whose key is
/// absent fail with a typed error when invoked.
#[derive(Clone, Default)]
pub struct SourceKeys {
    pub serper_api_key: Option<String>,
    pub newsapi_api_key: Option<String>,
    pub fmp_api_key: Option<String>,
    pub finnhub_api_key: Option<String>,
    pub marketaux_api_token: Option<String>,
}

impl std::fmt::Debug for SourceKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[redacted]");
        f.debug_struct("SourceKeys")
            .field("serper_api_key", &redact(&self.serper_api_key))
            .field("newsapi_api_key", &redact(&self.newsapi_api_key))
            .field("fmp_api_key", &redact(&self.fmp_api_key))
            .field("finnhub_api_key", &redact(&self.finnhub_api_key))
            .field("marketaux_api_token", &redact(&self.marketaux_api_token))
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_backoff_base_ms: u64,
    pub source_keys: SourceKeys,
    pub sentiment_backend: SentimentBackend,
    pub inference_url: String,
    pub hf_api_token: Option<String>,
    pub sentiment_model: String,
    pub summary_model: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field("http_backoff_base_ms", &self.http_backoff_base_ms)
            .field("source_keys", &self.source_keys)
            .field("sentiment_backend", &self.sentiment_backend)
            .field("inference_url", &self.inference_url)
            .field(
                "hf_api_token",
                &self.hf_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field("sentiment_model", &self.sentiment_model)
            .field("summary_model", &self.summary_model)
            .finish()
    }
}
