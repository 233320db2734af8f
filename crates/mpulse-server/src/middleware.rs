use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const API_KEYS_VAR: &str = "MPULSE_API_KEYS";
const REQUEST_ID_HEADER: &str = "x-request-id";
const ANONYMOUS_CALLER: &str = "anonymous";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer tokens accepted on the protected `/api/v1` routes.
#[derive(Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("key_count", &self.api_keys.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthState {
    /// Reads comma-separated bearer tokens from `MPULSE_API_KEYS`.
    ///
    /// # Errors
    ///
    /// Fails outside development when no token is configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var(API_KEYS_VAR).unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// Parses a comma-separated token list. Blank entries are ignored and
    /// duplicates collapse.
    ///
    /// # Errors
    ///
    /// Fails when the list is empty and `is_development` is false.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut keys: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        keys.sort();
        keys.dedup();

        match (keys.is_empty(), is_development) {
            (false, _) => Ok(Self {
                api_keys: Arc::new(keys),
                enabled: true,
            }),
            (true, true) => {
                tracing::warn!("{API_KEYS_VAR} is empty; /api/v1 routes are open in development");
                Ok(Self::disabled())
            }
            (true, false) => anyhow::bail!(
                "{API_KEYS_VAR} must list at least one bearer token outside development"
            ),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::new(Vec::new()),
            enabled: false,
        }
    }

    /// Constant-time comparison against every configured key.
    fn allows(&self, token: &str) -> bool {
        self.api_keys.iter().fold(false, |found, key| {
            found | bool::from(key.as_bytes().ct_eq(token.as_bytes()))
        })
    }
}

/// Fixed-window request budget, tracked separately for each caller.
///
/// A caller is identified by a bearer token that [`AuthState`] accepts. Every
/// other request, including ones carrying an unknown token, shares a single
/// anonymous budget.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, CallerWindow>>>,
}

#[derive(Debug, Clone, Copy)]
struct CallerWindow {
    started_at: Instant,
    count: usize,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `caller`. Returns the seconds until the window
    /// resets when the budget is already spent.
    async fn check(&self, caller: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        // Expired windows are dropped so the map only holds active callers.
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let entry = windows.entry(caller.to_owned()).or_insert(CallerWindow {
            started_at: now,
            count: 0,
        });

        if entry.count >= self.max_requests {
            let remaining = self.window.saturating_sub(now.duration_since(entry.started_at));
            return Err(remaining.as_secs().max(1));
        }

        entry.count += 1;
        Ok(())
    }
}

/// Uses the caller's `x-request-id` header or generates a `UUIDv4`, stores it
/// as a [`RequestId`] extension and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    res
}

/// Rejects requests without a configured bearer token when auth is enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response(),
    }
}

/// Rejects a caller that has spent its request budget for the current window.
///
/// Runs before [`require_bearer_auth`], so token guesses are counted against
/// the anonymous budget.
pub async fn enforce_rate_limit(
    State((auth, rate_limit)): State<(AuthState, RateLimitState)>,
    req: Request,
    next: Next,
) -> Response {
    let caller = rate_limit_caller(&auth, req.headers().get(AUTHORIZATION)).to_owned();

    match rate_limit.check(&caller).await {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            tracing::debug!(retry_after_secs, "request rejected by rate limit");
            let mut res = ApiError::new(
                request_id_of(&req),
                "rate_limited",
                format!("rate limit exceeded; retry in {retry_after_secs}s"),
            )
            .into_response();
            res.headers_mut().insert(
                axum::http::header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs),
            );
            res
        }
    }
}

/// Bucket key for a request: the bearer token when auth is enabled and the
/// token is valid, otherwise the shared anonymous key.
fn rate_limit_caller<'a>(auth: &AuthState, header: Option<&'a HeaderValue>) -> &'a str {
    extract_bearer_token(header)
        .filter(|token| auth.enabled && auth.allows(token))
        .unwrap_or(ANONYMOUS_CALLER)
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
