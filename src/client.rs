use std::fmt;
use std::time::{Duration, Instant};

use reqwest::{
    header,
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, StatusCode,
};
use tokio::time::sleep;

use crate::{
    account::AccountApi,
    jobs::JobsApi,
    types::{CostEstimate, EnhancementOptions, Operation, RateLimitSnapshot},
    webhooks::WebhooksApi,
    wire::{self, ErrorDetail},
    ClientOptions, GcxError, Result,
};

/// Default production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.golden-codex.com/v1";

/// Default cooldown applied to a 429 response that carries no
/// `retry_after` hint, in seconds.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Decoded response plus the advisory rate-limit headers that came with it.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// Decoded JSON body; `Null` for empty (204) responses.
    pub body: serde_json::Value,
    /// HTTP status of the final attempt.
    pub status: u16,
    /// Snapshot of `X-RateLimit-*` headers, with defaults when absent.
    pub rate_limit: RateLimitSnapshot,
}

#[derive(Clone)]
/// HTTP client for the Golden Codex enhancement API.
///
/// Holds the credential, base endpoint and retry policy; immutable after
/// construction and safe to share across tasks. All resource facades
/// ([`JobsApi`], [`AccountApi`], [`WebhooksApi`]) issue their calls through
/// [`GcxClient::send`].
pub struct GcxClient {
    http: reqwest::Client,
    base_url: String,
    authorization: String,
    options: ClientOptions,
}

impl fmt::Debug for GcxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcxClient")
            .field("base_url", &self.base_url)
            .field("authorization", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl GcxClient {
    /// Creates a client for the production endpoint.
    ///
    /// If the key is missing the `Bearer ` prefix, it is added automatically.
    pub fn new(api_key: impl AsRef<str>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Creates a client against a custom base URL (staging, mock servers).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl AsRef<str>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            authorization: normalize_bearer_authorization(api_key.as_ref()),
            options: ClientOptions::default(),
        }
    }

    /// Creates a client from the `GCX_API_KEY` environment variable, with
    /// `GCX_BASE_URL` optionally overriding the endpoint.
    pub fn from_env() -> std::result::Result<Self, String> {
        let api_key = std::env::var("GCX_API_KEY")
            .map_err(|_| "missing GCX_API_KEY environment variable".to_owned())?;
        if api_key.trim().is_empty() {
            return Err("GCX_API_KEY is set but empty".to_owned());
        }
        let base_url =
            std::env::var("GCX_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Ok(Self::with_base_url(base_url, api_key))
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Jobs facade: create, inspect, list, cancel, wait.
    pub fn jobs(&self) -> JobsApi<'_> {
        JobsApi::new(self)
    }

    /// Account facade: balance and usage statistics.
    pub fn account(&self) -> AccountApi<'_> {
        AccountApi::new(self)
    }

    /// Webhooks facade: subscription management.
    pub fn webhooks(&self) -> WebhooksApi<'_> {
        WebhooksApi::new(self)
    }

    /// Estimates the cost of operations without creating a job.
    ///
    /// Passing an empty operation list estimates the full pipeline.
    pub async fn estimate(
        &self,
        operations: Vec<Operation>,
        options: Option<EnhancementOptions>,
    ) -> Result<CostEstimate> {
        let operations = if operations.is_empty() {
            Operation::all()
        } else {
            operations
        };
        let body = serde_json::to_value(wire::EstimateBody {
            operations,
            options,
        })
        .map_err(|err| GcxError::Decode(format!("invalid estimate body: {err}")))?;
        let envelope = self.send(Method::POST, "/estimate", Some(body), &[]).await?;
        wire::decode(envelope.body)
    }

    /// Issues one authenticated API call, retrying transient failures.
    ///
    /// This is the stable request interface the resource facades build on;
    /// it is public so callers can reach endpoints this crate does not wrap.
    ///
    /// Attaches `Authorization` and `Content-Type`, then merges
    /// `extra_headers` (which may add headers but cannot replace the
    /// authorization header). A 429 response is retried after the
    /// server-stated `retry_after` (default 60 s); 500/502/503 are retried
    /// after `1000 ms * (attempt + 1)`. Every other non-2xx outcome, and any
    /// attempt past `max_retries`, fails with a classified [`GcxError`].
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        extra_headers: &[(&str, &str)],
    ) -> Result<Envelope> {
        let url = format!("{}{}", self.base_url, path);

        let mut headers = HeaderMap::new();
        for (name, value) in extra_headers {
            let name = HeaderName::try_from(*name)
                .map_err(|_| GcxError::Decode(format!("invalid header name '{name}'")))?;
            let value = HeaderValue::try_from(*value)
                .map_err(|_| GcxError::Decode(format!("invalid value for header '{name}'")))?;
            headers.insert(name, value);
        }
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        // Inserted last with replace semantics: callers can add headers but
        // cannot override the credential.
        let authorization = HeaderValue::from_str(&self.authorization)
            .map_err(|_| GcxError::Decode("api key contains invalid header bytes".to_owned()))?;
        headers.insert(header::AUTHORIZATION, authorization);

        let mut attempt = 0usize;

        loop {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .headers(headers.clone())
                .timeout(Duration::from_millis(self.options.timeout_ms));

            if let Some(body) = &body {
                request = request.json(body);
            }

            let started = Instant::now();
            let response = match request.send().await {
                Ok(response) => response,
                Err(err) if err.is_timeout() => {
                    return Err(GcxError::Timeout {
                        elapsed: started.elapsed(),
                    });
                }
                Err(err) => return Err(GcxError::Transport(err)),
            };

            let status = response.status();
            let rate_limit = rate_limit_from_headers(response.headers());
            let text = response.text().await.map_err(GcxError::Transport)?;

            if status.is_success() {
                let body = if text.trim().is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::from_str(&text).map_err(|err| {
                        GcxError::Decode(format!("invalid response JSON: {err}; body: {text}"))
                    })?
                };
                return Ok(Envelope {
                    body,
                    status: status.as_u16(),
                    rate_limit,
                });
            }

            let detail = wire::decode_error_detail(&text, status.as_u16());

            if attempt < self.options.max_retries {
                if let Some(delay) = retry_delay(status, attempt, &detail) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        status = status.as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying request after transient failure"
                    );
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }
            }

            return Err(classify_error(status.as_u16(), detail));
        }
    }
}

/// Backoff before re-issuing a request, or `None` when the status is not
/// retryable. 429 honors the server's cooldown; 5xx uses a linear schedule
/// (1 s, 2 s, 3 s, ...) with `attempt` 0-based.
fn retry_delay(status: StatusCode, attempt: usize, detail: &ErrorDetail) -> Option<Duration> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(Duration::from_secs(
            detail.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        )),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => {
            Some(Duration::from_millis(1_000 * (attempt as u64 + 1)))
        }
        _ => None,
    }
}

fn classify_error(status: u16, detail: ErrorDetail) -> GcxError {
    let ErrorDetail {
        code,
        message,
        balance,
        required,
        retry_after,
    } = detail;

    match status {
        401 => GcxError::Authentication { code, message },
        402 => GcxError::InsufficientBalance {
            code,
            message,
            balance: balance.unwrap_or(0),
            required: required.unwrap_or(0),
        },
        404 => GcxError::NotFound { code, message },
        400 => GcxError::Validation { code, message },
        429 => GcxError::RateLimited {
            code,
            message,
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        _ => GcxError::Api {
            status,
            code,
            message,
        },
    }
}

fn rate_limit_from_headers(headers: &HeaderMap) -> RateLimitSnapshot {
    let defaults = RateLimitSnapshot::default();
    RateLimitSnapshot {
        limit: header_number(headers, "x-ratelimit-limit").unwrap_or(defaults.limit),
        remaining: header_number(headers, "x-ratelimit-remaining").unwrap_or(defaults.remaining),
        reset: header_number(headers, "x-ratelimit-reset").unwrap_or(defaults.reset),
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn normalize_bearer_authorization(api_key: &str) -> String {
    let trimmed = api_key.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
