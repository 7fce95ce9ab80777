use std::time::Duration;

/// Error type returned by this crate.
///
/// Every API-derived variant carries the server's stable machine code so
/// callers can branch without string-matching messages.
#[derive(Debug, thiserror::Error)]
pub enum GcxError {
    /// The API key was rejected (HTTP 401). Never retried.
    #[error("authentication failed: {message}")]
    Authentication { code: String, message: String },
    /// Not enough GCX credit for the requested work (HTTP 402). Never retried.
    #[error("insufficient balance: {message} (balance {balance}, required {required})")]
    InsufficientBalance {
        code: String,
        message: String,
        /// Current account balance in GCX.
        balance: i64,
        /// Balance the request would have needed.
        required: i64,
    },
    /// The addressed resource does not exist (HTTP 404). Never retried.
    #[error("not found: {message}")]
    NotFound { code: String, message: String },
    /// The request body or parameters were rejected (HTTP 400). Never retried.
    #[error("validation failed: {message}")]
    Validation { code: String, message: String },
    /// Rate limit exceeded (HTTP 429) and the retry budget is exhausted.
    #[error("rate limited: {message} (retry after {retry_after_secs}s)")]
    RateLimited {
        code: String,
        message: String,
        /// Server-stated cooldown in seconds.
        retry_after_secs: u64,
    },
    /// Any other non-2xx status, including 5xx after retries are exhausted.
    #[error("api error {status}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// The local per-request or polling deadline elapsed.
    #[error("timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// A job reached the `failed` or `cancelled` terminal state.
    #[error("job {job_id} failed: {message}")]
    JobFailed {
        job_id: String,
        code: String,
        message: String,
        /// Enhancement stage that failed, when the service reports one.
        stage: Option<String>,
    },
    /// Response decoding or protocol-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
}
