/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    ///
    /// Only 429 and 500/502/503 responses are retried; all other outcomes
    /// surface immediately regardless of this ceiling.
    pub max_retries: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 2,
        }
    }
}

/// Configures [`JobsApi::wait`](crate::JobsApi::wait) polling behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WaitOptions {
    /// Fixed delay between status fetches, in milliseconds.
    pub poll_interval_ms: u64,
    /// Overall wall-clock budget in milliseconds. Once it elapses, `wait`
    /// fails with [`GcxError::Timeout`](crate::GcxError::Timeout) instead of
    /// issuing another fetch.
    pub timeout_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            timeout_ms: 300_000,
        }
    }
}
