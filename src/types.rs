use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Enhancement operations the service can run on an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// AI metadata generation.
    Nova,
    /// Upscaling.
    Flux,
    /// Metadata infusion into the output file.
    Atlas,
}

impl Operation {
    /// All three operations, in pipeline order. The default set for job
    /// creation and cost estimates.
    pub fn all() -> Vec<Operation> {
        vec![Operation::Nova, Operation::Flux, Operation::Atlas]
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Operation::Nova => "nova",
            Operation::Flux => "flux",
            Operation::Atlas => "atlas",
        }
    }
}

/// Externally observed job status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether the status will never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// Nova analysis depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NovaTier {
    Standard,
    FullGcx,
}

/// Flux upscaling model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FluxModel {
    #[serde(rename = "2x")]
    X2,
    #[serde(rename = "4x")]
    X4,
    #[serde(rename = "anime")]
    Anime,
    #[serde(rename = "photo")]
    Photo,
}

/// Atlas output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtlasFormat {
    Png,
    Jpg,
    Webp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<NovaTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluxOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<FluxModel>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<AtlasFormat>,
}

/// Per-operation options attached to a job or cost estimate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nova: Option<NovaOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flux: Option<FluxOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atlas: Option<AtlasOptions>,
}

/// GCX cost figures for a job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct JobCost {
    #[serde(default)]
    pub estimated_gcx: i64,
    #[serde(default)]
    pub charged_gcx: Option<i64>,
    #[serde(default)]
    pub refunded_gcx: Option<i64>,
}

/// Per-operation progress inside a running job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct JobProgress {
    #[serde(default)]
    pub nova: Option<JobStatus>,
    #[serde(default)]
    pub flux: Option<JobStatus>,
    #[serde(default)]
    pub atlas: Option<JobStatus>,
}

/// URLs to job outputs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct JobUrls {
    pub original: String,
    #[serde(default)]
    pub upscaled: Option<String>,
    #[serde(default, rename = "final")]
    pub final_: Option<String>,
}

/// Generated artwork metadata. The service adds fields over time, so
/// anything beyond the documented ones lands in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GoldenCodexMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_interpretation: Option<String>,
    #[serde(default)]
    pub style_classification: Option<Vec<String>>,
    #[serde(default)]
    pub soul_whisper: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Results from a completed job.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct JobResults {
    #[serde(default)]
    pub golden_codex: Option<GoldenCodexMetadata>,
    #[serde(default)]
    pub urls: Option<JobUrls>,
    #[serde(default)]
    pub artwork_id: Option<String>,
}

/// Error details for a failed job.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct JobError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub stage: Option<Operation>,
    #[serde(default)]
    pub retryable: bool,
}

/// Hypermedia links returned on job creation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct JobLinks {
    #[serde(rename = "self")]
    pub self_: String,
    pub cancel: String,
}

/// Response from creating a job.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedJob {
    pub job_id: String,
    pub status: JobStatus,
    pub operations: Vec<Operation>,
    pub cost: JobCost,
    pub created_at: String,
    #[serde(default)]
    pub links: Option<JobLinks>,
}

/// Point-in-time snapshot of a job, as reported by the service.
///
/// The service is the sole source of truth; snapshots are never mutated
/// locally, only replaced by fresher fetches.
#[derive(Clone, Debug, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub progress: Option<JobProgress>,
    #[serde(default)]
    pub results: Option<JobResults>,
    #[serde(default)]
    pub error: Option<JobError>,
    #[serde(default)]
    pub cost: JobCost,
    #[serde(default)]
    pub client_metadata: Option<serde_json::Value>,
    pub created_at: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Pagination block on list responses.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    /// Best-effort heuristic for whether another page exists, computed as
    /// `offset + limit < total`.
    ///
    /// `total` is a point-in-time figure: if records are deleted between
    /// calls this can report `true` while the next page turns out empty.
    /// Treat it as a hint, not a guarantee.
    pub fn has_more(&self) -> bool {
        self.offset + self.limit < self.total
    }
}

/// One page of jobs.
#[derive(Clone, Debug, Deserialize)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub pagination: Pagination,
}

/// Account subscription tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    FreeTrial,
    Curator,
    Studio,
    Gallery,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccountBalance {
    pub gcx: i64,
    #[serde(default)]
    pub storage_used_bytes: u64,
    #[serde(default)]
    pub storage_limit_bytes: u64,
}

/// Account-level rate limit configuration. Advisory only.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RateLimitInfo {
    pub requests_per_minute: u32,
    #[serde(default)]
    pub concurrent_jobs: u32,
}

/// Account information.
#[derive(Clone, Debug, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub email: String,
    pub tier: SubscriptionTier,
    pub balance: AccountBalance,
    pub rate_limit: RateLimitInfo,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UsageByStatus {
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub cancelled: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UsageByOperation {
    #[serde(default)]
    pub nova: i64,
    #[serde(default)]
    pub flux: i64,
    #[serde(default)]
    pub atlas: i64,
}

/// Usage statistics over the trailing 30 days.
#[derive(Clone, Debug, Deserialize)]
pub struct UsageStats {
    pub period_start: String,
    pub period_end: String,
    pub jobs_created: u64,
    #[serde(default)]
    pub jobs_by_status: UsageByStatus,
    #[serde(default)]
    pub gcx_spent: i64,
    #[serde(default)]
    pub gcx_by_operation: UsageByOperation,
}

/// Per-operation line item in a cost estimate.
#[derive(Clone, Debug, Deserialize)]
pub struct CostBreakdownItem {
    pub cost: i64,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Cost estimate for a set of operations, without creating a job.
#[derive(Clone, Debug, Deserialize)]
pub struct CostEstimate {
    pub estimated_gcx: i64,
    #[serde(default)]
    pub breakdown: BTreeMap<String, CostBreakdownItem>,
    pub current_balance: i64,
    pub sufficient_balance: bool,
}

/// Webhook event types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEvent {
    #[serde(rename = "job.completed")]
    JobCompleted,
    #[serde(rename = "job.failed")]
    JobFailed,
    #[serde(rename = "job.cancelled")]
    JobCancelled,
}

/// Response from creating a webhook or rotating its secret.
///
/// The signing `secret` is only ever returned here; store it immediately.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedWebhook {
    pub webhook_id: String,
    pub url: String,
    pub events: Vec<WebhookEvent>,
    pub secret: String,
    pub created_at: String,
}

/// Webhook subscription details (secret omitted).
#[derive(Clone, Debug, Deserialize)]
pub struct Webhook {
    pub webhook_id: String,
    pub url: String,
    pub events: Vec<WebhookEvent>,
    pub active: bool,
    pub created_at: String,
    #[serde(default)]
    pub last_success_at: Option<String>,
    #[serde(default)]
    pub consecutive_failures: u32,
}

/// One page of webhooks.
#[derive(Clone, Debug, Deserialize)]
pub struct WebhookPage {
    pub webhooks: Vec<Webhook>,
    pub pagination: Pagination,
}

/// Advisory rate-limit state captured from response headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Requests allowed per window (`X-RateLimit-Limit`, default 100).
    pub limit: u32,
    /// Requests remaining in the window (`X-RateLimit-Remaining`, default 100).
    pub remaining: u32,
    /// Unix timestamp when the window resets (`X-RateLimit-Reset`, default 0).
    pub reset: u64,
}

impl Default for RateLimitSnapshot {
    fn default() -> Self {
        Self {
            limit: 100,
            remaining: 100,
            reset: 0,
        }
    }
}
