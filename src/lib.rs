//! `golden-codex` is an async HTTP client for the Golden Codex image
//! enhancement API.
//!
//! The crate wraps the `/v1` REST surface with ergonomic, typed methods:
//! - [`GcxClient::jobs`] — create, inspect, list, cancel and wait on
//!   enhancement jobs
//! - [`GcxClient::account`] — balance and usage statistics
//! - [`GcxClient::webhooks`] — webhook subscription management
//! - [`verify_signature`] — inbound webhook authenticity checks
//!
//! # Example
//!
//! ```no_run
//! use golden_codex::{GcxClient, NewJob, WaitOptions};
//!
//! # async fn run() -> golden_codex::Result<()> {
//! let gcx = GcxClient::new("gcx_live_...");
//!
//! let created = gcx.jobs().create(NewJob::new("https://example.com/artwork.jpg")).await?;
//! let job = gcx.jobs().wait(&created.job_id, WaitOptions::default()).await?;
//! println!("{:?}", job.results);
//! # Ok(())
//! # }
//! ```

mod account;
mod client;
mod error;
mod jobs;
mod options;
mod signature;
mod types;
mod webhooks;
mod wire;

pub use account::AccountApi;
pub use client::{Envelope, GcxClient};
pub use error::GcxError;
pub use jobs::{JobsApi, ListJobs, NewJob};
pub use options::{ClientOptions, WaitOptions};
pub use signature::{generate_signature, verify_signature, DEFAULT_MAX_AGE_SECS};
pub use types::{
    Account, AccountBalance, AtlasFormat, AtlasOptions, CostBreakdownItem, CostEstimate,
    CreatedJob, CreatedWebhook, EnhancementOptions, FluxModel, FluxOptions, GoldenCodexMetadata,
    Job, JobCost, JobError, JobLinks, JobPage, JobProgress, JobResults, JobStatus, JobUrls,
    NovaOptions, NovaTier, Operation, Pagination, RateLimitInfo, RateLimitSnapshot,
    SubscriptionTier, UsageByOperation, UsageByStatus, UsageStats, Webhook, WebhookEvent,
    WebhookPage,
};
pub use webhooks::{UpdateWebhook, WebhooksApi};

pub type Result<T> = std::result::Result<T, GcxError>;
