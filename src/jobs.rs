use std::time::{Duration, Instant};

use reqwest::Method;
use tokio::time::sleep;

use crate::{
    types::{CreatedJob, EnhancementOptions, Job, JobPage, JobStatus, Operation},
    wire, GcxClient, GcxError, Result, WaitOptions,
};

/// Builder for a job creation request.
///
/// Defaults to running the full pipeline (`nova`, `flux`, `atlas`).
#[derive(Clone, Debug)]
pub struct NewJob {
    pub image_url: String,
    pub operations: Vec<Operation>,
    pub options: Option<EnhancementOptions>,
    pub webhook_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
    /// Sent as `X-Request-ID` for idempotent creation: re-sending the same
    /// id returns the originally created job instead of a duplicate.
    pub request_id: Option<String>,
}

impl NewJob {
    /// Starts a job request for a publicly accessible image URL.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            operations: Operation::all(),
            options: None,
            webhook_url: None,
            metadata: None,
            request_id: None,
        }
    }

    /// Restricts the job to a subset of operations.
    pub fn operations(mut self, operations: impl Into<Vec<Operation>>) -> Self {
        self.operations = operations.into();
        self
    }

    pub fn options(mut self, options: EnhancementOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// URL to notify when the job reaches a terminal state.
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Attaches custom metadata, echoed back on the job snapshot.
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Idempotency key for the creation call.
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Query for [`JobsApi::list`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListJobs {
    /// Maximum jobs to return (1-100).
    pub limit: u32,
    /// Jobs to skip for pagination.
    pub offset: u32,
    /// Optional status filter.
    pub status: Option<JobStatus>,
}

impl Default for ListJobs {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            status: None,
        }
    }
}

impl ListJobs {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn to_query(&self) -> String {
        let mut query = format!("limit={}&offset={}", self.limit, self.offset);
        if let Some(status) = self.status {
            query.push_str("&status=");
            query.push_str(status.as_str());
        }
        query
    }
}

/// Jobs facade: creates and manages enhancement jobs.
#[derive(Clone, Copy, Debug)]
pub struct JobsApi<'a> {
    client: &'a GcxClient,
}

impl<'a> JobsApi<'a> {
    pub(crate) fn new(client: &'a GcxClient) -> Self {
        Self { client }
    }

    /// Creates a new enhancement job. The job runs asynchronously; poll it
    /// with [`JobsApi::wait`] or subscribe to a webhook.
    pub async fn create(&self, job: NewJob) -> Result<CreatedJob> {
        let body = serde_json::to_value(wire::CreateJobBody {
            image_url: job.image_url,
            operations: job.operations,
            options: job.options,
            webhook_url: job.webhook_url,
            metadata: job.metadata,
        })
        .map_err(|err| GcxError::Decode(format!("invalid job body: {err}")))?;

        let mut headers = Vec::new();
        if let Some(request_id) = &job.request_id {
            headers.push(("X-Request-ID", request_id.as_str()));
        }

        let envelope = self
            .client
            .send(Method::POST, "/jobs", Some(body), &headers)
            .await?;
        wire::decode(envelope.body)
    }

    /// Fetches the current snapshot of a job.
    pub async fn get(&self, job_id: &str) -> Result<Job> {
        let envelope = self
            .client
            .send(Method::GET, &format!("/jobs/{job_id}"), None, &[])
            .await?;
        wire::decode(envelope.body)
    }

    /// Lists jobs with pagination and optional status filtering.
    pub async fn list(&self, query: ListJobs) -> Result<JobPage> {
        let envelope = self
            .client
            .send(Method::GET, &format!("/jobs?{}", query.to_query()), None, &[])
            .await?;
        wire::decode(envelope.body)
    }

    /// Cancels a pending job. Jobs already processing cannot be cancelled.
    pub async fn cancel(&self, job_id: &str) -> Result<()> {
        self.client
            .send(Method::DELETE, &format!("/jobs/{job_id}"), None, &[])
            .await?;
        Ok(())
    }

    /// Polls a job at a fixed interval until it reaches a terminal state or
    /// the wall-clock budget elapses.
    ///
    /// Returns the completed snapshot on success. A `failed` or `cancelled`
    /// job fails with [`GcxError::JobFailed`]; an exhausted budget fails
    /// with [`GcxError::Timeout`] without issuing another fetch.
    pub async fn wait(&self, job_id: &str, opts: WaitOptions) -> Result<Job> {
        self.wait_with_progress(job_id, opts, |_| {}).await
    }

    /// Like [`JobsApi::wait`], invoking `on_progress` with every snapshot
    /// observed, terminal ones included.
    pub async fn wait_with_progress<F>(
        &self,
        job_id: &str,
        opts: WaitOptions,
        mut on_progress: F,
    ) -> Result<Job>
    where
        F: FnMut(&Job),
    {
        let budget = Duration::from_millis(opts.timeout_ms);
        let interval = Duration::from_millis(opts.poll_interval_ms);
        let started = Instant::now();

        while started.elapsed() < budget {
            let job = self.get(job_id).await?;
            on_progress(&job);

            match job.status {
                JobStatus::Completed => return Ok(job),
                JobStatus::Failed => {
                    let (code, message, stage) = match job.error {
                        Some(error) => (
                            error.code,
                            error.message,
                            error.stage.map(|op| op.as_str().to_owned()),
                        ),
                        None => ("unknown".to_owned(), "Job failed".to_owned(), None),
                    };
                    return Err(GcxError::JobFailed {
                        job_id: job.job_id,
                        code,
                        message,
                        stage,
                    });
                }
                JobStatus::Cancelled => {
                    return Err(GcxError::JobFailed {
                        job_id: job.job_id,
                        code: "cancelled".to_owned(),
                        message: "Job was cancelled".to_owned(),
                        stage: None,
                    });
                }
                JobStatus::Pending | JobStatus::Processing => {}
            }

            sleep(interval).await;
        }

        Err(GcxError::Timeout {
            elapsed: started.elapsed(),
        })
    }

    /// Creates a job and waits for completion in one call.
    pub async fn create_and_wait(&self, job: NewJob, opts: WaitOptions) -> Result<Job> {
        let created = self.create(job).await?;
        self.wait(&created.job_id, opts).await
    }
}
