use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use axum::{body::Body, extract::State, http::StatusCode, response::Response, Router};
use golden_codex::{
    ClientOptions, GcxClient, GcxError, JobStatus, ListJobs, NewJob, Operation, UpdateWebhook,
    WaitOptions, WebhookEvent,
};
use serde_json::{json, Value as JsonValue};

#[derive(Clone)]
struct MockResponse {
    status: StatusCode,
    body: String,
}

impl MockResponse {
    fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct RecordedRequest {
    method: String,
    path: String,
    body: String,
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Served once the queue is drained; lets a job stay `processing` forever.
    fallback: Option<MockResponse>,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn api_handler(State(state): State<MockState>, request: axum::extract::Request) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    state
        .requests
        .lock()
        .expect("request log mutex must not be poisoned")
        .push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts
                .uri
                .path_and_query()
                .map(|pq| pq.to_string())
                .unwrap_or_default(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front()
    }
    .or_else(|| state.fallback.clone())
    .unwrap_or_else(|| {
        MockResponse::json(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": {"code": "mock_exhausted", "message": "no mock response available"}}),
        )
    });

    Response::builder()
        .status(response.status)
        .header("content-type", "application/json")
        .body(Body::from(response.body))
        .expect("mock response must build")
}

struct TestServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn spawn_server(responses: Vec<MockResponse>, fallback: Option<MockResponse>) -> TestServer {
    let state = MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        fallback,
        hits: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new().fallback(api_handler).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        hits: state.hits,
        requests: state.requests,
        task,
    }
}

fn client_for(server: &TestServer) -> GcxClient {
    GcxClient::with_base_url(&server.base_url, "gcx_test_key").with_options(ClientOptions {
        timeout_ms: 2_000,
        max_retries: 0,
    })
}

fn job_body(status: &str, error: Option<JsonValue>) -> JsonValue {
    json!({
        "job_id": "job_abc123",
        "status": status,
        "operations": ["nova", "flux", "atlas"],
        "progress": { "nova": "completed", "flux": status, "atlas": "pending" },
        "results": if status == "completed" {
            json!({
                "golden_codex": { "title": "Dusk Over Glass", "soul_whisper": "quiet amber" },
                "urls": { "original": "https://cdn/o.jpg", "final": "https://cdn/f.png" },
                "artwork_id": "art_9"
            })
        } else {
            JsonValue::Null
        },
        "error": error,
        "cost": { "estimated_gcx": 5, "charged_gcx": 5 },
        "created_at": "2026-01-01T00:00:00Z"
    })
}

fn fast_wait() -> WaitOptions {
    WaitOptions {
        poll_interval_ms: 100,
        timeout_ms: 10_000,
    }
}

#[tokio::test]
async fn wait_polls_through_to_completion() {
    let server = spawn_server(
        vec![
            MockResponse::json(StatusCode::OK, job_body("pending", None)),
            MockResponse::json(StatusCode::OK, job_body("processing", None)),
            MockResponse::json(StatusCode::OK, job_body("completed", None)),
        ],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let mut observed = Vec::new();
    let job = gcx
        .jobs()
        .wait_with_progress("job_abc123", fast_wait(), |snapshot| {
            observed.push(snapshot.status);
        })
        .await
        .expect("job must complete");

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(
        observed,
        vec![
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed
        ]
    );
    assert_eq!(server.hits.load(Ordering::SeqCst), 3);

    let results = job.results.expect("completed job must carry results");
    let metadata = results.golden_codex.expect("must carry metadata");
    assert_eq!(metadata.title.as_deref(), Some("Dusk Over Glass"));
    assert_eq!(
        results.urls.expect("must carry urls").final_.as_deref(),
        Some("https://cdn/f.png")
    );
}

#[tokio::test]
async fn wait_times_out_on_a_stuck_job() {
    let server = spawn_server(
        Vec::new(),
        Some(MockResponse::json(
            StatusCode::OK,
            job_body("processing", None),
        )),
    )
    .await;
    let gcx = client_for(&server);

    let started = Instant::now();
    let err = gcx
        .jobs()
        .wait(
            "job_abc123",
            WaitOptions {
                poll_interval_ms: 100,
                timeout_ms: 500,
            },
        )
        .await
        .expect_err("wait must time out");

    let elapsed = started.elapsed();
    assert!(matches!(err, GcxError::Timeout { .. }));
    assert!(
        elapsed >= Duration::from_millis(450),
        "timed out too early: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(3),
        "timed out too late: {elapsed:?}"
    );
}

#[tokio::test]
async fn wait_surfaces_job_failure_verbatim() {
    let server = spawn_server(
        vec![MockResponse::json(
            StatusCode::OK,
            job_body(
                "failed",
                Some(json!({
                    "code": "nova_error",
                    "message": "Nova analysis crashed",
                    "stage": "nova",
                    "retryable": false
                })),
            ),
        )],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let err = gcx
        .jobs()
        .wait("job_abc123", fast_wait())
        .await
        .expect_err("wait must fail");

    match err {
        GcxError::JobFailed {
            job_id,
            code,
            stage,
            ..
        } => {
            assert_eq!(job_id, "job_abc123");
            assert_eq!(code, "nova_error");
            assert_eq!(stage.as_deref(), Some("nova"));
        }
        other => panic!("expected job failure, got {other:?}"),
    }
}

#[tokio::test]
async fn wait_synthesizes_descriptor_for_undescribed_failure() {
    let server = spawn_server(
        vec![MockResponse::json(StatusCode::OK, job_body("failed", None))],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let err = gcx
        .jobs()
        .wait("job_abc123", fast_wait())
        .await
        .expect_err("wait must fail");

    assert!(matches!(
        err,
        GcxError::JobFailed { code, .. } if code == "unknown"
    ));
}

#[tokio::test]
async fn wait_treats_cancellation_as_failure() {
    let server = spawn_server(
        vec![MockResponse::json(
            StatusCode::OK,
            job_body("cancelled", None),
        )],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let err = gcx
        .jobs()
        .wait("job_abc123", fast_wait())
        .await
        .expect_err("wait must fail");

    assert!(matches!(
        err,
        GcxError::JobFailed { code, .. } if code == "cancelled"
    ));
}

#[tokio::test]
async fn create_and_wait_chains_both_calls() {
    let server = spawn_server(
        vec![
            MockResponse::json(
                StatusCode::ACCEPTED,
                json!({
                    "job_id": "job_abc123",
                    "status": "pending",
                    "operations": ["nova"],
                    "cost": { "estimated_gcx": 2 },
                    "created_at": "2026-01-01T00:00:00Z",
                    "links": { "self": "/v1/jobs/job_abc123", "cancel": "/v1/jobs/job_abc123" }
                }),
            ),
            MockResponse::json(StatusCode::OK, job_body("completed", None)),
        ],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let job = gcx
        .jobs()
        .create_and_wait(
            NewJob::new("https://example.com/a.jpg").operations([Operation::Nova]),
            fast_wait(),
        )
        .await
        .expect("must create and complete");

    assert_eq!(job.status, JobStatus::Completed);
    let requests = server.requests.lock().expect("request log");
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/jobs");
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].path, "/jobs/job_abc123");
}

#[tokio::test]
async fn list_decodes_page_and_pagination() {
    let server = spawn_server(
        vec![MockResponse::json(
            StatusCode::OK,
            json!({
                "jobs": [job_body("completed", None)],
                "pagination": { "total": 41, "limit": 20, "offset": 20 }
            }),
        )],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let page = gcx
        .jobs()
        .list(ListJobs::default().offset(20).status(JobStatus::Completed))
        .await
        .expect("list must succeed");

    assert_eq!(page.jobs.len(), 1);
    assert!(page.pagination.has_more());

    let requests = server.requests.lock().expect("request log");
    assert_eq!(requests[0].path, "/jobs?limit=20&offset=20&status=completed");
}

#[tokio::test]
async fn account_and_usage_decode() {
    let server = spawn_server(
        vec![
            MockResponse::json(
                StatusCode::OK,
                json!({
                    "user_id": "user_1",
                    "email": "kit@example.com",
                    "tier": "STUDIO",
                    "balance": { "gcx": 120, "storage_used_bytes": 1024, "storage_limit_bytes": 10737418240u64 },
                    "rate_limit": { "requests_per_minute": 60, "concurrent_jobs": 10 }
                }),
            ),
            MockResponse::json(
                StatusCode::OK,
                json!({
                    "period_start": "2026-07-30T00:00:00Z",
                    "period_end": "2026-08-29T00:00:00Z",
                    "jobs_created": 14,
                    "jobs_by_status": { "completed": 11, "failed": 2, "cancelled": 1 },
                    "gcx_spent": 61,
                    "gcx_by_operation": { "nova": 28, "flux": 28, "atlas": 5 }
                }),
            ),
        ],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let account = gcx.account().get().await.expect("account must decode");
    assert_eq!(account.balance.gcx, 120);
    assert_eq!(account.rate_limit.requests_per_minute, 60);

    let usage = gcx.account().usage().await.expect("usage must decode");
    assert_eq!(usage.jobs_created, 14);
    assert_eq!(usage.jobs_by_status.completed, 11);
    assert_eq!(usage.gcx_by_operation.atlas, 5);
}

#[tokio::test]
async fn estimate_decodes_breakdown() {
    let server = spawn_server(
        vec![MockResponse::json(
            StatusCode::OK,
            json!({
                "estimated_gcx": 5,
                "breakdown": {
                    "nova": { "cost": 2, "tier": "standard" },
                    "flux": { "cost": 2, "model": "4x" },
                    "atlas": { "cost": 1 }
                },
                "current_balance": 120,
                "sufficient_balance": true
            }),
        )],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let estimate = gcx
        .estimate(Vec::new(), None)
        .await
        .expect("estimate must decode");

    assert_eq!(estimate.estimated_gcx, 5);
    assert!(estimate.sufficient_balance);
    assert_eq!(estimate.breakdown["flux"].model.as_deref(), Some("4x"));

    // An empty operation list estimates the full pipeline.
    let requests = server.requests.lock().expect("request log");
    assert!(requests[0].body.contains("\"nova\""));
    assert!(requests[0].body.contains("\"atlas\""));
}

#[tokio::test]
async fn webhook_create_defaults_to_terminal_events() {
    let server = spawn_server(
        vec![MockResponse::json(
            StatusCode::CREATED,
            json!({
                "webhook_id": "wh_1",
                "url": "https://example.com/hook",
                "events": ["job.completed", "job.failed"],
                "secret": "whsec_only_shown_once",
                "created_at": "2026-01-01T00:00:00Z"
            }),
        )],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let webhook = gcx
        .webhooks()
        .create("https://example.com/hook", Vec::new())
        .await
        .expect("create must succeed");

    assert_eq!(webhook.secret, "whsec_only_shown_once");

    let requests = server.requests.lock().expect("request log");
    assert!(requests[0].body.contains("job.completed"));
    assert!(requests[0].body.contains("job.failed"));
    assert!(!requests[0].body.contains("job.cancelled"));
}

#[tokio::test]
async fn webhook_update_and_rotation() {
    let server = spawn_server(
        vec![
            MockResponse::json(
                StatusCode::OK,
                json!({
                    "webhook_id": "wh_1",
                    "url": "https://example.com/hook",
                    "events": ["job.cancelled"],
                    "active": false,
                    "created_at": "2026-01-01T00:00:00Z",
                    "consecutive_failures": 3
                }),
            ),
            MockResponse::json(
                StatusCode::OK,
                json!({
                    "webhook_id": "wh_1",
                    "url": "https://example.com/hook",
                    "events": ["job.cancelled"],
                    "secret": "whsec_rotated",
                    "created_at": "2026-01-01T00:00:00Z"
                }),
            ),
        ],
        None,
    )
    .await;
    let gcx = client_for(&server);

    let webhook = gcx
        .webhooks()
        .update(
            "wh_1",
            UpdateWebhook::default()
                .events([WebhookEvent::JobCancelled])
                .active(false),
        )
        .await
        .expect("update must succeed");
    assert!(!webhook.active);
    assert_eq!(webhook.events, vec![WebhookEvent::JobCancelled]);

    let rotated = gcx
        .webhooks()
        .rotate_secret("wh_1")
        .await
        .expect("rotation must succeed");
    assert_eq!(rotated.secret, "whsec_rotated");

    let requests = server.requests.lock().expect("request log");
    assert_eq!(requests[0].method, "PATCH");
    assert_eq!(requests[0].path, "/webhooks/wh_1");
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].path, "/webhooks/wh_1/rotate-secret");
}
