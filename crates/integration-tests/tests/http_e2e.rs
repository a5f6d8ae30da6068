//! End-to-end: real HTTP server, real autoscaler client against a mock endpoint

use queuelength_api_http::{AppState, HttpServer, HttpServerConfig};
use queuelength_core::application::{
    stop_channel, AdmissionPolicy, Dispatcher, ReporterConfig, TelemetryReporter, WorkerPool,
};
use queuelength_core::domain::{CustomMetrics, JobQueue};
use queuelength_core::port::{MetricsSink, SleepExecutor};
use queuelength_infra_autoscaler::{AutoscalerClient, VcapCredentialSource};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    base: String,
    autoscaler: MockServer,
    queue: Arc<JobQueue>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Harness {
    async fn start(policy: AdmissionPolicy, capacity: usize, workers: usize) -> Self {
        let autoscaler = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/apps/app-guid/metrics"))
            .and(basic_auth("scaler", "s3cret"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&autoscaler)
            .await;

        let vcap = json!({
            "user-provided": [{
                "name": "autoscaler",
                "credentials": {
                    "app_id": "app-guid",
                    "username": "scaler",
                    "password": "s3cret",
                    "url": autoscaler.uri()
                }
            }]
        })
        .to_string();

        let queue = Arc::new(JobQueue::new(capacity).unwrap());
        let pool = WorkerPool::start(workers, Arc::clone(&queue), Arc::new(SleepExecutor)).unwrap();

        let (signal, token) = stop_channel();
        let config = ReporterConfig {
            interval: Duration::from_millis(50),
            timeout: Duration::from_millis(500),
        };
        let reporter = TelemetryReporter::bootstrap(
            Arc::clone(&queue),
            &VcapCredentialSource::new(Some(vcap), Some("1".to_string())),
            |credentials| {
                AutoscalerClient::new(credentials, config.timeout)
                    .map(|c| Arc::new(c) as Arc<dyn MetricsSink>)
            },
            config,
            token,
        )
        .unwrap();

        let state = AppState::new(
            Dispatcher::new(Arc::clone(&queue), policy),
            signal,
            Some(reporter.subscribe()),
            pool.size(),
        );
        let server = HttpServer::bind(
            &HttpServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            state,
        )
        .await
        .unwrap();
        let base = format!("http://{}", server.local_addr().unwrap());

        let (shutdown, rx) = oneshot::channel();
        tokio::spawn(server.serve(async move {
            let _ = rx.await;
        }));

        Self {
            base,
            autoscaler,
            queue,
            shutdown: Some(shutdown),
        }
    }

    async fn post(&self, uri: &str) -> (StatusCode, String) {
        let response = reqwest::Client::new()
            .post(format!("{}{}", self.base, uri))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    async fn health(&self) -> Value {
        reqwest::get(format!("{}/health", self.base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn reports(&self) -> Vec<CustomMetrics> {
        self.autoscaler
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_work_is_queued_and_reported() {
    // One worker busy with the first job, the rest stays queued
    let h = Harness::start(AdmissionPolicy::Reject, 10, 1).await;

    for _ in 0..4 {
        assert_eq!(h.post("/work?delay=2s").await.0, StatusCode::CREATED);
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    let reports = h.reports().await;
    assert!(!reports.is_empty(), "reporter should have ticked");
    let last = reports.last().unwrap();
    assert_eq!(last.instance_index, 1);
    assert_eq!(last.metrics.len(), 1);
    assert_eq!(last.metrics[0].name, "queuelength");
    assert_eq!(last.metrics[0].unit, "");
    assert_eq!(last.metrics[0].value, 3);

    let health = h.health().await;
    assert_eq!(health["queue_length"], 3);
    assert_eq!(health["workers"], 1);
    assert_eq!(health["reporter"], "running");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bad_delay_rejected() {
    let h = Harness::start(AdmissionPolicy::Reject, 10, 1).await;

    let (status, body) = h.post("/work?delay=forever").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Bad delay value"));
    assert_eq!(h.queue.current_length(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_queue_maps_to_503() {
    let h = Harness::start(AdmissionPolicy::Reject, 1, 1).await;

    // Worker takes the first, the second fills the single slot
    assert_eq!(h.post("/work?delay=5s").await.0, StatusCode::CREATED);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.post("/work?delay=5s").await.0, StatusCode::CREATED);
    assert_eq!(h.post("/work?delay=5s").await.0, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_detached_admission_answers_while_saturated() {
    let h = Harness::start(AdmissionPolicy::Detached, 1, 1).await;

    for _ in 0..10 {
        let (status, _) = tokio::time::timeout(Duration::from_secs(1), h.post("/work?delay=5s"))
            .await
            .expect("admission must not wait for queue space");
        assert_eq!(status, StatusCode::CREATED);
    }
    assert!(h.queue.current_length() <= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_emit_stop_halts_reporting() {
    let h = Harness::start(AdmissionPolicy::Reject, 10, 1).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (status, _) = h.post("/emitStop").await;
    assert_eq!(status, StatusCode::OK);

    // Give an in-flight report time to land, then the count must freeze
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after_stop = h.reports().await.len();
    assert!(after_stop > 0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.reports().await.len(), after_stop);

    // Second stop is refused, not fatal
    let (status, _) = h.post("/emitStop").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(h.post("/work?delay=10ms").await.0, StatusCode::CREATED);

    assert_eq!(h.health().await["reporter"], "stopped");
}
