//! HTTP Server
//!
//! axum router plus a small wrapper that binds and serves it with graceful
//! shutdown.

use crate::handler::{emit_stop, health, post_work, AppState};
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/work", post(post_work))
        .route("/emitStop", post(emit_stop))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP Server
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    /// Bind the listening socket
    pub async fn bind(config: &HttpServerConfig, state: AppState) -> std::io::Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %addr, "HTTP server bound");
        Ok(Self {
            listener,
            router: router(state),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` resolves; in-flight requests are finished first
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthResponse, ReporterStatus};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use queuelength_core::application::{
        stop_channel, AdmissionPolicy, Dispatcher, ReporterState, StopSignal,
    };
    use queuelength_core::domain::JobQueue;
    use std::sync::Arc;
    use tokio::sync::watch;
    use tower::ServiceExt;

    fn state(capacity: usize, policy: AdmissionPolicy) -> (AppState, Arc<JobQueue>, StopSignal) {
        let queue = Arc::new(JobQueue::new(capacity).unwrap());
        let (signal, _token) = stop_channel();
        let state = AppState::new(
            Dispatcher::new(Arc::clone(&queue), policy),
            signal.clone(),
            None,
            2,
        );
        (state, queue, signal)
    }

    async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_work_valid_delay_created() {
        let (state, queue, _) = state(4, AdmissionPolicy::Reject);
        let app = router(state);

        let (status, body) = call(&app, "POST", "/work?delay=2s").await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.is_empty());
        assert_eq!(queue.current_length(), 1);
    }

    #[tokio::test]
    async fn test_work_invalid_delay_bad_request() {
        let (state, queue, _) = state(4, AdmissionPolicy::Reject);
        let app = router(state);

        for uri in ["/work?delay=soon", "/work?delay=", "/work", "/work?delay=-3s"] {
            let (status, body) = call(&app, "POST", uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
            assert!(body.contains("Bad delay value"), "body {:?}", body);
        }
        assert_eq!(queue.current_length(), 0);
    }

    #[tokio::test]
    async fn test_work_full_queue_rejected() {
        let (state, queue, _) = state(1, AdmissionPolicy::Reject);
        let app = router(state);

        assert_eq!(call(&app, "POST", "/work?delay=1s").await.0, StatusCode::CREATED);
        assert_eq!(
            call(&app, "POST", "/work?delay=1s").await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(queue.current_length(), 1);
    }

    #[tokio::test]
    async fn test_work_detached_never_blocks_on_full_queue() {
        let (state, queue, _) = state(1, AdmissionPolicy::Detached);
        let app = router(state);

        for _ in 0..5 {
            let (status, _) = tokio::time::timeout(
                std::time::Duration::from_millis(500),
                call(&app, "POST", "/work?delay=1s"),
            )
            .await
            .expect("admission must not wait for queue space");
            assert_eq!(status, StatusCode::CREATED);
        }
        tokio::task::yield_now().await;
        assert!(queue.current_length() <= 1);
    }

    #[tokio::test]
    async fn test_work_default_policy_accepts_on_full_queue() {
        let (state, queue, _) = state(1, AdmissionPolicy::default());
        let app = router(state);

        for _ in 0..3 {
            assert_eq!(call(&app, "POST", "/work?delay=1s").await.0, StatusCode::CREATED);
        }
        tokio::task::yield_now().await;
        assert_eq!(queue.current_length(), 1);
    }

    #[tokio::test]
    async fn test_work_closed_queue_unavailable() {
        let (state, queue, _) = state(4, AdmissionPolicy::Reject);
        queue.close();
        let app = router(state);
        assert_eq!(
            call(&app, "POST", "/work?delay=1s").await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_work_requires_post() {
        let (state, _, _) = state(4, AdmissionPolicy::Reject);
        let app = router(state);
        assert_eq!(
            call(&app, "GET", "/work?delay=1s").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_emit_stop_once_then_conflict() {
        let (state, _, signal) = state(4, AdmissionPolicy::Reject);
        let app = router(state);

        let (status, _) = call(&app, "POST", "/emitStop").await;
        assert_eq!(status, StatusCode::OK);
        assert!(signal.is_triggered());

        let (status, body) = call(&app, "POST", "/emitStop").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("already stopped"));

        // Service keeps working
        assert_eq!(call(&app, "POST", "/work?delay=1ms").await.0, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_health_reports_queue_and_reporter() {
        let queue = Arc::new(JobQueue::new(8).unwrap());
        queue.try_enqueue(queuelength_core::domain::Job::new(std::time::Duration::ZERO)).unwrap();
        let (signal, _token) = stop_channel();
        let (_state_tx, state_rx) = watch::channel(ReporterState::Running);
        let app = router(AppState::new(
            Dispatcher::new(Arc::clone(&queue), AdmissionPolicy::Detached),
            signal,
            Some(state_rx),
            3,
        ));

        let (status, body) = call(&app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.queue_length, 1);
        assert_eq!(health.queue_capacity, 8);
        assert_eq!(health.workers, 3);
        assert_eq!(health.admission, "detached");
        assert_eq!(health.reporter, ReporterStatus::Running);
    }

    #[tokio::test]
    async fn test_health_without_telemetry() {
        let (state, _, _) = state(4, AdmissionPolicy::Reject);
        let (_, body) = call(&router(state), "GET", "/health").await;
        let health: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(health.reporter, ReporterStatus::Disabled);
    }
}
