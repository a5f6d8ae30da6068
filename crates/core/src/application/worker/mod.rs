// Worker - Job execution loop

use super::constants::FIRST_WORKER_ID;
use crate::domain::{Job, JobQueue};
use crate::error::{AppError, Result};
use crate::port::{ExecutionError, JobExecutor};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Worker drains jobs from the shared queue, one at a time
pub struct Worker {
    id: usize,
    queue: Arc<JobQueue>,
    executor: Arc<dyn JobExecutor>,
}

impl Worker {
    pub fn new(id: usize, queue: Arc<JobQueue>, executor: Arc<dyn JobExecutor>) -> Self {
        Self {
            id,
            queue,
            executor,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Run until the queue is closed and drained
    pub async fn run(self) {
        info!(worker_id = self.id, "Worker started");
        while let Some(job) = self.queue.dequeue().await {
            if let Err(e) = self.process(job).await {
                error!(worker_id = self.id, duration = %job, error = %e, "Job failed");
            }
        }
        info!(worker_id = self.id, "Worker stopped");
    }

    /// Execute one job with failure isolation.
    ///
    /// The job runs on its own task so a panic surfaces as a `JoinError`
    /// instead of tearing down the worker.
    pub async fn process(&self, job: Job) -> std::result::Result<(), ExecutionError> {
        let executor = Arc::clone(&self.executor);
        let worker_id = self.id;
        let handle = tokio::task::spawn(async move { executor.execute(worker_id, &job).await });

        match handle.await {
            Ok(result) => {
                if result.is_ok() {
                    debug!(worker_id, duration = %job, "Job completed");
                }
                result
            }
            Err(join_err) if join_err.is_panic() => {
                let panic = join_err.into_panic();
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Unknown panic".to_string());
                Err(ExecutionError::Panicked(msg))
            }
            Err(_) => Err(ExecutionError::Cancelled),
        }
    }
}

/// Fixed-size set of workers sharing one queue
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers (ids start at 1). The size never changes afterwards.
    pub fn start(size: usize, queue: Arc<JobQueue>, executor: Arc<dyn JobExecutor>) -> Result<Self> {
        if size == 0 {
            return Err(AppError::Config("worker count must be positive".to_string()));
        }

        let handles = (FIRST_WORKER_ID..FIRST_WORKER_ID + size)
            .map(|id| {
                let worker = Worker::new(id, Arc::clone(&queue), Arc::clone(&executor));
                tokio::spawn(worker.run())
            })
            .collect();

        info!(workers = size, capacity = queue.capacity(), "Worker pool started");
        Ok(Self { handles })
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit (they only do once the queue is closed)
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Worker task ended abnormally");
            }
        }
    }

    /// `join` bounded by `timeout`; returns false if workers were still busy
    pub async fn join_timeout(self, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, self.join()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(timeout = ?timeout, "Workers did not drain in time");
                false
            }
        }
    }
}
