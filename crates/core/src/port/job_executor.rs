// Job Executor Port
// Abstraction for running a job's work once a worker has claimed it

use crate::domain::Job;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Job failed: {0}")]
    Failed(String),

    #[error("Job panicked: {0}")]
    Panicked(String),

    #[error("Job cancelled")]
    Cancelled,
}

/// Job Executor trait
///
/// Implementations:
/// - SleepExecutor: simulates work by sleeping for the job's duration
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run a job to completion on behalf of worker `worker_id`
    async fn execute(&self, worker_id: usize, job: &Job) -> Result<(), ExecutionError>;
}

/// Simulated work: suspend the calling worker for the job's duration
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepExecutor;

#[async_trait]
impl JobExecutor for SleepExecutor {
    async fn execute(&self, worker_id: usize, job: &Job) -> Result<(), ExecutionError> {
        info!(
            worker_id,
            seconds = job.duration().as_secs_f64(),
            "worker will work"
        );
        tokio::time::sleep(job.duration()).await;
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Sleep like the real executor
        Sleep,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// One recorded execution
    #[derive(Debug, Clone)]
    pub struct ExecutionRecord {
        pub worker_id: usize,
        pub job: Job,
        pub started: Instant,
        pub finished: Instant,
    }

    /// Mock Job Executor that records every execution
    pub struct MockJobExecutor {
        behavior: Mutex<MockBehavior>,
        records: Mutex<Vec<ExecutionRecord>>,
    }

    impl MockJobExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                records: Mutex::new(Vec::new()),
            }
        }

        pub fn new_sleeping() -> Self {
            Self::new(MockBehavior::Sleep)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn records(&self) -> Vec<ExecutionRecord> {
            self.records.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl JobExecutor for MockJobExecutor {
        async fn execute(&self, worker_id: usize, job: &Job) -> Result<(), ExecutionError> {
            let started = Instant::now();
            let behavior = self.behavior.lock().unwrap().clone();

            let outcome = match behavior {
                MockBehavior::Sleep => {
                    tokio::time::sleep(job.duration()).await;
                    Ok(())
                }
                MockBehavior::Fail(msg) => Err(ExecutionError::Failed(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            };

            self.records.lock().unwrap().push(ExecutionRecord {
                worker_id,
                job: *job,
                started,
                finished: Instant::now(),
            });
            outcome
        }
    }
}
