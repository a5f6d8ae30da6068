// Dispatcher - turns a validated request into an admitted job

use crate::domain::{DomainError, Job, JobQueue};
use crate::error::{AppError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How a job enters the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionPolicy {
    /// Fire-and-forget: a background task waits for a free slot, the caller
    /// is acknowledged immediately
    #[default]
    Detached,
    /// Non-blocking: a full queue is reported back as `QueueFull`
    Reject,
}

impl fmt::Display for AdmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionPolicy::Reject => write!(f, "reject"),
            AdmissionPolicy::Detached => write!(f, "detached"),
        }
    }
}

impl FromStr for AdmissionPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(AdmissionPolicy::Reject),
            "detached" => Ok(AdmissionPolicy::Detached),
            other => Err(AppError::Config(format!(
                "unknown admission policy '{}' (expected 'reject' or 'detached')",
                other
            ))),
        }
    }
}

/// Outcome of a successful admission
#[derive(Debug)]
pub enum Admission {
    /// The job is in the queue
    Enqueued,
    /// The enqueue attempt was started; the handle resolves once the job is
    /// actually buffered (or the queue closed first)
    Detached(JoinHandle<std::result::Result<(), DomainError>>),
}

/// Dispatcher (admission path of the service)
#[derive(Clone)]
pub struct Dispatcher {
    queue: Arc<JobQueue>,
    policy: AdmissionPolicy,
}

impl Dispatcher {
    pub fn new(queue: Arc<JobQueue>, policy: AdmissionPolicy) -> Self {
        Self { queue, policy }
    }

    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    /// Parse `delay` and admit the resulting job.
    ///
    /// A bad delay is a validation error and leaves the queue untouched.
    pub fn submit(&self, delay: &str) -> Result<Admission> {
        let job = Job::from_delay(delay).map_err(|e| AppError::Validation(e.to_string()))?;
        self.admit(job)
    }

    /// Admit a job according to the configured policy.
    ///
    /// Must be called from within a tokio runtime.
    pub fn admit(&self, job: Job) -> Result<Admission> {
        match self.policy {
            AdmissionPolicy::Reject => {
                self.queue.try_enqueue(job)?;
                debug!(duration = %job, "add a new job");
                Ok(Admission::Enqueued)
            }
            AdmissionPolicy::Detached => {
                let queue = Arc::clone(&self.queue);
                let handle = tokio::spawn(async move {
                    debug!(duration = %job, "add a new job");
                    let result = queue.enqueue(job).await;
                    if let Err(e) = &result {
                        warn!(duration = %job, error = %e, "Dropped detached admission");
                    }
                    result
                });
                Ok(Admission::Detached(handle))
            }
        }
    }
}
