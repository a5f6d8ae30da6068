// Port Layer - Interfaces for external dependencies

pub mod credential_source;
pub mod job_executor;
pub mod metrics_sink;

// Re-exports
pub use credential_source::{CredentialSource, ReporterIdentity, ResolveError};
pub use job_executor::{ExecutionError, JobExecutor, SleepExecutor};
pub use metrics_sink::{MetricsSink, ReportError};
