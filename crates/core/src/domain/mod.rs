// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod queue;
pub mod telemetry;

// Re-exports
pub use error::DomainError;
pub use job::{parse_delay, Job};
pub use queue::JobQueue;
pub use telemetry::{Credentials, CustomMetrics, Metric, TelemetrySample, QUEUE_LENGTH_METRIC};
