// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod dispatcher;
pub mod reporter;
pub mod worker;

// Re-exports
pub use dispatcher::{Admission, AdmissionPolicy, Dispatcher};
pub use reporter::{stop_channel, ReporterConfig, ReporterHandle, ReporterState, StopSignal, StopToken, TelemetryReporter};
pub use worker::{Worker, WorkerPool};
