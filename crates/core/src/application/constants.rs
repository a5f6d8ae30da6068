// Application constants (No magic values)
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100_000;

/// Default number of workers
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Worker ids start at 1
pub const FIRST_WORKER_ID: usize = 1;

/// Period between two queue-length reports (1s)
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on one outbound report (5s)
pub const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long shutdown waits for workers to drain (30s)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
