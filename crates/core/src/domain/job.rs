// Job Domain Model

use super::error::{DomainError, Result};
use std::fmt;
use std::time::Duration;

/// One unit of simulated work.
///
/// A job only carries the time a worker spends on it. It is consumed by exactly
/// one worker and dropped once executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    duration: Duration,
}

impl Job {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Build a job from a textual delay such as `"2s"` or `"500ms"`
    pub fn from_delay(delay: &str) -> Result<Self> {
        parse_delay(delay).map(Self::new)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.duration))
    }
}

/// Parse a delay string into a non-negative duration.
///
/// Accepts the usual unit suffixes (`ns`, `us`, `ms`, `s`, `m`, `h`) and
/// compound values like `"1m30s"`. A bare `"0"` is zero and a leading
/// `.` reads as `0.` (`".5s"` is half a second).
pub fn parse_delay(delay: &str) -> Result<Duration> {
    let delay = delay.trim();
    if delay.is_empty() {
        return Err(DomainError::InvalidDelay("missing delay".to_string()));
    }
    if delay.starts_with('-') {
        return Err(DomainError::InvalidDelay(format!(
            "negative duration \"{}\"",
            delay
        )));
    }
    if delay == "0" {
        return Ok(Duration::ZERO);
    }

    let unsigned = delay.trim_start_matches('+');
    let normalized = if unsigned.starts_with('.') {
        format!("0{}", unsigned)
    } else {
        unsigned.to_string()
    };

    humantime::parse_duration(&normalized)
        .map_err(|e| DomainError::InvalidDelay(format!("invalid duration \"{}\": {}", delay, e)))
}
