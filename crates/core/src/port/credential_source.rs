// Credential Source Port
// Supplies the telemetry reporter with who it is and where to report

use crate::domain::Credentials;
use thiserror::Error;

/// Resolution errors (fatal to the telemetry reporter only)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Malformed service bindings: {0}")]
    Malformed(String),

    #[error("Missing Auto-Scaling credentials: {0}")]
    NotFound(String),

    #[error("Invalid instance index: {0}")]
    InvalidInstanceIndex(String),
}

/// Everything the reporter needs, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterIdentity {
    pub credentials: Credentials,
    pub instance_index: u32,
}

/// Credential Source trait
pub trait CredentialSource: Send + Sync {
    fn resolve(&self) -> Result<ReporterIdentity, ResolveError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Returns a fixed outcome
    pub struct StaticCredentialSource {
        outcome: Result<ReporterIdentity, ResolveError>,
    }

    impl StaticCredentialSource {
        pub fn found(credentials: Credentials, instance_index: u32) -> Self {
            Self {
                outcome: Ok(ReporterIdentity {
                    credentials,
                    instance_index,
                }),
            }
        }

        pub fn missing() -> Self {
            Self {
                outcome: Err(ResolveError::NotFound(
                    "no binding named autoscaler*".to_string(),
                )),
            }
        }
    }

    impl CredentialSource for StaticCredentialSource {
        fn resolve(&self) -> Result<ReporterIdentity, ResolveError> {
            self.outcome.clone()
        }
    }
}
