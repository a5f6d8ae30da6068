// Queuelength Infrastructure - Autoscaler Adapters
// Implements: MetricsSink, CredentialSource

pub mod client;
pub mod vcap;

pub use client::AutoscalerClient;
pub use vcap::{parse_instance_index, resolve_credentials, VcapCredentialSource};
