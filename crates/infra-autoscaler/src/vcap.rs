// VCAP_SERVICES credential resolver
//
// The platform injects service bindings as JSON in VCAP_SERVICES and the
// replica number in CF_INSTANCE_INDEX.

use queuelength_core::domain::Credentials;
use queuelength_core::port::{CredentialSource, ReporterIdentity, ResolveError};
use serde::Deserialize;
use serde_json::Value;

pub const VCAP_SERVICES_ENV: &str = "VCAP_SERVICES";
pub const INSTANCE_INDEX_ENV: &str = "CF_INSTANCE_INDEX";

/// Bindings whose name starts with this are autoscaler bindings
pub const AUTOSCALER_BINDING_PREFIX: &str = "autoscaler";

#[derive(Debug, Deserialize)]
struct VcapServices {
    #[serde(rename = "user-provided", default)]
    user_provided: Vec<UserProvided>,
}

#[derive(Debug, Deserialize)]
struct UserProvided {
    name: String,
    // Other bindings carry their own layouts; only the autoscaler one is decoded
    #[serde(default)]
    credentials: Value,
}

/// Pick the first autoscaler binding out of a VCAP_SERVICES document
pub fn resolve_credentials(vcap_services: &str) -> Result<Credentials, ResolveError> {
    let services: VcapServices =
        serde_json::from_str(vcap_services).map_err(|e| ResolveError::Malformed(e.to_string()))?;

    let binding = services
        .user_provided
        .into_iter()
        .find(|binding| binding.name.starts_with(AUTOSCALER_BINDING_PREFIX))
        .ok_or_else(|| {
            ResolveError::NotFound(format!(
                "no user-provided binding named {}*",
                AUTOSCALER_BINDING_PREFIX
            ))
        })?;

    serde_json::from_value(binding.credentials)
        .map_err(|e| ResolveError::Malformed(format!("binding {}: {}", binding.name, e)))
}

pub fn parse_instance_index(raw: &str) -> Result<u32, ResolveError> {
    raw.trim()
        .parse()
        .map_err(|e| ResolveError::InvalidInstanceIndex(format!("{:?}: {}", raw, e)))
}

/// CredentialSource over the raw platform values.
///
/// Values are captured once (`from_env`) so resolution stays a pure function.
#[derive(Debug, Clone, Default)]
pub struct VcapCredentialSource {
    vcap_services: Option<String>,
    instance_index: Option<String>,
}

impl VcapCredentialSource {
    pub fn new(vcap_services: Option<String>, instance_index: Option<String>) -> Self {
        Self {
            vcap_services,
            instance_index,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var(VCAP_SERVICES_ENV).ok(),
            std::env::var(INSTANCE_INDEX_ENV).ok(),
        )
    }
}

impl CredentialSource for VcapCredentialSource {
    fn resolve(&self) -> Result<ReporterIdentity, ResolveError> {
        let raw_index = self
            .instance_index
            .as_deref()
            .ok_or_else(|| ResolveError::MissingEnv(INSTANCE_INDEX_ENV.to_string()))?;
        let instance_index = parse_instance_index(raw_index)?;

        let vcap = self
            .vcap_services
            .as_deref()
            .ok_or_else(|| ResolveError::MissingEnv(VCAP_SERVICES_ENV.to_string()))?;
        let credentials = resolve_credentials(vcap)?;

        Ok(ReporterIdentity {
            credentials,
            instance_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vcap() -> String {
        json!({
            "user-provided": [
                {
                    "name": "database",
                    "credentials": { "uri": "postgres://db.internal/app", "port": 5432 }
                },
                { "name": "syslog-drain" },
                {
                    "name": "autoscaler-custom-metrics",
                    "credentials": {
                        "app_id": "app-guid",
                        "username": "scaler",
                        "password": "s3cret",
                        "url": "https://autoscaler-metrics.example.com"
                    }
                },
                {
                    "name": "autoscaler-second",
                    "credentials": { "app_id": "other", "username": "o", "password": "o", "url": "http://o" }
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_first_autoscaler_binding_wins() {
        let creds = resolve_credentials(&vcap()).unwrap();
        assert_eq!(creds.application_id, "app-guid");
        assert_eq!(creds.username, "scaler");
        assert_eq!(creds.password, "s3cret");
        assert_eq!(creds.reporting_url, "https://autoscaler-metrics.example.com");
    }

    #[test]
    fn test_other_binding_layouts_are_ignored() {
        let doc = r#"{"user-provided":[
            {"name":"database","credentials":{"uri":"postgres://x"}},
            {"name":"autoscaler","credentials":{"app_id":"a","username":"u","password":"p","url":"http://u"}}
        ]}"#;
        let creds = resolve_credentials(doc).unwrap();
        assert_eq!(creds.application_id, "a");
        assert_eq!(creds.reporting_url, "http://u");
    }

    #[test]
    fn test_no_matching_binding() {
        let doc = json!({ "user-provided": [{ "name": "my-autoscaler", "credentials": {
            "app_id": "a", "username": "u", "password": "p", "url": "http://u"
        }}]})
        .to_string();
        assert!(matches!(resolve_credentials(&doc), Err(ResolveError::NotFound(_))));
        assert!(matches!(resolve_credentials("{}"), Err(ResolveError::NotFound(_))));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(resolve_credentials(""), Err(ResolveError::Malformed(_))));
        assert!(matches!(resolve_credentials("not json"), Err(ResolveError::Malformed(_))));

        let missing_field = json!({ "user-provided": [{ "name": "autoscaler", "credentials": { "app_id": "a" } }] });
        assert!(matches!(
            resolve_credentials(&missing_field.to_string()),
            Err(ResolveError::Malformed(_))
        ));
    }

    #[test]
    fn test_instance_index() {
        assert_eq!(parse_instance_index("0").unwrap(), 0);
        assert_eq!(parse_instance_index(" 12 ").unwrap(), 12);
        assert!(matches!(
            parse_instance_index("first"),
            Err(ResolveError::InvalidInstanceIndex(_))
        ));
        assert!(parse_instance_index("-1").is_err());
    }

    #[test]
    fn test_source_resolves_identity() {
        let source = VcapCredentialSource::new(Some(vcap()), Some("2".to_string()));
        let identity = source.resolve().unwrap();
        assert_eq!(identity.instance_index, 2);
        assert_eq!(identity.credentials.application_id, "app-guid");
    }

    #[test]
    fn test_source_reports_missing_env() {
        let source = VcapCredentialSource::new(Some(vcap()), None);
        assert_eq!(
            source.resolve().unwrap_err(),
            ResolveError::MissingEnv(INSTANCE_INDEX_ENV.to_string())
        );

        let source = VcapCredentialSource::new(None, Some("0".to_string()));
        assert_eq!(
            source.resolve().unwrap_err(),
            ResolveError::MissingEnv(VCAP_SERVICES_ENV.to_string())
        );
    }
}
