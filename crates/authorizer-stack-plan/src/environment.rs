//! Configuration payloads handed to the deployable units as environment variables

use crate::resource::LogicalId;
use authorizer_stack_config::{DeploymentConfiguration, SecretString};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where the shared configuration volume is mounted inside each function.
pub const CONFIG_MOUNT_PATH: &str = "/mnt/ceauthconfig";
pub const FUNCTION_MEMORY_MIB: u32 = 128;
/// Heap cap for the units: 75% of the function memory.
pub const MAX_HEAP_MIB: u32 = FUNCTION_MEMORY_MIB * 3 / 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Plain(String),
    /// Never rendered; see [`Environment`]'s `Serialize` impl
    Secret(SecretString),
    /// ARN of another resource in the plan, resolved by the renderer
    ArnOf(LogicalId),
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        EnvValue::Plain(value)
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::Plain(value.to_string())
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        EnvValue::Plain(value.to_string())
    }
}

/// Environment variables of one function, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment(BTreeMap<&'static str, EnvValue>);

impl Environment {
    pub fn set(&mut self, key: &'static str, value: impl Into<EnvValue>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.0.get(key)
    }

    pub fn plain(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(EnvValue::Plain(value)) => Some(value),
            _ => None,
        }
    }

    pub fn references(&self) -> impl Iterator<Item = &LogicalId> {
        self.0.values().filter_map(|value| match value {
            EnvValue::ArnOf(id) => Some(id),
            _ => None,
        })
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            match value {
                EnvValue::Plain(text) => map.serialize_entry(key, text)?,
                EnvValue::Secret(_) => map.serialize_entry(key, &format!("<redacted:{key}>"))?,
                EnvValue::ArnOf(id) => map.serialize_entry(key, &ArnRef { arn_of: id })?,
            }
        }
        map.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArnRef<'a> {
    arn_of: &'a LogicalId,
}

/// Entries both units share: credentials, logging and the HTTP client.
fn common_environment(config: &DeploymentConfiguration) -> Environment {
    let credentials = &config.credentials;
    let mut env = Environment::default();
    env.set("ACP_CLIENT_ID", credentials.client_id.as_str());
    env.set(
        "ACP_CLIENT_SECRET",
        EnvValue::Secret(credentials.client_secret.clone()),
    );
    env.set("ACP_ISSUER_URL", credentials.issuer_url.as_str());
    env.set("LOGGING_LEVEL", config.logging_level.as_str());
    env.set("ANALYTICS_ENABLED", config.analytics_enabled);
    env.set(
        "HTTP_CLIENT_ROOT_CA",
        config.http_client.root_ca.as_deref().unwrap_or_default(),
    );
    env.set(
        "HTTP_CLIENT_INSECURE_SKIP_VERIFY",
        config.http_client.insecure_skip_verify,
    );
    env.set("AWS_LOCAL_CONFIGURATION", CONFIG_MOUNT_PATH);
    env.set("MAX_HEAP", MAX_HEAP_MIB.to_string());
    env
}

pub fn authorizer_environment(config: &DeploymentConfiguration) -> Environment {
    let mut env = common_environment(config);
    env.set("INJECT_CONTEXT", config.inject_context);
    env.set("ENFORCEMENT_ALLOW_UNKNOWN", config.enforcement_allow_unknown);
    env
}

pub fn sync_environment(config: &DeploymentConfiguration, authorizer: &LogicalId) -> Environment {
    let mut env = common_environment(config);
    env.set("AWS_AUTHORIZER_ARN", EnvValue::ArnOf(authorizer.clone()));
    env.set("AWS_AUTOBIND_AUTHORIZER", !config.manually_bind_authorizer);
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use authorizer_stack_config::StackProps;

    fn config(manual: bool) -> DeploymentConfiguration {
        StackProps {
            client_id: Some("client".to_string()),
            client_secret: Some(SecretString::from("very-secret")),
            issuer_url: Some("https://issuer".to_string()),
            manually_create_authorizer: Some(manual),
            inject_context: Some(true),
            ..Default::default()
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn test_authorizer_environment() {
        let env = authorizer_environment(&config(false));
        assert_eq!(env.plain("ACP_CLIENT_ID"), Some("client"));
        assert_eq!(env.plain("LOGGING_LEVEL"), Some("info"));
        assert_eq!(env.plain("INJECT_CONTEXT"), Some("true"));
        assert_eq!(env.plain("HTTP_CLIENT_ROOT_CA"), Some(""));
        assert_eq!(env.plain("AWS_LOCAL_CONFIGURATION"), Some("/mnt/ceauthconfig"));
        assert_eq!(env.plain("MAX_HEAP"), Some("96"));
        assert!(env.get("AWS_AUTHORIZER_ARN").is_none());
        assert!(matches!(env.get("ACP_CLIENT_SECRET"), Some(EnvValue::Secret(_))));
    }

    #[test]
    fn test_sync_environment_references_authorizer() {
        let authorizer = LogicalId::new("AuthorizerLambda");
        let env = sync_environment(&config(true), &authorizer);
        assert_eq!(env.plain("AWS_AUTOBIND_AUTHORIZER"), Some("false"));
        assert_eq!(env.references().collect::<Vec<_>>(), vec![&authorizer]);
        assert!(env.get("INJECT_CONTEXT").is_none());

        let env = sync_environment(&config(false), &authorizer);
        assert_eq!(env.plain("AWS_AUTOBIND_AUTHORIZER"), Some("true"));
    }

    #[test]
    fn test_secret_is_redacted_when_serialized() {
        let env = sync_environment(&config(false), &LogicalId::new("AuthorizerLambda"));
        let json = serde_json::to_string(&env).unwrap();
        assert!(!json.contains("very-secret"));
        assert!(json.contains("\"ACP_CLIENT_SECRET\":\"<redacted:ACP_CLIENT_SECRET>\""));
        assert!(json.contains("\"AWS_AUTHORIZER_ARN\":{\"arnOf\":\"AuthorizerLambda\"}"));
    }
}
