// authorizer-stack-config - Deployment parameters for the authorizer stack
//
// Raw parameters (`StackProps`) are layered from several sources:
// 1. CLI flags (applied by the binary, highest priority)
// 2. Environment variables (AUTHORIZER_STACK_*, ACP_CLIENT_SECRET, CDK_*)
// 3. Config file path from --config or AUTHORIZER_STACK_CONFIG
// 4. Default config file locations (./stack.toml, ./.authorizer-stack.toml)
//
// The merged props are then resolved exactly once into an immutable
// `DeploymentConfiguration`, which is what the topology planner consumes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

mod duration;
mod env_overrides;
mod error;
mod resolve;
mod sources;
mod validation;

pub use duration::{format_duration, parse_duration, DurationError};
pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};
pub use error::{ConfigError, Reason, Violation};
pub use resolve::resolve;
pub use sources::{load_from_file_path, load_stack_props, load_stack_props_from, StdEnvSource};

pub const DEFAULT_STACK_NAME: &str = "CloudentityAWSAuthorizer";
pub const DEFAULT_LOGGING_LEVEL: LoggingLevel = LoggingLevel::Info;
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(10);
pub const MIN_RELOAD_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_RELOAD_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_S3_BUCKET_NAME: &str = "cloudentity-aws-api-gateway-authorizer";
pub const DEFAULT_S3_AUTHORIZER_PREFIX: &str = "cloudentity-aws-authorizer-v2-";
pub const DEFAULT_S3_SYNC_PREFIX: &str = "cloudentity-aws-authorizer-v2-sync-";

/// The version of this crate, used as the unit release when a package is
/// fetched from the artifact bucket and `version` is unset. It is not checked
/// against the releases in the bucket; resolution logs a warning whenever the
/// fallback is taken. Set `version` to pin a real release.
pub const FALLBACK_RELEASE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Input key names, used both as TOML keys and in validation errors.
pub mod fields {
    pub const SYNC_ZIP: &str = "syncZip";
    pub const AUTHORIZER_ZIP: &str = "authorizerZip";
    pub const CLIENT_ID: &str = "clientID";
    pub const CLIENT_SECRET: &str = "clientSecret";
    pub const ISSUER_URL: &str = "issuerURL";
    pub const VERSION: &str = "version";
    pub const LOGGING_LEVEL: &str = "loggingLevel";
    pub const RELOAD_INTERVAL: &str = "reloadInterval";
    pub const S3_BUCKET_NAME: &str = "s3BucketName";
}

/// Raw, possibly incomplete deployment parameters as read from files,
/// environment and flags. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct StackProps {
    /// Path to the zip with the sync function
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_zip: Option<String>,
    /// Path to the zip with the authorizer function
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizer_zip: Option<String>,
    /// Skip auto-binding the authorizer to API Gateway from the sync function
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manually_create_authorizer: Option<bool>,
    #[serde(rename = "clientID", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Only ever supplied through the environment or a prompt, never a file.
    #[serde(skip)]
    pub client_secret: Option<SecretString>,
    #[serde(rename = "issuerURL", skip_serializing_if = "Option::is_none")]
    pub issuer_url: Option<String>,
    #[serde(rename = "vpcID", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging_level: Option<String>,
    /// Go-style duration text, e.g. "10s" or "1m"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inject_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforcement_allow_unknown: Option<bool>,
    #[serde(rename = "httpClientRootCA", skip_serializing_if = "Option::is_none")]
    pub http_client_root_ca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_client_insecure_skip_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_authorizer_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_sync_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

macro_rules! overlay {
    ($target:ident, $source:ident, $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field;
            }
        )+
    };
}

impl StackProps {
    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: StackProps) {
        overlay!(
            self,
            other,
            sync_zip,
            authorizer_zip,
            manually_create_authorizer,
            client_id,
            client_secret,
            issuer_url,
            vpc_id,
            version,
            logging_level,
            reload_interval,
            analytics_enabled,
            inject_context,
            enforcement_allow_unknown,
            http_client_root_ca,
            http_client_insecure_skip_verify,
            s3_bucket_name,
            s3_authorizer_prefix,
            s3_sync_prefix,
            stack_name,
            account,
            region,
        );
    }

    /// Resolve into a validated configuration.
    pub fn resolve(&self) -> Result<DeploymentConfiguration, ConfigError> {
        resolve::resolve(self)
    }
}

/// A string that never shows up in `Debug` or `Display` output.
///
/// Deliberately not `Serialize`: anything that persists configuration has to
/// decide explicitly how to handle the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(<redacted>)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// The two opaque executables this stack deploys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployableUnit {
    Authorizer,
    Sync,
}

impl DeployableUnit {
    pub const ALL: [DeployableUnit; 2] = [DeployableUnit::Authorizer, DeployableUnit::Sync];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployableUnit::Authorizer => "authorizer",
            DeployableUnit::Sync => "sync",
        }
    }
}

impl fmt::Display for DeployableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LoggingLevel {
    pub const VARIANTS: &'static str = "debug info warn error";

    pub fn as_str(&self) -> &'static str {
        match self {
            LoggingLevel::Debug => "debug",
            LoggingLevel::Info => "info",
            LoggingLevel::Warn => "warn",
            LoggingLevel::Error => "error",
        }
    }
}

impl fmt::Display for LoggingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoggingLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "debug" => Ok(LoggingLevel::Debug),
            "info" => Ok(LoggingLevel::Info),
            "warn" => Ok(LoggingLevel::Warn),
            "error" => Ok(LoggingLevel::Error),
            _ => anyhow::bail!(
                "Unsupported logging level: {}. Supported: {}",
                s,
                LoggingLevel::VARIANTS
            ),
        }
    }
}

/// Where a deployable unit's code package comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// A zip on the machine running the deployment
    Local { path: PathBuf },
    /// A released zip in the artifact bucket
    Remote {
        bucket_name: String,
        object_prefix: String,
        version: String,
    },
}

impl PackageSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, PackageSource::Remote { .. })
    }
}

/// Credentials of the identity provider client used by both units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub issuer_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpClientSettings {
    pub root_ca: Option<String>,
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPrefixes {
    pub authorizer: String,
    pub sync: String,
}

impl ObjectPrefixes {
    pub fn for_unit(&self, unit: DeployableUnit) -> &str {
        match unit {
            DeployableUnit::Authorizer => &self.authorizer,
            DeployableUnit::Sync => &self.sync,
        }
    }
}

impl Default for ObjectPrefixes {
    fn default() -> Self {
        Self {
            authorizer: DEFAULT_S3_AUTHORIZER_PREFIX.to_string(),
            sync: DEFAULT_S3_SYNC_PREFIX.to_string(),
        }
    }
}

/// Target account and region, when known at deploy time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetEnvironment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Validated, normalized deployment parameters. Built only by [`resolve`]
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentConfiguration {
    pub stack_name: String,
    pub environment: TargetEnvironment,
    pub authorizer_package: PackageSource,
    pub sync_package: PackageSource,
    pub manually_bind_authorizer: bool,
    pub credentials: Credentials,
    pub vpc_id: Option<String>,
    pub version: Option<String>,
    pub logging_level: LoggingLevel,
    pub reload_interval: Duration,
    pub analytics_enabled: bool,
    pub inject_context: bool,
    pub enforcement_allow_unknown: bool,
    pub http_client: HttpClientSettings,
    pub bucket_name: String,
    pub object_prefixes: ObjectPrefixes,
}

impl DeploymentConfiguration {
    pub fn package(&self, unit: DeployableUnit) -> &PackageSource {
        match unit {
            DeployableUnit::Authorizer => &self.authorizer_package,
            DeployableUnit::Sync => &self.sync_package,
        }
    }
}

impl From<&DeploymentConfiguration> for StackProps {
    fn from(config: &DeploymentConfiguration) -> Self {
        let local_path = |source: &PackageSource| match source {
            PackageSource::Local { path } => Some(path.to_string_lossy().into_owned()),
            PackageSource::Remote { .. } => None,
        };

        StackProps {
            sync_zip: local_path(&config.sync_package),
            authorizer_zip: local_path(&config.authorizer_package),
            manually_create_authorizer: Some(config.manually_bind_authorizer),
            client_id: Some(config.credentials.client_id.clone()),
            client_secret: Some(config.credentials.client_secret.clone()),
            issuer_url: Some(config.credentials.issuer_url.clone()),
            vpc_id: config.vpc_id.clone(),
            version: config.version.clone(),
            logging_level: Some(config.logging_level.as_str().to_string()),
            reload_interval: Some(format_duration(config.reload_interval)),
            analytics_enabled: Some(config.analytics_enabled),
            inject_context: Some(config.inject_context),
            enforcement_allow_unknown: Some(config.enforcement_allow_unknown),
            http_client_root_ca: config.http_client.root_ca.clone(),
            http_client_insecure_skip_verify: Some(config.http_client.insecure_skip_verify),
            s3_bucket_name: Some(config.bucket_name.clone()),
            s3_authorizer_prefix: Some(config.object_prefixes.authorizer.clone()),
            s3_sync_prefix: Some(config.object_prefixes.sync.clone()),
            stack_name: Some(config.stack_name.clone()),
            account: config.environment.account.clone(),
            region: config.environment.region.clone(),
        }
    }
}
