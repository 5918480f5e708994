use crate::{SecretString, StackProps};
use anyhow::{anyhow, Result};

pub const ENV_PREFIX: &str = "AUTHORIZER_STACK_";

/// Abstraction over environment-variable lookups so tests (and embedding
/// tools) can supply their own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the AUTHORIZER_STACK_ prefix
    /// Used for ACP_CLIENT_SECRET and the CDK_* account/region variables
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides on top of file-provided props.
pub fn apply_env_overrides<E: EnvSource>(props: &mut StackProps, env: &E) -> Result<()> {
    // Packaging
    if let Some(path) = get_env_string(env, "SYNC_ZIP") {
        props.sync_zip = Some(path);
    }
    if let Some(path) = get_env_string(env, "AUTHORIZER_ZIP") {
        props.authorizer_zip = Some(path);
    }
    if let Some(version) = get_env_string(env, "VERSION") {
        props.version = Some(version);
    }
    if let Some(bucket) = get_env_string(env, "S3_BUCKET_NAME") {
        props.s3_bucket_name = Some(bucket);
    }
    if let Some(prefix) = get_env_string(env, "S3_AUTHORIZER_PREFIX") {
        props.s3_authorizer_prefix = Some(prefix);
    }
    if let Some(prefix) = get_env_string(env, "S3_SYNC_PREFIX") {
        props.s3_sync_prefix = Some(prefix);
    }

    // Identity provider client
    if let Some(client_id) = get_env_string(env, "CLIENT_ID") {
        props.client_id = Some(client_id);
    }
    if let Some(issuer) = get_env_string(env, "ISSUER_URL") {
        props.issuer_url = Some(issuer);
    }
    // The secret is only ever read from the environment
    if let Some(secret) = env.get_raw("ACP_CLIENT_SECRET") {
        props.client_secret = Some(SecretString::from(secret));
    }

    // Behaviour toggles
    if let Some(val) = get_env_bool(env, "MANUALLY_CREATE_AUTHORIZER")? {
        props.manually_create_authorizer = Some(val);
    }
    if let Some(level) = get_env_string(env, "LOGGING_LEVEL") {
        props.logging_level = Some(level);
    }
    if let Some(interval) = get_env_string(env, "RELOAD_INTERVAL") {
        props.reload_interval = Some(interval);
    }
    if let Some(val) = get_env_bool(env, "ANALYTICS_ENABLED")? {
        props.analytics_enabled = Some(val);
    }
    if let Some(val) = get_env_bool(env, "INJECT_CONTEXT")? {
        props.inject_context = Some(val);
    }
    if let Some(val) = get_env_bool(env, "ENFORCEMENT_ALLOW_UNKNOWN")? {
        props.enforcement_allow_unknown = Some(val);
    }

    // HTTP client used by the deployed units
    if let Some(root_ca) = get_env_string(env, "HTTP_CLIENT_ROOT_CA") {
        props.http_client_root_ca = Some(root_ca);
    }
    if let Some(val) = get_env_bool(env, "HTTP_CLIENT_INSECURE_SKIP_VERIFY")? {
        props.http_client_insecure_skip_verify = Some(val);
    }

    // Placement
    if let Some(vpc_id) = get_env_string(env, "VPC_ID") {
        props.vpc_id = Some(vpc_id);
    }
    if let Some(stack_name) = get_env_string(env, "STACK_NAME") {
        props.stack_name = Some(stack_name);
    }
    // Standard CDK variables (without prefix); DEPLOY wins over DEFAULT
    if let Some(account) = first_raw(env, &["CDK_DEPLOY_ACCOUNT", "CDK_DEFAULT_ACCOUNT"]) {
        props.account = Some(account);
    }
    if let Some(region) = first_raw(env, &["CDK_DEPLOY_REGION", "CDK_DEFAULT_REGION"]) {
        props.region = Some(region);
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn first_raw<E: EnvSource>(env: &E, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env.get_raw(key))
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val.parse::<bool>().map_err(|e| {
                anyhow!(
                    "Failed to parse {}{} (expected bool): {}",
                    ENV_PREFIX,
                    key,
                    e
                )
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
