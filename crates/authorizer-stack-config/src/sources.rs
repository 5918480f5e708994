// Stack props loading for native targets.
//
// Priority order (highest first; CLI flags are layered by the binary):
// 1. Environment variables (AUTHORIZER_STACK_* prefix, ACP_CLIENT_SECRET, CDK_*)
// 2. Config file path given explicitly (--config)
// 3. Config file path from AUTHORIZER_STACK_CONFIG
// 4. Default config files (./stack.toml, ./.authorizer-stack.toml)

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::StackProps;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &["stack.toml", ".authorizer-stack.toml"];

/// Load stack props from the working directory and the process environment.
pub fn load_stack_props(explicit: Option<&Path>) -> Result<StackProps> {
    let cwd = env::current_dir().context("Failed to determine working directory")?;
    load_stack_props_from(&cwd, explicit, &StdEnvSource)
}

/// Load stack props, looking for default config files in `search_dir` and
/// reading overrides from `env`.
pub fn load_stack_props_from<E: EnvSource>(
    search_dir: &Path,
    explicit: Option<&Path>,
    env: &E,
) -> Result<StackProps> {
    let mut props = match find_config_file(search_dir, explicit, env)? {
        Some(path) => load_from_file_path(&path)?,
        None => {
            debug!("no stack config file found, using environment and flags only");
            StackProps::default()
        }
    };

    env_overrides::apply_env_overrides(&mut props, env)?;
    Ok(props)
}

/// Parse a single TOML file into stack props.
/// Returns error if the file doesn't exist or can't be parsed.
pub fn load_from_file_path(path: impl AsRef<Path>) -> Result<StackProps> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let props: StackProps = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    debug!(path = %path.display(), "loaded stack config file");
    Ok(props)
}

fn find_config_file<E: EnvSource>(
    search_dir: &Path,
    explicit: Option<&Path>,
    env: &E,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(path) = env.get("CONFIG") {
        let path = PathBuf::from(path);
        if !path.exists() {
            anyhow::bail!(
                "Config file from {}CONFIG does not exist: {}",
                ENV_PREFIX,
                path.display()
            );
        }
        return Ok(Some(path));
    }

    Ok(DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| search_dir.join(name))
        .find(|candidate| candidate.exists()))
}

pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}
