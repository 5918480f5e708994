//! Subcommands of the authorizer-stack CLI

mod args;
pub mod synth;
pub mod validate;
pub mod wizard;

pub use args::StackArgs;

use anyhow::{bail, Context, Result};
use authorizer_stack_config::{load_stack_props, SecretString, StackProps};
use clap::Subcommand;
use dialoguer::{Confirm, Password};
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the stack props and write the resource plan as JSON
    Synth(synth::SynthArgs),
    /// Resolve the stack props and report the selected strategies
    Validate(validate::ValidateArgs),
    /// Interactively create a stack.toml
    Init(wizard::InitArgs),
}

impl Command {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        match self {
            Command::Synth(args) => synth::run(args, config),
            Command::Validate(args) => validate::run(args, config),
            Command::Init(args) => wizard::run(args),
        }
    }
}

/// Load props from file and environment, then layer the CLI flags on top.
///
/// When the client secret is still missing and stdin is a terminal, it is
/// prompted for; otherwise resolution reports it.
pub(crate) fn load_props(config: Option<&Path>, flags: &StackArgs) -> Result<StackProps> {
    let mut props = load_stack_props(config).context("Failed to load stack props")?;
    props.merge(flags.to_props());

    let secret_missing = props.client_secret.as_ref().map_or(true, SecretString::is_empty);
    if secret_missing && std::io::stdin().is_terminal() {
        debug!("ACP_CLIENT_SECRET not set, prompting");
        let secret = Password::new()
            .with_prompt("Client secret")
            .interact()?;
        props.client_secret = Some(SecretString::from(secret));
    }

    Ok(props)
}

/// Whether `path` may be written: it does not exist, `force` is set, or the
/// user agrees to overwrite it.
pub(crate) fn may_overwrite(path: &Path, force: bool) -> Result<bool> {
    if !path.exists() || force {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }
    let overwrite = Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()?;
    Ok(overwrite)
}
