//! `init` - interactive stack.toml generator

use anyhow::{Context, Result};
use authorizer_stack_config::{
    parse_duration, SecretString, StackProps, DEFAULT_STACK_NAME, FALLBACK_RELEASE_VERSION,
};
use clap::Args;
use dialoguer::{Confirm, Input, Select};
use std::fs;
use std::path::PathBuf;

use super::may_overwrite;

const LOGGING_LEVELS: &[&str] = &["debug", "info", "warn", "error"];

const HEADER: &str = "\
# authorizer-stack configuration
#
# The client secret is never stored here. Provide it at deploy time through
# the ACP_CLIENT_SECRET environment variable.

";

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the config file
    #[arg(short, long, value_name = "FILE", default_value = "stack.toml")]
    pub out: PathBuf,

    /// Stack name
    #[arg(long)]
    pub stack_name: Option<String>,

    /// Client ID used by both units
    #[arg(long)]
    pub client_id: Option<String>,

    /// Issuer URL of the authorization server
    #[arg(long)]
    pub issuer_url: Option<String>,

    /// Overwrite existing file without asking
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    if !may_overwrite(&args.out, args.force)? {
        println!("Aborted.");
        return Ok(());
    }

    println!();
    println!("authorizer-stack init - API Gateway authorizer on AWS Lambda");
    println!();

    let stack_name = match args.stack_name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Stack name")
            .default(DEFAULT_STACK_NAME.to_string())
            .interact_text()?,
    };

    let client_id = match args.client_id {
        Some(id) => id,
        None => Input::new().with_prompt("Client ID").interact_text()?,
    };

    let issuer_url = match args.issuer_url {
        Some(url) => url,
        None => Input::new()
            .with_prompt("Issuer URL")
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.starts_with("https://") || input.starts_with("http://") {
                    Ok(())
                } else {
                    Err("Issuer URL must start with http:// or https://")
                }
            })
            .interact_text()?,
    };

    let reload_interval: String = Input::new()
        .with_prompt("Reload interval (1s to 1m)")
        .default("10s".to_string())
        .validate_with(|input: &String| {
            parse_duration(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;

    let level = Select::new()
        .with_prompt("Logging level of the deployed units")
        .items(LOGGING_LEVELS)
        .default(1)
        .interact()?;

    let sources = &[
        "Released packages from the artifact bucket",
        "Local zip files",
    ];
    let source = Select::new()
        .with_prompt("Where do the authorizer and sync packages come from?")
        .items(sources)
        .default(0)
        .interact()?;

    let mut props = StackProps {
        stack_name: Some(stack_name),
        client_id: Some(client_id),
        issuer_url: Some(issuer_url),
        reload_interval: Some(reload_interval),
        logging_level: Some(LOGGING_LEVELS[level].to_string()),
        ..Default::default()
    };

    if source == 0 {
        let version: String = Input::new()
            .with_prompt("Release version")
            .default(FALLBACK_RELEASE_VERSION.to_string())
            .interact_text()?;
        props.version = Some(version);
    } else {
        let authorizer_zip: String = Input::new()
            .with_prompt("Path to the authorizer zip")
            .interact_text()?;
        let sync_zip: String = Input::new()
            .with_prompt("Path to the sync zip")
            .interact_text()?;
        props.authorizer_zip = Some(authorizer_zip);
        props.sync_zip = Some(sync_zip);
    }

    let vpc_id: String = Input::new()
        .with_prompt("Existing VPC ID (leave empty to create one)")
        .allow_empty(true)
        .interact_text()?;
    if !vpc_id.is_empty() {
        props.vpc_id = Some(vpc_id);
    }

    let auto_bind = Confirm::new()
        .with_prompt("Let the sync unit bind the authorizer to API Gateway?")
        .default(true)
        .interact()?;
    props.manually_create_authorizer = Some(!auto_bind);

    check(&props)?;

    let content = toml::to_string_pretty(&props).context("Failed to render config")?;
    fs::write(&args.out, format!("{}{}", HEADER, content))
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    println!();
    println!("Created {}", args.out.display());
    println!();
    println!("Next steps:");
    println!("  1. export ACP_CLIENT_SECRET=<client secret>");
    println!("  2. authorizer-stack validate");
    println!("  3. authorizer-stack synth --out plan.json");
    println!();

    Ok(())
}

/// Resolve the answers with a placeholder secret so that mistakes surface now
/// rather than at deploy time.
fn check(props: &StackProps) -> Result<()> {
    let mut candidate = props.clone();
    candidate.client_secret = Some(SecretString::from("placeholder"));
    candidate
        .resolve()
        .map(|_| ())
        .context("The answers do not form a valid stack config")
}
