//! `synth` - resolve stack props and render the resource plan

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{load_props, may_overwrite, StackArgs};

#[derive(Args)]
pub struct SynthArgs {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Write the plan to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Overwrite an existing output file without asking
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: SynthArgs, config: Option<&Path>) -> Result<()> {
    let props = load_props(config, &args.stack)?;
    let deployment = props.resolve()?;
    let plan = authorizer_stack_plan::plan(&deployment)?;
    let json = plan
        .to_json_pretty()
        .context("Failed to render resource plan")?;

    let Some(out) = args.out else {
        println!("{}", json);
        return Ok(());
    };

    if !may_overwrite(&out, args.force)? {
        println!("Aborted.");
        return Ok(());
    }
    fs::write(&out, format!("{}\n", json))
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!(
        path = %out.display(),
        resources = plan.resources().len(),
        "resource plan written"
    );
    Ok(())
}
