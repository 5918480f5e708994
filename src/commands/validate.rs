//! `validate` - resolve stack props and report the selected strategies

use anyhow::Result;
use authorizer_stack_plan::{
    BindingStrategy, NetworkStrategy, PackagingStrategy, Strategies, TriggerStrategy,
};
use clap::Args;
use std::path::Path;

use super::{load_props, StackArgs};

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub stack: StackArgs,
}

pub fn run(args: ValidateArgs, config: Option<&Path>) -> Result<()> {
    let props = load_props(config, &args.stack)?;
    let deployment = props.resolve()?;
    let strategies = Strategies::select(&deployment)?;

    println!("{}: {}", deployment.stack_name, summarize(&strategies));
    Ok(())
}

/// One-line description of the strategies, e.g.
/// `trigger=fan-out(6/min) binding=auto network=isolated authorizer=bucket sync=local`.
pub fn summarize(strategies: &Strategies) -> String {
    let trigger = match &strategies.trigger {
        TriggerStrategy::Direct => "direct".to_string(),
        TriggerStrategy::FanOut { offsets_secs, .. } => {
            format!("fan-out({}/min)", offsets_secs.len())
        }
    };
    let binding = match strategies.binding {
        BindingStrategy::AutoBind => "auto",
        BindingStrategy::Manual => "manual",
    };
    let network = match &strategies.network {
        NetworkStrategy::Existing { vpc_id } => format!("existing({})", vpc_id),
        NetworkStrategy::Isolated => "isolated".to_string(),
    };
    let packaging = |strategy: &PackagingStrategy| match strategy {
        PackagingStrategy::LocalAsset { .. } => "local",
        PackagingStrategy::Bucket { .. } => "bucket",
    };

    format!(
        "trigger={} binding={} network={} authorizer={} sync={}",
        trigger,
        binding,
        network,
        packaging(&strategies.authorizer_packaging),
        packaging(&strategies.sync_packaging)
    )
}
