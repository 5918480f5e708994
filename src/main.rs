use anyhow::Result;
use authorizer_stack::commands::Command;
use authorizer_stack::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// Plan the resources of the API Gateway authorizer stack
#[derive(Parser)]
#[command(name = "authorizer-stack")]
#[command(version)]
#[command(about = "Resolve authorizer stack parameters and plan its resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to stack config file (default: ./stack.toml or ./.authorizer-stack.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level of this tool: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    authorizer_stack::init_tracing(cli.log_level.as_deref(), cli.log_format);

    cli.command.run(cli.config.as_deref())
}
