use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use apigw_stack::{StackConfig, StackDefinition};

#[derive(Parser, Debug)]
#[command(author, version, about = "API Gateway redeploy stack tooling")]
struct Cli {
    /// Stack configuration file (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize the CloudFormation template.
    Synth {
        /// Override the target region.
        #[arg(long)]
        region: Option<String>,
        /// Override the API stage name.
        #[arg(long)]
        stage: Option<String>,
        /// Write the template to this file instead of stdout.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Validate the configuration without synthesizing.
    Validate,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Synth {
            region,
            stage,
            output,
        } => handle_synth(config, region, stage, output),
        Command::Validate => handle_validate(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<StackConfig> {
    match path {
        Some(path) => StackConfig::load(path)
            .with_context(|| format!("failed to load stack config from {}", path.display())),
        None => Ok(StackConfig::default()),
    }
}

fn handle_synth(
    config: StackConfig,
    region: Option<String>,
    stage: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut builder = StackDefinition::builder(config);
    if let Some(region) = region {
        builder = builder.region(region);
    }
    if let Some(stage) = stage {
        builder = builder.stage_name(stage);
    }

    let stack = builder.build().context("invalid stack definition")?;
    info!(
        stack_name = %stack.stack_name,
        region = %stack.region,
        correlation_token = %stack.correlation_token,
        "synthesized stack"
    );

    let template = stack.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(&path, template)
                .with_context(|| format!("failed to write template to {}", path.display()))?;
            println!("Template written to {}", path.display());
        }
        None => println!("{template}"),
    }
    Ok(())
}

fn handle_validate(config: &StackConfig) -> Result<()> {
    config.validate().context("invalid stack configuration")?;
    println!(
        "Configuration valid: stack {} in {}",
        config.stack_name,
        config.resolved_region()
    );
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
