use anyhow::{Context, Result};
use clap::Parser;
use proofmaster::{
    infra::{commands::TimerSpec, config::Config, main_program::MainProgram},
    utils::logger,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Proofing and baking timers")]
struct Cli {
    /// TOML file with thresholds, tick interval and log filter
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Timer to start right away, e.g. baking:Sourdough:40m:20m
    #[arg(short, long = "timer", value_name = "KIND:NAME:DURATION[:ROTATE_AT]")]
    timers: Vec<TimerSpec>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    logger::init(&config.log_filter)?;

    MainProgram::new(config, cli.timers)
        .run()
        .await
        .context("proofmaster run failed")
}
