//! hoist -- command-line front end for the Docker convenience layer.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use hoist_core::config::{GeneralConfig, HoistConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        use colored::Colorize;
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // `config` and `decode` run without a usable file; logging falls back to
    // defaults when it does not load.
    let loaded = HoistConfig::load_or_default(&cli.config).await;
    let mut general = match &loaded {
        Ok(config) => config.general.clone(),
        Err(_) => GeneralConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        general.log_level.clone_from(level);
    }
    logging::init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;

    let writer = OutputWriter::new(cli.output);

    use commands::{container, decode, image, network, volume};

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::Decode(args) => decode::execute(args, &writer).await,
        Commands::Pull(args) => image::execute_pull(args, &loaded?, &writer).await,
        Commands::Image(args) => image::execute_image(args, &loaded?, &writer).await,
        Commands::Ps(args) => container::execute_ps(args, &loaded?, &writer).await,
        Commands::Find(args) => container::execute_find(args, &loaded?, &writer).await,
        Commands::Run(args) => container::execute_run(args, &loaded?, &writer).await,
        Commands::RunTemp(args) => container::execute_run_temp(args, &loaded?, &writer).await,
        Commands::Exec(args) => container::execute_exec(args, &loaded?, &writer).await,
        Commands::Network(args) => network::execute(args, &loaded?, &writer).await,
        Commands::Volume(args) => volume::execute(args, &loaded?, &writer).await,
        Commands::Whoami => container::execute_whoami(&loaded?, &writer).await,
    }
}
