use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use phorager::cli::{self, Cli, Commands, Context};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("phorager=debug,info")
    } else {
        EnvFilter::new("phorager=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::from_cli(&cli);
    match cli.command {
        Commands::Bacterial(args) => cli::bacterial::run(args, &ctx),
        Commands::Prophage(args) => cli::prophage::run(args, &ctx),
        Commands::Annotation(args) => cli::annotation::run(args, &ctx),
        Commands::Install(args) => cli::install::run(args, &ctx),
        Commands::Config(args) => {
            cli::config::run(args, &ctx)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
