//! Clery CLI - campus safety data pipeline

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{aggregate, audit, build, clean, dimensions, enrollment, generate, transform};

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Transform(args) => transform::execute(args, &cli.global).await,
        cli::Commands::Enrollment => enrollment::execute(&cli.global).await,
        cli::Commands::Dimensions => dimensions::execute(&cli.global).await,
        cli::Commands::Aggregate(args) => aggregate::execute(args, &cli.global).await,
        cli::Commands::Generate => generate::execute(&cli.global).await,
        cli::Commands::Audit(args) => audit::execute(args, &cli.global).await,
        cli::Commands::Build(args) => build::execute(args, &cli.global).await,
        cli::Commands::Clean(args) => clean::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        let code = match err.downcast_ref::<ExitCode>() {
            Some(code) => code.0,
            None => {
                eprintln!("Error: {:#}", err);
                1
            }
        };
        std::process::exit(code);
    }
}
