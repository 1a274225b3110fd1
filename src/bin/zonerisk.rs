//! zonerisk CLI - offline DNS zone-export risk analyzer.
//!
//! A synchronous binary: classification is pure CPU work with no
//! `.await` points, so there is no async runtime here, only the chunk
//! pipeline's own threads.

use clap::Parser;

mod cli;

use cli::args::{Cli, Commands, LogFormat};
use cli::commands::{analyze, config};

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let exit_code = match cli.command {
        Commands::Analyze(args) => analyze::run(&args, cli.quiet, cli.verbose),
        Commands::PrintDefaultConfig => {
            config::print_default_config();
            0
        }
        Commands::ValidateConfig { path } => {
            if config::validate_config(&path) {
                0
            } else {
                1
            }
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
