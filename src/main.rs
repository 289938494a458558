use clap::Parser;
use tracing_subscriber::EnvFilter;

use pds_match::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("pds_match=debug,info")
    } else {
        EnvFilter::new("pds_match=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Match(args) => {
            cli::match_cmd::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Reconcile(args) => {
            cli::reconcile::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::ValidateNhsNumber(args) => {
            if !cli::nhs_number::run(args, cli.format, cli.verbose)? {
                std::process::exit(1);
            }
        }
        cli::Commands::Strategies(args) => {
            cli::strategies::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
