//! transflac CLI entry point

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use transflac::config::{Cli, Settings};
use transflac::pipeline;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(&cli);

    // Build settings from CLI
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Validate before touching the filesystem
    if let Err(e) = settings.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    // Per-file failures are reported through logs and FAILURE files; the
    // exit code stays zero for them.
    match pipeline::run(&settings) {
        Ok(summary) => {
            if !settings.silent {
                println!();
                println!(
                    "Summary: {} encoded, {} failed, {} skipped in {} directories",
                    summary.encoded(),
                    summary.failed(),
                    summary.skipped(),
                    summary.directories
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
