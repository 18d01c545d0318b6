mod cli;
mod config_file;
mod error_presentation;
mod run;

use clap::Parser;

use cli::Cli;
use error_presentation::render_runtime_error;

const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Installs the process-wide log subscriber per `LOG_LEVEL` (§4.12). The
/// rendered plan is the program's primary output and is never routed through
/// this subscriber; logs go to stderr so stdout stays script-stable.
fn init_logging() {
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match run::run(cli) {
        Ok(transcript) => {
            print!("{transcript}");
            if !transcript.ends_with('\n') {
                println!();
            }
        }
        Err(error) => {
            eprintln!("{}", render_runtime_error(error));
            std::process::exit(1);
        }
    }
}
