//! Urna CLI

use std::process::ExitCode;

use clap::Parser;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = urna::logging::init(&cli.config.logging) {
        cli::output::failure(&format!("failed to initialise logging: {error}"));

        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            cli::output::failure(&message);

            ExitCode::FAILURE
        }
    }
}
