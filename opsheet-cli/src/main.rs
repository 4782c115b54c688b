use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use opsheet::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    init_logging(args.verbose);

    let success = cli::run(args).await?;
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// RUST_LOG wins; otherwise warnings only, or debug with --verbose
fn init_logging(verbose: bool) {
    let default = if verbose { "opsheet=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
