mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod run_log;
mod services;
mod store;
mod workflow;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::genticket::{self, GenticketArgs};

#[derive(Parser)]
#[command(
    name = "genticket",
    author,
    version,
    about = "File ServiceNow incidents for failed BigFix actions"
)]
struct Cli {
    #[command(flatten)]
    args: GenticketArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match genticket::run(cli.args).await {
        Ok(summary) => println!("genticket finished: {summary}"),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(error.exit_code());
        }
    }
}
