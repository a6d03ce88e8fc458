//! Image Toolbox command-line front end.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    logging::init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
