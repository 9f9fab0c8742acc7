//! nightswatch - configurable file watcher

use clap::Parser;
use cli_lib::Cli;

#[tokio::main]
async fn main() {
    cli_lib::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = cli_lib::run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
