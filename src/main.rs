mod main_dispatch;
mod main_runtime;

use clap::Parser;
use pickwise::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    main_dispatch::run(&cli).await
}
