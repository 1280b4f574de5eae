//! postbot binary: run the bot, run one publisher sweep, or list pending posts.

use anyhow::Result;
use clap::Parser;
use postbot::{list_due, load_config, publish_due_once, run_bot, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run_bot(load_config(token)?).await,
        Commands::PublishDue { token } => publish_due_once(load_config(token)?).await,
        Commands::ListDue => list_due(load_config(None)?).await,
    }
}
