use anyhow::Result;
use clap::Parser;
use slack_notify::{cli::Cli, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let code = run(cli).await?;
    std::process::exit(code);
}
