use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    docsite::logging::init(docsite::logging::LogProfile::Cli).context("init logging")?;

    let cli = docsite::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        docsite::cli::Command::Nav(args) => {
            docsite::commands::nav(args).await.context("nav")?;
        }
        docsite::cli::Command::Toc(args) => {
            docsite::commands::toc(args).context("toc")?;
        }
        docsite::cli::Command::Render(args) => {
            docsite::commands::render(args).await.context("render")?;
        }
    }

    Ok(())
}
