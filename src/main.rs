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
    playdeck::logging::init().context("init logging")?;

    let cli = playdeck::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        playdeck::cli::Command::Render(args) => {
            playdeck::dashboard::render(args).await.context("render")?;
        }
        playdeck::cli::Command::Add(args) => {
            playdeck::dashboard::add(args).await.context("add")?;
        }
        playdeck::cli::Command::Inject(args) => {
            playdeck::simulator::inject(args).await.context("inject")?;
        }
        playdeck::cli::Command::Simulate(args) => {
            playdeck::simulator::simulate(args)
                .await
                .context("simulate")?;
        }
    }

    Ok(())
}
