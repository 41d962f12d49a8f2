use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use playdeck::app::routes::router;
use playdeck::app::state::AppState;
use playdeck::catalog::LoadOutcome;
use playdeck::cli::CatalogArgs;
use playdeck::dashboard::build_catalog;
use playdeck::mraid::harness::HttpCreativeFetcher;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    #[command(flatten)]
    catalog: CatalogArgs,

    /// Static assets directory (playables, screenshots); served if it exists.
    #[arg(long, default_value = ".")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    playdeck::logging::init_with_default(playdeck::logging::SERVER_FILTER)?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting playdeck-app");

    let mut catalog = build_catalog(&args.catalog)?;
    match catalog.load().await {
        LoadOutcome::Fallback { failed } => {
            tracing::warn!(?failed, "serving fallback catalog");
        }
        outcome => tracing::info!(?outcome, "catalog loaded"),
    }

    let fetcher = Arc::new(HttpCreativeFetcher::new().context("build creative fetcher")?);
    let state = AppState::new(catalog, fetcher).with_static_dir(args.static_dir);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
