use anyhow::Context as _;

/// Directives used when `RUST_LOG` is unset.
pub const CLI_FILTER: &str = "info";
pub const SERVER_FILTER: &str = "info,tower_http=debug";

pub fn init() -> anyhow::Result<()> {
    init_with_default(CLI_FILTER)
}

/// Stderr subscriber filtered by `RUST_LOG`, else by `default_directives`.
pub fn init_with_default(default_directives: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_directives))
        .with_context(|| format!("build log filter from {default_directives:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
