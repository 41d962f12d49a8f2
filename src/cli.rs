use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Render(RenderArgs),
    Add(AddArgs),
    Inject(InjectArgs),
    Simulate(SimulateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    /// Built-in profile: base (farm/city) or extended (west/mega). Falls back
    /// to PLAYDECK_PROFILE, then base.
    #[arg(long)]
    pub profile: Option<String>,

    /// YAML profile file (overrides --profile).
    #[arg(long)]
    pub profile_file: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Catalog data root: a directory or an http(s) base URL.
    #[arg(long, default_value = ".")]
    pub data: String,

    /// Override store (JSON file holding the whole catalog).
    #[arg(long)]
    pub store: Option<String>,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Output file path for the dashboard HTML.
    #[arg(long)]
    pub out: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Category to prepend the playable to.
    #[arg(long)]
    pub category: String,

    /// Playable title; also names the asset files.
    #[arg(long)]
    pub title: String,

    /// Tracking ticket link (required by profiles that track Asana).
    #[arg(long)]
    pub asana_url: Option<String>,

    /// Screenshot to preview as a data URI before adding (never stored).
    #[arg(long)]
    pub preview_screenshot: Option<String>,

    /// Re-render the dashboard to this path after adding.
    #[arg(long)]
    pub out: Option<String>,
}

#[derive(Debug, Args)]
pub struct InjectArgs {
    /// Playable URL (must be http/https).
    #[arg(long)]
    pub url: String,

    /// Output file path for the injected document.
    #[arg(long)]
    pub out: String,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Playable URL (must be http/https).
    #[arg(long)]
    pub url: String,

    /// Frame directory (`frame.html` and `events.jsonl`).
    #[arg(long)]
    pub out: String,
}
