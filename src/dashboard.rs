use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::catalog::add::{NewPlayable, screenshot_preview};
use crate::catalog::source::source_from_location;
use crate::catalog::store::{JsonFileOverrideStore, MemoryOverrideStore, OverrideStore};
use crate::catalog::{Catalog, LoadOutcome};
use crate::cli::{AddArgs, CatalogArgs, ProfileArgs, RenderArgs};
use crate::config::Profile;

pub fn resolve_profile(args: &ProfileArgs) -> anyhow::Result<Profile> {
    Profile::resolve(
        args.profile.as_deref(),
        args.profile_file.as_deref().map(Path::new),
    )
}

pub fn build_catalog(args: &CatalogArgs) -> anyhow::Result<Catalog> {
    let profile = resolve_profile(&args.profile).context("resolve profile")?;
    let source = source_from_location(&args.data).context("build catalog source")?;
    let store: Arc<dyn OverrideStore> = match &args.store {
        Some(path) => Arc::new(JsonFileOverrideStore::new(path)),
        None => Arc::new(MemoryOverrideStore::new()),
    };
    tracing::debug!(
        profile = %profile.name,
        data = %args.data,
        store = ?args.store,
        "catalog configured"
    );
    Ok(Catalog::new(profile, source, store))
}

pub async fn render(args: RenderArgs) -> anyhow::Result<()> {
    let mut catalog = build_catalog(&args.catalog)?;
    let outcome = catalog.load().await;
    if let LoadOutcome::Fallback { failed } = &outcome {
        tracing::warn!(?failed, "rendering fallback catalog");
    }
    write_page(&catalog, &PathBuf::from(&args.out))
}

pub async fn add(args: AddArgs) -> anyhow::Result<()> {
    if args.catalog.store.is_none() {
        anyhow::bail!("--store is required to persist added playables");
    }

    if let Some(path) = &args.preview_screenshot {
        let bytes =
            std::fs::read(path).with_context(|| format!("read screenshot: {path}"))?;
        println!("{}", screenshot_preview(&bytes, path));
    }

    let mut catalog = build_catalog(&args.catalog)?;
    catalog.load().await;

    let added = catalog
        .add_record(
            &args.category,
            &NewPlayable {
                title: args.title.clone(),
                asana_url: args.asana_url.clone(),
            },
        )
        .await
        .context("add playable")?;
    println!("{}", added.notice);

    if let Some(out) = &args.out {
        write_page(&catalog, &PathBuf::from(out))?;
    }
    Ok(())
}

fn write_page(catalog: &Catalog, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(out, catalog.render_page())
        .with_context(|| format!("write dashboard: {}", out.display()))?;
    tracing::info!(out = %out.display(), "dashboard written");
    Ok(())
}
