pub mod add;
pub mod page;
pub mod render;
pub mod source;
pub mod store;

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context as _;
use tokio::task::JoinSet;

use crate::catalog::add::NewPlayable;
use crate::catalog::page::SectionView;
use crate::catalog::render::RenderedCatalog;
use crate::catalog::source::CatalogSource;
use crate::catalog::store::OverrideStore;
use crate::config::Profile;
use crate::formats::{CatalogState, PlayableRecord};

/// Where the current state came from after [`Catalog::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Override,
    Fetched,
    Fallback { failed: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct AddedPlayable {
    pub category: String,
    pub record: PlayableRecord,
    pub rendered: RenderedCatalog,
    pub notice: String,
}

pub struct Catalog {
    profile: Profile,
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn OverrideStore>,
    state: CatalogState,
    collapsed: BTreeSet<String>,
}

impl Catalog {
    pub fn new(
        profile: Profile,
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn OverrideStore>,
    ) -> Self {
        let state = CatalogState::empty_for(profile.category_names());
        Self {
            profile,
            source,
            store,
            state,
            collapsed: BTreeSet::new(),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn collapsed(&self) -> &BTreeSet<String> {
        &self.collapsed
    }

    /// Populates the state from the override store, else from the category
    /// resources, else from the profile fallback. Never fails.
    pub async fn load(&mut self) -> LoadOutcome {
        match self.store.load().await {
            Ok(Some(state)) => {
                tracing::info!(total = state.total(), "using stored catalog override");
                self.state = state;
                return LoadOutcome::Override;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(?err, "ignoring unreadable catalog override");
            }
        }

        match self.fetch_all().await {
            Ok(state) => {
                tracing::info!(total = state.total(), "loaded catalog resources");
                self.state = state;
                LoadOutcome::Fetched
            }
            Err(failed) => {
                tracing::error!(
                    failed = ?failed,
                    fallback = ?self.profile.fallback,
                    "catalog resources unavailable; using fallback"
                );
                self.state = self.profile.fallback_state();
                LoadOutcome::Fallback {
                    failed: failed.into_iter().map(|(name, _)| name).collect(),
                }
            }
        }
    }

    /// Fetches every category concurrently and waits for all of them. Any
    /// failure fails the whole load; the error lists every failed category.
    async fn fetch_all(&self) -> Result<CatalogState, Vec<(String, String)>> {
        let mut tasks = JoinSet::new();
        for category in &self.profile.categories {
            let source = Arc::clone(&self.source);
            let name = category.name.clone();
            let data_path = category.data_path();
            tasks.spawn(async move {
                let result = source
                    .fetch_category(&data_path)
                    .await
                    .with_context(|| format!("load category {name}"));
                (name, result)
            });
        }

        let mut state = CatalogState::empty_for(self.profile.category_names());
        let mut failed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(records))) => state.set_records(name, records),
                Ok((name, Err(err))) => {
                    tracing::error!(
                        category = %name,
                        error = %format!("{err:#}"),
                        "category load failed"
                    );
                    failed.push((name, format!("{err:#}")));
                }
                Err(err) => failed.push(("<task>".to_string(), err.to_string())),
            }
        }

        if failed.is_empty() {
            Ok(state)
        } else {
            failed.sort();
            Err(failed)
        }
    }

    pub fn render(&self) -> RenderedCatalog {
        render::render_catalog(&self.profile, &self.state)
    }

    pub fn render_page(&self) -> String {
        let title = match self.profile.name.as_str() {
            "base" => "Playables".to_string(),
            other => format!("Playables ({other})"),
        };
        page::render_page(&title, &self.render(), &self.collapsed)
    }

    /// Validates, prepends, persists the whole state, then re-renders. Invalid
    /// input leaves the state untouched.
    pub async fn add_record(
        &mut self,
        category: &str,
        fields: &NewPlayable,
    ) -> anyhow::Result<AddedPlayable> {
        let record = add::build_record(&self.profile, category, fields)?;
        let category = category.trim().to_string();

        let mut next = self.state.clone();
        next.prepend(&category, record.clone());
        self.store
            .save(&next)
            .await
            .context("persist catalog override")?;
        self.state = next;

        let notice = add::success_notice(&category, &record);
        tracing::info!(category = %category, title = %record.title, "playable added");
        Ok(AddedPlayable {
            category,
            record,
            rendered: self.render(),
            notice,
        })
    }

    pub fn toggle_section(&mut self, name: &str) -> SectionView {
        if self.collapsed.remove(name) {
            SectionView::Expanded
        } else {
            self.collapsed.insert(name.to_string());
            SectionView::Collapsed
        }
    }
}
