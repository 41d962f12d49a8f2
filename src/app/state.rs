use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::mraid::harness::CreativeFetcher;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Mutex<Catalog>>,
    pub fetcher: Arc<dyn CreativeFetcher>,
    /// Served as the static fallback when it exists.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(catalog: Catalog, fetcher: Arc<dyn CreativeFetcher>) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(catalog)),
            fetcher,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}
