use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::formats::PlayableRecord;

/// Where per-category playable lists come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_category(&self, data_path: &str) -> anyhow::Result<Vec<PlayableRecord>>;
}

#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalogSource {
    pub fn new(base_url: Url) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build catalog http client")?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            client,
            base_url: with_trailing_slash(base_url),
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_category(&self, data_path: &str) -> anyhow::Result<Vec<PlayableRecord>> {
        let url = self
            .base_url
            .join(data_path)
            .with_context(|| format!("resolve data path: {data_path}"))?;

        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, "playdeck/0.1")
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GET {url}: HTTP {status}");
        }

        let body = resp.bytes().await.context("read catalog response")?;
        let records =
            serde_json::from_slice(&body).with_context(|| format!("parse playables: {url}"))?;
        Ok(records)
    }
}

#[derive(Debug, Clone)]
pub struct DirCatalogSource {
    root: PathBuf,
}

impl DirCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl CatalogSource for DirCatalogSource {
    async fn fetch_category(&self, data_path: &str) -> anyhow::Result<Vec<PlayableRecord>> {
        let path = self.root.join(data_path);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read playables: {}", path.display()))?;
        let records = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse playables: {}", path.display()))?;
        Ok(records)
    }
}

/// Builds a source from either an http(s) base URL or a local directory.
pub fn source_from_location(location: &str) -> anyhow::Result<Arc<dyn CatalogSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let url = Url::parse(location).context("parse --data url")?;
        return Ok(Arc::new(HttpCatalogSource::new(url)?));
    }
    Ok(Arc::new(DirCatalogSource::new(location)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dir_source_reads_json_array() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("data"))?;
        std::fs::write(
            temp.path().join("data/farm-playables.json"),
            r#"[{"title":"Cows","playUrl":"playables/farm/Cows.html","screenshot":"playables/farm/screens/Cows.png"}]"#,
        )?;

        let source = DirCatalogSource::new(temp.path());
        let records = source.fetch_category("data/farm-playables.json").await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Cows");
        Ok(())
    }

    #[tokio::test]
    async fn dir_source_rejects_non_array() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join("farm.json"), r#"{"title":"Cows"}"#)?;

        let source = DirCatalogSource::new(temp.path());
        let err = source.fetch_category("farm.json").await.unwrap_err();
        assert!(format!("{err:#}").contains("parse playables"));
        Ok(())
    }

    #[test]
    fn base_url_gets_trailing_slash_so_join_keeps_prefix() {
        let url = with_trailing_slash(Url::parse("http://127.0.0.1:8000/dash").unwrap());
        assert_eq!(
            url.join("data/city-playables.json").unwrap().as_str(),
            "http://127.0.0.1:8000/dash/data/city-playables.json"
        );
    }
}
