use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::formats::{CatalogState, PlayableRecord};

/// Count-label wording for the per-category playable counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PluralRule {
    English,
    Russian,
}

impl PluralRule {
    pub fn count_label(self, count: usize) -> String {
        match self {
            Self::English => {
                if count == 1 {
                    "1 playable".to_string()
                } else {
                    format!("{count} playables")
                }
            }
            Self::Russian => format!("{count} {}", russian_playable_noun(count)),
        }
    }
}

/// Cardinal agreement: 1, 21, 101 take the singular; 2-4, 22-24 the
/// paucal; everything else (including 11-14) the genitive plural.
fn russian_playable_noun(count: usize) -> &'static str {
    let last_two = count % 100;
    let last = count % 10;
    if last == 1 && last_two != 11 {
        "плейбл"
    } else if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
        "плейбла"
    } else {
        "плейблов"
    }
}

/// What the catalog falls back to when the JSON resources cannot be loaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    Empty,
    Sample,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub count_id: Option<String>,
    #[serde(default)]
    pub sample: Option<PlayableRecord>,
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_path: None,
            container_id: None,
            count_id: None,
            sample: None,
        }
    }

    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => {
                let mut chars = self.name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    pub fn data_path(&self) -> String {
        self.data_path
            .clone()
            .unwrap_or_else(|| format!("data/{}-playables.json", self.name))
    }

    pub fn container_id(&self) -> String {
        self.container_id
            .clone()
            .unwrap_or_else(|| format!("{}-playables", self.name))
    }

    pub fn count_id(&self) -> String {
        self.count_id
            .clone()
            .unwrap_or_else(|| format!("{}-count", self.name))
    }
}

/// Deployment-time selection of categories and record schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub name: String,
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub track_asana: bool,
    #[serde(default = "default_plural")]
    pub plural: PluralRule,
    #[serde(default = "default_fallback")]
    pub fallback: FallbackPolicy,
}

fn default_plural() -> PluralRule {
    PluralRule::English
}

fn default_fallback() -> FallbackPolicy {
    FallbackPolicy::Empty
}

impl Profile {
    pub fn base() -> Self {
        Self {
            name: "base".to_string(),
            categories: vec![CategoryConfig::new("farm"), CategoryConfig::new("city")],
            track_asana: false,
            plural: PluralRule::English,
            fallback: FallbackPolicy::Empty,
        }
    }

    pub fn extended() -> Self {
        let category = |name: &str, label: &str| CategoryConfig {
            label: Some(label.to_string()),
            sample: Some(
                PlayableRecord::new(
                    format!("{name}_sample"),
                    format!("playables/{name}/{name}_sample.html"),
                )
                .with_asana_url("https://app.asana.com/"),
            ),
            ..CategoryConfig::new(name)
        };

        Self {
            name: "extended".to_string(),
            categories: vec![category("west", "West"), category("mega", "Mega")],
            track_asana: true,
            plural: PluralRule::Russian,
            fallback: FallbackPolicy::Sample,
        }
    }

    pub fn builtin(name: &str) -> anyhow::Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "base" => Ok(Self::base()),
            "extended" => Ok(Self::extended()),
            other => anyhow::bail!("unknown profile: {other} (expected one of: base, extended)"),
        }
    }

    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("read profile: {}", path.display()))?;
        let profile: Self = serde_yaml::from_str(&yaml)
            .with_context(|| format!("parse profile: {}", path.display()))?;
        if profile.categories.is_empty() {
            anyhow::bail!("profile has no categories: {}", path.display());
        }
        Ok(profile)
    }

    /// `--profile-file` wins over `--profile`, which wins over `PLAYDECK_PROFILE`.
    pub fn resolve(name: Option<&str>, file: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(file) = file {
            return Self::from_yaml_file(file);
        }
        match name {
            Some(name) => Self::builtin(name),
            None => {
                let raw = std::env::var("PLAYDECK_PROFILE").unwrap_or_default();
                Self::builtin(&raw).context("invalid PLAYDECK_PROFILE")
            }
        }
    }

    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn fallback_state(&self) -> CatalogState {
        let mut state = CatalogState::empty_for(self.category_names());
        if self.fallback == FallbackPolicy::Sample {
            for category in &self.categories {
                if let Some(sample) = &category.sample {
                    state.set_records(category.name.clone(), vec![sample.clone()]);
                }
            }
        }
        state
    }
}
