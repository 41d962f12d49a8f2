use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayableRecord {
    pub title: String,
    pub play_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asana_url: Option<String>,
}

impl PlayableRecord {
    pub fn new(title: impl Into<String>, play_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            play_url: play_url.into(),
            screenshot: None,
            asana_url: None,
        }
    }

    pub fn with_screenshot(mut self, screenshot: impl Into<String>) -> Self {
        self.screenshot = Some(screenshot.into());
        self
    }

    pub fn with_asana_url(mut self, asana_url: impl Into<String>) -> Self {
        self.asana_url = Some(asana_url.into());
        self
    }

    /// Screenshot path, treating an empty string like an absent one.
    pub fn screenshot_path(&self) -> Option<&str> {
        self.screenshot.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Playables per category, each sequence in render order (most recent first).
///
/// Serializes as a plain JSON object keyed by category, which is also the
/// override persistence format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogState {
    categories: BTreeMap<String, Vec<PlayableRecord>>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty sequence for every given category.
    pub fn empty_for<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let mut state = Self::new();
        for category in categories {
            state.categories.insert(category.to_owned(), Vec::new());
        }
        state
    }

    pub fn records(&self, category: &str) -> &[PlayableRecord] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn set_records(&mut self, category: impl Into<String>, records: Vec<PlayableRecord>) {
        self.categories.insert(category.into(), records);
    }

    pub fn prepend(&mut self, category: &str, record: PlayableRecord) {
        self.categories
            .entry(category.to_owned())
            .or_default()
            .insert(0, record);
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_keys_and_omits_absent_optionals() {
        let record = PlayableRecord::new("Cows", "playables/farm/Cows.html");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "Cows", "playUrl": "playables/farm/Cows.html"})
        );
    }

    #[test]
    fn record_accepts_null_screenshot() {
        let record: PlayableRecord = serde_json::from_str(
            r#"{"title":"A","playUrl":"a.html","screenshot":null,"asanaUrl":"https://app.asana.com/0/1"}"#,
        )
        .unwrap();
        assert_eq!(record.screenshot, None);
        assert_eq!(record.asana_url.as_deref(), Some("https://app.asana.com/0/1"));
    }

    #[test]
    fn empty_screenshot_counts_as_absent() {
        let record = PlayableRecord::new("A", "a.html").with_screenshot("  ");
        assert_eq!(record.screenshot_path(), None);
    }

    #[test]
    fn prepend_puts_new_record_first() {
        let mut state = CatalogState::empty_for(["farm"]);
        state.set_records(
            "farm",
            vec![PlayableRecord::new("A", "a.html"), PlayableRecord::new("B", "b.html")],
        );
        state.prepend("farm", PlayableRecord::new("R", "r.html"));

        let titles: Vec<&str> = state.records("farm").iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["R", "A", "B"]);
    }

    #[test]
    fn state_serializes_as_object_keyed_by_category() {
        let mut state = CatalogState::empty_for(["city", "farm"]);
        state.prepend("farm", PlayableRecord::new("A", "a.html"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"city": [], "farm": [{"title": "A", "playUrl": "a.html"}]})
        );
    }
}
