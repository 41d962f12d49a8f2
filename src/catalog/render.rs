use serde::Serialize;

use crate::config::Profile;
use crate::formats::{CatalogState, PlayableRecord};
use crate::markup::html_escape;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    pub category: String,
    pub label: String,
    pub container_id: String,
    pub count_id: String,
    pub count: usize,
    pub count_label: String,
    pub cards_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCatalog {
    pub sections: Vec<RenderedSection>,
}

impl RenderedCatalog {
    pub fn section(&self, category: &str) -> Option<&RenderedSection> {
        self.sections.iter().find(|s| s.category == category)
    }
}

/// Renders every profile category in profile order; categories missing from
/// `state` render as empty.
pub fn render_catalog(profile: &Profile, state: &CatalogState) -> RenderedCatalog {
    let sections = profile
        .categories
        .iter()
        .map(|category| {
            let records = state.records(&category.name);
            let cards_html = records
                .iter()
                .map(|record| render_card(record, &category.name, profile.track_asana))
                .collect::<String>();
            RenderedSection {
                category: category.name.clone(),
                label: category.label(),
                container_id: category.container_id(),
                count_id: category.count_id(),
                count: records.len(),
                count_label: profile.plural.count_label(records.len()),
                cards_html,
            }
        })
        .collect();

    RenderedCatalog { sections }
}

pub fn render_card(record: &PlayableRecord, category: &str, track_asana: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<div class=\"playable-card {}-card\">\n",
        html_escape(category)
    ));
    out.push_str(&format!(
        "  <h3 class=\"playable-title\">{}</h3>\n",
        html_escape(&record.title)
    ));

    match record.screenshot_path() {
        Some(screenshot) => out.push_str(&format!(
            "  <div class=\"playable-screenshot\" style=\"background-image: url('{}')\"></div>\n",
            html_escape(screenshot)
        )),
        None => out.push_str(
            "  <div class=\"playable-screenshot\">\
<div class=\"screenshot-placeholder\">📱<br>No preview</div></div>\n",
        ),
    }

    out.push_str("  <div class=\"playable-actions\">\n");
    out.push_str(&format!(
        "    <a href=\"{}\" target=\"_blank\" class=\"btn btn-play\">▶ Play</a>\n",
        html_escape(&record.play_url)
    ));
    if track_asana {
        let asana_url = record.asana_url.as_deref().unwrap_or("#");
        out.push_str(&format!(
            "    <a href=\"{}\" target=\"_blank\" class=\"btn btn-asana\">Asana</a>\n",
            html_escape(asana_url)
        ));
    }
    out.push_str("  </div>\n");
    out.push_str("</div>\n");
    out
}
