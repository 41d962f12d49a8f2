use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::render::RenderedCatalog;
use crate::markup::html_escape;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionView {
    Expanded,
    Collapsed,
}

impl SectionView {
    pub fn class(self) -> &'static str {
        match self {
            Self::Expanded => "section expanded",
            Self::Collapsed => "section collapsed",
        }
    }
}

/// Headers read their section name from `data-section`; the name never
/// appears inside script text.
const TOGGLE_SCRIPT: &str = "\
document.querySelectorAll('.section-header').forEach(function (header) {
  header.addEventListener('click', function () {
    var name = header.parentElement.getAttribute('data-section');
    fetch('/api/sections/' + encodeURIComponent(name) + '/toggle', { method: 'POST' })
      .then(function () { location.reload(); });
  });
});
";

const PAGE_STYLE: &str = "\
body { font-family: sans-serif; margin: 0; padding: 24px; background: #f4f5f7; }
.section { margin-bottom: 32px; }
.section.collapsed .playables-grid { display: none; }
.section-header { display: flex; align-items: baseline; gap: 12px; cursor: pointer; }
.playables-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 16px; }
.playable-card { background: #fff; border-radius: 8px; padding: 12px; }
.playable-screenshot { height: 320px; background-size: cover; background-position: center; background-color: #e1e3e8; }
.screenshot-placeholder { text-align: center; padding-top: 140px; color: #888; }
.btn { display: inline-block; margin-top: 8px; margin-right: 8px; }
";

/// Full dashboard document. Section headers post to the toggle endpoint when
/// served; opened as a file they are plain headings.
pub fn render_page(
    title: &str,
    rendered: &RenderedCatalog,
    collapsed: &BTreeSet<String>,
) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    out.push_str(&format!("<style>\n{PAGE_STYLE}</style>\n"));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", html_escape(title)));

    for section in &rendered.sections {
        let view = if collapsed.contains(&section.category) {
            SectionView::Collapsed
        } else {
            SectionView::Expanded
        };
        out.push_str(&format!(
            "<section class=\"{}\" data-section=\"{}\">\n",
            view.class(),
            html_escape(&section.category)
        ));
        out.push_str(&format!(
            "<div class=\"section-header\"><h2>{label}</h2>\
<span class=\"count\" id=\"{count_id}\">{count_label}</span></div>\n",
            label = html_escape(&section.label),
            count_id = html_escape(&section.count_id),
            count_label = html_escape(&section.count_label),
        ));
        out.push_str(&format!(
            "<div class=\"playables-grid\" id=\"{}\">\n{}</div>\n",
            html_escape(&section.container_id),
            section.cards_html
        ));
        out.push_str("</section>\n");
    }

    out.push_str(&format!("<script>\n{TOGGLE_SCRIPT}</script>\n"));
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::render::render_catalog;
    use crate::config::Profile;
    use crate::formats::{CatalogState, PlayableRecord};

    #[test]
    fn page_contains_containers_counts_and_collapse_state() {
        let mut state = CatalogState::new();
        state.set_records("farm", vec![PlayableRecord::new("Cows", "cows.html")]);
        let rendered = render_catalog(&Profile::base(), &state);
        let collapsed = BTreeSet::from(["city".to_string()]);

        let html = render_page("Playables", &rendered, &collapsed);
        assert!(html.contains("id=\"farm-playables\""));
        assert!(html.contains("<span class=\"count\" id=\"farm-count\">1 playable</span>"));
        assert!(html.contains("<section class=\"section expanded\" data-section=\"farm\">"));
        assert!(html.contains("<section class=\"section collapsed\" data-section=\"city\">"));
        assert!(html.find("farm-playables") < html.find("city-playables"));
    }

    #[test]
    fn section_names_stay_out_of_script_text() {
        let mut state = CatalogState::new();
        state.set_records("o'neil", Vec::new());
        let profile = Profile {
            categories: vec![crate::config::CategoryConfig::new("o'neil")],
            ..Profile::base()
        };
        let rendered = render_catalog(&profile, &state);

        let html = render_page("Playables", &rendered, &BTreeSet::new());
        assert!(html.contains("data-section=\"o&#39;neil\""));
        assert!(!html.contains("onclick"));
        assert!(!html.contains("o'neil"));
    }
}
