use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::markup::html_escape;
use crate::mraid::MOCK_SOURCE;

static MRAID_SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<script\b[^>]*?\bsrc\s*=\s*["']?(?:[^"'\s>]*/)?mraid\.js\b["']?[^>]*>\s*</script\s*>"#,
    )
    .expect("mraid script tag regex")
});

static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("head close regex"));

static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head\b[^>]*>").expect("head open regex"));

static BASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<base\b[^>]*\bhref\s*=").expect("base tag regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionMode {
    /// The SDK `<script src="mraid.js">` tag was swapped for the mock.
    Replaced,
    /// No SDK tag; the mock went in right before `</head>`.
    AppendedToHead,
    /// Neither an SDK tag nor `</head>`; the mock leads the document.
    Prepended,
}

#[derive(Debug, Clone)]
pub struct Injection {
    pub html: String,
    pub mode: InjectionMode,
}

pub fn mock_script_tag() -> String {
    format!("<script>{MOCK_SOURCE}</script>")
}

pub fn has_mraid_script_tag(html: &str) -> bool {
    MRAID_SCRIPT_TAG.is_match(html)
}

/// Puts the mock SDK into `html` exactly once.
pub fn inject_mock(html: &str) -> Injection {
    inject_script(html, &mock_script_tag())
}

fn inject_script(html: &str, script_tag: &str) -> Injection {
    if MRAID_SCRIPT_TAG.is_match(html) {
        let html = MRAID_SCRIPT_TAG
            .replacen(html, 1, NoExpand(script_tag))
            .into_owned();
        return Injection {
            html,
            mode: InjectionMode::Replaced,
        };
    }

    if let Some(close) = HEAD_CLOSE.find(html) {
        let mut out = String::with_capacity(html.len() + script_tag.len());
        out.push_str(&html[..close.start()]);
        out.push_str(script_tag);
        out.push_str(&html[close.start()..]);
        return Injection {
            html: out,
            mode: InjectionMode::AppendedToHead,
        };
    }

    Injection {
        html: format!("{script_tag}{html}"),
        mode: InjectionMode::Prepended,
    }
}

/// Anchors relative references to the creative's own URL, since the document
/// is served from somewhere else. An existing `<base href>` is kept.
pub fn with_base_href(html: &str, creative_url: &str) -> String {
    if BASE_TAG.is_match(html) {
        return html.to_string();
    }

    let base = format!("<base href=\"{}\">", html_escape(creative_url));
    match HEAD_OPEN.find(html) {
        Some(open) => {
            let mut out = String::with_capacity(html.len() + base.len());
            out.push_str(&html[..open.end()]);
            out.push_str(&base);
            out.push_str(&html[open.end()..]);
            out
        }
        None => format!("{base}{html}"),
    }
}
