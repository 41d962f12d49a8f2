use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::config::Profile;
use crate::error::InputError;
use crate::formats::PlayableRecord;

/// Fields a user supplies when registering a playable by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayable {
    pub title: String,
    #[serde(default)]
    pub asana_url: Option<String>,
}

pub fn play_path(category: &str, title: &str) -> String {
    format!("playables/{category}/{title}.html")
}

pub fn screenshot_path(category: &str, title: &str) -> String {
    format!("playables/{category}/screens/{title}.png")
}

/// Checks the input against the profile and derives the stored record.
pub fn build_record(
    profile: &Profile,
    category: &str,
    fields: &NewPlayable,
) -> Result<PlayableRecord, InputError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(InputError::MissingField("category"));
    }
    if profile.category(category).is_none() {
        return Err(InputError::UnknownCategory(category.to_string()));
    }

    let title = fields.title.trim();
    if title.is_empty() {
        return Err(InputError::MissingField("title"));
    }

    let asana_url = fields
        .asana_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());
    if profile.track_asana && asana_url.is_none() {
        return Err(InputError::MissingField("asanaUrl"));
    }

    Ok(PlayableRecord {
        title: title.to_string(),
        play_url: play_path(category, title),
        screenshot: Some(screenshot_path(category, title)),
        asana_url: asana_url.map(str::to_string),
    })
}

pub fn success_notice(category: &str, record: &PlayableRecord) -> String {
    format!(
        "Playable \"{title}\" added to {category}. Upload the files yourself: {play} and {screen}",
        title = record.title,
        play = record.play_url,
        screen = record
            .screenshot
            .as_deref()
            .unwrap_or_default(),
    )
}

/// Inline `data:` URI for showing a picked screenshot before submission.
pub fn screenshot_preview(bytes: &[u8], file_name: &str) -> String {
    let mime = match file_name
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}
