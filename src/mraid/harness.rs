use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::InputError;
use crate::markup::html_escape;
use crate::mraid::envelope::SimulatorMessage;
use crate::mraid::frame::FrameContext;
use crate::mraid::inject::{InjectionMode, inject_mock, with_base_href};
use crate::mraid::log::ActionLog;
use crate::mraid::shim::{
    EVENT_AUDIO_VOLUME_CHANGE, EVENT_STATE_CHANGE, EVENT_VIEWABLE_CHANGE, MraidState,
};

#[async_trait]
pub trait CreativeFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpCreativeFetcher {
    client: reqwest::Client,
}

impl HttpCreativeFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build creative http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CreativeFetcher for HttpCreativeFetcher {
    async fn fetch_html(&self, url: &str) -> anyhow::Result<String> {
        let parsed = url::Url::parse(url).with_context(|| format!("invalid url: {url}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!(
                "url must be http/https (serve the playable, do not open it from disk): {url}"
            );
        }

        let resp = self
            .client
            .get(parsed)
            .header(reqwest::header::USER_AGENT, "playdeck/0.1")
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error! status: {}", status.as_u16());
        }
        resp.text().await.context("read playable html")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    Loaded(InjectionMode),
    Failed,
}

/// Control panel driving one creative inside a [`FrameContext`].
pub struct Harness<C: FrameContext> {
    fetcher: Arc<dyn CreativeFetcher>,
    frame: C,
    volume_percent: u8,
    state: MraidState,
    current_url: Option<String>,
    log: ActionLog,
}

impl<C: FrameContext> Harness<C> {
    pub fn new(fetcher: Arc<dyn CreativeFetcher>, frame: C) -> Self {
        let mut log = ActionLog::new();
        log.append("MRAID simulator ready.");
        Self {
            fetcher,
            frame,
            volume_percent: 100,
            state: MraidState::Default,
            current_url: None,
            log,
        }
    }

    pub fn frame(&self) -> &C {
        &self.frame
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn volume_percent(&self) -> u8 {
        self.volume_percent
    }

    pub fn state(&self) -> MraidState {
        self.state
    }

    pub fn volume_label(&self) -> String {
        format!("Volume: {}%", self.volume_percent)
    }

    pub fn state_label(&self) -> String {
        format!("State: {}", self.state)
    }

    /// Fetches the creative, swaps in the mock SDK and loads the result into
    /// the frame. A fetch failure shows an error panel in the frame instead.
    pub async fn load_playable(&mut self, url: &str) -> anyhow::Result<LoadResult> {
        let url = url.trim();
        if url.is_empty() {
            return Err(InputError::EmptyUrl.into());
        }

        self.log.append(format!("Starting to load playable from: {url}"));
        self.current_url = Some(url.to_string());

        let html = match self.fetcher.fetch_html(url).await {
            Ok(html) => html,
            Err(err) => {
                let message = format!("{err:#}");
                self.log.append(format!("FAILED TO LOAD PLAYABLE: {message}"));
                self.log
                    .append("Make sure the playable is served over http(s), not opened from disk.");
                self.frame
                    .load_document(error_panel(&message))
                    .context("load error panel into frame")?;
                return Ok(LoadResult::Failed);
            }
        };
        self.log.append("Playable HTML fetched successfully.");

        let injection = inject_mock(&html);
        match injection.mode {
            InjectionMode::Replaced => self.log.append("Injected fake MRAID script."),
            InjectionMode::AppendedToHead => self
                .log
                .append("Warning: <script src=\"mraid.js\"> not found. Appended mock to <head>."),
            InjectionMode::Prepended => self
                .log
                .append("Warning: neither mraid.js tag nor </head> found. Prepended mock."),
        }

        self.frame
            .load_document(with_base_href(&injection.html, url))
            .context("load playable into frame")?;
        self.log.append("Playable loaded into frame.");
        Ok(LoadResult::Loaded(injection.mode))
    }

    pub async fn reload_current_ad(&mut self) -> anyhow::Result<Option<LoadResult>> {
        let Some(url) = self.current_url.clone() else {
            self.log.append("No playable URL to reload. Load one first.");
            return Ok(None);
        };
        self.load_playable(&url).await.map(Some)
    }

    /// Posts an event into the frame. Returns `false` (and logs) when the
    /// frame has no document yet or the post fails.
    pub fn send_event_to_ad(&mut self, event: &str, args: Vec<Value>) -> bool {
        if !self.frame.is_ready() {
            self.log.append("Could not send event. Frame not ready.");
            return false;
        }

        let rendered_args = Value::Array(args.clone()).to_string();
        let message = SimulatorMessage::new(event, args);
        match self.frame.post_message(&message) {
            Ok(()) => {
                self.log
                    .append(format!("Sent event: {event} with args: {rendered_args}"));
                true
            }
            Err(err) => {
                self.log
                    .append(format!("Could not send event {event}: {err:#}"));
                false
            }
        }
    }

    pub fn set_volume(&mut self, percent: u8) -> bool {
        self.volume_percent = percent.min(100);
        let volume = f64::from(self.volume_percent) / 100.0;
        self.send_event_to_ad(EVENT_AUDIO_VOLUME_CHANGE, vec![json!(volume)])
    }

    pub fn set_state(&mut self, state: MraidState) -> bool {
        self.state = state;
        let sent_state = self.send_event_to_ad(EVENT_STATE_CHANGE, vec![json!(state.as_str())]);
        let sent_viewable = self.send_event_to_ad(
            EVENT_VIEWABLE_CHANGE,
            vec![json!(state != MraidState::Hidden)],
        );
        sent_state && sent_viewable
    }
}

pub fn error_panel(message: &str) -> String {
    format!(
        "<div style=\"padding: 20px; color: red;\"><h1>Error</h1><p>{}</p>\
<p>Serve the simulator and the playable from a local web server \
(for example <code>playdeck-app</code>) so the playable can be fetched.</p></div>",
        html_escape(message)
    )
}
