use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use serde_json::Value;

use crate::mraid::envelope::{ENVELOPE_TYPE, SimulatorMessage};
use crate::mraid::shim::{
    EVENT_AUDIO_VOLUME_CHANGE, EVENT_READY, EVENT_STATE_CHANGE, EVENT_VIEWABLE_CHANGE, Listener,
    MraidShim, listener,
};

/// A sandboxed execution context hosting one creative document, reachable
/// only through posted messages.
pub trait FrameContext: Send {
    /// Replaces the hosted document wholesale (a fresh context every time).
    fn load_document(&mut self, html: String) -> anyhow::Result<()>;

    fn is_ready(&self) -> bool;

    fn post_message(&mut self, message: &SimulatorMessage) -> anyhow::Result<()>;
}

/// Keeps the document and posted messages in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingFrame {
    document: Option<String>,
    messages: Vec<SimulatorMessage>,
}

impl RecordingFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Messages posted since the current document was loaded.
    pub fn messages(&self) -> &[SimulatorMessage] {
        &self.messages
    }
}

impl FrameContext for RecordingFrame {
    fn load_document(&mut self, html: String) -> anyhow::Result<()> {
        self.document = Some(html);
        self.messages.clear();
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.document.is_some()
    }

    fn post_message(&mut self, message: &SimulatorMessage) -> anyhow::Result<()> {
        if self.document.is_none() {
            anyhow::bail!("no document loaded");
        }
        self.messages.push(message.clone());
        Ok(())
    }
}

/// Writes the document to `<dir>/frame.html` and appends each message as a
/// JSON line to `<dir>/events.jsonl`.
#[derive(Debug, Clone)]
pub struct DirFrame {
    dir: PathBuf,
    loaded: bool,
}

impl DirFrame {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create frame dir: {}", dir.display()))?;
        Ok(Self { dir, loaded: false })
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join("frame.html")
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.join("events.jsonl")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameContext for DirFrame {
    fn load_document(&mut self, html: String) -> anyhow::Result<()> {
        let document_path = self.document_path();
        std::fs::write(&document_path, html)
            .with_context(|| format!("write frame document: {}", document_path.display()))?;
        let events_path = self.events_path();
        std::fs::write(&events_path, "")
            .with_context(|| format!("reset frame events: {}", events_path.display()))?;
        self.loaded = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.loaded
    }

    fn post_message(&mut self, message: &SimulatorMessage) -> anyhow::Result<()> {
        if !self.loaded {
            anyhow::bail!("no document loaded");
        }
        let events_path = self.events_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&events_path)
            .with_context(|| format!("open frame events: {}", events_path.display()))?;
        serde_json::to_writer(&mut file, message).context("write frame event json")?;
        file.write_all(b"\n").context("write frame event newline")?;
        file.flush().context("flush frame events")?;
        Ok(())
    }
}

/// One event as a creative listener received it.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedEvent {
    pub event: String,
    pub args: Vec<Value>,
}

/// Events a creative is assumed to listen for from the moment it loads.
pub const OBSERVED_EVENTS: &[&str] = &[
    EVENT_STATE_CHANGE,
    EVENT_READY,
    EVENT_VIEWABLE_CHANGE,
    EVENT_AUDIO_VOLUME_CHANGE,
];

/// Wraps another frame and runs an [`MraidShim`] against every document and
/// message it receives, recording what the creative's listeners see.
pub struct ShimFrame<F> {
    inner: F,
    shim: MraidShim,
    observed: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl<F: FrameContext> ShimFrame<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            shim: MraidShim::default(),
            observed: Arc::default(),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn shim(&self) -> &MraidShim {
        &self.shim
    }

    /// Drains the events observed since the last call.
    pub fn take_observed(&self) -> Vec<ObservedEvent> {
        match self.observed.lock() {
            Ok(mut observed) => std::mem::take(&mut *observed),
            Err(_) => Vec::new(),
        }
    }

    fn observer(&self, event: &str) -> Listener {
        let observed = Arc::clone(&self.observed);
        let event = event.to_string();
        listener(move |args| {
            observed
                .lock()
                .map_err(|_| anyhow::anyhow!("observed events lock poisoned"))?
                .push(ObservedEvent {
                    event: event.clone(),
                    args: args.to_vec(),
                });
            Ok(())
        })
    }
}

impl<F: FrameContext> FrameContext for ShimFrame<F> {
    fn load_document(&mut self, html: String) -> anyhow::Result<()> {
        let has_mock = html.contains(ENVELOPE_TYPE);
        self.inner.load_document(html)?;

        self.take_observed();
        let mut shim = MraidShim::default();
        for event in OBSERVED_EVENTS {
            shim.add_event_listener(event, self.observer(event));
        }
        self.shim = shim;
        if has_mock {
            self.shim.fire_initial_events();
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    fn post_message(&mut self, message: &SimulatorMessage) -> anyhow::Result<()> {
        self.inner.post_message(message)?;
        if self.shim.listener_count(&message.event) == 0 {
            let observer = self.observer(&message.event);
            self.shim.add_event_listener(&message.event, observer);
        }
        self.shim.apply(message);
        Ok(())
    }
}
