use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::mraid::envelope::SimulatorMessage;

pub const MRAID_VERSION: &str = "3.0";
pub const SUPPORTED_FEATURES: &[&str] = &["sms", "tel", "inlineVideo"];
pub const READY_DELAY: Duration = Duration::from_millis(100);

pub const EVENT_READY: &str = "ready";
pub const EVENT_STATE_CHANGE: &str = "stateChange";
pub const EVENT_VIEWABLE_CHANGE: &str = "viewableChange";
pub const EVENT_AUDIO_VOLUME_CHANGE: &str = "audioVolumeChange";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MraidState {
    Loading,
    Default,
    Expanded,
    Hidden,
}

impl MraidState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Default => "default",
            Self::Expanded => "expanded",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for MraidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MraidState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loading" => Ok(Self::Loading),
            "default" => Ok(Self::Default),
            "expanded" => Ok(Self::Expanded),
            "hidden" => Ok(Self::Hidden),
            other => anyhow::bail!("unknown mraid state: {other}"),
        }
    }
}

/// Callback registered by the creative. Identity is the `Arc` pointer, so the
/// same handle must be kept to remove it later.
pub type Listener = Arc<dyn Fn(&[Value]) -> anyhow::Result<()> + Send + Sync>;

pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Host capability behind `open(url)`.
pub trait Opener: Send + Sync {
    fn open(&self, url: &str);
}

#[derive(Debug, Default)]
pub struct LogOpener;

impl Opener for LogOpener {
    fn open(&self, url: &str) {
        tracing::info!(url, "mraid open");
    }
}

/// The mock ad-SDK object as seen from inside a creative.
pub struct MraidShim {
    state: MraidState,
    volume: f64,
    listeners: HashMap<String, Vec<Listener>>,
    opener: Arc<dyn Opener>,
}

impl fmt::Debug for MraidShim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(event, list)| (event.as_str(), list.len()))
            .collect();
        f.debug_struct("MraidShim")
            .field("state", &self.state)
            .field("volume", &self.volume)
            .field("listeners", &counts)
            .finish()
    }
}

impl Default for MraidShim {
    fn default() -> Self {
        Self::new(Arc::new(LogOpener))
    }
}

impl MraidShim {
    pub fn new(opener: Arc<dyn Opener>) -> Self {
        Self {
            state: MraidState::Loading,
            volume: 1.0,
            listeners: HashMap::new(),
            opener,
        }
    }

    pub fn version(&self) -> &'static str {
        MRAID_VERSION
    }

    pub fn state(&self) -> MraidState {
        self.state
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// MRAID 3.0 name for [`MraidShim::volume`].
    pub fn audio_volume(&self) -> f64 {
        self.volume
    }

    pub fn is_viewable(&self) -> bool {
        self.state != MraidState::Hidden
    }

    pub fn supports(&self, feature: &str) -> bool {
        tracing::debug!(feature, "mraid supports query");
        SUPPORTED_FEATURES.contains(&feature)
    }

    pub fn add_event_listener(&mut self, event: &str, callback: Listener) {
        tracing::debug!(event, "mraid listener registered");
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(callback);
    }

    /// Removes every registration of `callback`, or all listeners of `event`
    /// when `callback` is `None`.
    pub fn remove_event_listener(&mut self, event: &str, callback: Option<&Listener>) {
        let Some(list) = self.listeners.get_mut(event) else {
            return;
        };
        match callback {
            Some(callback) => list.retain(|cb| !Arc::ptr_eq(cb, callback)),
            None => list.clear(),
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(Vec::len).unwrap_or(0)
    }

    /// Invokes listeners in registration order. A failing listener is logged
    /// and does not stop the rest.
    pub fn fire_event(&self, event: &str, args: &[Value]) {
        tracing::debug!(event, ?args, "mraid fire");
        let Some(list) = self.listeners.get(event) else {
            return;
        };
        for callback in list.clone() {
            if let Err(err) = callback(args) {
                tracing::warn!(event, error = %format!("{err:#}"), "mraid listener failed");
            }
        }
    }

    pub fn open(&self, url: &str) {
        self.opener.open(url);
    }

    pub fn close(&mut self) {
        let next = if self.state == MraidState::Expanded {
            MraidState::Default
        } else {
            MraidState::Hidden
        };
        self.set_state(next);
    }

    /// Fires `stateChange` only when the value actually changes.
    pub fn set_state(&mut self, next: MraidState) {
        if self.state == next {
            return;
        }
        self.state = next;
        self.fire_event(EVENT_STATE_CHANGE, &[json!(next.as_str())]);
    }

    pub fn fire_initial_events(&mut self) {
        self.set_state(MraidState::Default);
        self.fire_event(EVENT_READY, &[]);
        self.fire_event(EVENT_VIEWABLE_CHANGE, &[json!(self.is_viewable())]);
        self.fire_event(EVENT_AUDIO_VOLUME_CHANGE, &[json!(self.audio_volume())]);
    }

    /// Waits `delay` so the creative can attach listeners, then fires the
    /// initial sequence.
    pub async fn boot(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
        self.fire_initial_events();
    }

    /// Handles a message posted into the creative's context. Returns whether
    /// it was a simulator envelope.
    pub fn handle_message(&mut self, data: &Value) -> bool {
        let Some(message) = SimulatorMessage::from_value(data) else {
            return false;
        };
        self.apply(&message);
        true
    }

    pub fn apply(&mut self, message: &SimulatorMessage) {
        let first = message.args.first();
        match message.event.as_str() {
            EVENT_AUDIO_VOLUME_CHANGE => match first.and_then(Value::as_f64) {
                Some(volume) => self.volume = volume.clamp(0.0, 1.0),
                None => {
                    tracing::warn!(args = ?message.args, "audioVolumeChange without numeric volume")
                }
            },
            EVENT_STATE_CHANGE => {
                match first.and_then(Value::as_str).map(str::parse::<MraidState>) {
                    Some(Ok(state)) => self.state = state,
                    _ => tracing::warn!(
                        args = ?message.args,
                        "stateChange with unknown state; state unchanged"
                    ),
                }
            }
            _ => {}
        }
        self.fire_event(&message.event, &message.args);
    }
}
