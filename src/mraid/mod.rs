//! MRAID mock SDK and the harness that drives it.
//!
//! [`MOCK_SOURCE`] is the script that actually runs inside a creative;
//! [`shim::MraidShim`] models the same event contract so it can be exercised
//! without a browser.

pub mod envelope;
pub mod frame;
pub mod harness;
pub mod inject;
pub mod log;
pub mod shim;

/// JavaScript installed as `window.mraid` inside the creative.
pub const MOCK_SOURCE: &str = include_str!("../../assets/mraid-mock.js");
