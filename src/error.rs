use thiserror::Error;

/// Input rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("required field is empty: {0}")]
    MissingField(&'static str),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("playable url is empty")]
    EmptyUrl,
}
