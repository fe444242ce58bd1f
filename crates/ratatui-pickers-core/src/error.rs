//! Error types for attribute parsing and the remote insert flow.
//!
//! Component-level code never surfaces these to the host: they are logged and converted into
//! a fallback. The parse functions that produce them are public so hosts can validate input
//! up front.

use thiserror::Error;

/// Errors produced while parsing string-encoded attributes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid time {0:?} (expected HH:MM)")]
    InvalidTime(String),

    #[error("invalid date-time {0:?} (expected YYYY-MM-DDTHH:MM)")]
    InvalidDateTime(String),

    #[error("invalid hex color {0:?}")]
    InvalidHexColor(String),

    #[error("invalid size {0:?}")]
    InvalidSize(String),

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("invalid key/value map: {0}")]
    InvalidMap(String),

    #[error("invalid option list: {0}")]
    InvalidOptions(String),

    #[error("invalid modifier {0:?} (expected ctrl, alt, shift or meta)")]
    InvalidModifier(String),

    #[error("invalid shortcut key {0:?}")]
    InvalidShortcut(String),

    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported http method {0:?}")]
    InvalidMethod(String),
}

/// Reasons a remote insert did not produce a usable option.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("insert request failed: {0}")]
    Transport(String),

    #[error("insert endpoint answered with status {0}")]
    Status(u16),

    #[error("insert response is not valid option JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("insert response names disabled option {0:?}")]
    Disabled(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for InsertError {
    fn from(err: reqwest::Error) -> Self {
        InsertError::Transport(err.to_string())
    }
}
