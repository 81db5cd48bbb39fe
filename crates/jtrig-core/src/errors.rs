//! Error taxonomy of the jtrig crates.
//!
//! Every failure carries an [`ErrorInfo`] with a stable code, so callers branch on
//! `info().code` rather than on message text.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code of an event record that could not be decoded.
pub const MALFORMED_EVENT: &str = "source_parse";

/// Code, message and context of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable code, e.g. `binning_mismatch` or `store_missing`.
    pub code: String,
    /// Diagnostic message.
    pub message: String,
    /// Histogram names, axis indices, paths or line numbers involved.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// What the caller can change to avoid the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload without context or hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds one context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let context: Vec<String> = self
            .context
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        if !context.is_empty() {
            write!(f, " ({})", context.join(", "))?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Failure of a jtrig operation, grouped by the layer it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum TrigError {
    /// Invalid axis edges or descriptor entries.
    #[error("binning: {0}")]
    Binning(ErrorInfo),
    /// Incompatible histograms or invalid histogram operations.
    #[error("histogram: {0}")]
    Histogram(ErrorInfo),
    /// Unreadable or inconsistent configuration card.
    #[error("config: {0}")]
    Config(ErrorInfo),
    /// Event input that cannot be opened, read or decoded.
    #[error("source: {0}")]
    Source(ErrorInfo),
    /// Histogram store failures.
    #[error("store: {0}")]
    Store(ErrorInfo),
    /// JSON or YAML encoding failures.
    #[error("serde: {0}")]
    Serde(ErrorInfo),
}

impl TrigError {
    /// Payload of the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            TrigError::Binning(info)
            | TrigError::Histogram(info)
            | TrigError::Config(info)
            | TrigError::Source(info)
            | TrigError::Store(info)
            | TrigError::Serde(info) => info,
        }
    }

    /// True for a single event record that failed to decode. The source itself is
    /// still readable past it.
    pub fn is_malformed_event(&self) -> bool {
        matches!(self, TrigError::Source(info) if info.code == MALFORMED_EVENT)
    }
}
