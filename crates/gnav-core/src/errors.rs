//! Structured error types shared across the trial generation crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`GenError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (phase, subject, sizes, node ids).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for trial generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum GenError {
    /// A structural precondition of a template graph failed.
    #[error("template error: {0}")]
    Template(ErrorInfo),
    /// A reward source produced fewer values than required.
    #[error("reward error: {0}")]
    Rewards(ErrorInfo),
    /// Encoding, decoding or writing a document failed.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Configuration values are unusable.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl GenError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GenError::Template(info)
            | GenError::Rewards(info)
            | GenError::Serde(info)
            | GenError::Config(info) => info,
        }
    }

    /// Returns the error with an additional context entry attached.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            GenError::Template(info) => GenError::Template(info.with_context(key, value)),
            GenError::Rewards(info) => GenError::Rewards(info.with_context(key, value)),
            GenError::Serde(info) => GenError::Serde(info.with_context(key, value)),
            GenError::Config(info) => GenError::Config(info.with_context(key, value)),
        }
    }
}

/// Wraps an I/O or codec failure into a [`GenError::Serde`] value.
pub fn serde_error(code: &str, err: impl ToString) -> GenError {
    GenError::Serde(ErrorInfo::new(code, err.to_string()))
}
