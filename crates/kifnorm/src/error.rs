//! Error types and the diagnostic sink for the normalization pipeline

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::formula::SourceLocation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Unbalanced parentheses or quotes in: {0}")]
    Unbalanced(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("Malformed formula in {pass}: {formula}")]
    Malformed { pass: &'static str, formula: String },

    #[error("No predicate instantiations for {0}")]
    NoPredicateInstantiation(String),

    #[error("Formula rejected for inference: {0}")]
    RejectedForInference(String),

    #[error("TPTP translation failed: {0}")]
    Tptp(String),
}

pub type Result<T> = std::result::Result<T, TransformError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single message produced while processing a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            formula: None,
            location: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_formula(mut self, formula: impl fmt::Display) -> Self {
        self.formula = Some(formula.to_string());
        self
    }

    pub fn with_location(mut self, location: Option<&SourceLocation>) -> Self {
        self.location = location.cloned();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        if let Some(formula) = &self.formula {
            write!(f, " in {}", formula)?;
        }
        Ok(())
    }
}

impl From<&TransformError> for Diagnostic {
    fn from(err: &TransformError) -> Self {
        let severity = match err {
            TransformError::Malformed { .. } | TransformError::Tptp(_) => Severity::Warning,
            _ => Severity::Error,
        };
        Diagnostic::new(severity, err.to_string())
    }
}

/// Accumulates diagnostics across a batch of formulas.
///
/// Every report is also forwarded to `tracing` so a subscriber sees the
/// same messages as the caller that later drains the sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => info!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
            Severity::Error => error!("{}", diagnostic),
        }
        self.lock().push(diagnostic);
    }

    /// Copy of everything reported so far
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Drain the sink
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.lock().iter().any(|d| d.severity == Severity::Error)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
