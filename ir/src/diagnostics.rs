//! Diagnostic sink for one conversion run.
//!
//! Rules report through the sink instead of a global handler, so a caller can
//! inspect exactly what a conversion said. Every entry is also forwarded to
//! `tracing`.

use std::fmt;

use crate::function::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Remark,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, severity: Severity, location: &Location, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Remark => tracing::debug!(%location, %message, "remark"),
            Severity::Warning => tracing::warn!(%location, %message, "warning"),
            Severity::Error => tracing::error!(%location, %message, "error"),
        }
        self.entries.push(Diagnostic { severity, location: location.clone(), message });
    }

    pub fn remark(&mut self, location: &Location, message: impl Into<String>) {
        self.emit(Severity::Remark, location, message);
    }

    pub fn warning(&mut self, location: &Location, message: impl Into<String>) {
        self.emit(Severity::Warning, location, message);
    }

    pub fn error(&mut self, location: &Location, message: impl Into<String>) {
        self.emit(Severity::Error, location, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn has_errors(&self) -> bool {
        self.of_severity(Severity::Error).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets everything emitted after the first `len` entries.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}
