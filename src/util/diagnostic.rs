//! Operator-facing rendering of adapter errors.
//!
//! A rendered diagnostic carries the error's stable code, the payload file it
//! concerns, one note per field problem, and the help text declared on the
//! error type:
//!
//! ```text
//! error[adapterkit::validation::invalid_config]: invalid connection configuration for `mock` (2 problem(s))
//!   --> tenants/acme/mock.json
//!    | api_key: required field is missing
//!    | extra: unknown field
//!    = help: Run `adapterkit describe <backend>` to see the declared fields
//! ```

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as _;

use crate::adapter::error::AdapterError;
use crate::adapter::validation::{FieldIssue, Problem};

/// Extra hint when a strict payload carries undeclared keys.
const LENIENT_HINT: &str = "Undeclared fields can be dropped with `--lenient`";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, false) => "warning",
        }
    }
}

/// One rendered problem report.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable error code, e.g. `adapterkit::registry::unknown_backend`
    pub code: Option<String>,
    pub message: String,
    /// Payload file the problem was found in
    pub location: Option<PathBuf>,
    /// One line per field problem
    pub notes: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            code: None,
            message: message.into(),
            location: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Render an adapter error, taking its code and help from the
    /// [`miette::Diagnostic`] declaration and listing field problems.
    pub fn from_adapter_error(err: &AdapterError) -> Self {
        let mut diag = Diagnostic::error(err.to_string());
        diag.code = err.code().map(|c| c.to_string());
        diag.help.extend(err.help().map(|h| h.to_string()));

        let issues: &[FieldIssue] = match err {
            AdapterError::ConfigValidation(inner) => &inner.issues,
            AdapterError::InvalidSchema { issues, .. } => issues,
            _ => &[],
        };
        diag.notes = issues.iter().map(|issue| issue.to_string()).collect();
        if issues.iter().any(|i| i.problem == Problem::UnknownField) {
            diag.help.push(LENIENT_HINT.to_string());
        }
        diag
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format for the terminal, with ANSI colors if `color` is set.
    pub fn format(&self, color: bool) -> String {
        let mut out = String::from(self.severity.label(color));
        if let Some(code) = &self.code {
            out.push_str(&format!("[{}]", code));
        }
        out.push_str(&format!(": {}\n", self.message));

        if let Some(path) = &self.location {
            out.push_str(&format!("  --> {}\n", path.display()));
        }
        for note in &self.notes {
            out.push_str(&format!("   | {}\n", note));
        }

        let help_label = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
        for help in &self.help {
            out.push_str(&format!("   = {}: {}\n", help_label, help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
