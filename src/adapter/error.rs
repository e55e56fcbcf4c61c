//! Adapter error taxonomy.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use crate::adapter::capabilities::{BackendId, BackendIdParseError, Capability};
use crate::adapter::schema::SchemaKind;
use crate::adapter::validation::{ConfigValidationError, FieldIssue};

/// Classification of a backend client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    /// Safe to retry with backoff
    Transient,
    /// Retrying will not help
    Permanent,
}

impl std::fmt::Display for UpstreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamKind::Transient => write!(f, "transient"),
            UpstreamKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// Errors raised by the registry and the adapter interface.
#[derive(Debug, Error, Diagnostic)]
pub enum AdapterError {
    #[error("backend `{backend}` is already registered")]
    #[diagnostic(
        code(adapterkit::registry::duplicate_backend),
        help("Backend identifiers and aliases share one namespace; pick a different name")
    )]
    DuplicateBackend { backend: BackendId },

    #[error("unknown backend `{backend}`")]
    #[diagnostic(
        code(adapterkit::registry::unknown_backend),
        help("Run `adapterkit list` to see registered backends")
    )]
    UnknownBackend { backend: String },

    #[error(transparent)]
    #[diagnostic(code(adapterkit::registry::invalid_backend_id))]
    InvalidBackendId(#[from] BackendIdParseError),

    #[error("backend `{backend}` declares an invalid {kind} schema: {}", format_issues(.issues))]
    #[diagnostic(code(adapterkit::registry::invalid_schema))]
    InvalidSchema {
        backend: BackendId,
        kind: SchemaKind,
        issues: Vec<FieldIssue>,
    },

    #[error("a global adapter registry is already installed")]
    #[diagnostic(code(adapterkit::registry::already_installed))]
    AlreadyInstalled,

    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigValidation(#[from] ConfigValidationError),

    #[error("expected a {expected_kind} configuration for `{expected_backend}`, got {found_kind} for `{found_backend}`")]
    #[diagnostic(code(adapterkit::adapter::config_mismatch))]
    ConfigMismatch {
        expected_backend: BackendId,
        expected_kind: SchemaKind,
        found_backend: BackendId,
        found_kind: SchemaKind,
    },

    #[error("backend `{backend}` does not support {operation} ({capability}){}", detail_suffix(.detail))]
    #[diagnostic(
        code(adapterkit::adapter::capability_not_supported),
        help("Check `adapterkit describe {backend}` for the capabilities this backend declares")
    )]
    CapabilityNotSupported {
        backend: BackendId,
        operation: String,
        capability: Capability,
        detail: Option<String>,
    },

    #[error("{kind} upstream failure from `{backend}` during {operation}: {message}")]
    #[diagnostic(code(adapterkit::adapter::upstream))]
    Upstream {
        backend: BackendId,
        operation: String,
        kind: UpstreamKind,
        message: String,
    },

    #[error("{operation} on `{backend}` timed out after {after:?}")]
    #[diagnostic(code(adapterkit::adapter::timed_out))]
    TimedOut {
        backend: BackendId,
        operation: String,
        after: Duration,
    },

    #[error("{operation} on `{backend}` was cancelled")]
    #[diagnostic(code(adapterkit::adapter::cancelled))]
    Cancelled { backend: BackendId, operation: String },

    #[error("no client available for `{backend}`: {reason}")]
    #[diagnostic(
        code(adapterkit::adapter::client_unavailable),
        help("Register a client constructor for this backend or run in dry-run mode")
    )]
    ClientUnavailable { backend: BackendId, reason: String },
}

impl AdapterError {
    /// Whether the business-logic layer may retry the call with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AdapterError::Upstream {
                kind: UpstreamKind::Transient,
                ..
            } | AdapterError::TimedOut { .. }
        )
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}
