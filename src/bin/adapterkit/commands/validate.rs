//! `adapterkit validate` command
//!
//! Checks stored payload files against a backend schema. Files are
//! validated in parallel; results are reported in argument order.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use rayon::prelude::*;
use serde_json::Value;

use crate::cli::ValidateArgs;
use adapterkit::adapter::{AdapterRegistry, SchemaKind, ValidationMode, ValidationWarning};
use adapterkit::util::diagnostic::{self, Diagnostic};

const PAYLOAD_HELP: &str = "Payload files must hold a single JSON document";
const STRICT_HELP: &str = "Pass `--strict` to reject undeclared fields instead";

enum FileReport {
    Valid {
        path: PathBuf,
        warnings: Vec<ValidationWarning>,
        redacted: Value,
    },
    Invalid(Diagnostic),
}

pub fn execute(args: ValidateArgs, color: bool) -> Result<()> {
    let config = super::load_settings()?;

    let mode = if args.strict {
        ValidationMode::Strict
    } else if args.lenient {
        ValidationMode::Lenient
    } else {
        super::configured_mode(&config)?
    };

    let kind: SchemaKind = args
        .kind
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let registry = super::catalog(&config, mode)?;
    let backend = registry.resolve(&args.backend)?.id().clone();

    tracing::debug!(
        "Validating {} file(s) against {} {} schema ({})",
        args.files.len(),
        backend,
        kind,
        mode
    );

    let reports: Vec<FileReport> = args
        .files
        .par_iter()
        .map(|path| check_file(&registry, backend.as_str(), kind, mode, path))
        .collect();

    let mut failed = 0;
    for report in &reports {
        match report {
            FileReport::Valid {
                path,
                warnings,
                redacted,
            } => {
                for warning in warnings {
                    let diag = Diagnostic::warning(warning.to_string())
                        .with_location(path)
                        .with_help(STRICT_HELP);
                    diagnostic::emit(&diag, color);
                }
                println!("{}: ok", path.display());
                if args.show {
                    println!("{}", serde_json::to_string_pretty(redacted)?);
                }
            }
            FileReport::Invalid(diag) => {
                failed += 1;
                diagnostic::emit(diag, color);
            }
        }
    }

    if failed > 0 {
        bail!(
            "{} of {} file(s) failed validation",
            failed,
            reports.len()
        );
    }

    Ok(())
}

fn check_file(
    registry: &AdapterRegistry,
    backend: &str,
    kind: SchemaKind,
    mode: ValidationMode,
    path: &Path,
) -> FileReport {
    let payload = match super::read_json(path) {
        Ok(payload) => payload,
        Err(e) => {
            return FileReport::Invalid(
                Diagnostic::error(e.to_string())
                    .with_location(path)
                    .with_note(e.root_cause().to_string())
                    .with_help(PAYLOAD_HELP),
            )
        }
    };

    match registry.validate_with_mode(backend, kind, &payload, mode) {
        Ok(validated) => FileReport::Valid {
            path: path.to_path_buf(),
            redacted: validated.config.to_json_redacted(),
            warnings: validated.warnings,
        },
        Err(err) => {
            FileReport::Invalid(Diagnostic::from_adapter_error(&err).with_location(path))
        }
    }
}
