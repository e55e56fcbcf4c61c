//! Configuration validation - raw payloads in, typed configuration out.
//!
//! Validation is a pure walk over a [`ConfigSchema`]. Every declared field is
//! checked for presence, converted to its semantic type and checked against
//! its constraints; every problem is collected so callers see the full list
//! at once. Strict mode rejects undeclared keys; lenient mode drops them and
//! reports them as warnings.

use std::collections::BTreeMap;
use std::fmt;

use miette::Diagnostic;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::adapter::capabilities::BackendId;
use crate::adapter::schema::{ConfigSchema, FieldSpec, FieldType, SchemaKind};
use crate::adapter::validated::{ConfigObject, ConfigValue, ValidatedConfig};

/// How undeclared payload keys are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Unknown keys fail validation (development and test)
    #[default]
    Strict,
    /// Unknown keys are dropped with a warning (production)
    Lenient,
}

impl ValidationMode {
    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Lenient => "lenient",
        }
    }

    /// Select the mode from a deployment environment name.
    ///
    /// `production` is lenient, everything else (including unset) is strict.
    pub fn from_environment(environment: Option<&str>) -> Self {
        match environment {
            Some(env) if env.trim().eq_ignore_ascii_case("production") => ValidationMode::Lenient,
            _ => ValidationMode::Strict,
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = ValidationModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "lenient" => Ok(ValidationMode::Lenient),
            _ => Err(ValidationModeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid validation mode.
#[derive(Debug, Clone)]
pub struct ValidationModeParseError(pub String);

impl fmt::Display for ValidationModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid validation mode '{}', valid values: strict, lenient",
            self.0
        )
    }
}

impl std::error::Error for ValidationModeParseError {}

/// One step in a field path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a payload, e.g. `zone_targeting[1].zone_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The payload root.
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    /// Extend with an object key.
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.to_string()));
        FieldPath(segments)
    }

    /// Extend with a list index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        FieldPath(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }

        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// What is wrong with one field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Problem {
    #[error("required field is missing")]
    Missing,

    #[error("unknown field")]
    UnknownField,

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value '{found}' is not one of: {}", .allowed.join(", "))]
    NotInEnum { allowed: Vec<String>, found: String },

    #[error("value {found} is below the minimum of {minimum}")]
    BelowMinimum { minimum: f64, found: f64 },

    #[error("value {found} is above the maximum of {maximum}")]
    AboveMaximum { maximum: f64, found: f64 },

    #[error("value does not match pattern `{pattern}`")]
    PatternMismatch { pattern: String },

    #[error("field pattern `{pattern}` is not a valid regular expression")]
    InvalidPattern { pattern: String },

    #[error("field is declared more than once")]
    DuplicateField,
}

/// A problem at a specific path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub path: FieldPath,
    pub problem: Problem,
}

impl FieldIssue {
    pub fn new(path: FieldPath, problem: Problem) -> Self {
        FieldIssue { path, problem }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.problem)
    }
}

/// A payload failed validation. Carries every problem found.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("invalid {kind} configuration for `{backend}` ({n} problem(s))", n = .issues.len())]
#[diagnostic(
    code(adapterkit::validation::invalid_config),
    help("Run `adapterkit describe <backend>` to see the declared fields")
)]
pub struct ConfigValidationError {
    pub backend: BackendId,
    pub kind: SchemaKind,
    pub issues: Vec<FieldIssue>,
}

impl ConfigValidationError {
    /// Paths reported as unknown fields.
    pub fn unknown_fields(&self) -> Vec<&FieldPath> {
        self.issues
            .iter()
            .filter(|i| i.problem == Problem::UnknownField)
            .map(|i| &i.path)
            .collect()
    }

    /// Paths reported as missing.
    pub fn missing_fields(&self) -> Vec<&FieldPath> {
        self.issues
            .iter()
            .filter(|i| i.problem == Problem::Missing)
            .map(|i| &i.path)
            .collect()
    }
}

/// Non-fatal findings from lenient validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    UnknownFieldDropped(FieldPath),
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::UnknownFieldDropped(path) => {
                write!(f, "ignoring unknown field `{}`", path)
            }
        }
    }
}

/// Successful validation result.
#[derive(Debug, Clone)]
pub struct Validated {
    pub config: ValidatedConfig,
    pub warnings: Vec<ValidationWarning>,
}

/// Validates payloads for one (backend, schema kind) pair.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    backend: &'a BackendId,
    kind: SchemaKind,
    schema: &'a ConfigSchema,
    mode: ValidationMode,
}

impl<'a> Validator<'a> {
    /// Create a strict validator.
    pub fn new(backend: &'a BackendId, kind: SchemaKind, schema: &'a ConfigSchema) -> Self {
        Validator {
            backend,
            kind,
            schema,
            mode: ValidationMode::Strict,
        }
    }

    /// Set the validation mode.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validate a raw payload.
    pub fn validate(&self, payload: &Value) -> Result<Validated, ConfigValidationError> {
        let mut walk = Walk {
            mode: self.mode,
            issues: Vec::new(),
            warnings: Vec::new(),
        };

        let values = match payload {
            Value::Object(map) => walk.object(self.schema, map, &FieldPath::root()),
            other => {
                walk.issue(
                    FieldPath::root(),
                    Problem::TypeMismatch {
                        expected: "object",
                        found: json_type_name(other),
                    },
                );
                ConfigObject::new()
            }
        };

        if !walk.issues.is_empty() {
            return Err(ConfigValidationError {
                backend: self.backend.clone(),
                kind: self.kind,
                issues: walk.issues,
            });
        }

        Ok(Validated {
            config: ValidatedConfig::new(self.backend.clone(), self.kind, self.schema, values),
            warnings: walk.warnings,
        })
    }
}

/// Validate a payload against a schema.
pub fn validate(
    backend: &BackendId,
    kind: SchemaKind,
    schema: &ConfigSchema,
    payload: &Value,
    mode: ValidationMode,
) -> Result<Validated, ConfigValidationError> {
    Validator::new(backend, kind, schema)
        .with_mode(mode)
        .validate(payload)
}

/// Check one value against one field, returning every problem found.
///
/// Used to verify declared defaults at registration time.
pub(crate) fn check_value(field: &FieldSpec, value: &Value, path: &FieldPath) -> Vec<FieldIssue> {
    let mut walk = Walk {
        mode: ValidationMode::Strict,
        issues: Vec::new(),
        warnings: Vec::new(),
    };
    walk.convert(field, value, path);
    walk.issues
}

struct Walk {
    mode: ValidationMode,
    issues: Vec<FieldIssue>,
    warnings: Vec<ValidationWarning>,
}

impl Walk {
    fn issue(&mut self, path: FieldPath, problem: Problem) {
        self.issues.push(FieldIssue::new(path, problem));
    }

    fn object(
        &mut self,
        schema: &ConfigSchema,
        map: &Map<String, Value>,
        base: &FieldPath,
    ) -> ConfigObject {
        let mut values = BTreeMap::new();

        for field in &schema.fields {
            let path = base.key(&field.name);
            match map.get(&field.name) {
                None | Some(Value::Null) => {
                    if let Some(default) = &field.default {
                        if let Some(value) = self.convert(field, default, &path) {
                            values.insert(field.name.clone(), value);
                        }
                    } else if field.required {
                        self.issue(path, Problem::Missing);
                    }
                }
                Some(raw) => {
                    if let Some(value) = self.convert(field, raw, &path) {
                        values.insert(field.name.clone(), value);
                    }
                }
            }
        }

        let mut unknown: Vec<&String> = map.keys().filter(|k| !schema.contains(k)).collect();
        unknown.sort();
        for key in unknown {
            let path = base.key(key);
            match self.mode {
                ValidationMode::Strict => self.issue(path, Problem::UnknownField),
                ValidationMode::Lenient => {
                    self.warnings.push(ValidationWarning::UnknownFieldDropped(path))
                }
            }
        }

        values
    }

    fn convert(&mut self, field: &FieldSpec, raw: &Value, path: &FieldPath) -> Option<ConfigValue> {
        match &field.field_type {
            FieldType::String => {
                let Value::String(s) = raw else {
                    return self.mismatch(path, "string", raw);
                };
                self.check_pattern(field, s, path);
                Some(ConfigValue::String(s.clone()))
            }
            FieldType::Integer => {
                let Some(n) = to_integer(raw) else {
                    return self.mismatch(path, "integer", raw);
                };
                self.check_range(field, n as f64, path);
                Some(ConfigValue::Integer(n))
            }
            FieldType::Number => {
                let Some(n) = to_number(raw) else {
                    return self.mismatch(path, "number", raw);
                };
                self.check_range(field, n, path);
                Some(ConfigValue::Number(n))
            }
            FieldType::Boolean => match raw {
                Value::Bool(b) => Some(ConfigValue::Bool(*b)),
                other => self.mismatch(path, "boolean", other),
            },
            FieldType::Enum(allowed) => {
                let Value::String(s) = raw else {
                    return self.mismatch(path, "string", raw);
                };
                match allowed.iter().find(|a| a.eq_ignore_ascii_case(s)) {
                    Some(canonical) => Some(ConfigValue::String(canonical.clone())),
                    None => {
                        self.issue(
                            path.clone(),
                            Problem::NotInEnum {
                                allowed: allowed.clone(),
                                found: s.clone(),
                            },
                        );
                        None
                    }
                }
            }
            FieldType::StringList => {
                let Value::Array(items) = raw else {
                    return self.mismatch(path, "array of strings", raw);
                };
                let before = self.issues.len();
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => list.push(s.clone()),
                        other => {
                            self.mismatch(&path.index(i), "string", other);
                        }
                    }
                }
                (self.issues.len() == before).then_some(ConfigValue::StringList(list))
            }
            FieldType::Object(schema) => {
                let Value::Object(map) = raw else {
                    return self.mismatch(path, "object", raw);
                };
                Some(ConfigValue::Object(self.object(schema, map, path)))
            }
            FieldType::ObjectList(schema) => {
                let Value::Array(items) = raw else {
                    return self.mismatch(path, "array of objects", raw);
                };
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = path.index(i);
                    match item {
                        Value::Object(map) => list.push(self.object(schema, map, &item_path)),
                        other => {
                            self.mismatch(&item_path, "object", other);
                        }
                    }
                }
                Some(ConfigValue::ObjectList(list))
            }
        }
    }

    fn mismatch(
        &mut self,
        path: &FieldPath,
        expected: &'static str,
        found: &Value,
    ) -> Option<ConfigValue> {
        self.issue(
            path.clone(),
            Problem::TypeMismatch {
                expected,
                found: json_type_name(found),
            },
        );
        None
    }

    fn check_range(&mut self, field: &FieldSpec, value: f64, path: &FieldPath) {
        if let Some(minimum) = field.minimum {
            if value < minimum {
                self.issue(path.clone(), Problem::BelowMinimum { minimum, found: value });
            }
        }
        if let Some(maximum) = field.maximum {
            if value > maximum {
                self.issue(path.clone(), Problem::AboveMaximum { maximum, found: value });
            }
        }
    }

    fn check_pattern(&mut self, field: &FieldSpec, value: &str, path: &FieldPath) {
        match field.pattern_regex() {
            None => {}
            Some(Ok(re)) if re.is_match(value) => {}
            Some(Ok(re)) => self.issue(
                path.clone(),
                Problem::PatternMismatch {
                    pattern: re.as_str().to_string(),
                },
            ),
            Some(Err(pattern)) => self.issue(
                path.clone(),
                Problem::InvalidPattern {
                    pattern: pattern.to_string(),
                },
            ),
        }
    }
}

fn to_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            let whole = f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64;
            whole.then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn to_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// JSON type name used in mismatch messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> BackendId {
        BackendId::new("example").unwrap()
    }

    fn schema() -> ConfigSchema {
        let size = ConfigSchema::new("Size")
            .field(FieldSpec::integer("width").required())
            .field(FieldSpec::integer("height").required());
        let zone = ConfigSchema::new("Zone")
            .field(FieldSpec::string("zone_id").required())
            .field(FieldSpec::object_list("sizes", size));

        ConfigSchema::connection("ExampleConnection")
            .field(FieldSpec::string("api_key").required().secret())
            .field(FieldSpec::integer("timeout").default_value(30).range(Some(1.0), Some(300.0)))
            .field(FieldSpec::number("fill_rate").range(Some(0.0), Some(1.0)))
            .field(FieldSpec::enumeration("mode", &["CPM", "FLAT_RATE"]))
            .field(FieldSpec::string_list("tags"))
            .field(FieldSpec::string("network_code").pattern(r"^\d+$"))
            .field(FieldSpec::object_list("zones", zone))
    }

    fn run(payload: Value, mode: ValidationMode) -> Result<Validated, ConfigValidationError> {
        let id = backend();
        let schema = schema();
        validate(&id, SchemaKind::Connection, &schema, &payload, mode)
    }

    fn run_fixture(
        payload: Value,
        mode: ValidationMode,
    ) -> Result<Validated, ConfigValidationError> {
        let id = backend();
        let schema = crate::test_support::fixture_schemas().connection;
        validate(&id, SchemaKind::Connection, &schema, &payload, mode)
    }

    #[test]
    fn test_nested_object_reports_inner_paths() {
        let err = run_fixture(
            json!({"api_key": "k", "proxy": {"password": "p", "extra": 1}}),
            ValidationMode::Strict,
        )
        .unwrap_err();

        let paths: Vec<String> = err.issues.iter().map(|i| i.path.to_string()).collect();
        assert_eq!(paths, vec!["proxy.user", "proxy.extra"]);
        assert_eq!(err.issues[0].problem, Problem::Missing);
        assert_eq!(err.issues[1].problem, Problem::UnknownField);
    }

    #[test]
    fn test_nested_object_converts_and_defaults() {
        let validated = run_fixture(
            json!({"api_key": "k", "proxy": {"user": "u", "password": "p", "extra": 1}}),
            ValidationMode::Lenient,
        )
        .unwrap();

        let proxy = validated.config.get_object("proxy").unwrap();
        assert_eq!(proxy.get("user"), Some(&ConfigValue::String("u".to_string())));
        assert_eq!(proxy.get("port"), Some(&ConfigValue::Integer(8080)));
        assert!(proxy.get("extra").is_none());
        assert_eq!(
            validated.warnings,
            vec![ValidationWarning::UnknownFieldDropped(
                FieldPath::root().key("proxy").key("extra")
            )]
        );

        let err = run_fixture(json!({"api_key": "k", "proxy": "host:3128"}), ValidationMode::Strict)
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path.to_string(), "proxy");
    }

    #[test]
    fn test_field_path_display() {
        assert_eq!(FieldPath::root().to_string(), "<root>");
        let path = FieldPath::root().key("zones").index(1).key("zone_id");
        assert_eq!(path.to_string(), "zones[1].zone_id");
    }

    #[test]
    fn test_mode_from_environment() {
        assert_eq!(
            ValidationMode::from_environment(Some("production")),
            ValidationMode::Lenient
        );
        assert_eq!(
            ValidationMode::from_environment(Some("staging")),
            ValidationMode::Strict
        );
        assert_eq!(ValidationMode::from_environment(None), ValidationMode::Strict);
        assert_eq!("LENIENT".parse::<ValidationMode>().unwrap(), ValidationMode::Lenient);
    }

    #[test]
    fn test_valid_payload_applies_defaults() {
        let validated = run(json!({"api_key": "k"}), ValidationMode::Strict).unwrap();
        let config = validated.config;
        assert_eq!(config.get_str("api_key"), Some("k"));
        assert_eq!(config.get_i64("timeout"), Some(30));
        assert_eq!(config.get_bool("manual_approval_required"), Some(false));
        assert!(config.get("fill_rate").is_none());
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn test_integer_coercion() {
        let config = run(json!({"api_key": "k", "timeout": " 45 "}), ValidationMode::Strict)
            .unwrap()
            .config;
        assert_eq!(config.get_i64("timeout"), Some(45));

        let config = run(json!({"api_key": "k", "timeout": 60.0}), ValidationMode::Strict)
            .unwrap()
            .config;
        assert_eq!(config.get_i64("timeout"), Some(60));

        let err = run(json!({"api_key": "k", "timeout": 1.5}), ValidationMode::Strict).unwrap_err();
        assert!(matches!(err.issues[0].problem, Problem::TypeMismatch { expected: "integer", .. }));
    }

    #[test]
    fn test_no_coercion_across_incompatible_types() {
        let err = run(json!({"api_key": {"nested": true}}), ValidationMode::Strict).unwrap_err();
        assert_eq!(
            err.issues[0].problem,
            Problem::TypeMismatch {
                expected: "string",
                found: "object"
            }
        );

        let err = run(json!({"api_key": 42}), ValidationMode::Strict).unwrap_err();
        assert_eq!(err.issues[0].path.to_string(), "api_key");
    }

    #[test]
    fn test_enum_is_case_insensitive_and_canonical() {
        let config = run(json!({"api_key": "k", "mode": "flat_rate"}), ValidationMode::Strict)
            .unwrap()
            .config;
        assert_eq!(config.get_str("mode"), Some("FLAT_RATE"));

        let err = run(json!({"api_key": "k", "mode": "CPC"}), ValidationMode::Strict).unwrap_err();
        assert!(matches!(
            &err.issues[0].problem,
            Problem::NotInEnum { found, .. } if found == "CPC"
        ));
    }

    #[test]
    fn test_null_is_absent() {
        let config = run(json!({"api_key": "k", "timeout": null}), ValidationMode::Strict)
            .unwrap()
            .config;
        assert_eq!(config.get_i64("timeout"), Some(30));

        let err = run(json!({"api_key": null}), ValidationMode::Strict).unwrap_err();
        assert_eq!(err.missing_fields()[0].to_string(), "api_key");
    }

    #[test]
    fn test_root_must_be_object() {
        let err = run(json!(["api_key"]), ValidationMode::Strict).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].path.is_root());
    }

    #[test]
    fn test_strict_reports_all_unknown_fields() {
        let err = run(
            json!({"api_key": "k", "zeta": 1, "alpha": 2}),
            ValidationMode::Strict,
        )
        .unwrap_err();
        let unknown: Vec<String> = err.unknown_fields().iter().map(|p| p.to_string()).collect();
        assert_eq!(unknown, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_lenient_drops_unknown_fields() {
        let validated = run(json!({"api_key": "k", "extra": 1}), ValidationMode::Lenient).unwrap();
        assert!(validated.config.get("extra").is_none());
        assert_eq!(
            validated.warnings,
            vec![ValidationWarning::UnknownFieldDropped(FieldPath::root().key("extra"))]
        );
    }

    #[test]
    fn test_collects_all_problems() {
        let err = run(
            json!({
                "timeout": 0,
                "fill_rate": 1.5,
                "tags": ["a", 3],
                "network_code": "abc"
            }),
            ValidationMode::Strict,
        )
        .unwrap_err();

        let rendered: Vec<String> = err.issues.iter().map(|i| i.to_string()).collect();
        assert_eq!(err.issues.len(), 5, "{:?}", rendered);
        assert!(rendered.iter().any(|r| r.starts_with("api_key: required")));
        assert!(rendered.iter().any(|r| r.starts_with("timeout: value 0 is below")));
        assert!(rendered.iter().any(|r| r.starts_with("fill_rate: value 1.5 is above")));
        assert!(rendered.iter().any(|r| r.starts_with("tags[1]: expected string")));
        assert!(rendered.iter().any(|r| r.starts_with("network_code: value does not match")));
    }

    #[test]
    fn test_nested_object_lists() {
        let err = run(
            json!({
                "api_key": "k",
                "zones": [
                    {"zone_id": "z1", "sizes": [{"width": 300, "height": 250}]},
                    {"sizes": [{"width": "wide", "height": 90}], "extra": true},
                    "not-an-object"
                ]
            }),
            ValidationMode::Strict,
        )
        .unwrap_err();

        let paths: Vec<String> = err.issues.iter().map(|i| i.path.to_string()).collect();
        assert_eq!(
            paths,
            vec!["zones[1].zone_id", "zones[1].sizes[0].width", "zones[1].extra", "zones[2]"]
        );
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let config = run(json!({"api_key": "k", "fill_rate": "0.25"}), ValidationMode::Strict)
            .unwrap()
            .config;
        assert_eq!(config.get_f64("fill_rate"), Some(0.25));

        let err = run(json!({"api_key": "k", "fill_rate": "NaN"}), ValidationMode::Strict)
            .unwrap_err();
        assert_eq!(err.issues.len(), 1);
    }

    #[test]
    fn test_error_message() {
        let err = run(json!({}), ValidationMode::Strict).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid connection configuration for `example` (1 problem(s))"
        );
    }
}
