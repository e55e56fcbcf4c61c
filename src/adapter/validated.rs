//! Typed configuration produced by the validator.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::adapter::capabilities::BackendId;
use crate::adapter::schema::{ConfigSchema, FieldType, SchemaKind};
use crate::adapter::validation::FieldPath;

/// Placeholder written in place of secret values.
pub const REDACTED: &str = "********";

/// A converted configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    StringList(Vec<String>),
    Object(ConfigObject),
    ObjectList(Vec<ConfigObject>),
}

/// Field values of one (possibly nested) object, keyed by field name.
pub type ConfigObject = BTreeMap<String, ConfigValue>;

impl ConfigValue {
    /// Convert back into a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Integer(n) => Value::from(*n),
            ConfigValue::Number(n) => Value::from(*n),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::StringList(list) => {
                Value::Array(list.iter().cloned().map(Value::String).collect())
            }
            ConfigValue::Object(object) => Value::Object(object_to_json(object)),
            ConfigValue::ObjectList(list) => Value::Array(
                list.iter()
                    .map(|object| Value::Object(object_to_json(object)))
                    .collect(),
            ),
        }
    }
}

fn object_to_json(object: &ConfigObject) -> Map<String, Value> {
    object
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

/// Configuration that passed validation against a backend schema.
///
/// Immutable once built; only the validator constructs it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    backend: BackendId,
    kind: SchemaKind,
    schema_name: String,
    schema_version: semver::Version,
    values: ConfigObject,
    secret_paths: Vec<FieldPath>,
}

impl ValidatedConfig {
    pub(crate) fn new(
        backend: BackendId,
        kind: SchemaKind,
        schema: &ConfigSchema,
        values: ConfigObject,
    ) -> Self {
        let mut secret_paths = Vec::new();
        collect_secrets(schema, &values, &FieldPath::root(), &mut secret_paths);

        ValidatedConfig {
            backend,
            kind,
            schema_name: schema.name.clone(),
            schema_version: schema.version.clone(),
            values,
            secret_paths,
        }
    }

    pub fn backend(&self) -> &BackendId {
        &self.backend
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn schema_version(&self) -> &semver::Version {
        &self.schema_version
    }

    /// All top-level values.
    pub fn values(&self) -> &ConfigObject {
        &self.values
    }

    /// Paths of values marked secret by the schema.
    pub fn secret_paths(&self) -> &[FieldPath] {
        &self.secret_paths
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ConfigValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value; integer fields are widened.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ConfigValue::Number(n) => Some(*n),
            ConfigValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_string_list(&self, name: &str) -> Option<&[String]> {
        match self.get(name)? {
            ConfigValue::StringList(list) => Some(list),
            _ => None,
        }
    }

    pub fn get_object(&self, name: &str) -> Option<&ConfigObject> {
        match self.get(name)? {
            ConfigValue::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Whether operations on this connection need human approval.
    pub fn manual_approval_required(&self) -> bool {
        self.get_bool("manual_approval_required").unwrap_or(false)
    }

    /// Render as JSON for persistence.
    pub fn to_json(&self) -> Value {
        Value::Object(object_to_json(&self.values))
    }

    /// Render as JSON with secret values replaced by [`REDACTED`].
    pub fn to_json_redacted(&self) -> Value {
        let mut json = self.to_json();
        for path in &self.secret_paths {
            if let Some(slot) = lookup_mut(&mut json, path) {
                *slot = Value::String(REDACTED.to_string());
            }
        }
        json
    }
}

fn collect_secrets(
    schema: &ConfigSchema,
    values: &ConfigObject,
    base: &FieldPath,
    out: &mut Vec<FieldPath>,
) {
    for field in &schema.fields {
        let Some(value) = values.get(&field.name) else {
            continue;
        };
        let path = base.key(&field.name);

        if field.ui.secret {
            out.push(path);
            continue;
        }

        match (&field.field_type, value) {
            (FieldType::Object(nested), ConfigValue::Object(object)) => {
                collect_secrets(nested, object, &path, out)
            }
            (FieldType::ObjectList(nested), ConfigValue::ObjectList(list)) => {
                for (i, object) in list.iter().enumerate() {
                    collect_secrets(nested, object, &path.index(i), out);
                }
            }
            _ => {}
        }
    }
}

fn lookup_mut<'v>(value: &'v mut Value, path: &FieldPath) -> Option<&'v mut Value> {
    use crate::adapter::validation::PathSegment;

    let mut current = value;
    for segment in path.segments() {
        current = match segment {
            PathSegment::Key(key) => current.get_mut(key.as_str())?,
            PathSegment::Index(index) => current.get_mut(*index)?,
        };
    }
    Some(current)
}
