//! Configuration schema types - the typed field contracts each backend declares.
//!
//! A backend declares three schemas (connection, product, inventory). Each is
//! a named, versioned list of fields. Schemas only describe structure; the
//! validator in `validation.rs` checks payloads against them and the
//! introspection service in `introspect.rs` renders them for form surfaces.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::adapter::validation::{FieldPath, Problem};

/// Which of the three configuration categories a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Credentials and tenant-level settings
    Connection,
    /// Per-product implementation settings
    Product,
    /// Inventory profile settings
    Inventory,
}

impl SchemaKind {
    /// All kinds, in document order.
    pub const ALL: [SchemaKind; 3] = [
        SchemaKind::Connection,
        SchemaKind::Product,
        SchemaKind::Inventory,
    ];

    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Connection => "connection",
            SchemaKind::Product => "product",
            SchemaKind::Inventory => "inventory",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SchemaKind {
    type Err = SchemaKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "connection" => Ok(SchemaKind::Connection),
            "product" => Ok(SchemaKind::Product),
            "inventory" => Ok(SchemaKind::Inventory),
            _ => Err(SchemaKindParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid schema kind.
#[derive(Debug, Clone)]
pub struct SchemaKindParseError(pub String);

impl std::fmt::Display for SchemaKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid schema kind '{}', valid values: connection, product, inventory",
            self.0
        )
    }
}

impl std::error::Error for SchemaKindParseError {}

/// Semantic type of a configuration field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    /// Floating point number
    Number,
    Boolean,
    /// String restricted to the listed values (matched case-insensitively)
    Enum(Vec<String>),
    StringList,
    /// Nested object validated against its own schema
    Object(Box<ConfigSchema>),
    /// List of nested objects
    ObjectList(Box<ConfigSchema>),
}

impl FieldType {
    /// Short name used in error messages and descriptors.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Enum(_) => "enum",
            FieldType::StringList => "string_list",
            FieldType::Object(_) => "object",
            FieldType::ObjectList(_) => "object_list",
        }
    }

    /// JSON Schema `type` keyword for this field.
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Enum(_) => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::StringList | FieldType::ObjectList(_) => "array",
            FieldType::Object(_) => "object",
        }
    }

    /// Default form widget for this type.
    pub fn default_component(&self, secret: bool) -> &'static str {
        match self {
            FieldType::String if secret => "password",
            FieldType::String => "text",
            FieldType::Integer | FieldType::Number => "number",
            FieldType::Boolean => "checkbox",
            FieldType::Enum(_) => "select",
            FieldType::StringList => "tags",
            FieldType::Object(_) => "fieldset",
            FieldType::ObjectList(_) => "repeater",
        }
    }

    /// Nested schema for object-shaped fields.
    pub fn nested(&self) -> Option<&ConfigSchema> {
        match self {
            FieldType::Object(schema) | FieldType::ObjectList(schema) => Some(schema),
            _ => None,
        }
    }

    /// Allowed values for enum fields.
    pub fn allowed_values(&self) -> Option<&[String]> {
        match self {
            FieldType::Enum(values) => Some(values),
            _ => None,
        }
    }
}

/// Form rendering hints attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiHints {
    /// Display position (lower first)
    pub order: Option<u32>,

    /// Value must be masked in forms and logs
    pub secret: bool,

    /// Preferred widget (e.g. "zone_selector", "textarea")
    pub component: Option<String>,
}

/// Compiled form of a field's `pattern`, built on first use and shared by
/// clones of the field. Holds `None` when the pattern does not compile.
#[derive(Debug, Clone, Default)]
struct PatternCache(Arc<OnceLock<Option<Regex>>>);

impl PatternCache {
    fn get(&self, pattern: &str) -> Option<&Regex> {
        self.0.get_or_init(|| Regex::new(pattern).ok()).as_ref()
    }
}

// Equality follows the pattern source held on the field.
impl PartialEq for PatternCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// One declared configuration field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub ui: UiHints,

    /// Inclusive lower bound for integer/number fields
    pub minimum: Option<f64>,

    /// Inclusive upper bound for integer/number fields
    pub maximum: Option<f64>,

    /// Regular expression a string value must match. Set it with
    /// [`FieldSpec::pattern`] so the compiled form stays in step.
    pub pattern: Option<String>,

    compiled_pattern: PatternCache,
}

impl FieldSpec {
    /// Create an optional field of the given type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldSpec {
            name: name.into(),
            field_type,
            required: false,
            default: None,
            description: None,
            ui: UiHints::default(),
            minimum: None,
            maximum: None,
            pattern: None,
            compiled_pattern: PatternCache::default(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn enumeration(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(
            name,
            FieldType::Enum(values.iter().map(|v| v.to_string()).collect()),
        )
    }

    pub fn string_list(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::StringList)
    }

    pub fn object(name: impl Into<String>, schema: ConfigSchema) -> Self {
        Self::new(name, FieldType::Object(Box::new(schema)))
    }

    pub fn object_list(name: impl Into<String>, schema: ConfigSchema) -> Self {
        Self::new(name, FieldType::ObjectList(Box::new(schema)))
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default used when the field is absent.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the human description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the display position.
    pub fn order(mut self, order: u32) -> Self {
        self.ui.order = Some(order);
        self
    }

    /// Mark the field as secret.
    pub fn secret(mut self) -> Self {
        self.ui.secret = true;
        self
    }

    /// Set the preferred widget.
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.ui.component = Some(component.into());
        self
    }

    /// Set inclusive numeric bounds.
    pub fn range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// Require string values to match a regular expression.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self.compiled_pattern = PatternCache::default();
        self
    }

    /// The compiled `pattern`, or `Err` with the source if it does not
    /// compile. Compiled once and reused by every later call and clone.
    pub(crate) fn pattern_regex(&self) -> Option<Result<&Regex, &str>> {
        let pattern = self.pattern.as_deref()?;
        Some(self.compiled_pattern.get(pattern).ok_or(pattern))
    }

    /// A field is effectively required only if it has no default.
    pub fn is_required(&self) -> bool {
        self.required && self.default.is_none()
    }

    /// Widget to render, falling back to the type's default.
    pub fn effective_component(&self) -> &str {
        self.ui
            .component
            .as_deref()
            .unwrap_or_else(|| self.field_type.default_component(self.ui.secret))
    }
}

/// A named, versioned set of configuration fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSchema {
    pub name: String,
    pub version: semver::Version,
    pub fields: Vec<FieldSpec>,
}

impl ConfigSchema {
    /// Create an empty schema at version 1.0.0.
    pub fn new(name: impl Into<String>) -> Self {
        ConfigSchema {
            name: name.into(),
            version: semver::Version::new(1, 0, 0),
            fields: Vec::new(),
        }
    }

    /// Connection schema pre-populated with the base connection fields.
    pub fn connection(name: impl Into<String>) -> Self {
        Self::new(name).field(
            FieldSpec::boolean("manual_approval_required")
                .default_value(false)
                .describe("Require human approval for operations like create_media_buy")
                .order(100),
        )
    }

    /// Set the schema version.
    pub fn version(mut self, major: u64, minor: u64, patch: u64) -> Self {
        self.version = semver::Version::new(major, minor, patch);
        self
    }

    /// Append a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check if a field is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Check if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in display order with their effective `ui_order`.
    ///
    /// A field without an explicit order takes its declaration position
    /// (1-based). Ties keep declaration order.
    pub fn ordered_fields(&self) -> Vec<(u32, &FieldSpec)> {
        let mut fields: Vec<(u32, usize, &FieldSpec)> = self
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let order = field.ui.order.unwrap_or(index as u32 + 1);
                (order, index, field)
            })
            .collect();
        fields.sort_by_key(|(order, index, _)| (*order, *index));
        fields.into_iter().map(|(order, _, f)| (order, f)).collect()
    }

    /// Check the schema is internally consistent: patterns compile, defaults
    /// satisfy their own field, and field names are unique.
    pub fn check_integrity(&self) -> Vec<(FieldPath, Problem)> {
        let mut problems = Vec::new();
        self.check_integrity_at(&FieldPath::root(), &mut problems);
        problems
    }

    fn check_integrity_at(&self, base: &FieldPath, problems: &mut Vec<(FieldPath, Problem)>) {
        for (index, field) in self.fields.iter().enumerate() {
            let path = base.key(&field.name);

            if self.fields[..index].iter().any(|f| f.name == field.name) {
                problems.push((path.clone(), Problem::DuplicateField));
            }

            if let Some(Err(pattern)) = field.pattern_regex() {
                problems.push((
                    path.clone(),
                    Problem::InvalidPattern {
                        pattern: pattern.to_string(),
                    },
                ));
            }

            if let Some(default) = &field.default {
                for issue in crate::adapter::validation::check_value(field, default, &path) {
                    problems.push((issue.path, issue.problem));
                }
            }

            if let Some(nested) = field.field_type.nested() {
                nested.check_integrity_at(&path, problems);
            }
        }
    }
}

/// The three schemas one backend declares.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDeclaration {
    pub connection: ConfigSchema,
    pub product: ConfigSchema,
    pub inventory: ConfigSchema,
}

impl SchemaDeclaration {
    /// Declare a connection schema; product and inventory start empty.
    pub fn new(connection: ConfigSchema) -> Self {
        SchemaDeclaration {
            connection,
            product: ConfigSchema::new("BaseProductConfig"),
            inventory: ConfigSchema::new("BaseInventoryConfig"),
        }
    }

    /// Set the product schema.
    pub fn with_product(mut self, product: ConfigSchema) -> Self {
        self.product = product;
        self
    }

    /// Set the inventory schema.
    pub fn with_inventory(mut self, inventory: ConfigSchema) -> Self {
        self.inventory = inventory;
        self
    }

    /// Get the schema for a kind.
    pub fn schema(&self, kind: SchemaKind) -> &ConfigSchema {
        match kind {
            SchemaKind::Connection => &self.connection,
            SchemaKind::Product => &self.product,
            SchemaKind::Inventory => &self.inventory,
        }
    }
}

/// A violation of the additive-only schema evolution rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvolutionIssue {
    #[error("schema version went backwards: {previous} -> {next}")]
    VersionRegressed {
        previous: semver::Version,
        next: semver::Version,
    },

    #[error("field `{path}` was removed without a major version bump")]
    FieldRemoved { path: String },

    #[error("field `{path}` changed type from {from} to {to} without a major version bump")]
    FieldRetyped {
        path: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("field `{path}` became required without a major version bump")]
    BecameRequired { path: String },

    #[error(
        "field `{path}` no longer allows {} without a major version bump",
        .removed.join(", ")
    )]
    EnumValuesRemoved { path: String, removed: Vec<String> },

    #[error("new field `{path}` is required and has no default")]
    NewFieldRequired { path: String },
}

/// Check that `next` is a backward-compatible evolution of `previous`.
///
/// Within one major version fields may only be added, and only as optional
/// or defaulted fields. A major version bump allows anything.
pub fn check_evolution(
    previous: &ConfigSchema,
    next: &ConfigSchema,
) -> Result<(), Vec<EvolutionIssue>> {
    if next.version < previous.version {
        return Err(vec![EvolutionIssue::VersionRegressed {
            previous: previous.version.clone(),
            next: next.version.clone(),
        }]);
    }

    if next.version.major > previous.version.major {
        return Ok(());
    }

    let mut issues = Vec::new();
    compare_fields(previous, next, &FieldPath::root(), &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn compare_fields(
    previous: &ConfigSchema,
    next: &ConfigSchema,
    base: &FieldPath,
    issues: &mut Vec<EvolutionIssue>,
) {
    for old in &previous.fields {
        let path = base.key(&old.name);
        let Some(new) = next.get(&old.name) else {
            issues.push(EvolutionIssue::FieldRemoved {
                path: path.to_string(),
            });
            continue;
        };

        if old.field_type.name() != new.field_type.name() {
            issues.push(EvolutionIssue::FieldRetyped {
                path: path.to_string(),
                from: old.field_type.name(),
                to: new.field_type.name(),
            });
            continue;
        }

        if new.is_required() && !old.is_required() {
            issues.push(EvolutionIssue::BecameRequired {
                path: path.to_string(),
            });
        }

        if let (Some(old_values), Some(new_values)) =
            (old.field_type.allowed_values(), new.field_type.allowed_values())
        {
            // Enum matching is case-insensitive, so a respelled value is kept.
            let removed: Vec<String> = old_values
                .iter()
                .filter(|value| !new_values.iter().any(|v| v.eq_ignore_ascii_case(value)))
                .cloned()
                .collect();
            if !removed.is_empty() {
                issues.push(EvolutionIssue::EnumValuesRemoved {
                    path: path.to_string(),
                    removed,
                });
            }
        }

        if let (Some(old_nested), Some(new_nested)) =
            (old.field_type.nested(), new.field_type.nested())
        {
            compare_fields(old_nested, new_nested, &path, issues);
        }
    }

    for new in &next.fields {
        if !previous.contains(&new.name) && new.is_required() {
            issues.push(EvolutionIssue::NewFieldRequired {
                path: base.key(&new.name).to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_schema() -> ConfigSchema {
        ConfigSchema::new("Example")
            .field(FieldSpec::string("api_key").required().secret())
            .field(FieldSpec::integer("limit").default_value(10))
    }

    #[test]
    fn test_schema_kind_parse() {
        assert_eq!("product".parse::<SchemaKind>().unwrap(), SchemaKind::Product);
        assert_eq!(
            "CONNECTION".parse::<SchemaKind>().unwrap(),
            SchemaKind::Connection
        );
        assert!("creative".parse::<SchemaKind>().is_err());
    }

    #[test]
    fn test_connection_schema_has_base_fields() {
        let schema = ConfigSchema::connection("Conn");
        let field = schema.get("manual_approval_required").unwrap();
        assert_eq!(field.default, Some(json!(false)));
        assert!(!field.is_required());
    }

    #[test]
    fn test_required_with_default_is_not_required() {
        let field = FieldSpec::string("name").required().default_value("x");
        assert!(!field.is_required());
        assert!(FieldSpec::string("name").required().is_required());
    }

    #[test]
    fn test_ordered_fields() {
        let schema = ConfigSchema::new("Ordered")
            .field(FieldSpec::string("c"))
            .field(FieldSpec::string("a").order(1))
            .field(FieldSpec::string("b").order(1));

        let names: Vec<&str> = schema
            .ordered_fields()
            .into_iter()
            .map(|(_, f)| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_effective_component() {
        assert_eq!(
            FieldSpec::string("token").secret().effective_component(),
            "password"
        );
        assert_eq!(
            FieldSpec::string_list("zones")
                .component("zone_selector")
                .effective_component(),
            "zone_selector"
        );
    }

    #[test]
    fn test_integrity_catches_bad_pattern_and_default() {
        let schema = ConfigSchema::new("Broken")
            .field(FieldSpec::string("code").pattern("(unclosed"))
            .field(FieldSpec::integer("count").default_value("many"))
            .field(FieldSpec::string("code"));

        let problems = schema.check_integrity();
        assert_eq!(problems.len(), 3);
        assert!(problems
            .iter()
            .any(|(_, p)| matches!(p, Problem::InvalidPattern { .. })));
        assert!(problems
            .iter()
            .any(|(_, p)| matches!(p, Problem::DuplicateField)));
    }

    #[test]
    fn test_pattern_compiled_once_and_shared() {
        let field = FieldSpec::string("network_code").pattern(r"^\d+$");
        let first = field.pattern_regex().unwrap().unwrap();
        let again = field.pattern_regex().unwrap().unwrap();
        assert!(std::ptr::eq(first, again));

        let copy = field.clone();
        assert!(std::ptr::eq(first, copy.pattern_regex().unwrap().unwrap()));
        assert_eq!(copy, field);

        let repatterned = copy.pattern("^[A-Z]+$");
        assert!(repatterned.pattern_regex().unwrap().unwrap().is_match("ABC"));
        assert!(field.pattern_regex().unwrap().unwrap().is_match("123"));

        let broken = FieldSpec::string("code").pattern("(unclosed");
        assert!(matches!(broken.pattern_regex(), Some(Err("(unclosed"))));
        assert!(FieldSpec::string("code").pattern_regex().is_none());
    }

    #[test]
    fn test_evolution_additive_ok() {
        let next = base_schema()
            .version(1, 1, 0)
            .field(FieldSpec::boolean("verbose").default_value(false))
            .field(FieldSpec::string("label"));

        assert!(check_evolution(&base_schema(), &next).is_ok());
    }

    #[test]
    fn test_evolution_removal_and_retype_rejected() {
        let mut next = ConfigSchema::new("Example")
            .version(1, 1, 0)
            .field(FieldSpec::integer("api_key").required());
        next = next.field(FieldSpec::string("region").required());

        let issues = check_evolution(&base_schema(), &next).unwrap_err();
        assert_eq!(issues.len(), 3);
        assert!(issues
            .iter()
            .any(|i| matches!(i, EvolutionIssue::FieldRetyped { path, .. } if path == "api_key")));
        assert!(issues
            .iter()
            .any(|i| matches!(i, EvolutionIssue::FieldRemoved { path } if path == "limit")));
        assert!(issues
            .iter()
            .any(|i| matches!(i, EvolutionIssue::NewFieldRequired { path } if path == "region")));
    }

    #[test]
    fn test_evolution_enum_narrowing_rejected() {
        let previous = ConfigSchema::new("Delivery")
            .field(FieldSpec::enumeration("pacing", &["EVEN", "ASAP", "FRONTLOADED"]));

        let widened = ConfigSchema::new("Delivery").version(1, 1, 0).field(
            FieldSpec::enumeration("pacing", &["even", "ASAP", "FRONTLOADED", "DAILY"]),
        );
        assert!(check_evolution(&previous, &widened).is_ok());

        let narrowed = ConfigSchema::new("Delivery")
            .version(1, 1, 0)
            .field(FieldSpec::enumeration("pacing", &["EVEN"]));
        let issues = check_evolution(&previous, &narrowed).unwrap_err();
        assert_eq!(
            issues,
            vec![EvolutionIssue::EnumValuesRemoved {
                path: "pacing".to_string(),
                removed: vec!["ASAP".to_string(), "FRONTLOADED".to_string()],
            }]
        );
        assert_eq!(
            issues[0].to_string(),
            "field `pacing` no longer allows ASAP, FRONTLOADED without a major version bump"
        );

        assert!(check_evolution(&previous, &narrowed.version(2, 0, 0)).is_ok());
    }

    #[test]
    fn test_evolution_major_bump_allows_breaking_change() {
        let next = ConfigSchema::new("Example").version(2, 0, 0);
        assert!(check_evolution(&base_schema(), &next).is_ok());
    }

    #[test]
    fn test_evolution_version_regression() {
        let previous = base_schema().version(1, 2, 0);
        let next = base_schema().version(1, 1, 0);
        let issues = check_evolution(&previous, &next).unwrap_err();
        assert!(matches!(issues[0], EvolutionIssue::VersionRegressed { .. }));
    }

    #[test]
    fn test_evolution_nested_fields() {
        let size = ConfigSchema::new("Size").field(FieldSpec::integer("width").required());
        let previous = ConfigSchema::new("P").field(FieldSpec::object_list("sizes", size));
        let next = ConfigSchema::new("P").version(1, 0, 1).field(FieldSpec::object_list(
            "sizes",
            ConfigSchema::new("Size").field(FieldSpec::string("width").required()),
        ));

        let issues = check_evolution(&previous, &next).unwrap_err();
        assert_eq!(
            issues,
            vec![EvolutionIssue::FieldRetyped {
                path: "sizes.width".to_string(),
                from: "integer",
                to: "string",
            }]
        );
    }
}
