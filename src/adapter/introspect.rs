//! Schema introspection - renders backend schemas for form surfaces.
//!
//! The document has exactly four top-level keys: `connection`, `product`,
//! `inventory` (JSON Schema objects with an `x-ui` extension per property)
//! and `capabilities` (a flat map). Output is deterministic: properties are
//! key-sorted and display order is carried separately in `x-field-order`.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::adapter::capabilities::BackendId;
use crate::adapter::registry::AdapterRegistration;
use crate::adapter::schema::{ConfigSchema, FieldSpec, SchemaKind};
use crate::util::hash;

/// Descriptor of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: &'static str,
    /// JSON Schema `type` keyword
    pub json_type: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub ui_order: u32,
    pub secret: bool,
    pub ui_component: String,
    pub enum_values: Option<Vec<String>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub pattern: Option<String>,
    /// Sub-schema for object and object-list fields
    pub nested: Option<SchemaDescription>,
}

/// Descriptor of one schema, fields in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescription {
    pub title: String,
    pub version: String,
    pub fields: Vec<FieldDescriptor>,
}

/// Full description of one backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendDescription {
    pub backend: BackendId,
    pub connection: SchemaDescription,
    pub product: SchemaDescription,
    pub inventory: SchemaDescription,
    pub capabilities: Map<String, Value>,
}

/// Describe a registered backend. Never validates data.
pub fn describe(registration: &AdapterRegistration) -> BackendDescription {
    let schemas = registration.schemas();
    BackendDescription {
        backend: registration.id().clone(),
        connection: describe_schema(schemas.schema(SchemaKind::Connection)),
        product: describe_schema(schemas.schema(SchemaKind::Product)),
        inventory: describe_schema(schemas.schema(SchemaKind::Inventory)),
        capabilities: registration.capabilities().to_flat_map(),
    }
}

/// Describe one schema.
pub fn describe_schema(schema: &ConfigSchema) -> SchemaDescription {
    SchemaDescription {
        title: schema.name.clone(),
        version: schema.version.to_string(),
        fields: schema
            .ordered_fields()
            .into_iter()
            .map(|(order, field)| describe_field(order, field))
            .collect(),
    }
}

fn describe_field(order: u32, field: &FieldSpec) -> FieldDescriptor {
    FieldDescriptor {
        name: field.name.clone(),
        field_type: field.field_type.name(),
        json_type: field.field_type.json_type(),
        required: field.is_required(),
        default: field.default.clone(),
        description: field.description.clone(),
        ui_order: order,
        secret: field.ui.secret,
        ui_component: field.effective_component().to_string(),
        enum_values: field.field_type.allowed_values().map(|v| v.to_vec()),
        minimum: field.minimum,
        maximum: field.maximum,
        pattern: field.pattern.clone(),
        nested: field.field_type.nested().map(describe_schema),
    }
}

impl BackendDescription {
    pub fn section(&self, kind: SchemaKind) -> &SchemaDescription {
        match kind {
            SchemaKind::Connection => &self.connection,
            SchemaKind::Product => &self.product,
            SchemaKind::Inventory => &self.inventory,
        }
    }

    /// Render the form-surface document.
    pub fn to_json(&self) -> Value {
        json!({
            "connection": self.connection.to_json(),
            "product": self.product.to_json(),
            "inventory": self.inventory.to_json(),
            "capabilities": Value::Object(self.capabilities.clone()),
        })
    }

    /// Pretty-printed document.
    pub fn to_json_string(&self) -> String {
        // Serializing a `Value` cannot fail.
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }

    /// SHA-256 hex digest of the document.
    pub fn fingerprint(&self) -> String {
        hash::fingerprint(self.to_json_string())
    }
}

impl SchemaDescription {
    /// Render as a JSON Schema object.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
            properties.insert(field.name.clone(), field.to_json());
        }

        let order: Vec<Value> = self
            .fields
            .iter()
            .map(|f| Value::String(f.name.clone()))
            .collect();

        json!({
            "type": "object",
            "title": self.title,
            "x-schema-version": self.version,
            "properties": properties,
            "required": required,
            "additionalProperties": false,
            "x-field-order": order,
        })
    }
}

impl FieldDescriptor {
    /// Render one property.
    pub fn to_json(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), json!(self.json_type));

        if let Some(description) = &self.description {
            property.insert("description".into(), json!(description));
        }
        if let Some(default) = &self.default {
            property.insert("default".into(), default.clone());
        }
        if let Some(values) = &self.enum_values {
            property.insert("enum".into(), json!(values));
        }
        if let Some(minimum) = self.minimum {
            property.insert("minimum".into(), self.bound(minimum));
        }
        if let Some(maximum) = self.maximum {
            property.insert("maximum".into(), self.bound(maximum));
        }
        if let Some(pattern) = &self.pattern {
            property.insert("pattern".into(), json!(pattern));
        }
        if self.secret {
            property.insert("writeOnly".into(), json!(true));
        }

        match (self.field_type, &self.nested) {
            ("string_list", _) => {
                property.insert("items".into(), json!({"type": "string"}));
            }
            ("object", Some(nested)) => {
                if let Value::Object(section) = nested.to_json() {
                    for key in ["properties", "required", "additionalProperties", "x-field-order"] {
                        if let Some(value) = section.get(key) {
                            property.insert(key.into(), value.clone());
                        }
                    }
                }
            }
            ("object_list", Some(nested)) => {
                property.insert("items".into(), nested.to_json());
            }
            _ => {}
        }

        let mut ui = Map::new();
        ui.insert("ui_order".into(), json!(self.ui_order));
        ui.insert("secret".into(), json!(self.secret));
        ui.insert("ui_component".into(), json!(self.ui_component));
        if let Some(values) = &self.enum_values {
            ui.insert("enum".into(), json!(values));
        }
        property.insert("x-ui".into(), Value::Object(ui));

        Value::Object(property)
    }

    fn bound(&self, value: f64) -> Value {
        if self.field_type == "integer" && value.fract() == 0.0 {
            json!(value as i64)
        } else {
            json!(value)
        }
    }
}
