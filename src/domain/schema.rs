//! Host-side schema model: attribute declarations and the per-instance
//! attribute bag handlers read from and write to.

use crate::utils::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const ID_ATTRIBUTE: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Int,
    String,
    Bool,
}

impl AttributeType {
    /// null 視為未設定，任何型別皆接受
    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (AttributeType::Int, v) => v.as_i64().is_some(),
            (AttributeType::String, v) => v.is_string(),
            (AttributeType::Bool, v) => v.is_boolean(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AttributeType::Int => "int",
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Zero values count as "not set", the same way the host SDK treats them.
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: AttributeType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_new: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attribute {
    fn base(ty: AttributeType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            force_new: false,
            conflicts_with: Vec::new(),
            description: None,
        }
    }

    pub fn required(ty: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::base(ty)
        }
    }

    pub fn optional(ty: AttributeType) -> Self {
        Self {
            optional: true,
            ..Self::base(ty)
        }
    }

    pub fn computed(ty: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::base(ty)
        }
    }

    pub fn conflicts_with(mut self, others: &[&str]) -> Self {
        self.conflicts_with = others.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Check a configuration block before any handler sees it.
    pub fn validate_config(&self, config: &Map<String, Value>) -> Result<()> {
        for (name, value) in config {
            if name == ID_ATTRIBUTE {
                if !value.is_null() && !value.is_string() {
                    return Err(schema_error(name, "expected string"));
                }
                continue;
            }

            let attribute = self
                .attribute(name)
                .ok_or_else(|| schema_error(name, "unsupported attribute"))?;

            if !attribute.ty.accepts(value) {
                return Err(schema_error(
                    name,
                    &format!(
                        "expected {}, got {}",
                        attribute.ty.name(),
                        json_type_name(value)
                    ),
                ));
            }

            if attribute.is_computed_only() && !value.is_null() {
                return Err(schema_error(name, "attribute is computed and cannot be set"));
            }
        }

        for (name, attribute) in &self.attributes {
            let value = config.get(name).filter(|v| !v.is_null());

            if attribute.required && value.is_none() {
                return Err(schema_error(name, "required attribute is missing"));
            }

            let Some(value) = value else { continue };
            if is_zero_value(value) {
                continue;
            }

            for other in &attribute.conflicts_with {
                let other_set = config.get(other).is_some_and(|v| !is_zero_value(v));
                if other_set {
                    return Err(schema_error(name, &format!("conflicts with {}", other)));
                }
            }
        }

        Ok(())
    }
}

fn schema_error(attribute: &str, message: &str) -> ProviderError {
    ProviderError::SchemaError {
        attribute: attribute.to_string(),
        message: message.to_string(),
    }
}

/// Attribute values of a single data source or resource instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    values: Map<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a configuration block, validating it against `schema`.
    pub fn from_config(schema: &Schema, config: &Value) -> Result<Self> {
        let config = as_object(config)?;
        schema.validate_config(&config)?;
        Self::from_object(config)
    }

    /// Build from previously stored state. State is trusted, so only its shape is checked.
    pub fn from_state(state: &Value) -> Result<Self> {
        Self::from_object(as_object(state)?)
    }

    fn from_object(mut values: Map<String, Value>) -> Result<Self> {
        let id = match values.remove(ID_ATTRIBUTE) {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) if id.is_empty() => None,
            Some(Value::String(id)) => Some(id),
            Some(_) => return Err(schema_error(ID_ATTRIBUTE, "expected string")),
        };
        Ok(Self { id, values })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !is_zero_value(v))
    }

    pub fn get_int_ok(&self, key: &str) -> Option<i64> {
        self.get_ok(key).and_then(Value::as_i64)
    }

    pub fn get_str_ok(&self, key: &str) -> Option<&str> {
        self.get_ok(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.get_int_ok(key).unwrap_or(0)
    }

    pub fn get_str(&self, key: &str) -> &str {
        self.get_str_ok(key).unwrap_or("")
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Numeric form of the ID. Harbor IDs are always integers.
    pub fn numeric_id(&self) -> Result<i64> {
        let id = self.id().ok_or_else(|| ProviderError::InvalidInputError {
            message: "resource has no ID".to_string(),
        })?;
        id.parse().map_err(|_| ProviderError::InvalidInputError {
            message: format!("invalid ID {:?}: expected a numeric Harbor ID", id),
        })
    }

    /// Render every schema attribute (null where unset) plus `id`.
    pub fn into_state(mut self, schema: &Schema) -> Value {
        let mut state = Map::new();
        for name in schema.attributes.keys() {
            let value = self.values.remove(name).unwrap_or(Value::Null);
            state.insert(name.clone(), value);
        }
        state.insert(
            ID_ATTRIBUTE.to_string(),
            self.id.map(Value::String).unwrap_or(Value::Null),
        );
        Value::Object(state)
    }
}

fn as_object(value: &Value) -> Result<Map<String, Value>> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        other => Err(ProviderError::InvalidInputError {
            message: format!("expected an object, got {}", json_type_name(other)),
        }),
    }
}
