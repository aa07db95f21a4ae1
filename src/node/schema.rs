//! Attribute list of [`Node`] for consumers that map records by field name.

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;

use super::Node;

/// Primitive type of a [`Node`] attribute as seen by data-mapping consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Number,
    Date,
    String,
    Boolean,
}

impl AttrType {
    /// Whether `value` is acceptable for an attribute of this type.
    /// `null` stands for an absent value and is always accepted.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (AttrType::Number, Value::Number(_)) => true,
            (AttrType::Date, Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
            (AttrType::String, Value::String(_)) => true,
            (AttrType::Boolean, Value::Bool(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttrType,
}

const fn attr(name: &'static str, ty: AttrType) -> Attribute {
    Attribute { name, ty }
}

impl Node {
    /// Declared attributes, in declaration order. `id` is the record
    /// identity and not an attribute.
    pub const ATTRIBUTES: [Attribute; 10] = [
        attr("kind", AttrType::Number),
        attr("updated_at", AttrType::Date),
        attr("name", AttrType::String),
        attr("domoticz_idx", AttrType::String),
        attr("temperature", AttrType::Number),
        attr("humidity", AttrType::Number),
        attr("light", AttrType::Number),
        attr("motion", AttrType::Boolean),
        attr("low_battery", AttrType::Boolean),
        attr("vcc", AttrType::Number),
    ];

    pub fn attribute(name: &str) -> Option<Attribute> {
        Self::ATTRIBUTES.iter().find(|a| a.name == name).copied()
    }

    /// Checks a JSON record against [`Node::ATTRIBUTES`]: every declared
    /// attribute that is present must have its declared type. Keys that are
    /// not attributes are ignored.
    pub fn conforms(record: &Value) -> bool {
        let Some(fields) = record.as_object() else {
            return false;
        };

        Self::ATTRIBUTES.iter().all(|attr| {
            fields
                .get(attr.name)
                .map_or(true, |value| attr.ty.accepts(value))
        })
    }
}
