//! Attribute and event schemas.
//!
//! A [`Schema`] validates and normalizes a [`Value`]. Every schema carries an
//! explicit [`AttrKind`] decided when it is built, which tells the attribute
//! decoder whether a DOM string is taken literally (`String`, `Enum`) or
//! decoded as JSON first (`Structured`).
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::schema::{Schema, SchemaMap};
//!
//! let attrs = SchemaMap::new()
//!     .with("value", Schema::string())
//!     .with("trimsize", Schema::number().optional());
//!
//! assert!(attrs.get("trimsize").unwrap().safe_parse(&6.into()).is_ok());
//! ```

pub mod marshal;

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::decimal::Decimal;
use crate::value::Value;

pub use marshal::{DecimalUnit, MarshalUnit, Marshaller, default_marshaller, encode_attr, process_attr};

// =============================================================================
// Errors
// =============================================================================

/// Validation failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("expected {expected}, received {received}")]
    Expected {
        expected: String,
        received: &'static str,
    },

    #[error("expected one of [{}], received `{received}`", .allowed.join(", "))]
    InvalidEnum { allowed: Vec<String>, received: String },

    #[error("at `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("at [{index}]: {source}")]
    Index {
        index: usize,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("value matches none of the union members")]
    NoUnionMatch,

    #[error("{0}")]
    Custom(String),
}

// =============================================================================
// Attribute Kind
// =============================================================================

/// How a DOM attribute string is decoded before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    /// Literal string, no decoding.
    String,
    /// Literal string checked against a fixed set.
    Enum,
    /// JSON text, unmarshalled into rich values.
    Structured,
}

impl AttrKind {
    /// Whether attribute strings bypass JSON decoding.
    pub fn is_literal(self) -> bool {
        matches!(self, AttrKind::String | AttrKind::Enum)
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Custom validator: returns the normalized value or a message.
pub type CustomCheck = Rc<dyn Fn(&Value) -> Result<Value, String>>;

#[derive(Clone)]
enum SchemaType {
    Any,
    String,
    Number,
    Boolean,
    Enum(Vec<String>),
    Decimal,
    Node,
    Array(Box<Schema>),
    Object(Vec<(String, Schema)>),
    Union(Vec<Schema>),
    Custom { name: String, check: CustomCheck },
}

/// Validation rule for one attribute or event payload.
///
/// Schemas are immutable once built; builder methods return new schemas.
#[derive(Clone)]
pub struct Schema {
    ty: SchemaType,
    kind: AttrKind,
    optional: bool,
}

impl Schema {
    fn of(ty: SchemaType, kind: AttrKind) -> Self {
        Self {
            ty,
            kind,
            optional: false,
        }
    }

    /// Accepts anything, including `undefined`.
    pub fn any() -> Self {
        Self::of(SchemaType::Any, AttrKind::Structured)
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String, AttrKind::String)
    }

    /// Finite numbers.
    pub fn number() -> Self {
        Self::of(SchemaType::Number, AttrKind::Structured)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean, AttrKind::Structured)
    }

    /// One of a fixed set of strings.
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(
            SchemaType::Enum(variants.into_iter().map(Into::into).collect()),
            AttrKind::Enum,
        )
    }

    pub fn decimal() -> Self {
        Self::of(SchemaType::Decimal, AttrKind::Structured)
    }

    /// Reference to a host node.
    pub fn node() -> Self {
        Self::of(SchemaType::Node, AttrKind::Structured)
    }

    pub fn array(items: Schema) -> Self {
        Self::of(SchemaType::Array(Box::new(items)), AttrKind::Structured)
    }

    /// Object with the given fields. Unknown fields pass through untouched.
    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        Self::of(
            SchemaType::Object(fields.into_iter().map(|(k, s)| (k.into(), s)).collect()),
            AttrKind::Structured,
        )
    }

    /// First member that accepts the value wins.
    pub fn union(members: Vec<Schema>) -> Self {
        Self::of(SchemaType::Union(members), AttrKind::Structured)
    }

    /// Arbitrary check, for host objects the runtime knows nothing about.
    pub fn custom(name: impl Into<String>, check: impl Fn(&Value) -> Result<Value, String> + 'static) -> Self {
        Self::of(
            SchemaType::Custom {
                name: name.into(),
                check: Rc::new(check),
            },
            AttrKind::Structured,
        )
    }

    /// Also accept `undefined`. The attribute kind is that of the inner schema.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Decoding rule for DOM attribute strings.
    pub fn kind(&self) -> AttrKind {
        self.kind
    }

    /// Validate `value`, returning the normalized value.
    pub fn safe_parse(&self, value: &Value) -> Result<Value, SchemaError> {
        if value.is_undefined() && (self.optional || matches!(self.ty, SchemaType::Any)) {
            return Ok(Value::Undefined);
        }

        match &self.ty {
            SchemaType::Any => Ok(value.clone()),
            SchemaType::String => match value {
                Value::String(_) => Ok(value.clone()),
                other => Err(expected("string", other)),
            },
            SchemaType::Number => match value {
                Value::Number(n) if n.is_finite() => Ok(value.clone()),
                other => Err(expected("finite number", other)),
            },
            SchemaType::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                other => Err(expected("boolean", other)),
            },
            SchemaType::Enum(allowed) => match value {
                Value::String(s) if allowed.iter().any(|a| a == s) => Ok(value.clone()),
                Value::String(s) => Err(SchemaError::InvalidEnum {
                    allowed: allowed.clone(),
                    received: s.clone(),
                }),
                other => Err(expected("enum string", other)),
            },
            SchemaType::Decimal => match value {
                Value::Decimal(_) => Ok(value.clone()),
                other => Err(expected("decimal", other)),
            },
            SchemaType::Node => match value {
                Value::Node(_) => Ok(value.clone()),
                other => Err(expected("node", other)),
            },
            SchemaType::Array(items) => {
                let Value::Array(values) = value else {
                    return Err(expected("array", value));
                };
                values
                    .iter()
                    .enumerate()
                    .map(|(index, v)| {
                        items.safe_parse(v).map_err(|e| SchemaError::Index {
                            index,
                            source: Box::new(e),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            SchemaType::Object(fields) => {
                let Value::Object(map) = value else {
                    return Err(expected("object", value));
                };
                let mut out = map.clone();
                for (field, schema) in fields {
                    let current = map.get(field).cloned().unwrap_or_default();
                    let parsed = schema.safe_parse(&current).map_err(|e| SchemaError::Field {
                        field: field.clone(),
                        source: Box::new(e),
                    })?;
                    if parsed.is_undefined() {
                        out.remove(field);
                    } else {
                        out.insert(field.clone(), parsed);
                    }
                }
                Ok(Value::Object(out))
            }
            SchemaType::Union(members) => members
                .iter()
                .find_map(|m| m.safe_parse(value).ok())
                .ok_or(SchemaError::NoUnionMatch),
            SchemaType::Custom { check, .. } => check(value).map_err(SchemaError::Custom),
        }
    }
}

fn expected(what: &str, received: &Value) -> SchemaError {
    SchemaError::Expected {
        expected: what.to_string(),
        received: received.type_name(),
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match &self.ty {
            SchemaType::Any => "any".to_string(),
            SchemaType::String => "string".to_string(),
            SchemaType::Number => "number".to_string(),
            SchemaType::Boolean => "boolean".to_string(),
            SchemaType::Enum(v) => format!("enum({})", v.join("|")),
            SchemaType::Decimal => "decimal".to_string(),
            SchemaType::Node => "node".to_string(),
            SchemaType::Array(items) => format!("array({items:?})"),
            SchemaType::Object(fields) => format!("object({} fields)", fields.len()),
            SchemaType::Union(members) => format!("union({} members)", members.len()),
            SchemaType::Custom { name, .. } => format!("custom({name})"),
        };
        if self.optional {
            write!(f, "optional({name})")
        } else {
            f.write_str(&name)
        }
    }
}

/// Convenience: decimal, number or numeric string, normalized to [`Decimal`].
///
/// Strings and numbers that do not parse are rejected.
pub fn decimal_like() -> Schema {
    Schema::custom("decimal-like", |value| match value {
        Value::Decimal(_) => Ok(value.clone()),
        Value::Number(n) => Decimal::from_f64(*n)
            .map(Value::Decimal)
            .map_err(|e| e.to_string()),
        Value::String(s) => Decimal::parse(s).map(Value::Decimal).map_err(|e| e.to_string()),
        other => Err(format!("expected decimal, number or string, received {}", other.type_name())),
    })
}

// =============================================================================
// Schema Map
// =============================================================================

/// Ordered mapping from attribute (or event) name to schema.
#[derive(Clone, Debug, Default)]
pub struct SchemaMap {
    entries: Vec<(String, Schema)>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an entry.
    pub fn with(mut self, name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = schema,
            None => self.entries.push((name, schema)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_fixed_at_build_time() {
        assert_eq!(Schema::string().kind(), AttrKind::String);
        assert_eq!(Schema::string().optional().kind(), AttrKind::String);
        assert_eq!(Schema::enumeration(["a", "b"]).optional().kind(), AttrKind::Enum);
        assert_eq!(Schema::number().kind(), AttrKind::Structured);
        assert_eq!(Schema::union(vec![Schema::string()]).kind(), AttrKind::Structured);
    }

    #[test]
    fn test_optional_accepts_undefined_only() {
        let schema = Schema::number().optional();
        assert_eq!(schema.safe_parse(&Value::Undefined), Ok(Value::Undefined));
        assert!(schema.safe_parse(&Value::Null).is_err());
        assert!(Schema::number().safe_parse(&Value::Undefined).is_err());
    }

    #[test]
    fn test_number_rejects_non_finite() {
        assert!(Schema::number().safe_parse(&Value::Number(f64::NAN)).is_err());
        assert!(Schema::number().safe_parse(&Value::Number(6.0)).is_ok());
    }

    #[test]
    fn test_enum() {
        let schema = Schema::enumeration(["xxs", "md"]);
        assert!(schema.safe_parse(&"md".into()).is_ok());
        let err = schema.safe_parse(&"lg".into()).unwrap_err();
        assert_eq!(err.to_string(), "expected one of [xxs, md], received `lg`");
    }

    #[test]
    fn test_array_reports_index() {
        let schema = Schema::array(Schema::number());
        let value = Value::Array(vec![1.into(), "two".into()]);
        match schema.safe_parse(&value) {
            Err(SchemaError::Index { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_object_checks_fields_and_passes_unknown() {
        let schema = Schema::object([("name", Schema::string()), ("chain", Schema::string().optional())]);
        let value = Value::object([("name", "neutron".into()), ("extra", 1.into())]);
        let parsed = schema.safe_parse(&value).unwrap();
        assert_eq!(parsed.field("extra"), Value::from(1));

        let missing = Value::object([("chain", Value::from("x"))]);
        assert!(matches!(
            schema.safe_parse(&missing),
            Err(SchemaError::Field { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn test_union_first_match() {
        let schema = Schema::union(vec![Schema::decimal(), Schema::number(), Schema::string()]);
        assert!(schema.safe_parse(&"12".into()).is_ok());
        assert_eq!(schema.safe_parse(&Value::Bool(true)), Err(SchemaError::NoUnionMatch));
    }

    #[test]
    fn test_decimal_like_normalizes() {
        let schema = decimal_like();
        assert_eq!(
            schema.safe_parse(&"1.25".into()).unwrap(),
            Value::Decimal(Decimal::new(125, 2))
        );
        assert!(schema.safe_parse(&"abc".into()).is_err());
    }

    #[test]
    fn test_schema_map_preserves_order() {
        let map = SchemaMap::new()
            .with("b", Schema::string())
            .with("a", Schema::number())
            .with("b", Schema::boolean());
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b").unwrap().kind(), AttrKind::Structured);
    }
}
