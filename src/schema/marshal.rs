//! Attribute marshalling.
//!
//! DOM attributes are strings. Literal schemas (`String`, `Enum`) take them
//! as-is; every other schema expects JSON text, which a [`Marshaller`] turns
//! into a [`Value`]. Marshal units restore rich types the JSON model lacks,
//! such as decimals, from tagged objects:
//!
//! ```text
//! {"$decimal": "1.500"}   →  Value::Decimal(1.500)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cosmos_elements::schema::{Schema, default_marshaller, process_attr};
//!
//! let m = default_marshaller();
//! let v = process_attr(&Schema::decimal(), Some(r#"{"$decimal":"2.5"}"#), &m)?;
//! assert_eq!(v.as_decimal().unwrap().to_string(), "2.5");
//! ```

use std::rc::Rc;

use serde_json::Value as Json;

use super::Schema;
use crate::decimal::Decimal;
use crate::error::CoerceError;
use crate::value::Value;

// =============================================================================
// Marshal Units
// =============================================================================

/// Converts one rich value type to and from JSON.
pub trait MarshalUnit {
    /// JSON for `value` if this unit handles it.
    fn marshal(&self, value: &Value) -> Option<Json>;

    /// Rich value for `json` if this unit recognizes it.
    fn unmarshal(&self, json: &Json) -> Option<Value>;
}

/// Tag key used by [`DecimalUnit`].
pub const DECIMAL_TAG: &str = "$decimal";

/// Decimals as `{"$decimal": "<plain decimal string>"}`.
pub struct DecimalUnit;

impl MarshalUnit for DecimalUnit {
    fn marshal(&self, value: &Value) -> Option<Json> {
        let Value::Decimal(d) = value else {
            return None;
        };
        let mut map = serde_json::Map::new();
        map.insert(DECIMAL_TAG.to_string(), Json::String(d.to_string()));
        Some(Json::Object(map))
    }

    fn unmarshal(&self, json: &Json) -> Option<Value> {
        let map = json.as_object()?;
        if map.len() != 1 {
            return None;
        }
        let raw = map.get(DECIMAL_TAG)?.as_str()?;
        Decimal::parse(raw).ok().map(Value::Decimal)
    }
}

// =============================================================================
// Marshaller
// =============================================================================

/// Ordered set of marshal units. Earlier units take precedence.
#[derive(Clone, Default)]
pub struct Marshaller {
    units: Vec<Rc<dyn MarshalUnit>>,
}

impl Marshaller {
    /// Marshaller without any units: plain JSON only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit with lower precedence than the existing ones.
    pub fn extend(mut self, unit: impl MarshalUnit + 'static) -> Self {
        self.units.push(Rc::new(unit));
        self
    }

    pub fn unmarshal(&self, json: &Json) -> Value {
        if let Some(value) = self.units.iter().find_map(|u| u.unmarshal(json)) {
            return value;
        }
        match json {
            Json::Array(items) => Value::Array(items.iter().map(|j| self.unmarshal(j)).collect()),
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.unmarshal(v)))
                    .collect(),
            ),
            other => Value::from(other.clone()),
        }
    }

    pub fn marshal(&self, value: &Value) -> Json {
        if let Some(json) = self.units.iter().find_map(|u| u.marshal(value)) {
            return json;
        }
        match value {
            Value::Array(items) => Json::Array(items.iter().map(|v| self.marshal(v)).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), self.marshal(v)))
                    .collect(),
            ),
            other => other.to_json(),
        }
    }
}

/// Plain JSON plus [`DecimalUnit`].
pub fn default_marshaller() -> Marshaller {
    Marshaller::new().extend(DecimalUnit)
}

// =============================================================================
// Attribute Coercion
// =============================================================================

/// Decode a DOM attribute string for `schema`.
///
/// A missing attribute is `Undefined`. Literal kinds pass the string through;
/// everything else is parsed as JSON and unmarshalled. The result is not yet
/// validated.
pub fn process_attr(schema: &Schema, raw: Option<&str>, marshaller: &Marshaller) -> Result<Value, CoerceError> {
    let Some(raw) = raw else {
        return Ok(Value::Undefined);
    };
    if schema.kind().is_literal() {
        return Ok(Value::String(raw.to_string()));
    }
    let json: Json = serde_json::from_str(raw)?;
    Ok(marshaller.unmarshal(&json))
}

/// Encode `value` as a DOM attribute string for `schema`.
///
/// Returns `None` for `Undefined` (the attribute should be removed).
pub fn encode_attr(schema: &Schema, value: &Value, marshaller: &Marshaller) -> Option<String> {
    if value.is_undefined() {
        return None;
    }
    if schema.kind().is_literal() {
        if let Value::String(s) = value {
            return Some(s.clone());
        }
    }
    Some(marshaller.marshal(value).to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_schema_bypasses_json() {
        let m = default_marshaller();
        let v = process_attr(&Schema::string(), Some("neutron1abc"), &m).unwrap();
        assert_eq!(v, Value::from("neutron1abc"));

        let v = process_attr(&Schema::string().optional(), Some("42"), &m).unwrap();
        assert_eq!(v, Value::from("42"));
    }

    #[test]
    fn test_enum_schema_bypasses_json() {
        let m = default_marshaller();
        let v = process_attr(&Schema::enumeration(["top", "bottom"]), Some("top"), &m).unwrap();
        assert_eq!(v, Value::from("top"));
    }

    #[test]
    fn test_structured_schema_decodes_json() {
        let m = default_marshaller();
        let v = process_attr(&Schema::number().optional(), Some("8"), &m).unwrap();
        assert_eq!(v, Value::Number(8.0));

        let v = process_attr(&Schema::boolean(), Some("true"), &m).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let m = default_marshaller();
        assert!(process_attr(&Schema::number(), Some("eight"), &m).is_err());
    }

    #[test]
    fn test_missing_attribute_is_undefined() {
        let m = default_marshaller();
        assert_eq!(process_attr(&Schema::number(), None, &m).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_decimal_unit_nested() {
        let m = default_marshaller();
        let v = process_attr(
            &Schema::any(),
            Some(r#"{"amount": {"$decimal": "1.500"}, "denom": "untrn"}"#),
            &m,
        )
        .unwrap();
        assert_eq!(v.field("amount"), Value::Decimal(Decimal::new(1500, 3)));
        assert_eq!(v.field("denom"), Value::from("untrn"));
    }

    #[test]
    fn test_plain_marshaller_leaves_tag_alone() {
        let m = Marshaller::new();
        let v = m.unmarshal(&serde_json::json!({"$decimal": "1"}));
        assert_eq!(v.field("$decimal"), Value::from("1"));
    }

    #[test]
    fn test_encode_attr() {
        let m = default_marshaller();
        assert_eq!(encode_attr(&Schema::string(), &"abc".into(), &m).as_deref(), Some("abc"));
        assert_eq!(
            encode_attr(&Schema::decimal(), &Value::Decimal(Decimal::new(25, 1)), &m).as_deref(),
            Some(r#"{"$decimal":"2.5"}"#)
        );
        assert_eq!(encode_attr(&Schema::number(), &Value::Undefined, &m), None);
    }
}
