//! The JSON-like data value model consumed and produced by the engines.
//!
//! [`Value`] is a closed sum over the primitive and composite shapes the
//! schema interpreter understands. Two deliberate departures from
//! [`serde_json::Value`]:
//!
//! - "undefined" is modeled as *absence*: engine inputs and outputs are
//!   `Option<&Value>` / `Option<Value>`, and an object simply lacks the
//!   key. [`Value::Null`] is JSON `null`, a present value.
//! - numbers are plain [`f64`], so a failed numeric coercion can surface
//!   as a propagated NaN sentinel instead of an error (serde_json's
//!   number type cannot carry NaN).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A JSON-like data value.
///
/// Values deserialize from plain JSON/YAML via the untagged representation
/// and convert to and from [`serde_json::Value`] losslessly, except that
/// non-finite numbers map to JSON `null` on the way out.
///
/// # Examples
///
/// ```
/// use json_shape_core::Value;
///
/// let value = Value::from(serde_json::json!({"id": 1, "tags": ["a"]}));
/// assert_eq!(value.get("id"), Some(&Value::Number(1.0)));
/// assert_eq!(value.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`. A present value, distinct from an absent field.
    Null,
    /// Boolean.
    Bool(bool),
    /// Numeric value. NaN marks a failed coercion.
    Number(f64),
    /// Text.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Mapping from field name to value.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for the propagated not-a-number sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::Value;
    ///
    /// assert!(Value::String("asdf".into()).parse_number().is_nan());
    /// assert!(Value::Number(f64::NAN).is_nan());
    /// assert!(!Value::Number(1.0).is_nan());
    /// ```
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    /// Borrows the boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrows the numeric payload, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrows the text payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the element sequence, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the field mapping, if this is an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a field on an object value. `None` for non-objects and
    /// absent fields alike.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|fields| fields.get(name))
    }

    /// Renders this value as text, the coercion applied by string-typed
    /// schema leaves.
    ///
    /// Mirrors loose text rendering: numbers drop a trailing `.0`,
    /// booleans become `"true"`/`"false"`, `null` becomes `"null"`, and
    /// composites render as compact JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::Value;
    ///
    /// assert_eq!(Value::Number(10.0).render_text(), "10");
    /// assert_eq!(Value::Number(1.5).render_text(), "1.5");
    /// assert_eq!(Value::Bool(true).render_text(), "true");
    /// assert_eq!(Value::Null.render_text(), "null");
    /// ```
    pub fn render_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            composite => serde_json::to_string(&serde_json::Value::from(composite.clone()))
                .unwrap_or_default(),
        }
    }

    /// Parses this value as a number, the coercion applied by
    /// number-typed schema leaves.
    ///
    /// Empty or whitespace-only text parses to `0`, unparsable text to
    /// NaN (the propagated sentinel, never an error), booleans to `1`/`0`,
    /// `null` to `0`, and composites to NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::Value;
    ///
    /// assert_eq!(Value::String("10".into()).parse_number(), 10.0);
    /// assert_eq!(Value::String("".into()).parse_number(), 0.0);
    /// assert_eq!(Value::Bool(true).parse_number(), 1.0);
    /// assert!(Value::String("asdf".into()).parse_number().is_nan());
    /// ```
    pub fn parse_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Null => 0.0,
            Value::String(s) => {
                let text = s.trim();
                if text.is_empty() {
                    0.0
                } else {
                    text.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Object(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, field)| (name, Value::from(field)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => {
                // Integral values serialize without a fractional part;
                // NaN and infinities have no JSON form and become null.
                if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                    serde_json::Value::Number(serde_json::Number::from(n as i64))
                } else {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(name, field)| (name, serde_json::Value::from(field)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let json = serde_json::json!({
            "id": 1,
            "name": "name",
            "nested": {"flag": true, "none": null},
            "tags": ["a", "b"],
        });

        let value = Value::from(json.clone());
        assert_eq!(serde_json::Value::from(value), json);
    }

    #[test]
    fn test_nan_converts_to_json_null() {
        let value = Value::Number(f64::NAN);
        assert_eq!(serde_json::Value::from(value), serde_json::Value::Null);
    }

    #[test]
    fn test_untagged_deserialization() {
        let value: Value = serde_json::from_str(r#"{"a": [1, "x", null, false]}"#)
            .expect("value should parse");
        assert_eq!(
            value.get("a"),
            Some(&Value::Array(vec![
                Value::Number(1.0),
                Value::String("x".into()),
                Value::Null,
                Value::Bool(false),
            ]))
        );
    }

    #[test]
    fn test_typed_accessors_borrow_matching_payloads() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Number(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(
            Value::Array(vec![Value::Null]).as_array(),
            Some(&[Value::Null][..])
        );

        // Mismatched shapes yield None rather than coercing.
        assert_eq!(Value::String("true".into()).as_bool(), None);
        assert_eq!(Value::Number(0.0).as_str(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(Value::String(" 10 ".into()).parse_number(), 10.0);
        assert_eq!(Value::String("1.5".into()).parse_number(), 1.5);
        assert_eq!(Value::Null.parse_number(), 0.0);
        assert_eq!(Value::Bool(false).parse_number(), 0.0);
        assert!(Value::Object(BTreeMap::new()).parse_number().is_nan());
    }

    #[test]
    fn test_render_text_variants() {
        assert_eq!(Value::String("asdf".into()).render_text(), "asdf");
        assert_eq!(Value::Number(10.0).render_text(), "10");
        assert_eq!(Value::Number(0.0).render_text(), "0");
        assert_eq!(Value::Bool(false).render_text(), "false");
        assert_eq!(
            Value::Array(vec![Value::Number(1.0)]).render_text(),
            "[1]"
        );
    }
}
