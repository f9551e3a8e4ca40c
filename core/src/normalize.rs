//! The Normalization Engine.
//!
//! Walks a schema tree in lock-step with a data tree and produces a value
//! suitable for persistence: unset fields are dropped, empty objects
//! collapse to `null` (marking the absence of a sub-record), numbers and
//! strings are coerced, and the `"-"` date placeholder is cleared. The
//! input is never mutated; the output is a fresh tree.
//!
//! Unlike the Defaulting Engine, a position here is *present* whenever it
//! carries any value at all — `null` is a meaningful value that flows
//! through the matching type rule. The one exception is the array rule,
//! which folds `null` input into "absent".

use std::collections::BTreeMap;

use crate::types::{ArraySchema, ObjectSchema, SchemaNode};
use crate::value::Value;

/// Normalizes `data` for persistence according to `schema`.
///
/// Pure and total: all failure is value-level (NaN sentinels, omitted
/// fields, null collapse), never an error.
///
/// # Examples
///
/// ```
/// use json_shape_core::{SchemaNode, Value, normalize_to_save};
///
/// let schema = SchemaNode::object([("id", SchemaNode::number())]);
///
/// // Comma decimal separators are locale-friendly input.
/// let data = Value::from(serde_json::json!({"id": "1,1"}));
/// let saved = normalize_to_save(&schema, Some(&data)).unwrap();
/// assert_eq!(saved.get("id"), Some(&Value::Number(1.1)));
/// ```
pub fn normalize_to_save(schema: &SchemaNode, data: Option<&Value>) -> Option<Value> {
    normalize_node(schema, data)
}

/// Returns a reusable normalization function bound to `schema`.
///
/// # Examples
///
/// ```
/// use json_shape_core::{SchemaNode, Value, normalize_to_save_fn};
///
/// let normalize = normalize_to_save_fn(SchemaNode::date());
/// assert_eq!(normalize(Some(&Value::String("-".into()))), None);
/// assert_eq!(
///     normalize(Some(&Value::String("2018".into()))),
///     Some(Value::String("2018".into())),
/// );
/// ```
pub fn normalize_to_save_fn(
    schema: SchemaNode,
) -> impl Fn(Option<&Value>) -> Option<Value> + Clone {
    move |data| normalize_node(&schema, data)
}

fn normalize_node(schema: &SchemaNode, data: Option<&Value>) -> Option<Value> {
    match schema {
        SchemaNode::Object(object) => Some(normalize_object(object, data)),
        SchemaNode::Array(array) => normalize_array(array, data),
        SchemaNode::Number(_) | SchemaNode::Integer(_) => normalize_number(data),
        SchemaNode::String(_) | SchemaNode::Enum(_) => normalize_string(data),
        SchemaNode::Date(date) => normalize_date(date.default.as_ref(), data),
        // Booleans have no persistence coercion; values pass through.
        SchemaNode::Boolean(_) => data.cloned(),
    }
}

fn normalize_object(schema: &ObjectSchema, data: Option<&Value>) -> Value {
    // The empty-object collapse is decided on the *input*: an absent,
    // null, empty, or non-mapping input marks the absence of a
    // sub-record and becomes null for storage.
    let fields = match data.and_then(Value::as_object) {
        Some(fields) if !fields.is_empty() => fields,
        _ => return Value::Null,
    };

    let mut result: BTreeMap<String, Value> = if schema.additional_properties {
        fields.clone()
    } else {
        BTreeMap::new()
    };

    for (name, property) in &schema.properties {
        let field = fields.get(name);
        if schema.is_required_property(name, property) || field.is_some() {
            match normalize_node(property, field) {
                Some(normalized) => {
                    result.insert(name.clone(), normalized);
                }
                // Normalized to unset: drop the seeded raw value too.
                None => {
                    result.remove(name);
                }
            }
        }
    }

    Value::Object(result)
}

fn normalize_array(schema: &ArraySchema, data: Option<&Value>) -> Option<Value> {
    // Null input folds into "absent" here: the declared default
    // sequence if any, else the field stays unset.
    let Some(elements) = data.and_then(Value::as_array) else {
        return match &schema.default {
            Some(Value::Array(default)) => Some(Value::Array(default.clone())),
            _ => None,
        };
    };

    Some(Value::Array(
        elements
            .iter()
            .map(|element| normalize_node(&schema.items, Some(element)).unwrap_or(Value::Null))
            .collect(),
    ))
}

fn normalize_number(data: Option<&Value>) -> Option<Value> {
    match data {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        Some(Value::String(text)) => {
            // Comma decimal separators are rewritten before parsing so
            // locale-formatted input round-trips to a plain number.
            let text = text.replace(',', ".");
            Some(Value::Number(Value::String(text).parse_number()))
        }
        Some(other) => Some(Value::Number(other.parse_number())),
    }
}

fn normalize_string(data: Option<&Value>) -> Option<Value> {
    match data {
        None => None,
        Some(Value::String(_)) => data.cloned(),
        Some(other) => Some(Value::String(other.render_text())),
    }
}

fn normalize_date(default: Option<&Value>, data: Option<&Value>) -> Option<Value> {
    match data {
        // "-" is the placeholder for a date cleared by the user.
        None => default.cloned(),
        Some(Value::String(text)) if text == "-" => default.cloned(),
        Some(other) => Some(other.clone()),
    }
}
