//! The Defaulting Engine.
//!
//! Walks a schema tree in lock-step with a data tree and produces a value
//! where every required field is present, unset positions carry their
//! schema-declared defaults, and primitive values are coerced to the
//! declared type. The input is never mutated; the output is a fresh tree.
//!
//! Throughout this engine a position is *present* only when its value is
//! neither absent nor `null` — `null` folds into "unset" and is replaced
//! by defaults like any other missing value.

use std::collections::BTreeMap;

use crate::types::{ArraySchema, ObjectSchema, SchemaNode};
use crate::value::Value;

/// Fills `data` with the defaults declared by `schema` and coerces
/// primitive leaves to their declared types.
///
/// Pure and total: any schema/data combination produces a value (or
/// `None`, meaning the position stays unset). Coercion failures propagate
/// as NaN numbers rather than errors.
///
/// # Examples
///
/// ```
/// use json_shape_core::{SchemaNode, Value, fill_defaults};
///
/// let schema = SchemaNode::object([
///     ("id", SchemaNode::number()),
///     ("name", SchemaNode::string().with_default("")),
/// ])
/// .with_required_names(["id", "name"]);
///
/// let data = Value::from(serde_json::json!({"id": "7"}));
/// let filled = fill_defaults(&schema, Some(&data)).unwrap();
/// assert_eq!(filled, Value::from(serde_json::json!({"id": 7, "name": ""})));
/// ```
pub fn fill_defaults(schema: &SchemaNode, data: Option<&Value>) -> Option<Value> {
    fill_node(schema, data)
}

/// Fills `data` against a sequence of `items`-shaped elements.
///
/// Equivalent to wrapping `items` in [`SchemaNode::array`] first; absent
/// input yields the empty sequence.
///
/// # Examples
///
/// ```
/// use json_shape_core::{SchemaNode, Value, fill_defaults_array};
///
/// let filled = fill_defaults_array(&SchemaNode::string(), None).unwrap();
/// assert_eq!(filled, Value::Array(vec![]));
/// ```
pub fn fill_defaults_array(items: &SchemaNode, data: Option<&Value>) -> Option<Value> {
    fill_node(&SchemaNode::array(items.clone()), data)
}

/// Returns a reusable defaulting function bound to `schema`.
///
/// The curried calling convention: the closure captures the schema by
/// value and is safe to share and reuse across calls and threads.
///
/// # Examples
///
/// ```
/// use json_shape_core::{SchemaNode, Value, fill_defaults_fn};
///
/// let fill = fill_defaults_fn(SchemaNode::object([
///     ("name", SchemaNode::string().with_default("unnamed").require()),
/// ]));
///
/// let first = fill(None).unwrap();
/// let second = fill(None).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(first.get("name"), Some(&Value::String("unnamed".into())));
/// ```
pub fn fill_defaults_fn(schema: SchemaNode) -> impl Fn(Option<&Value>) -> Option<Value> + Clone {
    move |data| fill_node(&schema, data)
}

fn fill_node(schema: &SchemaNode, data: Option<&Value>) -> Option<Value> {
    match schema {
        SchemaNode::Object(object) => Some(Value::Object(fill_object(object, data))),
        SchemaNode::Array(array) => Some(fill_array(array, data)),
        leaf => fill_leaf(leaf, data),
    }
}

fn fill_object(schema: &ObjectSchema, data: Option<&Value>) -> BTreeMap<String, Value> {
    let fields = data.and_then(Value::as_object);
    let mut result = BTreeMap::new();

    for (name, property) in &schema.properties {
        let field = fields.and_then(|fields| fields.get(name)).filter(|v| !v.is_null());
        if schema.is_required_property(name, property) || field.is_some() {
            if let Some(filled) = fill_node(property, field) {
                result.insert(name.clone(), filled);
            }
        }
    }

    // Extra input fields pass through untouched; schema-set keys win.
    if schema.additional_properties {
        if let Some(fields) = fields {
            for (name, value) in fields {
                if !value.is_null() && !result.contains_key(name) {
                    result.insert(name.clone(), value.clone());
                }
            }
        }
    }

    result
}

fn fill_array(schema: &ArraySchema, data: Option<&Value>) -> Value {
    match data.and_then(Value::as_array) {
        Some(elements) => Value::Array(
            elements
                .iter()
                .map(|element| fill_node(&schema.items, Some(element)).unwrap_or(Value::Null))
                .collect(),
        ),
        // Absent, null, and non-sequence input all produce a sequence:
        // the declared default when one is declared, else empty. An
        // explicit null default folds into the empty sequence.
        None => match &schema.default {
            Some(Value::Array(default)) => Value::Array(default.clone()),
            _ => Value::Array(Vec::new()),
        },
    }
}

fn fill_leaf(schema: &SchemaNode, data: Option<&Value>) -> Option<Value> {
    if let Some(value) = data.filter(|v| !v.is_null()) {
        let coerced = match schema {
            SchemaNode::String(_) | SchemaNode::Enum(_) => match value {
                Value::String(_) => value.clone(),
                other => Value::String(other.render_text()),
            },
            SchemaNode::Number(_) | SchemaNode::Integer(_) => match value {
                Value::Number(_) => value.clone(),
                other => Value::Number(other.parse_number()),
            },
            _ => value.clone(),
        };
        return Some(coerced);
    }

    match schema.default_value() {
        Some(default) if !default.is_null() => Some(default.clone()),
        // Unset integers fall back to zero as a hard convention.
        _ if matches!(schema, SchemaNode::Integer(_)) => Some(Value::Number(0.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn entry_schema() -> SchemaNode {
        SchemaNode::object([
            ("id", SchemaNode::number()),
            ("name", SchemaNode::string()),
            ("folder", SchemaNode::string()),
        ])
    }

    #[test]
    fn test_fills_complete_object_unchanged() {
        let data = value(json!({"id": 1, "name": "name", "folder": "/name"}));
        let filled = fill_defaults(&entry_schema(), Some(&data));
        assert_eq!(filled, Some(data));
    }

    #[test]
    fn test_does_not_create_non_required_props() {
        let data = value(json!({"id": 1}));
        let filled = fill_defaults(&entry_schema(), Some(&data));
        assert_eq!(filled, Some(value(json!({"id": 1}))));
    }

    #[test]
    fn test_creates_required_props() {
        let schema = SchemaNode::object([
            ("id", SchemaNode::number()),
            ("name", SchemaNode::string()),
            ("folder", SchemaNode::string()),
            ("sub", SchemaNode::object([("id", SchemaNode::string())])),
        ])
        .with_required_names(["id", "name", "folder", "sub"]);

        let data = value(json!({"id": 1}));
        let filled = fill_defaults(&schema, Some(&data));
        // Required leaves without defaults stay unset; the required
        // object materializes as an empty mapping.
        assert_eq!(filled, Some(value(json!({"id": 1, "sub": {}}))));
    }

    #[test]
    fn test_does_not_create_non_required_object_prop() {
        let schema = SchemaNode::object([
            ("id", SchemaNode::number()),
            ("sub", SchemaNode::object([("id", SchemaNode::string())])),
        ])
        .with_required_names(["id"]);

        let data = value(json!({"id": 1}));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(value(json!({"id": 1}))));
    }

    #[test]
    fn test_creates_required_default_props() {
        let schema = SchemaNode::object([
            ("id", SchemaNode::number()),
            ("name", SchemaNode::string().with_default("")),
            ("folder", SchemaNode::string()),
        ])
        .with_required_names(["id", "name", "folder"]);

        let data = value(json!({"id": 1}));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(value(json!({"id": 1, "name": ""}))));
    }

    #[test]
    fn test_legacy_required_flag_drives_inclusion() {
        let schema = SchemaNode::object([
            ("id", SchemaNode::number()),
            ("name", SchemaNode::string().with_default("").require()),
        ]);

        let data = value(json!({"id": 1}));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(value(json!({"id": 1, "name": ""}))));
    }

    #[test]
    fn test_legacy_and_canonical_required_fill_identically() {
        let legacy = SchemaNode::object([
            ("id", SchemaNode::number().require()),
            ("name", SchemaNode::string().with_default("").require()),
            ("folder", SchemaNode::string()),
            (
                "sub",
                SchemaNode::object([
                    ("code", SchemaNode::empty_string().require()),
                    ("note", SchemaNode::string()),
                ])
                .require(),
            ),
        ]);
        let canonical = legacy
            .clone()
            .adopt_legacy_required()
            .expect("conversion succeeds");

        // Required-but-unset, present, omitted, and extra fields must all
        // come out the same under either policy form.
        let inputs = [
            None,
            Some(value(json!({"id": 1}))),
            Some(value(json!({"id": "7", "folder": "/f", "extra": true}))),
            Some(value(json!({"sub": {"note": "n"}}))),
        ];
        for data in &inputs {
            assert_eq!(
                fill_defaults(&legacy, data.as_ref()),
                fill_defaults(&canonical, data.as_ref()),
            );
        }
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let schema = SchemaNode::object([("id", SchemaNode::number())]);
        let data = value(json!({"id": 1, "extra": "234"}));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(value(json!({"id": 1, "extra": "234"}))));
    }

    #[test]
    fn test_exact_schema_drops_extra_fields() {
        let schema = SchemaNode::object([("id", SchemaNode::number())]).exact();
        let data = value(json!({"id": 1, "extra": "234"}));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(value(json!({"id": 1}))));
    }

    #[test]
    fn test_null_fields_are_dropped() {
        let schema = entry_schema();
        let data = value(json!({"id": 1, "name": null}));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(value(json!({"id": 1}))));
    }

    #[test]
    fn test_string_passes_through() {
        let filled = fill_defaults(&SchemaNode::string(), Some(&value(json!("asdf"))));
        assert_eq!(filled, Some(Value::String("asdf".into())));
    }

    #[test]
    fn test_string_coerces_number() {
        let filled = fill_defaults(&SchemaNode::string(), Some(&value(json!(10))));
        assert_eq!(filled, Some(Value::String("10".into())));
    }

    #[test]
    fn test_number_coerces_text() {
        let filled = fill_defaults(&SchemaNode::number(), Some(&value(json!("10"))));
        assert_eq!(filled, Some(Value::Number(10.0)));
    }

    #[test]
    fn test_number_coercion_failure_is_nan() {
        let filled = fill_defaults(&SchemaNode::number(), Some(&value(json!("asdf"))))
            .expect("value is present");
        assert!(filled.is_nan());
    }

    #[test]
    fn test_integer_coerces_text() {
        let filled = fill_defaults(&SchemaNode::integer(), Some(&value(json!("10"))));
        assert_eq!(filled, Some(Value::Number(10.0)));
    }

    #[test]
    fn test_integer_defaults_to_zero() {
        let filled = fill_defaults(&SchemaNode::integer(), None);
        assert_eq!(filled, Some(Value::Number(0.0)));
    }

    #[test]
    fn test_absent_array_yields_empty_sequence() {
        let schema = SchemaNode::array(SchemaNode::string());
        assert_eq!(fill_defaults(&schema, None), Some(Value::Array(vec![])));
    }

    #[test]
    fn test_null_array_default_still_yields_empty_sequence() {
        let schema = SchemaNode::array(SchemaNode::string()).with_default(Value::Null);
        assert_eq!(fill_defaults(&schema, None), Some(Value::Array(vec![])));
    }

    #[test]
    fn test_null_array_input_yields_empty_sequence() {
        let schema = SchemaNode::array(SchemaNode::string());
        let filled = fill_defaults(&schema, Some(&Value::Null));
        assert_eq!(filled, Some(Value::Array(vec![])));
    }

    #[test]
    fn test_declared_array_default_is_used() {
        let schema = SchemaNode::array(SchemaNode::string())
            .with_default(value(json!(["a", "b"])));
        assert_eq!(fill_defaults(&schema, None), Some(value(json!(["a", "b"]))));
    }

    #[test]
    fn test_array_elements_are_coerced() {
        let schema = SchemaNode::array(SchemaNode::string());
        let data = value(json!([11, "asdf"]));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(value(json!(["11", "asdf"]))));
    }

    #[test]
    fn test_date_stays_unset_when_absent() {
        assert_eq!(fill_defaults(&SchemaNode::date(), None), None);
    }

    #[test]
    fn test_date_passes_through_when_present() {
        let filled = fill_defaults(&SchemaNode::date(), Some(&value(json!("2018"))));
        assert_eq!(filled, Some(Value::String("2018".into())));
    }

    #[test]
    fn test_boolean_default_applies() {
        assert_eq!(
            fill_defaults(&SchemaNode::boolean_true(), None),
            Some(Value::Bool(true))
        );
        assert_eq!(
            fill_defaults(&SchemaNode::boolean_false(), None),
            Some(Value::Bool(false))
        );
    }

    #[test]
    fn test_enum_default_applies() {
        let schema = SchemaNode::enumeration(["draft", "published"]).with_default("draft");
        assert_eq!(fill_defaults(&schema, None), Some(Value::String("draft".into())));
    }

    #[test]
    fn test_filling_is_idempotent() {
        let schema = SchemaNode::object([
            ("id", SchemaNode::integer()),
            ("name", SchemaNode::string().with_default("")),
            ("tags", SchemaNode::array(SchemaNode::string())),
        ])
        .with_required_names(["id", "name", "tags"]);

        let data = value(json!({"id": "3", "extra": true}));
        let once = fill_defaults(&schema, Some(&data)).expect("object fills");
        let twice = fill_defaults(&schema, Some(&once)).expect("object fills");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_round_trip_preserves_typed_fields() {
        let schema = entry_schema();
        let data = value(json!({"id": 2.5, "name": "n", "folder": "/n"}));
        let filled = fill_defaults(&schema, Some(&data));
        assert_eq!(filled, Some(data));
    }

    #[test]
    fn test_curried_form_is_reusable() {
        let fill = fill_defaults_fn(SchemaNode::object([(
            "name",
            SchemaNode::string().with_default("unnamed").require(),
        )]));

        assert_eq!(fill(None), fill(None));
        let data = value(json!({"name": "set"}));
        assert_eq!(fill(Some(&data)), Some(value(json!({"name": "set"}))));
    }

    #[test]
    fn test_fill_defaults_array_wraps_item_schema() {
        let filled = fill_defaults_array(&SchemaNode::string(), Some(&value(json!([1]))));
        assert_eq!(filled, Some(value(json!(["1"]))));
    }
}
