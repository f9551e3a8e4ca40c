//! Schema-driven shaping of JSON-like values.
//!
//! This crate interprets a declarative schema tree against a data tree,
//! walking both in lock-step and applying per-node-type rules. Two sibling
//! engines share that walk:
//!
//! - [`fill_defaults`] — the Defaulting Engine: every required field is
//!   present in the output, unset positions get their schema-declared
//!   defaults, and primitive values are coerced to the declared type.
//! - [`normalize_to_save`] — the Normalization Engine: produces a value
//!   suitable for persistence by dropping unset fields, collapsing empty
//!   objects to `null`, coercing numbers and strings, and clearing date
//!   placeholders.
//!
//! Schemas are built with the constructors on [`SchemaNode`] (or parsed
//! from JSON/YAML text) and are immutable, long-lived descriptors; data
//! values ([`Value`]) are ephemeral, supplied per call and never mutated.
//! Both engines are pure synchronous functions with no shared state, so
//! schemas and the curried closures ([`fill_defaults_fn`],
//! [`normalize_to_save_fn`]) can be shared freely across threads.
//!
//! Failure is value-level by design: a failed numeric coercion yields a
//! propagated NaN sentinel, an unset field is omitted, an empty sub-record
//! becomes `null`. The engines never return an error.
//!
//! # Example
//!
//! ```
//! use json_shape_core::*;
//!
//! let schema = SchemaNode::object([
//!     ("id", SchemaNode::integer()),
//!     ("name", SchemaNode::string().with_default("")),
//!     ("price", SchemaNode::number()),
//!     ("tags", SchemaNode::array(SchemaNode::string())),
//! ])
//! .with_required_names(["id", "name", "tags"]);
//!
//! // A partially filled form...
//! let draft = Value::from(serde_json::json!({"price": "1,5"}));
//!
//! // ...gets its defaults for editing...
//! let filled = fill_defaults(&schema, Some(&draft)).unwrap();
//! assert_eq!(filled.get("id"), Some(&Value::Number(0.0)));
//! assert_eq!(filled.get("name"), Some(&Value::String(String::new())));
//! assert_eq!(filled.get("tags"), Some(&Value::Array(vec![])));
//!
//! // ...and is shaped for persistence on save.
//! let saved = normalize_to_save(&schema, Some(&draft)).unwrap();
//! assert_eq!(saved.get("price"), Some(&Value::Number(1.5)));
//! ```

mod error;
mod fill;
mod normalize;
mod types;
mod value;

pub use error::SchemaError;
pub use fill::{fill_defaults, fill_defaults_array, fill_defaults_fn};
pub use normalize::{normalize_to_save, normalize_to_save_fn};
pub use types::{
    ArraySchema, EnumSchema, LeafSchema, ObjectSchema, RequiredSpec, SchemaNode, StringSchema,
};
pub use value::Value;
