//! Schema node definitions and the builder layer.
//!
//! A [`SchemaNode`] is a declarative description of one position in a data
//! tree's expected shape: its type tag, default value, required policy, and
//! (for composites) its children. Schema trees are built once, treated as
//! immutable descriptors, and reused across many transform calls. The types
//! serialize with [`serde`] and round-trip through JSON and YAML.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::value::Value;

fn is_false(flag: &bool) -> bool {
    !*flag
}

fn is_true(flag: &bool) -> bool {
    *flag
}

/// Declarative description of one position in a data tree.
///
/// A closed sum dispatched by pattern matching: every node kind the engines
/// understand is a variant, so there is no "unrecognized type" fallthrough.
/// Construct nodes with the builder constructors ([`string`](Self::string),
/// [`number`](Self::number), [`array`](Self::array),
/// [`object`](Self::object), ...) and refine them with chained decorators
/// ([`with_default`](Self::with_default), [`require`](Self::require),
/// [`require_declared`](Self::require_declared), ...).
///
/// # Examples
///
/// ```
/// use json_shape_core::SchemaNode;
///
/// let schema = SchemaNode::object([
///     ("id", SchemaNode::number()),
///     ("name", SchemaNode::string().with_default("")),
///     ("tags", SchemaNode::array(SchemaNode::string())),
/// ]);
///
/// assert!(matches!(schema, SchemaNode::Object(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNode {
    /// Text leaf. Present non-text values are rendered as text.
    String(StringSchema),
    /// Numeric leaf. Present non-numeric values are parsed; failures
    /// propagate as the NaN sentinel.
    Number(LeafSchema),
    /// Numeric leaf with a hard zero-default convention when unset.
    Integer(LeafSchema),
    /// Boolean leaf. Values pass through uncoerced.
    Boolean(LeafSchema),
    /// Date leaf. Values pass through unvalidated; the `"-"` placeholder
    /// means "cleared by the user" during normalization.
    Date(LeafSchema),
    /// Text leaf with an allowed value set. Transforms treat it exactly
    /// like [`SchemaNode::String`]; the value set is descriptive.
    Enum(EnumSchema),
    /// Ordered sequence of like-shaped elements.
    Array(ArraySchema),
    /// Mapping from declared property names to child schemas.
    Object(ObjectSchema),
}

/// Text leaf schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StringSchema {
    /// Advisory maximum length. Not enforced by the engines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Value substituted when the data leaves this position unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Legacy per-property required flag.
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    /// Identifier metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Presentation title metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Shared shape of the number, integer, boolean, and date leaves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeafSchema {
    /// Value substituted when the data leaves this position unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Legacy per-property required flag.
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    /// Identifier metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Presentation title metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Enumerated text leaf schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumSchema {
    /// Allowed values. Descriptive only; the engines do not validate
    /// membership.
    #[serde(rename = "enum")]
    pub values: Vec<String>,
    /// Value substituted when the data leaves this position unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Legacy per-property required flag.
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    /// Identifier metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Presentation title metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Ordered sequence schema.
///
/// `items` is mandatory: an array position always declares the shape of
/// its elements, so the historical "array schema without items" authoring
/// defect is unrepresentable, and wire schemas lacking `items` fail at
/// parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArraySchema {
    /// Schema every element is transformed against.
    pub items: Box<SchemaNode>,
    /// Sequence substituted when the data leaves this position unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Legacy per-property required flag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Identifier metadata. No transform semantics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Presentation title metadata. No transform semantics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Mapping schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectSchema {
    /// Declared properties, by field name.
    pub properties: BTreeMap<String, SchemaNode>,
    /// Required policy for the declared properties (or, in the legacy
    /// boolean form, this object's own required flag). See
    /// [`RequiredSpec`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<RequiredSpec>,
    /// Whether undeclared input fields pass through to the output.
    #[serde(skip_serializing_if = "is_true")]
    pub additional_properties: bool,
    /// Identifier metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Presentation title metadata. No transform semantics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
            required: None,
            additional_properties: true,
            id: None,
            title: None,
        }
    }
}

/// The two historical wire forms of the `required` field on an object.
///
/// The canonical form is [`Names`](RequiredSpec::Names): a property is
/// included in output when its name appears in the set. The legacy form
/// put a boolean `required` on each property schema instead, in which case
/// the flag read here belongs to the object *itself* (as a property of its
/// parent). The two forms must not be mixed within one object node;
/// [`SchemaNode::adopt_legacy_required`] converts legacy trees to the
/// canonical form and reports mixed usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredSpec {
    /// Legacy boolean flag.
    Flag(bool),
    /// Canonical required-name set.
    Names(BTreeSet<String>),
}

impl ObjectSchema {
    /// Decides whether a declared property is included in output even when
    /// the input leaves it unset.
    ///
    /// Uses the name set when this object carries one, otherwise falls
    /// back to the property's own legacy flag — never both.
    pub fn is_required_property(&self, name: &str, property: &SchemaNode) -> bool {
        match &self.required {
            Some(RequiredSpec::Names(names)) => names.contains(name),
            _ => property.required_flag(),
        }
    }
}

impl SchemaNode {
    /// Creates a plain text schema.
    pub fn string() -> Self {
        SchemaNode::String(StringSchema::default())
    }

    /// Creates a text schema with an advisory maximum length.
    pub fn limited_string(max_length: usize) -> Self {
        SchemaNode::String(StringSchema {
            max_length: Some(max_length),
            ..StringSchema::default()
        })
    }

    /// Creates a text schema defaulting to the empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::{SchemaNode, Value, fill_defaults};
    ///
    /// let schema = SchemaNode::object([("name", SchemaNode::empty_string().require())]);
    /// let filled = fill_defaults(&schema, None).unwrap();
    /// assert_eq!(filled.get("name"), Some(&Value::String(String::new())));
    /// ```
    pub fn empty_string() -> Self {
        Self::string().with_default("")
    }

    /// Creates a numeric schema.
    pub fn number() -> Self {
        SchemaNode::Number(LeafSchema::default())
    }

    /// Creates an integer schema. Defaulting substitutes `0` when the
    /// position is unset and no explicit default is declared.
    pub fn integer() -> Self {
        SchemaNode::Integer(LeafSchema::default())
    }

    /// Creates a boolean schema.
    pub fn boolean() -> Self {
        SchemaNode::Boolean(LeafSchema::default())
    }

    /// Creates a boolean schema defaulting to `true`.
    pub fn boolean_true() -> Self {
        Self::boolean().with_default(true)
    }

    /// Creates a boolean schema defaulting to `false`.
    pub fn boolean_false() -> Self {
        Self::boolean().with_default(false)
    }

    /// Creates a date schema.
    pub fn date() -> Self {
        SchemaNode::Date(LeafSchema::default())
    }

    /// Creates an enumerated text schema over the given allowed values.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::SchemaNode;
    ///
    /// let schema = SchemaNode::enumeration(["draft", "published"])
    ///     .with_default("draft");
    /// assert!(matches!(schema, SchemaNode::Enum(_)));
    /// ```
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaNode::Enum(EnumSchema {
            values: values.into_iter().map(Into::into).collect(),
            ..EnumSchema::default()
        })
    }

    /// Creates a sequence schema over like-shaped elements, defaulting to
    /// the empty sequence.
    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array(ArraySchema {
            items: Box::new(items),
            default: Some(Value::Array(Vec::new())),
            required: false,
            id: None,
            title: None,
        })
    }

    /// Creates a mapping schema from `(name, child)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::SchemaNode;
    ///
    /// let schema = SchemaNode::object([
    ///     ("id", SchemaNode::number()),
    ///     ("name", SchemaNode::string()),
    /// ]);
    ///
    /// if let SchemaNode::Object(object) = &schema {
    ///     assert_eq!(object.properties.len(), 2);
    ///     assert!(object.additional_properties);
    /// }
    /// ```
    pub fn object<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, SchemaNode)>,
        S: Into<String>,
    {
        SchemaNode::Object(ObjectSchema {
            properties: properties
                .into_iter()
                .map(|(name, child)| (name.into(), child))
                .collect(),
            ..ObjectSchema::default()
        })
    }

    /// Declares the value substituted when the data leaves this position
    /// unset. No effect on object nodes, which always materialize a map.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        match &mut self {
            SchemaNode::String(s) => s.default = Some(value),
            SchemaNode::Number(s)
            | SchemaNode::Integer(s)
            | SchemaNode::Boolean(s)
            | SchemaNode::Date(s) => s.default = Some(value),
            SchemaNode::Enum(s) => s.default = Some(value),
            SchemaNode::Array(s) => s.default = Some(value),
            SchemaNode::Object(_) => {}
        }
        self
    }

    /// Sets the legacy per-property required flag.
    ///
    /// Under the legacy policy a property is included in output whenever
    /// its own schema carries this flag. Prefer parent-level
    /// [`with_required_names`](Self::with_required_names) for new schemas.
    pub fn require(mut self) -> Self {
        match &mut self {
            SchemaNode::String(s) => s.required = true,
            SchemaNode::Number(s)
            | SchemaNode::Integer(s)
            | SchemaNode::Boolean(s)
            | SchemaNode::Date(s) => s.required = true,
            SchemaNode::Enum(s) => s.required = true,
            SchemaNode::Array(s) => s.required = true,
            SchemaNode::Object(s) => s.required = Some(RequiredSpec::Flag(true)),
        }
        self
    }

    /// Declares the required-name set on an object schema. No effect on
    /// other node kinds.
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
    /// let data = Value::from(serde_json::json!({"id": 1}));
    /// let filled = fill_defaults(&schema, Some(&data)).unwrap();
    /// assert_eq!(filled, Value::from(serde_json::json!({"id": 1, "name": ""})));
    /// ```
    pub fn with_required_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let SchemaNode::Object(object) = &mut self {
            object.required = Some(RequiredSpec::Names(
                names.into_iter().map(Into::into).collect(),
            ));
        }
        self
    }

    /// Marks every declared property required and forbids additional
    /// properties. No effect on other node kinds.
    pub fn require_declared(mut self) -> Self {
        if let SchemaNode::Object(object) = &mut self {
            object.required = Some(RequiredSpec::Names(
                object.properties.keys().cloned().collect(),
            ));
            object.additional_properties = false;
        }
        self
    }

    /// Forbids additional properties without altering the required
    /// policy. No effect on other node kinds.
    pub fn exact(mut self) -> Self {
        if let SchemaNode::Object(object) = &mut self {
            object.additional_properties = false;
        }
        self
    }

    /// Attaches an identifier to this node. Metadata only.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = Some(id.into());
        match &mut self {
            SchemaNode::String(s) => s.id = id,
            SchemaNode::Number(s)
            | SchemaNode::Integer(s)
            | SchemaNode::Boolean(s)
            | SchemaNode::Date(s) => s.id = id,
            SchemaNode::Enum(s) => s.id = id,
            SchemaNode::Array(s) => s.id = id,
            SchemaNode::Object(s) => s.id = id,
        }
        self
    }

    /// Strips the identifier, presentation title, and declared default
    /// from this node.
    pub fn omit_id(mut self) -> Self {
        match &mut self {
            SchemaNode::String(s) => {
                s.id = None;
                s.title = None;
                s.default = None;
            }
            SchemaNode::Number(s)
            | SchemaNode::Integer(s)
            | SchemaNode::Boolean(s)
            | SchemaNode::Date(s) => {
                s.id = None;
                s.title = None;
                s.default = None;
            }
            SchemaNode::Enum(s) => {
                s.id = None;
                s.title = None;
                s.default = None;
            }
            SchemaNode::Array(s) => {
                s.id = None;
                s.title = None;
                s.default = None;
            }
            SchemaNode::Object(s) => {
                s.id = None;
                s.title = None;
            }
        }
        self
    }

    /// Returns the declared default for this node, if any.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            SchemaNode::String(s) => s.default.as_ref(),
            SchemaNode::Number(s)
            | SchemaNode::Integer(s)
            | SchemaNode::Boolean(s)
            | SchemaNode::Date(s) => s.default.as_ref(),
            SchemaNode::Enum(s) => s.default.as_ref(),
            SchemaNode::Array(s) => s.default.as_ref(),
            SchemaNode::Object(_) => None,
        }
    }

    /// Reads the legacy per-property required flag.
    pub fn required_flag(&self) -> bool {
        match self {
            SchemaNode::String(s) => s.required,
            SchemaNode::Number(s)
            | SchemaNode::Integer(s)
            | SchemaNode::Boolean(s)
            | SchemaNode::Date(s) => s.required,
            SchemaNode::Enum(s) => s.required,
            SchemaNode::Array(s) => s.required,
            SchemaNode::Object(s) => matches!(s.required, Some(RequiredSpec::Flag(true))),
        }
    }

    /// Converts a schema tree still using the legacy per-property
    /// required flags into the canonical required-name-set form.
    ///
    /// Fails when one object node carries a name set *and* one of its
    /// properties carries the legacy flag, since the two policies are
    /// mutually exclusive per schema version.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::{RequiredSpec, SchemaNode};
    ///
    /// let legacy = SchemaNode::object([
    ///     ("id", SchemaNode::number().require()),
    ///     ("name", SchemaNode::string()),
    /// ]);
    ///
    /// let canonical = legacy.adopt_legacy_required().unwrap();
    /// if let SchemaNode::Object(object) = &canonical {
    ///     assert_eq!(
    ///         object.required,
    ///         Some(RequiredSpec::Names(["id".to_string()].into())),
    ///     );
    ///     assert!(!object.properties["id"].required_flag());
    /// }
    /// ```
    pub fn adopt_legacy_required(self) -> Result<SchemaNode, SchemaError> {
        let mut path = Vec::new();
        adopt(self, &mut path)
    }

    /// Parses a schema tree from JSON text.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_shape_core::SchemaNode;
    ///
    /// let schema = SchemaNode::from_json_str(
    ///     r#"{"type": "object", "properties": {"id": {"type": "number"}}, "required": ["id"]}"#,
    /// )
    /// .unwrap();
    /// assert!(matches!(schema, SchemaNode::Object(_)));
    /// ```
    pub fn from_json_str(text: &str) -> Result<SchemaNode, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a schema tree from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<SchemaNode, SchemaError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serializes this schema tree as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn adopt(node: SchemaNode, path: &mut Vec<String>) -> Result<SchemaNode, SchemaError> {
    match node {
        SchemaNode::Object(mut object) => {
            let has_names = matches!(object.required, Some(RequiredSpec::Names(_)));
            let mut names: BTreeSet<String> = match &object.required {
                Some(RequiredSpec::Names(names)) => names.clone(),
                _ => BTreeSet::new(),
            };

            let properties = std::mem::take(&mut object.properties);
            for (name, property) in properties {
                if property.required_flag() {
                    if has_names {
                        return Err(SchemaError::MixedRequiredPolicy {
                            path: render_path(path),
                            property: name,
                        });
                    }
                    names.insert(name.clone());
                }
                path.push(name.clone());
                let converted = adopt(clear_required_flag(property), path)?;
                path.pop();
                object.properties.insert(name, converted);
            }

            object.required = if names.is_empty() && !has_names {
                None
            } else {
                Some(RequiredSpec::Names(names))
            };
            Ok(SchemaNode::Object(object))
        }
        SchemaNode::Array(mut array) => {
            path.push("[]".to_string());
            let items = adopt(*array.items, path)?;
            path.pop();
            array.items = Box::new(items);
            Ok(SchemaNode::Array(array))
        }
        leaf => Ok(leaf),
    }
}

fn clear_required_flag(mut node: SchemaNode) -> SchemaNode {
    match &mut node {
        SchemaNode::String(s) => s.required = false,
        SchemaNode::Number(s)
        | SchemaNode::Integer(s)
        | SchemaNode::Boolean(s)
        | SchemaNode::Date(s) => s.required = false,
        SchemaNode::Enum(s) => s.required = false,
        SchemaNode::Array(s) => s.required = false,
        SchemaNode::Object(s) => {
            if matches!(s.required, Some(RequiredSpec::Flag(_))) {
                s.required = None;
            }
        }
    }
    node
}

fn render_path(path: &[String]) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        format!("$.{}", path.join("."))
    }
}
