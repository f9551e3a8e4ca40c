//! Schema loading and conversion errors.
//!
//! The transform engines themselves are total: coercion failures surface
//! as value-level sentinels (NaN numbers, omitted fields, null collapse),
//! never as errors. [`SchemaError`] covers only the edges where schema
//! descriptions enter the system — parsing schema text and converting
//! legacy required policies.

use thiserror::Error;

/// Errors raised while loading or converting schema descriptions.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema JSON text failed to parse.
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Schema YAML text failed to parse.
    #[error("invalid schema YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// An object node mixes the required-name-set policy with a legacy
    /// per-property required flag.
    #[error(
        "mixed required policies at {path}: object declares a required-name set \
         while property '{property}' carries a legacy required flag"
    )]
    MixedRequiredPolicy {
        /// Dotted path of the object node (`$` is the root).
        path: String,
        /// Name of the property carrying the legacy flag.
        property: String,
    },
}
