//! Error types for catalog access and model reconciliation.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Restriction;
use crate::schema::Cardinality;

/// Which rule of a canonical naming grammar a malformed name violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameRule {
    MissingSeparator,
    Prefix,
    EntitySuffix,
    EnumSuffix,
}

impl std::fmt::Display for NameRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            NameRule::MissingSeparator => "missing '$' separator",
            NameRule::Prefix => "prefix must be a lowercase letter followed by letters",
            NameRule::EntitySuffix => {
                "suffix must be an uppercase letter followed by letters and digits"
            }
            NameRule::EnumSuffix => "suffix must be a letter followed by letters and digits",
        };
        f.write_str(text)
    }
}

/// Errors from the remote catalog collaborator or a local snapshot source.
#[derive(Debug, Error)]
pub enum CatalogError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Data errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog has no record of {name}")]
    NotFound { name: String },
}

impl CatalogError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } | Self::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            Self::Network { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors that abort a reconciliation before a report can be produced.
///
/// These indicate misconfiguration or a broken collaborator, never a
/// field-level drift; drifts are reported as [`Violation`]s instead.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid canonical name \"{name}\": {rule}")]
    InvalidFormat { name: String, rule: NameRule },

    #[error("metaclass not found: {name}")]
    MetaclassNotFound { name: String },

    #[error("enum not found: {name}")]
    EnumNotFound { name: String },

    #[error("schema integrity error for {name}: {message}")]
    SchemaIntegrity { name: String, message: String },

    #[error("{type_name} is not an entity type bound to a canonical name")]
    NotAnEntityType { type_name: String },

    #[error("{type_name} is not an enum bound to a canonical name")]
    NotAnEnum { type_name: String },

    #[error("cluster \"{cluster}\" contains no types bound to a canonical name")]
    NoMappedTypesFound { cluster: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ReconcileError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Catalog(e) => e.exit_code(),
            _ => 2,
        }
    }
}

/// A single field- or value-level drift between a local descriptor and the
/// canonical schema.
///
/// Violations never abort a reconciliation; they are gathered into the
/// report (all of them, or just the first in fail-fast mode). Every variant
/// carries enough context to attribute blame without re-running.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("{entity}: canonical field {field} has no local property {property}")]
    MissingPropertyMapping {
        entity: String,
        field: String,
        property: String,
    },

    #[error("{entity}.{property} is absent from the canonical schema")]
    UnknownLocalProperty { entity: String, property: String },

    #[error("{entity}.{property} {} carry the {marker} marker", if *expected { "must" } else { "must not" })]
    RestrictionMismatch {
        entity: String,
        property: String,
        marker: Restriction,
        expected: bool,
    },

    #[error("{entity}.{property} has no description")]
    MissingDescription { entity: String, property: String },

    #[error("{entity}.{property} description \"{actual}\" does not match canonical \"{expected}\"")]
    DescriptionMismatch {
        entity: String,
        property: String,
        expected: String,
        actual: String,
    },

    #[error("{entity}.{field}: canonical cardinality {cardinality} requires a {} local property", if *collection_expected { "collection-valued" } else { "single-valued" })]
    CardinalityMismatch {
        entity: String,
        field: String,
        cardinality: Cardinality,
        collection_expected: bool,
    },

    #[error("{entity}.{field}: canonical type {expected} does not match local type {actual}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("{entity}.{field}: embedded type \"{wire_type}\" is not supported")]
    UnsupportedEmbeddedType {
        entity: String,
        field: String,
        wire_type: String,
    },

    #[error("{entity}.{field}: scalar collections are not supported yet")]
    NotImplemented { entity: String, field: String },

    #[error("{enumeration}: canonical value {value} is missing from the local enum")]
    MissingEnumValue { enumeration: String, value: String },

    #[error("{enumeration}.{value} is absent from the canonical enum")]
    UnknownLocalEnumValue { enumeration: String, value: String },

    #[error("{enumeration}.{value} caption \"{actual}\" does not match canonical \"{expected}\"")]
    CaptionMismatch {
        enumeration: String,
        value: String,
        expected: String,
        actual: String,
    },

    #[error("{enumeration}.{value}: local numeric value {} does not match canonical id {expected}", match actual { Some(n) => n.to_string(), None => String::from("<unset>") })]
    NumericValueMismatch {
        enumeration: String,
        value: String,
        expected: i64,
        actual: Option<i64>,
    },
}
