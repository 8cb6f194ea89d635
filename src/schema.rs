//! Canonical schema model - entity and enum metadata as the server reports it.
//!
//! These types deserialize directly from the metadata endpoints' camelCase
//! JSON. They are immutable snapshots; the session cache clones them out
//! and nothing in the engine mutates them.

use serde::{Deserialize, Serialize};

/// Kind of a canonical entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    /// Wire-level scalar backed by an embedded type.
    #[serde(alias = "DATATYPE")]
    Scalar,
    Association,
    Composition,
    Enum,
}

/// Relationship shape of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    #[default]
    None,
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// True for the collection-valued cardinalities.
    pub fn is_many(self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Cardinality::None => "NONE",
            Cardinality::OneToOne => "ONE_TO_ONE",
            Cardinality::OneToMany => "ONE_TO_MANY",
            Cardinality::ManyToOne => "MANY_TO_ONE",
            Cardinality::ManyToMany => "MANY_TO_MANY",
        };
        f.write_str(text)
    }
}

/// One attribute of a canonical entity descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityField {
    /// Lower-camel wire name (`createTs`).
    pub name: String,
    pub attribute_type: AttributeType,
    /// Embedded type identifier for scalars; canonical entity or enum name
    /// for references.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub transient: bool,
    #[serde(default)]
    pub description: String,
}

/// Canonical entity descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    /// Canonical metaclass identifier (`sys$Config`), unique within a
    /// catalog snapshot.
    pub entity_name: String,
    #[serde(default)]
    pub properties: Vec<EntityField>,
}

/// One value of a canonical enum descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumField {
    /// Server-side identifier; may or may not parse as an integer.
    pub id: String,
    /// Symbolic constant name.
    pub name: String,
    #[serde(default)]
    pub caption: String,
}

/// Canonical enum descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumField>,
}
