//! Local model descriptors - the client-declared approximation of the
//! canonical schema.
//!
//! Instead of runtime reflection, every mapped local type carries an
//! explicit descriptor: its canonical name binding plus per-property
//! metadata (declared type, restriction markers, description, collection
//! shape). Descriptors are plain data; they can be declared in code with
//! the builder methods or loaded from a JSON manifest.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::embedded::ScalarType;
use crate::error::CatalogError;
use crate::schema::EntityField;

/// The closed set of restriction markers checked during reconciliation.
///
/// Each marker's presence on a local property must equal the matching
/// boolean flag on the canonical field. The canonical `persistent` flag is
/// deliberately not in this set: it has no local marker and is only
/// involved in the persistent/transient integrity invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    Mandatory,
    ReadOnly,
    Transient,
}

impl Restriction {
    pub const ALL: [Restriction; 3] = [
        Restriction::Mandatory,
        Restriction::ReadOnly,
        Restriction::Transient,
    ];

    /// The matching boolean flag on a canonical field.
    pub fn canonical_flag(self, field: &EntityField) -> bool {
        match self {
            Restriction::Mandatory => field.mandatory,
            Restriction::ReadOnly => field.read_only,
            Restriction::Transient => field.transient,
        }
    }
}

impl std::fmt::Display for Restriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Restriction::Mandatory => "mandatory",
            Restriction::ReadOnly => "read-only",
            Restriction::Transient => "transient",
        };
        f.write_str(text)
    }
}

/// Declared type of a local property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// A primitive/value type from the embedded registry.
    Scalar(ScalarType),
    /// Reference to another mapped entity, by its canonical name.
    Entity(String),
    /// Reference to a mapped enum, by its canonical name.
    Enumeration(String),
}

impl PropertyType {
    /// Canonical name of the referenced type; `None` for scalars.
    pub fn remote_name(&self) -> Option<&str> {
        match self {
            PropertyType::Entity(name) | PropertyType::Enumeration(name) => Some(name),
            PropertyType::Scalar(_) => None,
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Scalar(scalar) => scalar.fmt(f),
            PropertyType::Entity(name) | PropertyType::Enumeration(name) => f.write_str(name),
        }
    }
}

/// One declared property of a local entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Local PascalCase property name.
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Collection-shaped (Vec-valued) property; the element type is the
    /// underlying type used for comparison.
    #[serde(default)]
    pub collection: bool,
    /// Human-readable description. Required on every mapped property; its
    /// absence is reported, not silently skipped.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub transient: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            collection: false,
            description: None,
            mandatory: false,
            read_only: false,
            transient: false,
        }
    }

    /// Set the description text.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Declare the property collection-shaped.
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Attach a restriction marker.
    pub fn mark(mut self, marker: Restriction) -> Self {
        match marker {
            Restriction::Mandatory => self.mandatory = true,
            Restriction::ReadOnly => self.read_only = true,
            Restriction::Transient => self.transient = true,
        }
        self
    }

    /// Whether the property carries the given restriction marker.
    pub fn has_marker(&self, marker: Restriction) -> bool {
        match marker {
            Restriction::Mandatory => self.mandatory,
            Restriction::ReadOnly => self.read_only,
            Restriction::Transient => self.transient,
        }
    }
}

/// Local entity descriptor: canonical binding plus declared properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Local type name, used in diagnostics (`Std.Produce`).
    pub name: String,
    /// Canonical metaclass name the type is bound to. `None` means the
    /// type carries no binding and cannot be reconciled.
    #[serde(default)]
    pub remote_name: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>, remote_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_name: Some(remote_name.into()),
            properties: Vec::new(),
        }
    }

    /// A descriptor with no canonical binding.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_name: None,
            properties: Vec::new(),
        }
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn find(&self, local_name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == local_name)
    }
}

/// One declared value of a local enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    /// Symbolic constant name (`ACTIVE`).
    pub name: String,
    /// Underlying numeric value, when the constant has one.
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl EnumValueDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: None,
            caption: None,
        }
    }

    pub fn number(mut self, number: i64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Local enum descriptor: canonical binding plus declared values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    pub name: String,
    #[serde(default)]
    pub remote_name: Option<String>,
    #[serde(default)]
    pub values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, remote_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_name: Some(remote_name.into()),
            values: Vec::new(),
        }
    }

    /// A descriptor with no canonical binding.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_name: None,
            values: Vec::new(),
        }
    }

    pub fn value(mut self, value: EnumValueDescriptor) -> Self {
        self.values.push(value);
        self
    }

    pub fn find(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// A local type that may be reconciled - entity or enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelType {
    Entity(EntityDescriptor),
    Enum(EnumDescriptor),
}

impl ModelType {
    /// Local type name, used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            ModelType::Entity(e) => &e.name,
            ModelType::Enum(e) => &e.name,
        }
    }

    /// Canonical name the type is bound to, if any.
    pub fn remote_name(&self) -> Option<&str> {
        match self {
            ModelType::Entity(e) => e.remote_name.as_deref(),
            ModelType::Enum(e) => e.remote_name.as_deref(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.remote_name().is_some()
    }
}

/// A named group of local types checked together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCluster {
    pub name: String,
    #[serde(default)]
    pub types: Vec<ModelType>,
}

impl ModelCluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    pub fn with(mut self, model: ModelType) -> Self {
        self.types.push(model);
        self
    }

    /// Load a cluster manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FileNotFound` if the file doesn't exist,
    /// `ReadError` on IO failure, or `InvalidJson` on malformed content.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content =
            std::fs::read_to_string(path).map_err(|source| CatalogError::ReadError {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| CatalogError::InvalidJson { source })
    }
}
