//! Metadrift
//!
//! Schema reconciliation for clients of a business-object server.
//!
//! A client declares descriptors for its local data model - entities bound
//! to canonical metaclass names, enums bound to canonical enum names - and
//! the engine proves them equivalent to the metadata the server actually
//! serves: property by property, restriction by restriction, value by
//! value. Disagreements come back as structured violations; broken
//! collaborators and malformed bindings fail hard with a classified error.
//!
//! # Example
//!
//! ```
//! use metadrift::{
//!     CatalogSnapshot, EntityDescriptor, ModelType, PropertyDescriptor, PropertyType,
//!     Reconciler, Restriction, ScalarType, SnapshotCatalog,
//! };
//! use serde_json::json;
//!
//! let snapshot: CatalogSnapshot = serde_json::from_value(json!({
//!     "entities": [{
//!         "entityName": "sys$Config",
//!         "properties": [{
//!             "name": "name",
//!             "attributeType": "SCALAR",
//!             "type": "string",
//!             "mandatory": true,
//!             "persistent": true,
//!             "description": "Name"
//!         }]
//!     }]
//! }))
//! .unwrap();
//!
//! let config = ModelType::Entity(
//!     EntityDescriptor::new("Config", "sys$Config").property(
//!         PropertyDescriptor::new("Name", PropertyType::Scalar(ScalarType::String))
//!             .description("Name")
//!             .mark(Restriction::Mandatory),
//!     ),
//! );
//!
//! let engine = Reconciler::new(SnapshotCatalog::new(snapshot));
//! let report = engine.reconcile_entity(&config, true).unwrap();
//! assert!(report.is_clean());
//! ```
//!
//! # Strict and lenient modes
//!
//! | Check | Strict | Lenient |
//! |-------|--------|---------|
//! | Canonical field missing locally | violation | violation only if mandatory |
//! | Local property unknown canonically | violation | violation |
//! | Restriction / type / description drift | violation | violation |
//!
//! # Catalog sources
//!
//! Any [`SchemaCatalog`] works: [`SnapshotCatalog`] reads a JSON snapshot
//! (the `metadrift pull` output), `HttpCatalog` (feature `remote`, on by
//! default) talks to the live metadata endpoints. The [`Reconciler`] caches
//! the catalog per session, so a whole cluster costs one bulk fetch.

mod catalog;
mod embedded;
mod error;
mod model;
mod naming;
mod reconcile;
mod schema;

#[cfg(feature = "remote")]
mod client;

pub use catalog::{CatalogSnapshot, SchemaCatalog, Session, SnapshotCatalog};
pub use embedded::{ScalarType, EMBEDDED_TYPES};
pub use error::{CatalogError, NameRule, ReconcileError, Violation};
pub use model::{
    EntityDescriptor, EnumDescriptor, EnumValueDescriptor, ModelCluster, ModelType,
    PropertyDescriptor, PropertyType, Restriction,
};
pub use naming::{split_name, to_pascal_case, validate_entity_name, validate_enum_name};
pub use reconcile::{Reconciler, Report, ReportMode};
pub use schema::{AttributeType, Cardinality, EntityField, EntityType, EnumField, EnumType};

#[cfg(feature = "remote")]
pub use client::HttpCatalog;
