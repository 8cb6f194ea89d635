//! The reconciliation engine - proves that local model descriptors match
//! the canonical schema, field by field and value by value.
//!
//! Each `reconcile_*` call is an independent, side-effect-free check; the
//! only shared state is the read-only session cache. Naming and lookup
//! failures abort a call with a [`ReconcileError`]; field- and value-level
//! disagreements come back as [`Violation`]s inside the report.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::{SchemaCatalog, Session};
use crate::embedded::ScalarType;
use crate::error::{ReconcileError, Violation};
use crate::model::{
    EntityDescriptor, EnumDescriptor, ModelCluster, ModelType, PropertyDescriptor, PropertyType,
    Restriction,
};
use crate::naming::{to_pascal_case, validate_entity_name, validate_enum_name};
use crate::schema::{AttributeType, EntityField, EntityType, EnumField, EnumType};

/// How violations are gathered within one reconciliation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Gather every violation (test-suite consumers).
    #[default]
    CollectAll,
    /// Stop at the first violation (fail-fast consumers).
    FailFast,
}

/// Outcome of reconciling one local type.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Local type name the report is about.
    pub subject: String,
    /// Canonical name the type was checked against.
    pub remote_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl Report {
    /// True when the local type matched the canonical schema exactly.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

struct Collector {
    mode: ReportMode,
    violations: Vec<Violation>,
}

impl Collector {
    fn new(mode: ReportMode) -> Self {
        Self {
            mode,
            violations: Vec::new(),
        }
    }

    fn push(&mut self, violation: Violation) {
        if !self.full() {
            self.violations.push(violation);
        }
    }

    // In fail-fast mode one violation is enough.
    fn full(&self) -> bool {
        self.mode == ReportMode::FailFast && !self.violations.is_empty()
    }
}

/// Reconciles local descriptors against a canonical catalog.
///
/// Owns a [`Session`] cache, so the catalog is bulk-fetched at most once
/// over the reconciler's lifetime. Construct a fresh reconciler to start a
/// fresh session.
pub struct Reconciler<C> {
    session: Session<C>,
    mode: ReportMode,
}

impl<C: SchemaCatalog> Reconciler<C> {
    /// Create a reconciler in collect-all mode (default).
    pub fn new(catalog: C) -> Self {
        Self {
            session: Session::new(catalog),
            mode: ReportMode::default(),
        }
    }

    /// Set the violation gathering mode.
    pub fn mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reconcile a local entity type against its canonical descriptor.
    ///
    /// In strict mode every canonical field must have a local counterpart;
    /// in lenient mode only canonical fields marked mandatory must. The
    /// reverse check - no local property without a canonical counterpart -
    /// always runs.
    ///
    /// # Errors
    ///
    /// Fails without producing a report when the model is not an entity
    /// bound to a canonical name, the name is malformed, the metaclass is
    /// unknown server-side, or the canonical descriptor is internally
    /// inconsistent.
    pub fn reconcile_entity(
        &self,
        model: &ModelType,
        strict: bool,
    ) -> Result<Report, ReconcileError> {
        let ModelType::Entity(entity) = model else {
            return Err(ReconcileError::NotAnEntityType {
                type_name: model.name().to_string(),
            });
        };
        self.reconcile_entity_descriptor(entity, strict)
    }

    fn reconcile_entity_descriptor(
        &self,
        entity: &EntityDescriptor,
        strict: bool,
    ) -> Result<Report, ReconcileError> {
        let Some(remote_name) = entity.remote_name.as_deref() else {
            return Err(ReconcileError::NotAnEntityType {
                type_name: entity.name.clone(),
            });
        };
        validate_entity_name(remote_name)?;

        let canonical = self.session.entity_type(remote_name)?;
        check_entity_identity(&canonical, remote_name)?;

        let mut collector = Collector::new(self.mode);
        for field in &canonical.properties {
            if collector.full() {
                break;
            }
            check_field(entity, remote_name, field, strict, &mut collector)?;
        }

        // Reverse pass: every local property must map back to a canonical
        // field, regardless of strictness.
        let canonical_names: BTreeSet<String> = canonical
            .properties
            .iter()
            .map(|f| to_pascal_case(&f.name))
            .collect();
        for property in &entity.properties {
            if collector.full() {
                break;
            }
            if !canonical_names.contains(&property.name) {
                collector.push(Violation::UnknownLocalProperty {
                    entity: entity.name.clone(),
                    property: property.name.clone(),
                });
            }
        }

        Ok(Report {
            subject: entity.name.clone(),
            remote_name: remote_name.to_string(),
            violations: collector.violations,
        })
    }

    /// Reconcile a local enumeration against its canonical descriptor.
    ///
    /// Every canonical value must exist locally with a matching caption
    /// and, when the canonical id is numeric, a matching underlying value;
    /// every local value must exist canonically.
    ///
    /// # Errors
    ///
    /// Fails without producing a report when the model is not an enum
    /// bound to a canonical name, the name is malformed, or the enum is
    /// unknown server-side.
    pub fn reconcile_enum(&self, model: &ModelType) -> Result<Report, ReconcileError> {
        let ModelType::Enum(local) = model else {
            return Err(ReconcileError::NotAnEnum {
                type_name: model.name().to_string(),
            });
        };
        self.reconcile_enum_descriptor(local)
    }

    fn reconcile_enum_descriptor(&self, local: &EnumDescriptor) -> Result<Report, ReconcileError> {
        let Some(remote_name) = local.remote_name.as_deref() else {
            return Err(ReconcileError::NotAnEnum {
                type_name: local.name.clone(),
            });
        };
        validate_enum_name(remote_name)?;

        let canonical = self.session.enum_type(remote_name)?;
        check_enum_identity(&canonical, remote_name)?;

        let mut collector = Collector::new(self.mode);
        for value in &canonical.values {
            if collector.full() {
                break;
            }
            check_enum_value(local, value, &mut collector);
        }

        let canonical_names: BTreeSet<&str> =
            canonical.values.iter().map(|v| v.name.as_str()).collect();
        for value in &local.values {
            if collector.full() {
                break;
            }
            if !canonical_names.contains(value.name.as_str()) {
                collector.push(Violation::UnknownLocalEnumValue {
                    enumeration: local.name.clone(),
                    value: value.name.clone(),
                });
            }
        }

        Ok(Report {
            subject: local.name.clone(),
            remote_name: remote_name.to_string(),
            violations: collector.violations,
        })
    }

    /// Reconcile every bound type in a cluster.
    ///
    /// Types without a canonical binding are skipped; a cluster with none
    /// at all is a caller error.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::NoMappedTypesFound` for an empty cluster;
    /// otherwise the first per-type fatal error aborts the run.
    pub fn reconcile_cluster(
        &self,
        cluster: &ModelCluster,
        strict: bool,
    ) -> Result<Vec<Report>, ReconcileError> {
        let bound: Vec<&ModelType> = cluster.types.iter().filter(|t| t.is_bound()).collect();
        if bound.is_empty() {
            return Err(ReconcileError::NoMappedTypesFound {
                cluster: cluster.name.clone(),
            });
        }

        let mut reports = Vec::with_capacity(bound.len());
        for model in bound {
            let report = match model {
                ModelType::Entity(entity) => self.reconcile_entity_descriptor(entity, strict)?,
                ModelType::Enum(e) => self.reconcile_enum_descriptor(e)?,
            };
            reports.push(report);
        }
        Ok(reports)
    }
}

/// Defends against a misbehaving remote returning the wrong record.
fn check_entity_identity(canonical: &EntityType, requested: &str) -> Result<(), ReconcileError> {
    if canonical.entity_name.is_empty() {
        return Err(ReconcileError::SchemaIntegrity {
            name: requested.to_string(),
            message: "canonical descriptor has an empty entity name".to_string(),
        });
    }
    if canonical.entity_name != requested {
        return Err(ReconcileError::SchemaIntegrity {
            name: requested.to_string(),
            message: format!(
                "canonical descriptor reports entity name {} for requested {}",
                canonical.entity_name, requested
            ),
        });
    }
    Ok(())
}

fn check_enum_identity(canonical: &EnumType, requested: &str) -> Result<(), ReconcileError> {
    if canonical.name.is_empty() {
        return Err(ReconcileError::SchemaIntegrity {
            name: requested.to_string(),
            message: "canonical descriptor has an empty enum name".to_string(),
        });
    }
    if canonical.name != requested {
        return Err(ReconcileError::SchemaIntegrity {
            name: requested.to_string(),
            message: format!(
                "canonical descriptor reports enum name {} for requested {}",
                canonical.name, requested
            ),
        });
    }
    Ok(())
}

fn check_field(
    entity: &EntityDescriptor,
    remote_name: &str,
    field: &EntityField,
    strict: bool,
    out: &mut Collector,
) -> Result<(), ReconcileError> {
    // Canonical-side invariant, independent of the local type.
    if field.persistent && field.transient {
        return Err(ReconcileError::SchemaIntegrity {
            name: remote_name.to_string(),
            message: format!("field {} is both persistent and transient", field.name),
        });
    }

    let local_name = to_pascal_case(&field.name);
    let Some(property) = entity.find(&local_name) else {
        if strict || field.mandatory {
            out.push(Violation::MissingPropertyMapping {
                entity: entity.name.clone(),
                field: field.name.clone(),
                property: local_name,
            });
        }
        // Lenient mode tolerates an intentionally omitted optional field.
        return Ok(());
    };

    for marker in Restriction::ALL {
        let expected = marker.canonical_flag(field);
        if property.has_marker(marker) != expected {
            out.push(Violation::RestrictionMismatch {
                entity: entity.name.clone(),
                property: property.name.clone(),
                marker,
                expected,
            });
        }
    }

    match &property.description {
        None => out.push(Violation::MissingDescription {
            entity: entity.name.clone(),
            property: property.name.clone(),
        }),
        Some(text) if *text != field.description => out.push(Violation::DescriptionMismatch {
            entity: entity.name.clone(),
            property: property.name.clone(),
            expected: field.description.clone(),
            actual: text.clone(),
        }),
        Some(_) => {}
    }

    let many = field.cardinality.is_many();
    if property.collection != many {
        out.push(Violation::CardinalityMismatch {
            entity: entity.name.clone(),
            field: field.name.clone(),
            cardinality: field.cardinality,
            collection_expected: many,
        });
    }

    check_field_type(entity, field, property, many, out);
    Ok(())
}

fn check_field_type(
    entity: &EntityDescriptor,
    field: &EntityField,
    property: &PropertyDescriptor,
    many: bool,
    out: &mut Collector,
) {
    match field.attribute_type {
        AttributeType::Scalar => {
            if many {
                out.push(Violation::NotImplemented {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                });
                return;
            }
            let Some(expected) = ScalarType::resolve(&field.type_name) else {
                out.push(Violation::UnsupportedEmbeddedType {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                    wire_type: field.type_name.clone(),
                });
                return;
            };
            if property.property_type != PropertyType::Scalar(expected) {
                out.push(Violation::TypeMismatch {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                    expected: expected.to_string(),
                    actual: property.property_type.to_string(),
                });
            }
        }
        AttributeType::Association | AttributeType::Composition | AttributeType::Enum => {
            // References are compared by canonical name; the referenced
            // type's own schema is never re-fetched here.
            if property.property_type.remote_name() != Some(field.type_name.as_str()) {
                out.push(Violation::TypeMismatch {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                    expected: field.type_name.clone(),
                    actual: property.property_type.to_string(),
                });
            }
        }
    }
}

fn check_enum_value(local: &EnumDescriptor, canonical: &EnumField, out: &mut Collector) {
    let Some(value) = local.find(&canonical.name) else {
        out.push(Violation::MissingEnumValue {
            enumeration: local.name.clone(),
            value: canonical.name.clone(),
        });
        return;
    };

    // An unannotated local constant compares as an empty caption.
    let caption = value.caption.as_deref().unwrap_or("");
    if caption != canonical.caption {
        out.push(Violation::CaptionMismatch {
            enumeration: local.name.clone(),
            value: value.name.clone(),
            expected: canonical.caption.clone(),
            actual: caption.to_string(),
        });
    }

    // The numeric check only applies when the canonical id is a number.
    if let Ok(expected) = canonical.id.parse::<i64>() {
        if value.number != Some(expected) {
            out.push(Violation::NumericValueMismatch {
                enumeration: local.name.clone(),
                value: value.name.clone(),
                expected,
                actual: value.number,
            });
        }
    }
}
