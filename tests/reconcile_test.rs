//! End-to-end reconciliation tests against an in-memory catalog.

use metadrift::{
    CatalogSnapshot, EntityDescriptor, EnumDescriptor, EnumValueDescriptor, ModelCluster,
    ModelType, PropertyDescriptor, PropertyType, ReconcileError, Reconciler, ReportMode,
    Restriction, ScalarType, SnapshotCatalog, Violation,
};
use serde_json::json;

/// Catalog with a platform-shaped `sys$Config` entity and one enum.
fn catalog() -> SnapshotCatalog {
    let snapshot: CatalogSnapshot = serde_json::from_value(json!({
        "entities": [{
            "entityName": "sys$Config",
            "properties": [
                {
                    "name": "id",
                    "attributeType": "SCALAR",
                    "type": "uuid",
                    "mandatory": true,
                    "readOnly": true,
                    "persistent": true,
                    "description": "Identifier"
                },
                {
                    "name": "createTs",
                    "attributeType": "SCALAR",
                    "type": "dateTime",
                    "readOnly": true,
                    "persistent": true,
                    "description": "Created at"
                },
                {
                    "name": "createdBy",
                    "attributeType": "SCALAR",
                    "type": "string",
                    "readOnly": true,
                    "persistent": true,
                    "description": "Created by"
                },
                {
                    "name": "name",
                    "attributeType": "SCALAR",
                    "type": "string",
                    "mandatory": true,
                    "persistent": true,
                    "description": "Name"
                },
                {
                    "name": "updateTs",
                    "attributeType": "SCALAR",
                    "type": "dateTime",
                    "readOnly": true,
                    "persistent": true,
                    "description": "Updated at"
                },
                {
                    "name": "updatedBy",
                    "attributeType": "SCALAR",
                    "type": "string",
                    "readOnly": true,
                    "persistent": true,
                    "description": "Updated by"
                },
                {
                    "name": "value",
                    "attributeType": "SCALAR",
                    "type": "string",
                    "persistent": true,
                    "description": "Value"
                },
                {
                    "name": "version",
                    "attributeType": "SCALAR",
                    "type": "int",
                    "readOnly": true,
                    "persistent": true,
                    "description": "Version"
                }
            ]
        }],
        "enums": [{
            "name": "sys$SendingStatus",
            "values": [
                { "id": "0", "name": "QUEUE", "caption": "In queue" },
                { "id": "2", "name": "SENDING", "caption": "Sending" },
                { "id": "3", "name": "SENT", "caption": "Sent" }
            ]
        }]
    }))
    .unwrap();
    SnapshotCatalog::new(snapshot)
}

fn scalar(name: &str, scalar: ScalarType, description: &str) -> PropertyDescriptor {
    PropertyDescriptor::new(name, PropertyType::Scalar(scalar)).description(description)
}

fn set_description(entity: &mut EntityDescriptor, property: &str, text: Option<&str>) {
    let property = entity
        .properties
        .iter_mut()
        .find(|p| p.name == property)
        .unwrap();
    property.description = text.map(str::to_string);
}

/// A local `Config` descriptor mirroring the catalog fixture exactly.
fn config_entity() -> EntityDescriptor {
    EntityDescriptor::new("Config", "sys$Config")
        .property(
            scalar("Id", ScalarType::Uuid, "Identifier")
                .mark(Restriction::Mandatory)
                .mark(Restriction::ReadOnly),
        )
        .property(scalar("CreateTs", ScalarType::DateTime, "Created at").mark(Restriction::ReadOnly))
        .property(scalar("CreatedBy", ScalarType::String, "Created by").mark(Restriction::ReadOnly))
        .property(scalar("Name", ScalarType::String, "Name").mark(Restriction::Mandatory))
        .property(scalar("UpdateTs", ScalarType::DateTime, "Updated at").mark(Restriction::ReadOnly))
        .property(scalar("UpdatedBy", ScalarType::String, "Updated by").mark(Restriction::ReadOnly))
        .property(scalar("Value", ScalarType::String, "Value"))
        .property(scalar("Version", ScalarType::Int, "Version").mark(Restriction::ReadOnly))
}

fn sending_status() -> EnumDescriptor {
    EnumDescriptor::new("SendingStatus", "sys$SendingStatus")
        .value(EnumValueDescriptor::new("QUEUE").number(0).caption("In queue"))
        .value(EnumValueDescriptor::new("SENDING").number(2).caption("Sending"))
        .value(EnumValueDescriptor::new("SENT").number(3).caption("Sent"))
}

#[test]
fn exact_mirror_is_clean_in_both_modes() {
    let engine = Reconciler::new(catalog());
    let model = ModelType::Entity(config_entity());

    let strict = engine.reconcile_entity(&model, true).unwrap();
    assert!(strict.is_clean(), "strict: {:?}", strict.violations);

    let lenient = engine.reconcile_entity(&model, false).unwrap();
    assert!(lenient.is_clean(), "lenient: {:?}", lenient.violations);
}

#[test]
fn omitted_optional_field_fails_only_strict_mode() {
    let engine = Reconciler::new(catalog());
    // Drop the optional "Value" property.
    let mut entity = config_entity();
    entity.properties.retain(|p| p.name != "Value");
    let model = ModelType::Entity(entity);

    let lenient = engine.reconcile_entity(&model, false).unwrap();
    assert!(lenient.is_clean(), "lenient: {:?}", lenient.violations);

    let strict = engine.reconcile_entity(&model, true).unwrap();
    assert_eq!(strict.violations.len(), 1);
    assert!(matches!(
        &strict.violations[0],
        Violation::MissingPropertyMapping { field, property, .. }
            if field == "value" && property == "Value"
    ));
}

#[test]
fn omitted_mandatory_field_fails_both_modes() {
    let engine = Reconciler::new(catalog());
    let mut entity = config_entity();
    entity.properties.retain(|p| p.name != "Name");
    let model = ModelType::Entity(entity);

    for strict in [false, true] {
        let report = engine.reconcile_entity(&model, strict).unwrap();
        assert_eq!(report.violations.len(), 1, "strict={}", strict);
        assert!(matches!(
            &report.violations[0],
            Violation::MissingPropertyMapping { field, .. } if field == "name"
        ));
    }
}

#[test]
fn description_drift_is_attributed_to_the_property() {
    let engine = Reconciler::new(catalog());
    let mut entity = config_entity();
    set_description(&mut entity, "Name", Some("Config name"));
    let model = ModelType::Entity(entity);

    let report = engine.reconcile_entity(&model, true).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert!(matches!(
        &report.violations[0],
        Violation::DescriptionMismatch { property, expected, actual, .. }
            if property == "Name" && expected == "Name" && actual == "Config name"
    ));
}

#[test]
fn undocumented_property_is_reported() {
    let engine = Reconciler::new(catalog());
    let mut entity = config_entity();
    set_description(&mut entity, "Value", None);
    let model = ModelType::Entity(entity);

    let report = engine.reconcile_entity(&model, true).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert!(matches!(
        &report.violations[0],
        Violation::MissingDescription { property, .. } if property == "Value"
    ));
}

#[test]
fn extra_local_property_is_reported_in_lenient_mode_too() {
    let engine = Reconciler::new(catalog());
    let entity = config_entity().property(scalar("Legacy", ScalarType::String, "Legacy"));
    let model = ModelType::Entity(entity);

    let report = engine.reconcile_entity(&model, false).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert!(matches!(
        &report.violations[0],
        Violation::UnknownLocalProperty { property, .. } if property == "Legacy"
    ));
}

#[test]
fn scalar_type_drift_is_reported() {
    let engine = Reconciler::new(catalog());
    let mut entity = config_entity();
    let version = entity
        .properties
        .iter_mut()
        .find(|p| p.name == "Version")
        .unwrap();
    *version = scalar("Version", ScalarType::Long, "Version").mark(Restriction::ReadOnly);
    let model = ModelType::Entity(entity);

    let report = engine.reconcile_entity(&model, true).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert!(matches!(
        &report.violations[0],
        Violation::TypeMismatch { field, expected, actual, .. }
            if field == "version" && expected == "int" && actual == "long"
    ));
}

#[test]
fn reconciler_is_idempotent_over_a_session() {
    let engine = Reconciler::new(catalog());
    let model = ModelType::Entity(config_entity());
    let first = engine.reconcile_entity(&model, true).unwrap();
    let second = engine.reconcile_entity(&model, true).unwrap();
    assert!(first.is_clean());
    assert!(second.is_clean());
}

#[test]
fn enum_mirror_is_clean() {
    let engine = Reconciler::new(catalog());
    let report = engine
        .reconcile_enum(&ModelType::Enum(sending_status()))
        .unwrap();
    assert!(report.is_clean(), "unexpected: {:?}", report.violations);
}

#[test]
fn enum_numeric_drift_names_the_value() {
    let engine = Reconciler::new(catalog());
    let mut local = sending_status();
    local.values[1].number = Some(1);
    let report = engine.reconcile_enum(&ModelType::Enum(local)).unwrap();
    assert_eq!(report.violations.len(), 1);
    assert!(matches!(
        &report.violations[0],
        Violation::NumericValueMismatch { value, expected: 2, actual: Some(1), .. }
            if value == "SENDING"
    ));
}

#[test]
fn unknown_names_abort_with_classified_errors() {
    let engine = Reconciler::new(catalog());

    let entity = ModelType::Entity(EntityDescriptor::new("Order", "sales$Order"));
    let err = engine.reconcile_entity(&entity, false).unwrap_err();
    assert!(matches!(err, ReconcileError::MetaclassNotFound { ref name } if name == "sales$Order"));
    assert_eq!(err.exit_code(), 2);

    let local = ModelType::Enum(EnumDescriptor::new("OrderStatus", "sales$OrderStatus"));
    let err = engine.reconcile_enum(&local).unwrap_err();
    assert!(matches!(err, ReconcileError::EnumNotFound { .. }));
}

#[test]
fn malformed_binding_reports_the_violated_rule() {
    let engine = Reconciler::new(catalog());
    let model = ModelType::Entity(EntityDescriptor::new("Config", "sys2$Config"));
    let err = engine.reconcile_entity(&model, false).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("sys2$Config"), "message: {message}");
    assert!(message.contains("prefix"), "message: {message}");
}

#[test]
fn cluster_checks_entities_and_enums_together() {
    let engine = Reconciler::new(catalog());
    let cluster = ModelCluster::new("sys")
        .with(ModelType::Entity(config_entity()))
        .with(ModelType::Enum(sending_status()))
        .with(ModelType::Entity(EntityDescriptor::unbound("Scratch")));

    let reports = engine.reconcile_cluster(&cluster, true).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.is_clean()));
}

#[test]
fn fail_fast_cluster_reports_at_most_one_violation_per_type() {
    let engine = Reconciler::new(catalog()).mode(ReportMode::FailFast);
    let mut entity = config_entity();
    set_description(&mut entity, "Name", Some("Config name"));
    set_description(&mut entity, "Value", None);
    let cluster = ModelCluster::new("sys").with(ModelType::Entity(entity));

    let reports = engine.reconcile_cluster(&cluster, true).unwrap();
    assert_eq!(reports[0].violations.len(), 1);
}

#[test]
fn report_serializes_violations_with_kind_tags() {
    let engine = Reconciler::new(catalog());
    let entity = config_entity().property(scalar("Legacy", ScalarType::String, "Legacy"));
    let report = engine
        .reconcile_entity(&ModelType::Entity(entity), false)
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["subject"], "Config");
    assert_eq!(json["remote_name"], "sys$Config");
    assert_eq!(json["violations"][0]["kind"], "unknown_local_property");
}
