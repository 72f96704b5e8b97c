//! Custom-attribute integration tests
//!
//! Attributes are discovered in the Pipes schema and realized against
//! classes declared both locally and in the Annotations schema.

use chrono::{TimeZone, Utc};
use ecschema::{
    ConstraintEnd, CustomAttributeProvider, Error, Result, SchemaContext, SchemaItemLookup,
    SchemaParser, Value,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn context() -> SchemaContext {
    let mut context = SchemaContext::new();
    for name in ["Pipes.ecschema.xml", "Annotations.ecschema.xml"] {
        context
            .add_schema(SchemaParser::from_file(fixture(name)).unwrap())
            .unwrap();
    }
    context
}

fn class_providers<'a>(parser: &'a SchemaParser, item: &str) -> Vec<CustomAttributeProvider<'a>> {
    let item = parser.find_item(item).unwrap().unwrap();
    parser
        .class_custom_attribute_providers(&item)
        .collect::<Result<_>>()
        .unwrap()
}

fn point(x: f64, y: f64) -> Value {
    let mut fields = IndexMap::new();
    fields.insert("X".to_string(), Value::Double(x));
    fields.insert("Y".to_string(), Value::Double(y));
    Value::Struct(fields)
}

#[test]
fn test_schema_level_attribute() {
    let context = context();
    let pipes = context.schema("Pipes").unwrap();
    let providers: Vec<_> = pipes
        .schema_custom_attribute_providers()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].class_name.to_string(), "Annotations.Owner");

    let owner = context.realize(&providers[0]).unwrap();
    assert_eq!(owner.get("Name"), Some(&Value::String("Hydraulics".into())));
    assert_eq!(
        owner.get("Since"),
        Some(&Value::DateTime(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()))
    );
}

#[test]
fn test_local_attribute_with_enum_point_and_structs() {
    let context = context();
    let pipes = context.schema("Pipes").unwrap();
    let providers = class_providers(pipes, "Valve");
    let names: Vec<_> = providers.iter().map(|p| p.class_name.to_string()).collect();
    assert_eq!(names, vec!["Annotations.Reviewed", "Pipes.PipeSpec"]);

    let spec = context.realize(&providers[1]).unwrap();
    assert_eq!(spec.class_name.to_string(), "Pipes.PipeSpec");
    assert_eq!(spec.get("Material"), Some(&Value::Int(2)));
    assert_eq!(spec.get("Rated"), Some(&Value::Bool(true)));
    assert_eq!(spec.get("Pressure"), Some(&Value::Int(16)));
    assert_eq!(spec.get("Origin"), Some(&Value::Point2d { x: 1.5, y: 2.5 }));
    assert_eq!(
        spec.get("Bends"),
        Some(&Value::Array(vec![point(0.0, 1.0), point(2.0, 3.0)]))
    );
}

#[test]
fn test_inherited_attribute_properties() {
    let context = context();
    let class = context
        .lookup_class(&ecschema::QualifiedName::new("Annotations", "Reviewed"))
        .unwrap()
        .unwrap();
    let names: Vec<_> = class.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["By", "Approved"]);

    let pipes = context.schema("Pipes").unwrap();
    let reviewed = context.realize(&class_providers(pipes, "Valve")[0]).unwrap();
    assert_eq!(reviewed.get("By"), Some(&Value::String("Design".into())));
    assert_eq!(reviewed.get("Approved"), None);
}

#[test]
fn test_is_mixin_is_not_a_provider() {
    let context = context();
    let pipes = context.schema("Pipes").unwrap();
    let providers = class_providers(pipes, "IInsulated");
    let names: Vec<_> = providers.iter().map(|p| p.class_name.to_string()).collect();
    assert_eq!(names, vec!["Annotations.Reviewed"]);
    let reviewed = context.realize(&providers[0]).unwrap();
    assert_eq!(reviewed.get("By"), Some(&Value::String("QA".into())));
}

#[test]
fn test_constraint_level_attribute() {
    let context = context();
    let pipes = context.schema("Pipes").unwrap();
    let rel = pipes.find_item("PipeHasValves").unwrap().unwrap();

    let target: Vec<_> = pipes
        .relationship_constraint_custom_attribute_providers(&rel, ConstraintEnd::Target)
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(target.len(), 1);
    let reviewed = context.realize(&target[0]).unwrap();
    assert_eq!(reviewed.get("By"), Some(&Value::String("Ops".into())));

    assert_eq!(
        pipes
            .relationship_constraint_custom_attribute_providers(&rel, ConstraintEnd::Source)
            .count(),
        0
    );
}

#[test]
fn test_realize_without_referenced_schema() {
    let mut context = SchemaContext::new();
    context
        .add_schema(SchemaParser::from_file(fixture("Pipes.ecschema.xml")).unwrap())
        .unwrap();
    let pipes = context.schema("Pipes").unwrap();
    let providers = class_providers(pipes, "Valve");

    let err = context.realize(&providers[0]).unwrap_err();
    assert!(matches!(err, Error::ClassNotFound(_)));
    assert_eq!(
        err.to_string(),
        "The custom attribute class 'Annotations.Reviewed' could not be found."
    );
    assert!(context.realize(&providers[1]).is_ok());
}

#[test]
fn test_instance_json() {
    let context = context();
    let pipes = context.schema("Pipes").unwrap();
    let spec = context.realize(&class_providers(pipes, "Valve")[1]).unwrap();
    let value = serde_json::to_value(&spec).unwrap();
    assert_eq!(value["className"], "Pipes.PipeSpec");
    assert_eq!(value["properties"]["Origin"], serde_json::json!({ "x": 1.5, "y": 2.5 }));
    assert_eq!(value["properties"]["Bends"][1]["Y"], serde_json::json!(3.0));
}
