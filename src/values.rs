//! Custom-attribute instance values
//!
//! Instance data is dynamically shaped: the property set is whatever the
//! attribute class declares. Each property element's text is coerced to a
//! [`Value`] according to its declared [`PropertyType`].

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::context::{ClassDefinition, PropertyType, SchemaItemLookup};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::QualifiedName;
use crate::primitives::PrimitiveType;
use crate::props::{EnumerationBackingType, EnumeratorValue};

/// A coerced property value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// `boolean`
    Bool(bool),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `double`
    Double(f64),
    /// `string`, or a string-backed enumeration value
    String(String),
    /// `dateTime`
    DateTime(DateTime<Utc>),
    /// `point2d`
    Point2d {
        /// X coordinate
        x: f64,
        /// Y coordinate
        y: f64,
    },
    /// `point3d`
    Point3d {
        /// X coordinate
        x: f64,
        /// Y coordinate
        y: f64,
        /// Z coordinate
        z: f64,
    },
    /// Primitive, enumeration or struct array
    Array(Vec<Value>),
    /// Struct value, keyed by property name
    Struct(IndexMap<String, Value>),
    /// `binary` and geometry values, carried as written
    Opaque(String),
}

/// A realized custom attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttributeInstance {
    /// Attribute class
    pub class_name: QualifiedName,
    /// Property values present in the markup, in class declaration order
    pub properties: IndexMap<String, Value>,
}

impl CustomAttributeInstance {
    /// Value of a property (exact name)
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

fn invalid_value(name: &str) -> Error {
    Error::InvalidPrimitivePropertyValue(format!(
        "Property '{}' has an invalid property value.",
        name
    ))
}

fn expected(name: &str, what: &str) -> Error {
    Error::TypeMismatch(format!(
        "Property '{}' has an invalid property value. {} value was expected.",
        name, what
    ))
}

/// Coerce the property elements under `node` against `class`.
///
/// Properties with no element are left out. Navigation properties are never
/// read from instance markup.
pub fn coerce_properties(
    node: &Element,
    class: &ClassDefinition,
    lookup: &dyn SchemaItemLookup,
    limits: &Limits,
    depth: usize,
) -> Result<IndexMap<String, Value>> {
    let mut values = IndexMap::new();

    for property in &class.properties {
        if matches!(property.property_type, PropertyType::Navigation(_)) {
            continue;
        }
        let Some(element) = node.first_child(&property.name) else {
            continue;
        };
        if element.is_empty() {
            return Err(invalid_value(&property.name));
        }

        let value = match &property.property_type {
            PropertyType::Primitive(primitive) => {
                coerce_primitive(&property.name, element_text(element, &property.name)?, *primitive)?
            }
            PropertyType::Enumeration(enumeration) => coerce_enumeration(
                &property.name,
                element_text(element, &property.name)?,
                enumeration,
                lookup,
            )?,
            PropertyType::PrimitiveArray(primitive) => Value::Array(
                element
                    .children
                    .iter()
                    .map(|item| {
                        if item.is_empty() {
                            return Err(invalid_value(&property.name));
                        }
                        coerce_primitive(&property.name, element_text(item, &property.name)?, *primitive)
                    })
                    .collect::<Result<_>>()?,
            ),
            PropertyType::EnumerationArray(enumeration) => Value::Array(
                element
                    .children
                    .iter()
                    .map(|item| {
                        if item.is_empty() {
                            return Err(invalid_value(&property.name));
                        }
                        coerce_enumeration(
                            &property.name,
                            element_text(item, &property.name)?,
                            enumeration,
                            lookup,
                        )
                    })
                    .collect::<Result<_>>()?,
            ),
            PropertyType::Struct(struct_name) => {
                let struct_class = struct_class(struct_name, lookup)?;
                coerce_struct(element, &struct_class, lookup, limits, depth)?
            }
            PropertyType::StructArray(struct_name) => {
                let struct_class = struct_class(struct_name, lookup)?;
                Value::Array(
                    element
                        .children
                        .iter()
                        .map(|item| coerce_struct(item, &struct_class, lookup, limits, depth))
                        .collect::<Result<_>>()?,
                )
            }
            PropertyType::Navigation(_) => continue,
        };

        values.insert(property.name.clone(), value);
    }

    Ok(values)
}

fn element_text<'a>(element: &'a Element, name: &str) -> Result<&'a str> {
    element.text().ok_or_else(|| invalid_value(name))
}

fn struct_class(name: &QualifiedName, lookup: &dyn SchemaItemLookup) -> Result<ClassDefinition> {
    lookup.lookup_class(name)?.ok_or_else(|| {
        Error::ClassNotFound(format!("The struct class '{}' could not be found.", name))
    })
}

fn coerce_struct(
    element: &Element,
    class: &ClassDefinition,
    lookup: &dyn SchemaItemLookup,
    limits: &Limits,
    depth: usize,
) -> Result<Value> {
    limits.check_struct_depth(depth + 1)?;
    coerce_properties(element, class, lookup, limits, depth + 1).map(Value::Struct)
}

/// Coerce the text of one element to a primitive value
pub fn coerce_primitive(name: &str, text: &str, primitive: PrimitiveType) -> Result<Value> {
    let trimmed = text.trim();
    Ok(match primitive {
        PrimitiveType::Boolean => match trimmed {
            "True" => Value::Bool(true),
            "False" => Value::Bool(false),
            _ => return Err(expected(name, "A boolean")),
        },
        PrimitiveType::Integer => {
            Value::Int(trimmed.parse().map_err(|_| expected(name, "An integer"))?)
        }
        PrimitiveType::Long => {
            Value::Long(trimmed.parse().map_err(|_| expected(name, "An integer"))?)
        }
        PrimitiveType::Double => Value::Double(
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| expected(name, "A double"))?,
        ),
        PrimitiveType::DateTime => {
            Value::DateTime(parse_date_time(trimmed).ok_or_else(|| expected(name, "A dateTime"))?)
        }
        PrimitiveType::Point2d => match parse_coordinates(trimmed).as_deref() {
            Some([x, y]) => Value::Point2d { x: *x, y: *y },
            _ => return Err(expected(name, "A Point 2D")),
        },
        PrimitiveType::Point3d => match parse_coordinates(trimmed).as_deref() {
            Some([x, y, z]) => Value::Point3d {
                x: *x,
                y: *y,
                z: *z,
            },
            _ => return Err(expected(name, "A Point 3D")),
        },
        PrimitiveType::String => Value::String(text.to_string()),
        PrimitiveType::Binary | PrimitiveType::IGeometry => Value::Opaque(text.to_string()),
    })
}

/// Milliseconds since the Unix epoch, or an RFC 3339 timestamp
fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = text.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_coordinates(text: &str) -> Option<Vec<f64>> {
    text.split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

fn coerce_enumeration(
    name: &str,
    text: &str,
    enumeration: &QualifiedName,
    lookup: &dyn SchemaItemLookup,
) -> Result<Value> {
    let props = lookup.lookup_enumeration(enumeration)?.ok_or_else(|| {
        Error::EnumerationNotFound(format!(
            "The Enumeration class '{}' could not be found.",
            enumeration
        ))
    })?;

    let trimmed = text.trim();
    if let Some(enumerator) = props.find_enumerator(trimmed) {
        return Ok(match &enumerator.value {
            EnumeratorValue::Int(v) => Value::Int(*v),
            EnumeratorValue::String(v) => Value::String(v.clone()),
        });
    }

    if props.is_strict {
        return Err(Error::TypeMismatch(format!(
            "Property '{}' has an invalid property value. '{}' is not a value of the Enumeration '{}'.",
            name, trimmed, enumeration
        )));
    }

    Ok(match props.backing_type {
        EnumerationBackingType::Int => {
            Value::Int(trimmed.parse().map_err(|_| expected(name, "An integer"))?)
        }
        EnumerationBackingType::String => Value::String(text.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PropertyDefinition;
    use crate::documents::Document;
    use crate::items::ItemKind;
    use crate::props::{EnumerationProps, EnumeratorProps, ItemProps};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    struct Fixture;

    impl SchemaItemLookup for Fixture {
        fn lookup_enumeration(&self, name: &QualifiedName) -> Result<Option<EnumerationProps>> {
            let strict = match name.item.as_str() {
                "Color" => true,
                "LooseColor" => false,
                _ => return Ok(None),
            };
            Ok(Some(EnumerationProps {
                item: ItemProps::default(),
                backing_type: EnumerationBackingType::Int,
                is_strict: strict,
                enumerators: vec![EnumeratorProps {
                    name: "Red".into(),
                    value: EnumeratorValue::Int(1),
                    item: ItemProps::default(),
                }],
            }))
        }

        fn lookup_class(&self, name: &QualifiedName) -> Result<Option<ClassDefinition>> {
            Ok(match name.item.as_str() {
                "Point" => Some(class(
                    "Point",
                    vec![("X", PropertyType::Primitive(PrimitiveType::Double))],
                )),
                "Nested" => Some(class(
                    "Nested",
                    vec![("Inner", PropertyType::Struct(QualifiedName::new("T", "Nested")))],
                )),
                _ => None,
            })
        }
    }

    fn class(name: &str, properties: Vec<(&str, PropertyType)>) -> ClassDefinition {
        ClassDefinition {
            name: QualifiedName::new("T", name),
            kind: ItemKind::StructClass,
            properties: properties
                .into_iter()
                .map(|(name, property_type)| PropertyDefinition {
                    name: name.to_string(),
                    property_type,
                })
                .collect(),
        }
    }

    fn coerce(xml: &str, property_type: PropertyType) -> Result<IndexMap<String, Value>> {
        let node = Document::from_string(xml).unwrap().root.unwrap();
        let class = class("Attr", vec![("P", property_type)]);
        coerce_properties(&node, &class, &Fixture, &Limits::default(), 0)
    }

    #[test]
    fn test_boolean() {
        let ok = coerce("<A><P>True</P></A>", PropertyType::Primitive(PrimitiveType::Boolean)).unwrap();
        assert_eq!(ok["P"], Value::Bool(true));
        let ok = coerce("<A><P>False</P></A>", PropertyType::Primitive(PrimitiveType::Boolean)).unwrap();
        assert_eq!(ok["P"], Value::Bool(false));

        let err = coerce("<A><P>bad</P></A>", PropertyType::Primitive(PrimitiveType::Boolean)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Property 'P' has an invalid property value. A boolean value was expected."
        );

        let err = coerce("<A><P/></A>", PropertyType::Primitive(PrimitiveType::Boolean)).unwrap_err();
        assert!(matches!(err, Error::InvalidPrimitivePropertyValue(_)));
        assert_eq!(err.to_string(), "Property 'P' has an invalid property value.");
    }

    #[test]
    fn test_boolean_tokens_are_case_sensitive() {
        for token in ["true", "false", "TRUE"] {
            let err = coerce_primitive("P", token, PrimitiveType::Boolean).unwrap_err();
            assert!(matches!(err, Error::TypeMismatch(_)));
            assert!(err.to_string().ends_with("A boolean value was expected."));
        }
        assert_eq!(
            coerce_primitive("P", "False", PrimitiveType::Boolean).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_int_rejects_fraction() {
        let err = coerce("<A><P>1.1</P></A>", PropertyType::Primitive(PrimitiveType::Integer)).unwrap_err();
        assert!(err.to_string().ends_with("An integer value was expected."));

        let ok = coerce("<A><P>1.1</P></A>", PropertyType::Primitive(PrimitiveType::Double)).unwrap();
        assert_eq!(ok["P"], Value::Double(1.1));
    }

    #[test]
    fn test_points_and_dates() {
        let ok = coerce("<A><P>1,2.5</P></A>", PropertyType::Primitive(PrimitiveType::Point2d)).unwrap();
        assert_eq!(ok["P"], Value::Point2d { x: 1.0, y: 2.5 });

        let err = coerce("<A><P>1,2</P></A>", PropertyType::Primitive(PrimitiveType::Point3d)).unwrap_err();
        assert!(err.to_string().ends_with("A Point 3D value was expected."));

        let ok = coerce("<A><P>86400000</P></A>", PropertyType::Primitive(PrimitiveType::DateTime)).unwrap();
        assert_eq!(ok["P"], Value::DateTime(Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_opaque_and_missing() {
        let ok = coerce("<A><P>AAEC</P></A>", PropertyType::Primitive(PrimitiveType::Binary)).unwrap();
        assert_eq!(ok["P"], Value::Opaque("AAEC".into()));

        let ok = coerce("<A><Other>1</Other></A>", PropertyType::Primitive(PrimitiveType::Integer)).unwrap();
        assert!(ok.is_empty());
    }

    #[test]
    fn test_enumeration() {
        let color = QualifiedName::new("T", "Color");
        let ok = coerce("<A><P>1</P></A>", PropertyType::Enumeration(color.clone())).unwrap();
        assert_eq!(ok["P"], Value::Int(1));

        let err = coerce("<A><P>7</P></A>", PropertyType::Enumeration(color)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));

        let loose = QualifiedName::new("T", "LooseColor");
        let ok = coerce("<A><P>7</P></A>", PropertyType::Enumeration(loose)).unwrap();
        assert_eq!(ok["P"], Value::Int(7));

        let err = coerce("<A><P>1</P></A>", PropertyType::Enumeration(QualifiedName::new("T", "Gone")))
            .unwrap_err();
        assert_eq!(err.to_string(), "The Enumeration class 'T.Gone' could not be found.");
    }

    #[test]
    fn test_arrays_keep_order() {
        let ok = coerce(
            "<A><P><int>3</int><int>1</int><int>2</int></P></A>",
            PropertyType::PrimitiveArray(PrimitiveType::Integer),
        )
        .unwrap();
        assert_eq!(
            ok["P"],
            Value::Array(vec![Value::Int(3), Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_structs() {
        let ok = coerce(
            "<A><P><Point><X>1</X></Point><Point><X>2</X></Point></P></A>",
            PropertyType::StructArray(QualifiedName::new("T", "Point")),
        )
        .unwrap();
        let Value::Array(points) = &ok["P"] else {
            panic!("expected an array");
        };
        assert_eq!(points.len(), 2);
        let Value::Struct(first) = &points[0] else {
            panic!("expected a struct");
        };
        assert_eq!(first["X"], Value::Double(1.0));

        let err = coerce("<A><P><X>1</X></P></A>", PropertyType::Struct(QualifiedName::new("T", "Gone")))
            .unwrap_err();
        assert!(matches!(err, Error::ClassNotFound(_)));
    }

    #[test]
    fn test_struct_depth_limit() {
        let mut xml = String::from("<A><P>");
        for _ in 0..5 {
            xml.push_str("<Inner>");
        }
        xml.push_str("<Unused>x</Unused>");
        for _ in 0..5 {
            xml.push_str("</Inner>");
        }
        xml.push_str("</P></A>");

        let node = Document::from_string(&xml).unwrap().root.unwrap();
        let class = class("Attr", vec![("P", PropertyType::Struct(QualifiedName::new("T", "Nested")))]);
        let limits = Limits {
            max_struct_depth: 3,
            ..Limits::default()
        };
        let err = coerce_properties(&node, &class, &Fixture, &limits, 0).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }

    #[test]
    fn test_instance_json() {
        let instance = CustomAttributeInstance {
            class_name: QualifiedName::new("T", "Attr"),
            properties: IndexMap::from([
                ("Flag".to_string(), Value::Bool(true)),
                ("At".to_string(), Value::Point2d { x: 1.0, y: 2.0 }),
            ]),
        };
        assert_eq!(
            serde_json::to_value(&instance).unwrap(),
            serde_json::json!({
                "className": "T.Attr",
                "properties": { "Flag": true, "At": { "x": 1.0, "y": 2.0 } }
            })
        );
    }

    proptest! {
        #[test]
        fn prop_int_round_trips(v in any::<i32>()) {
            let value = coerce_primitive("P", &v.to_string(), PrimitiveType::Integer).unwrap();
            prop_assert_eq!(value, Value::Int(v));
        }

        #[test]
        fn prop_fractions_are_not_ints(whole in -1000i32..1000, frac in 1u32..1000) {
            let text = format!("{}.{}", whole, frac);
            prop_assert!(coerce_primitive("P", &text, PrimitiveType::Integer).is_err());
        }
    }
}
