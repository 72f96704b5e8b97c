//! Typed property bags produced by the parsers
//!
//! One struct per item kind and per property kind. A bag handed to a caller
//! is always complete: required fields have been checked and every reference
//! has been canonicalized. Bags serialize with ECJSON-style camelCase keys
//! and absent optional fields are omitted.

use crate::items::ItemKind;
use crate::namespaces::QualifiedName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProps {
    /// Schema name
    pub name: String,
    /// Version string, e.g. `01.00.00`
    pub version: String,
    /// Schema alias
    pub alias: String,
    /// Display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ECXML major version from the namespace marker
    pub ec_spec_major_version: u32,
    /// ECXML minor version from the namespace marker
    pub ec_spec_minor_version: u32,
}

/// Fields shared by every schema item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProps {
    /// Display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Class modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassModifier {
    /// No modifier
    None,
    /// Abstract class
    Abstract,
    /// Sealed class
    Sealed,
}

impl ClassModifier {
    /// Parse a modifier token (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Some(ClassModifier::None),
            "abstract" => Some(ClassModifier::Abstract),
            "sealed" => Some(ClassModifier::Sealed),
            _ => None,
        }
    }
}

/// Fields shared by every class kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Modifier, absent when the markup has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<ClassModifier>,
    /// First base class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_class: Option<QualifiedName>,
}

/// Entity class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityClassProps {
    /// Common class fields
    #[serde(flatten)]
    pub class: ClassProps,
    /// Base classes after the first, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<QualifiedName>,
}

/// Mixin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixinProps {
    /// Common class fields
    #[serde(flatten)]
    pub class: ClassProps,
    /// Entity class the mixin may be applied to
    pub applies_to: QualifiedName,
}

/// Struct class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructClassProps {
    /// Common class fields
    #[serde(flatten)]
    pub class: ClassProps,
}

/// Custom-attribute class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttributeClassProps {
    /// Common class fields
    #[serde(flatten)]
    pub class: ClassProps,
    /// Container types the attribute may be applied to
    pub applies_to: String,
}

/// Relationship strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrengthType {
    /// Referencing
    Referencing,
    /// Holding
    Holding,
    /// Embedding
    Embedding,
}

impl StrengthType {
    /// Parse a strength token (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "referencing" => Some(StrengthType::Referencing),
            "holding" => Some(StrengthType::Holding),
            "embedding" => Some(StrengthType::Embedding),
            _ => None,
        }
    }
}

/// Relationship strength direction, also used by navigation properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrengthDirection {
    /// Source to target
    #[default]
    Forward,
    /// Target to source
    Backward,
}

impl StrengthDirection {
    /// Parse a direction token (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Some(StrengthDirection::Forward),
            "backward" => Some(StrengthDirection::Backward),
            _ => None,
        }
    }
}

impl fmt::Display for StrengthDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrengthDirection::Forward => f.write_str("Forward"),
            StrengthDirection::Backward => f.write_str("Backward"),
        }
    }
}

/// One end of a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipConstraintProps {
    /// Multiplicity, e.g. `(0..*)`
    pub multiplicity: String,
    /// Role label
    pub role_label: String,
    /// Whether derived classes are allowed
    pub polymorphic: bool,
    /// Abstract constraint class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_constraint: Option<QualifiedName>,
    /// Constraint classes, in declaration order
    pub constraint_classes: Vec<QualifiedName>,
}

/// Relationship class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipClassProps {
    /// Common class fields
    #[serde(flatten)]
    pub class: ClassProps,
    /// Strength
    pub strength: StrengthType,
    /// Strength direction (`Forward` when absent from the markup)
    pub strength_direction: StrengthDirection,
    /// Source constraint
    pub source: RelationshipConstraintProps,
    /// Target constraint
    pub target: RelationshipConstraintProps,
}

/// Enumeration backing type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumerationBackingType {
    /// Integer values
    Int,
    /// String values
    String,
}

/// An enumerator value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumeratorValue {
    /// Value of an int-backed enumeration
    Int(i32),
    /// Value of a string-backed enumeration
    String(String),
}

impl fmt::Display for EnumeratorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumeratorValue::Int(v) => write!(f, "{}", v),
            EnumeratorValue::String(v) => f.write_str(v),
        }
    }
}

/// Enumerator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratorProps {
    /// Enumerator name
    pub name: String,
    /// Enumerator value
    pub value: EnumeratorValue,
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
}

/// Enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerationProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Backing type
    #[serde(rename = "type")]
    pub backing_type: EnumerationBackingType,
    /// Whether only declared enumerators are allowed (`true` when absent)
    pub is_strict: bool,
    /// Enumerators, in declaration order
    pub enumerators: Vec<EnumeratorProps>,
}

impl EnumerationProps {
    /// Find the enumerator whose name or value matches `text`
    pub fn find_enumerator(&self, text: &str) -> Option<&EnumeratorProps> {
        self.enumerators.iter().find(|e| match &e.value {
            EnumeratorValue::Int(v) => text.parse::<i32>().map(|t| t == *v).unwrap_or(false),
            EnumeratorValue::String(v) => v == text || e.name == text,
        })
    }
}

/// Kind of quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindOfQuantityProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Relative error
    pub relative_error: f64,
    /// Persistence unit
    pub persistence_unit: QualifiedName,
    /// Presentation format strings with every reference qualified
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presentation_units: Vec<String>,
}

/// Property category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCategoryProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Priority
    pub priority: i32,
}

/// Unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Phenomenon
    pub phenomenon: QualifiedName,
    /// Unit system
    pub unit_system: QualifiedName,
    /// Definition expression
    pub definition: String,
    /// Numerator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerator: Option<f64>,
    /// Denominator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<f64>,
    /// Offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

/// Inverted unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvertedUnitProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Unit being inverted
    pub inverts_unit: QualifiedName,
    /// Unit system
    pub unit_system: QualifiedName,
}

/// Phenomenon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhenomenonProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Definition expression
    pub definition: String,
}

/// Constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Phenomenon
    pub phenomenon: QualifiedName,
    /// Definition expression
    pub definition: String,
    /// Numerator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerator: Option<f64>,
    /// Denominator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<f64>,
}

/// A unit inside a format composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatUnitProps {
    /// Unit
    pub name: QualifiedName,
    /// Label override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Format composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCompositeProps {
    /// Spacer between units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacer: Option<String>,
    /// Whether zero-valued sub-units are shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_zero: Option<bool>,
    /// One to four units, in declaration order
    pub units: Vec<FormatUnitProps>,
}

/// Format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatProps {
    /// Label and description
    #[serde(flatten)]
    pub item: ItemProps,
    /// Format type, e.g. `Decimal`
    #[serde(rename = "type")]
    pub format_type: String,
    /// Precision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    /// Round factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_factor: Option<f64>,
    /// Minimum width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<i32>,
    /// Sign option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_sign_option: Option<String>,
    /// Format traits, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format_traits: Vec<String>,
    /// Decimal separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_separator: Option<String>,
    /// Thousand separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thousand_separator: Option<String>,
    /// Unit-of-measure separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom_separator: Option<String>,
    /// Scientific type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_type: Option<String>,
    /// Station offset size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_offset_size: Option<i32>,
    /// Station separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_separator: Option<String>,
    /// Composite definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<FormatCompositeProps>,
}

/// Props of any schema item, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "schemaItemType")]
pub enum SchemaItemProps {
    /// Entity class
    EntityClass(EntityClassProps),
    /// Mixin
    Mixin(MixinProps),
    /// Struct class
    StructClass(StructClassProps),
    /// Custom-attribute class
    CustomAttributeClass(CustomAttributeClassProps),
    /// Relationship class
    RelationshipClass(RelationshipClassProps),
    /// Enumeration
    Enumeration(EnumerationProps),
    /// Kind of quantity
    KindOfQuantity(KindOfQuantityProps),
    /// Property category
    PropertyCategory(PropertyCategoryProps),
    /// Unit
    Unit(UnitProps),
    /// Inverted unit
    InvertedUnit(InvertedUnitProps),
    /// Unit system
    UnitSystem(ItemProps),
    /// Phenomenon
    Phenomenon(PhenomenonProps),
    /// Constant
    Constant(ConstantProps),
    /// Format
    Format(FormatProps),
}

impl SchemaItemProps {
    /// Kind of the item these props describe
    pub fn kind(&self) -> ItemKind {
        match self {
            SchemaItemProps::EntityClass(_) => ItemKind::EntityClass,
            SchemaItemProps::Mixin(_) => ItemKind::Mixin,
            SchemaItemProps::StructClass(_) => ItemKind::StructClass,
            SchemaItemProps::CustomAttributeClass(_) => ItemKind::CustomAttributeClass,
            SchemaItemProps::RelationshipClass(_) => ItemKind::RelationshipClass,
            SchemaItemProps::Enumeration(_) => ItemKind::Enumeration,
            SchemaItemProps::KindOfQuantity(_) => ItemKind::KindOfQuantity,
            SchemaItemProps::PropertyCategory(_) => ItemKind::PropertyCategory,
            SchemaItemProps::Unit(_) => ItemKind::Unit,
            SchemaItemProps::InvertedUnit(_) => ItemKind::InvertedUnit,
            SchemaItemProps::UnitSystem(_) => ItemKind::UnitSystem,
            SchemaItemProps::Phenomenon(_) => ItemKind::Phenomenon,
            SchemaItemProps::Constant(_) => ItemKind::Constant,
            SchemaItemProps::Format(_) => ItemKind::Format,
        }
    }

    /// The common class fields, for class kinds
    pub fn class(&self) -> Option<&ClassProps> {
        match self {
            SchemaItemProps::EntityClass(p) => Some(&p.class),
            SchemaItemProps::Mixin(p) => Some(&p.class),
            SchemaItemProps::StructClass(p) => Some(&p.class),
            SchemaItemProps::CustomAttributeClass(p) => Some(&p.class),
            SchemaItemProps::RelationshipClass(p) => Some(&p.class),
            _ => None,
        }
    }
}

// =============================================================================
// Properties
// =============================================================================

/// Kind of a property declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// `ECProperty`
    #[serde(rename = "PrimitiveProperty")]
    Primitive,
    /// `ECStructProperty`
    #[serde(rename = "StructProperty")]
    Struct,
    /// `ECArrayProperty`
    #[serde(rename = "PrimitiveArrayProperty")]
    PrimitiveArray,
    /// `ECStructArrayProperty`
    #[serde(rename = "StructArrayProperty")]
    StructArray,
    /// `ECNavigationProperty`
    #[serde(rename = "NavigationProperty")]
    Navigation,
}

impl PropertyKind {
    /// Map a property declaration tag to its kind
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ECProperty" => Some(PropertyKind::Primitive),
            "ECStructProperty" => Some(PropertyKind::Struct),
            "ECArrayProperty" => Some(PropertyKind::PrimitiveArray),
            "ECStructArrayProperty" => Some(PropertyKind::StructArray),
            "ECNavigationProperty" => Some(PropertyKind::Navigation),
            _ => None,
        }
    }

    /// Whether the property holds an array
    pub fn is_array(&self) -> bool {
        matches!(self, PropertyKind::PrimitiveArray | PropertyKind::StructArray)
    }
}

/// Fields shared by every property kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyProps {
    /// Property name
    pub name: String,
    /// Property kind
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    /// Display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Read-only flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read_only: Option<bool>,
    /// Property category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<QualifiedName>,
    /// Priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Inherited flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited: Option<bool>,
    /// Kind of quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind_of_quantity: Option<QualifiedName>,
}

/// Fields only primitive (and primitive array) properties carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveValueProps {
    /// Extended type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_type_name: Option<String>,
    /// Minimum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i32>,
    /// Maximum length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
    /// Minimum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Maximum value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

/// Primitive property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitivePropertyProps {
    /// Common property fields
    #[serde(flatten)]
    pub property: PropertyProps,
    /// Primitive-only fields
    #[serde(flatten)]
    pub primitive: PrimitiveValueProps,
    /// Primitive type token, or the qualified name of an enumeration
    pub type_name: String,
}

/// Struct property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructPropertyProps {
    /// Common property fields
    #[serde(flatten)]
    pub property: PropertyProps,
    /// Struct class
    pub type_name: QualifiedName,
}

/// Primitive array property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveArrayPropertyProps {
    /// Common property fields
    #[serde(flatten)]
    pub property: PropertyProps,
    /// Primitive-only fields
    #[serde(flatten)]
    pub primitive: PrimitiveValueProps,
    /// Primitive type token, or the qualified name of an enumeration
    pub type_name: String,
    /// Minimum occurrences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<i32>,
    /// Maximum occurrences (`unbounded` is `i32::MAX`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<i32>,
}

/// Struct array property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructArrayPropertyProps {
    /// Common property fields
    #[serde(flatten)]
    pub property: PropertyProps,
    /// Struct class
    pub type_name: QualifiedName,
    /// Minimum occurrences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<i32>,
    /// Maximum occurrences (`unbounded` is `i32::MAX`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<i32>,
}

/// Navigation property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationPropertyProps {
    /// Common property fields
    #[serde(flatten)]
    pub property: PropertyProps,
    /// Relationship class
    pub relationship_name: QualifiedName,
    /// Direction
    pub direction: StrengthDirection,
}

/// Props of any property, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyPropertyProps {
    /// Primitive property
    Primitive(PrimitivePropertyProps),
    /// Struct property
    Struct(StructPropertyProps),
    /// Primitive array property
    PrimitiveArray(PrimitiveArrayPropertyProps),
    /// Struct array property
    StructArray(StructArrayPropertyProps),
    /// Navigation property
    Navigation(NavigationPropertyProps),
}

impl AnyPropertyProps {
    /// Common property fields
    pub fn property(&self) -> &PropertyProps {
        match self {
            AnyPropertyProps::Primitive(p) => &p.property,
            AnyPropertyProps::Struct(p) => &p.property,
            AnyPropertyProps::PrimitiveArray(p) => &p.property,
            AnyPropertyProps::StructArray(p) => &p.property,
            AnyPropertyProps::Navigation(p) => &p.property,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_entity_class_json_shape() {
        let props = EntityClassProps {
            class: ClassProps {
                item: ItemProps {
                    label: Some("Pipe".into()),
                    description: None,
                },
                modifier: Some(ClassModifier::Abstract),
                base_class: Some(QualifiedName::new("Test", "Base")),
            },
            mixins: vec![QualifiedName::new("Test", "IMixin")],
        };
        assert_eq!(
            serde_json::to_value(&props).unwrap(),
            json!({
                "label": "Pipe",
                "modifier": "Abstract",
                "baseClass": "Test.Base",
                "mixins": ["Test.IMixin"]
            })
        );
    }

    #[test]
    fn test_struct_property_has_no_primitive_fields() {
        let props = StructPropertyProps {
            property: PropertyProps {
                name: "Location".into(),
                kind: PropertyKind::Struct,
                label: None,
                description: None,
                is_read_only: None,
                category: None,
                priority: None,
                inherited: None,
                kind_of_quantity: None,
            },
            type_name: QualifiedName::new("Test", "Point"),
        };
        let value = serde_json::to_value(&props).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("extendedTypeName"));
        assert!(!obj.contains_key("minLength"));
        assert_eq!(obj["type"], json!("StructProperty"));
    }

    #[test]
    fn test_find_enumerator() {
        let e = EnumerationProps {
            item: ItemProps::default(),
            backing_type: EnumerationBackingType::Int,
            is_strict: true,
            enumerators: vec![EnumeratorProps {
                name: "Red".into(),
                value: EnumeratorValue::Int(1),
                item: ItemProps::default(),
            }],
        };
        assert_eq!(e.find_enumerator("1").unwrap().name, "Red");
        assert!(e.find_enumerator("Red").is_none());
        assert!(e.find_enumerator("2").is_none());
    }

    #[test]
    fn test_modifier_parse() {
        assert_eq!(ClassModifier::parse("abstract"), Some(ClassModifier::Abstract));
        assert_eq!(ClassModifier::parse("Sealed"), Some(ClassModifier::Sealed));
        assert_eq!(ClassModifier::parse("Open"), None);
    }
}
