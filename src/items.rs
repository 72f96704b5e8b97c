//! Schema item kinds and classification
//!
//! Every direct child of the `ECSchema` element is either bookkeeping
//! (`ECSchemaReference`, `ECCustomAttributes`) or a schema item. Items are
//! classified here, once, into an [`ItemKind`]; everything downstream
//! matches on the enum instead of looking at tags again.

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::names;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema item element tags
pub(crate) mod item_tags {
    pub const ENTITY_CLASS: &str = "ECEntityClass";
    pub const STRUCT_CLASS: &str = "ECStructClass";
    pub const CUSTOM_ATTRIBUTE_CLASS: &str = "ECCustomAttributeClass";
    pub const RELATIONSHIP_CLASS: &str = "ECRelationshipClass";
    pub const ENUMERATION: &str = "ECEnumeration";
    pub const KIND_OF_QUANTITY: &str = "KindOfQuantity";
    pub const PROPERTY_CATEGORY: &str = "PropertyCategory";
    pub const UNIT: &str = "Unit";
    pub const INVERTED_UNIT: &str = "InvertedUnit";
    pub const UNIT_SYSTEM: &str = "UnitSystem";
    pub const PHENOMENON: &str = "Phenomenon";
    pub const CONSTANT: &str = "Constant";
    pub const FORMAT: &str = "Format";
    // Non-item children of the schema element
    pub const SCHEMA_REFERENCE: &str = "ECSchemaReference";
    pub const CUSTOM_ATTRIBUTES: &str = "ECCustomAttributes";
    // Custom attribute that turns an entity class into a mixin
    pub const IS_MIXIN: &str = "IsMixin";
}

/// Concrete kind of a schema item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Entity class
    EntityClass,
    /// Entity class carrying the `IsMixin` custom attribute
    Mixin,
    /// Struct class
    StructClass,
    /// Custom-attribute class
    CustomAttributeClass,
    /// Relationship class
    RelationshipClass,
    /// Enumeration
    Enumeration,
    /// Kind of quantity
    KindOfQuantity,
    /// Property category
    PropertyCategory,
    /// Unit
    Unit,
    /// Inverted unit
    InvertedUnit,
    /// Unit system
    UnitSystem,
    /// Phenomenon
    Phenomenon,
    /// Constant
    Constant,
    /// Format
    Format,
}

impl ItemKind {
    /// Map an item tag to its kind (case-insensitive). Mixins have no tag of
    /// their own and are never returned here.
    pub fn from_tag(tag: &str) -> Option<Self> {
        use item_tags::*;
        const TABLE: &[(&str, ItemKind)] = &[
            (ENTITY_CLASS, ItemKind::EntityClass),
            (STRUCT_CLASS, ItemKind::StructClass),
            (CUSTOM_ATTRIBUTE_CLASS, ItemKind::CustomAttributeClass),
            (RELATIONSHIP_CLASS, ItemKind::RelationshipClass),
            (ENUMERATION, ItemKind::Enumeration),
            (KIND_OF_QUANTITY, ItemKind::KindOfQuantity),
            (PROPERTY_CATEGORY, ItemKind::PropertyCategory),
            (UNIT, ItemKind::Unit),
            (INVERTED_UNIT, ItemKind::InvertedUnit),
            (UNIT_SYSTEM, ItemKind::UnitSystem),
            (PHENOMENON, ItemKind::Phenomenon),
            (CONSTANT, ItemKind::Constant),
            (FORMAT, ItemKind::Format),
        ];
        TABLE
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag))
            .map(|(_, kind)| *kind)
    }

    /// Whether items of this kind are classes
    pub fn is_class(&self) -> bool {
        matches!(
            self,
            ItemKind::EntityClass
                | ItemKind::Mixin
                | ItemKind::StructClass
                | ItemKind::CustomAttributeClass
                | ItemKind::RelationshipClass
        )
    }

    /// Name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::EntityClass => "EntityClass",
            ItemKind::Mixin => "Mixin",
            ItemKind::StructClass => "StructClass",
            ItemKind::CustomAttributeClass => "CustomAttributeClass",
            ItemKind::RelationshipClass => "RelationshipClass",
            ItemKind::Enumeration => "Enumeration",
            ItemKind::KindOfQuantity => "KindOfQuantity",
            ItemKind::PropertyCategory => "PropertyCategory",
            ItemKind::Unit => "Unit",
            ItemKind::InvertedUnit => "InvertedUnit",
            ItemKind::UnitSystem => "UnitSystem",
            ItemKind::Phenomenon => "Phenomenon",
            ItemKind::Constant => "Constant",
            ItemKind::Format => "Format",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified top-level schema item
#[derive(Debug, Clone, Copy)]
pub struct SchemaItem<'a> {
    /// Item name (`typeName`)
    pub name: &'a str,
    /// Classified kind
    pub kind: ItemKind,
    /// The raw item element
    pub node: &'a Element,
}

/// Whether a top-level schema child is an `ECSchemaReference`. Tags match
/// case-insensitively, like item tags.
pub(crate) fn is_schema_reference(node: &Element) -> bool {
    node.tag.eq_ignore_ascii_case(item_tags::SCHEMA_REFERENCE)
}

/// Whether a top-level schema child is bookkeeping rather than an item
pub(crate) fn is_schema_bookkeeping(node: &Element) -> bool {
    is_schema_reference(node) || node.tag.eq_ignore_ascii_case(item_tags::CUSTOM_ATTRIBUTES)
}

/// Whether a class element carries `IsMixin` directly under its
/// custom-attributes container
pub fn has_is_mixin(node: &Element) -> bool {
    node.first_child(item_tags::CUSTOM_ATTRIBUTES)
        .map(|container| container.first_child(item_tags::IS_MIXIN).is_some())
        .unwrap_or(false)
}

/// Determine the name and kind of a top-level schema child
pub fn classify<'a>(node: &'a Element, schema_name: &str) -> Result<SchemaItem<'a>> {
    let name = node.attribute("typeName").ok_or_else(|| {
        Error::MissingTypeName(format!(
            "A SchemaItem in {} is missing the required 'typeName' attribute.",
            schema_name
        ))
    })?;

    if names::validate(name).is_err() {
        return Err(Error::InvalidTypeName(format!(
            "A SchemaItem in {} has an invalid 'typeName' attribute. '{}' is not a valid ECName.",
            schema_name, name
        )));
    }

    let mut kind = ItemKind::from_tag(&node.tag).ok_or_else(|| {
        Error::UnknownItemType(format!(
            "A SchemaItem in {} has an invalid type. '{}' is not a valid SchemaItem type.",
            schema_name, node.tag
        ))
    })?;

    if kind == ItemKind::EntityClass && has_is_mixin(node) {
        kind = ItemKind::Mixin;
    }

    Ok(SchemaItem { name, kind, node })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    fn element(xml: &str) -> Element {
        Document::from_string(xml).unwrap().root.unwrap()
    }

    #[test]
    fn test_classify_entity_class() {
        let node = element(r#"<ECEntityClass typeName="Pipe"/>"#);
        let item = classify(&node, "Test").unwrap();
        assert_eq!(item.name, "Pipe");
        assert_eq!(item.kind, ItemKind::EntityClass);
    }

    #[test]
    fn test_classify_mixin() {
        let node = element(
            r#"<ECEntityClass typeName="IPipe">
                <ECCustomAttributes>
                    <IsMixin xmlns="CoreCustomAttributes.01.00.00">
                        <AppliesToEntityClass>Pipe</AppliesToEntityClass>
                    </IsMixin>
                </ECCustomAttributes>
            </ECEntityClass>"#,
        );
        assert_eq!(classify(&node, "Test").unwrap().kind, ItemKind::Mixin);
    }

    #[test]
    fn test_nested_is_mixin_does_not_count() {
        let node = element(
            r#"<ECEntityClass typeName="Pipe">
                <ECCustomAttributes>
                    <Wrapper><IsMixin/></Wrapper>
                </ECCustomAttributes>
            </ECEntityClass>"#,
        );
        assert_eq!(classify(&node, "Test").unwrap().kind, ItemKind::EntityClass);
    }

    #[test]
    fn test_classify_case_insensitive_tag() {
        let node = element(r#"<ecenumeration typeName="Color"/>"#);
        assert_eq!(classify(&node, "Test").unwrap().kind, ItemKind::Enumeration);
    }

    #[test]
    fn test_bookkeeping_tags_ignore_case() {
        assert!(is_schema_bookkeeping(&element(r#"<ecschemareference name="Units"/>"#)));
        assert!(is_schema_bookkeeping(&element(r#"<ECCUSTOMATTRIBUTES/>"#)));
        assert!(!is_schema_bookkeeping(&element(r#"<ECEntityClass typeName="Pipe"/>"#)));
    }

    #[test]
    fn test_classify_errors() {
        let missing = element(r#"<ECEntityClass/>"#);
        assert!(matches!(classify(&missing, "Test"), Err(Error::MissingTypeName(_))));

        let invalid = element(r#"<ECEntityClass typeName="1Pipe"/>"#);
        let err = classify(&invalid, "Test").unwrap_err();
        assert!(matches!(err, Error::InvalidTypeName(_)));
        assert!(err.to_string().contains("'1Pipe' is not a valid ECName"));

        let unknown = element(r#"<ECWidget typeName="Pipe"/>"#);
        assert!(matches!(classify(&unknown, "Test"), Err(Error::UnknownItemType(_))));
    }
}
