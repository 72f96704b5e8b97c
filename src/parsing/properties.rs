//! Property declarations of class items

use super::{item_props, optional_float, optional_int, parse_bool_exact, parse_int, SchemaParser};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::items::{ItemKind, SchemaItem};
use crate::names;
use crate::namespaces::QualifiedName;
use crate::primitives::PrimitiveType;
use crate::props::{
    AnyPropertyProps, NavigationPropertyProps, PrimitiveArrayPropertyProps,
    PrimitivePropertyProps, PrimitiveValueProps, PropertyKind, PropertyProps,
    StrengthDirection, StructArrayPropertyProps, StructPropertyProps,
};
use tracing::trace;

/// Property attribute names, with the short spellings accepted as fallbacks
mod property_attrs {
    pub const PROPERTY_NAME: &str = "propertyName";
    pub const TYPE_NAME: &str = "typeName";
    pub const READ_ONLY: &str = "readOnly";
    pub const IS_READ_ONLY: &str = "isReadOnly";
    pub const CATEGORY: &str = "category";
    pub const PRIORITY: &str = "priority";
    pub const INHERITED: &str = "inherited";
    pub const KIND_OF_QUANTITY: &str = "kindOfQuantity";
    pub const EXTENDED_TYPE_NAME: &str = "extendedTypeName";
    pub const MIN_LENGTH: &[&str] = &["minimumLength", "minLength"];
    pub const MAX_LENGTH: &[&str] = &["maximumLength", "maxLength"];
    pub const MIN_VALUE: &[&str] = &["minimumValue", "minValue"];
    pub const MAX_VALUE: &[&str] = &["maximumValue", "maxValue"];
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const RELATIONSHIP_NAME: &str = "relationshipName";
    pub const DIRECTION: &str = "direction";
}

const UNBOUNDED: &str = "unbounded";

/// A property declaration found directly under a class item
#[derive(Debug, Clone, Copy)]
pub struct PropertyDescriptor<'a> {
    /// Property name (`propertyName`)
    pub name: &'a str,
    /// Declared kind
    pub kind: PropertyKind,
    /// The raw declaration element
    pub node: &'a Element,
    /// The class the property is declared on
    pub class: SchemaItem<'a>,
}

impl SchemaParser {
    /// Lazily enumerate the property declarations of a class. Only direct
    /// children are considered; a declaration without `propertyName` fails
    /// when the iterator reaches it.
    pub fn properties<'a>(
        &'a self,
        item: &SchemaItem<'a>,
    ) -> impl Iterator<Item = Result<PropertyDescriptor<'a>>> + 'a {
        let class = *item;
        class
            .node
            .children
            .iter()
            .filter_map(|node| PropertyKind::from_tag(&node.tag).map(|kind| (node, kind)))
            .enumerate()
            .map(move |(count, (node, kind))| {
                self.limits.check_properties(count + 1)?;
                self.describe_property(class, node, kind)
            })
    }

    fn describe_property<'a>(
        &self,
        class: SchemaItem<'a>,
        node: &'a Element,
        kind: PropertyKind,
    ) -> Result<PropertyDescriptor<'a>> {
        let name = node.attribute(property_attrs::PROPERTY_NAME).ok_or_else(|| {
            Error::MissingPropertyName(format!(
                "An ECProperty in {} is missing the required 'propertyName' attribute.",
                self.full_name(&class)
            ))
        })?;

        if !names::is_valid_ec_name(name) {
            return Err(Error::InvalidAttributeValue(format!(
                "An ECProperty in {} has an invalid 'propertyName' attribute. '{}' is not a valid ECName.",
                self.full_name(&class),
                name
            )));
        }

        trace!(class = class.name, property = name, ?kind, "found property declaration");
        Ok(PropertyDescriptor {
            name,
            kind,
            node,
            class,
        })
    }

    /// Find a property declared directly on a class (case-insensitive)
    pub fn find_property<'a>(
        &'a self,
        item: &SchemaItem<'a>,
        name: &str,
    ) -> Result<Option<PropertyDescriptor<'a>>> {
        for property in self.properties(item) {
            let property = property?;
            if property.name.eq_ignore_ascii_case(name) {
                return Ok(Some(property));
            }
        }
        Ok(None)
    }

    /// Parse a property declaration into its props bag
    pub fn parse_property(&self, property: &PropertyDescriptor<'_>) -> Result<AnyPropertyProps> {
        Ok(match property.kind {
            PropertyKind::Primitive => {
                AnyPropertyProps::Primitive(self.parse_primitive_property(property)?)
            }
            PropertyKind::Struct => AnyPropertyProps::Struct(self.parse_struct_property(property)?),
            PropertyKind::PrimitiveArray => {
                AnyPropertyProps::PrimitiveArray(self.parse_primitive_array_property(property)?)
            }
            PropertyKind::StructArray => {
                AnyPropertyProps::StructArray(self.parse_struct_array_property(property)?)
            }
            PropertyKind::Navigation => {
                AnyPropertyProps::Navigation(self.parse_navigation_property(property)?)
            }
        })
    }

    /// Parse a primitive property
    pub fn parse_primitive_property(
        &self,
        property: &PropertyDescriptor<'_>,
    ) -> Result<PrimitivePropertyProps> {
        Ok(PrimitivePropertyProps {
            property: self.common_property_props(property)?,
            primitive: self.primitive_value_props(property)?,
            type_name: self.primitive_type_name(property)?,
        })
    }

    /// Parse a struct property
    pub fn parse_struct_property(
        &self,
        property: &PropertyDescriptor<'_>,
    ) -> Result<StructPropertyProps> {
        Ok(StructPropertyProps {
            property: self.common_property_props(property)?,
            type_name: self.struct_type_name(property)?,
        })
    }

    /// Parse a primitive array property
    pub fn parse_primitive_array_property(
        &self,
        property: &PropertyDescriptor<'_>,
    ) -> Result<PrimitiveArrayPropertyProps> {
        Ok(PrimitiveArrayPropertyProps {
            property: self.common_property_props(property)?,
            primitive: self.primitive_value_props(property)?,
            type_name: self.primitive_type_name(property)?,
            min_occurs: self.parse_occurs(property, property_attrs::MIN_OCCURS)?,
            max_occurs: self.parse_occurs(property, property_attrs::MAX_OCCURS)?,
        })
    }

    /// Parse a struct array property
    pub fn parse_struct_array_property(
        &self,
        property: &PropertyDescriptor<'_>,
    ) -> Result<StructArrayPropertyProps> {
        Ok(StructArrayPropertyProps {
            property: self.common_property_props(property)?,
            type_name: self.struct_type_name(property)?,
            min_occurs: self.parse_occurs(property, property_attrs::MIN_OCCURS)?,
            max_occurs: self.parse_occurs(property, property_attrs::MAX_OCCURS)?,
        })
    }

    /// Parse a navigation property
    pub fn parse_navigation_property(
        &self,
        property: &PropertyDescriptor<'_>,
    ) -> Result<NavigationPropertyProps> {
        let common = self.common_property_props(property)?;
        let missing = |attr: &str| {
            Error::MissingRequiredPropertyAttribute(format!(
                "The ECNavigationProperty {} is missing the required '{}' property.",
                self.property_full_name(property),
                attr
            ))
        };

        let relationship = property
            .node
            .attribute(property_attrs::RELATIONSHIP_NAME)
            .ok_or_else(|| missing(property_attrs::RELATIONSHIP_NAME))?;
        let raw_direction = property
            .node
            .attribute(property_attrs::DIRECTION)
            .ok_or_else(|| missing(property_attrs::DIRECTION))?;
        let direction = StrengthDirection::parse(raw_direction).ok_or_else(|| {
            Error::InvalidAttributeValue(self.invalid_property_attribute(
                property,
                property_attrs::DIRECTION,
                raw_direction,
            ))
        })?;

        Ok(NavigationPropertyProps {
            property: common,
            relationship_name: self.resolve(relationship)?,
            direction,
        })
    }

    // =========================================================================
    // Shared pieces
    // =========================================================================

    fn property_full_name(&self, property: &PropertyDescriptor<'_>) -> String {
        format!("{}.{}", self.full_name(&property.class), property.name)
    }

    fn invalid_property_attribute(
        &self,
        property: &PropertyDescriptor<'_>,
        attr: &str,
        raw: &str,
    ) -> String {
        format!(
            "The ECProperty {} has an invalid '{}' attribute. '{}' is not a valid value.",
            self.property_full_name(property),
            attr,
            raw
        )
    }

    fn property_bool(&self, property: &PropertyDescriptor<'_>, attrs: &[&str]) -> Result<Option<bool>> {
        let Some(raw) = property.node.attribute_any(attrs) else {
            return Ok(None);
        };
        parse_bool_exact(raw).map(Some).ok_or_else(|| {
            Error::InvalidAttributeValue(self.invalid_property_attribute(property, attrs[0], raw))
        })
    }

    fn common_property_props(&self, property: &PropertyDescriptor<'_>) -> Result<PropertyProps> {
        let node = property.node;
        let labels = item_props(node);

        let priority = optional_int(node, &[property_attrs::PRIORITY], || {
            self.invalid_property_attribute(
                property,
                property_attrs::PRIORITY,
                node.attribute(property_attrs::PRIORITY).unwrap_or_default(),
            )
        })?;

        Ok(PropertyProps {
            name: property.name.to_string(),
            kind: property.kind,
            label: labels.label,
            description: labels.description,
            is_read_only: self.property_bool(
                property,
                &[property_attrs::READ_ONLY, property_attrs::IS_READ_ONLY],
            )?,
            category: self.optional_reference(node, property_attrs::CATEGORY)?,
            priority,
            inherited: self.property_bool(property, &[property_attrs::INHERITED])?,
            kind_of_quantity: self.optional_reference(node, property_attrs::KIND_OF_QUANTITY)?,
        })
    }

    fn optional_reference(&self, node: &Element, attr: &str) -> Result<Option<QualifiedName>> {
        node.attribute(attr).map(|raw| self.resolve(raw)).transpose()
    }

    fn primitive_value_props(&self, property: &PropertyDescriptor<'_>) -> Result<PrimitiveValueProps> {
        let node = property.node;
        let invalid = |attrs: &[&str]| {
            self.invalid_property_attribute(
                property,
                attrs[0],
                node.attribute_any(attrs).unwrap_or_default(),
            )
        };

        Ok(PrimitiveValueProps {
            extended_type_name: node
                .attribute(property_attrs::EXTENDED_TYPE_NAME)
                .map(str::to_string),
            min_length: optional_int(node, property_attrs::MIN_LENGTH, || {
                invalid(property_attrs::MIN_LENGTH)
            })?,
            max_length: optional_int(node, property_attrs::MAX_LENGTH, || {
                invalid(property_attrs::MAX_LENGTH)
            })?,
            min_value: optional_float(node, property_attrs::MIN_VALUE, || {
                invalid(property_attrs::MIN_VALUE)
            })?,
            max_value: optional_float(node, property_attrs::MAX_VALUE, || {
                invalid(property_attrs::MAX_VALUE)
            })?,
        })
    }

    fn raw_type_name<'a>(&self, property: &PropertyDescriptor<'a>) -> Result<&'a str> {
        property.node.attribute(property_attrs::TYPE_NAME).ok_or_else(|| {
            Error::MissingRequiredAttribute(format!(
                "The ECProperty {} is missing the required 'typeName' attribute.",
                self.property_full_name(property)
            ))
        })
    }

    /// A primitive token stays as written unless an enumeration of the same
    /// name is declared in this schema. Anything else is a reference to an
    /// enumeration and is qualified.
    fn primitive_type_name(&self, property: &PropertyDescriptor<'_>) -> Result<String> {
        let raw = self.raw_type_name(property)?;
        let qualified = self.resolve(raw)?;

        if qualified.is_in_schema(&self.schema_name) {
            if let Some(item) = self.find_item(&qualified.item)? {
                if item.kind == ItemKind::Enumeration {
                    return Ok(QualifiedName::new(self.schema_name.as_str(), item.name).to_string());
                }
            }
        }

        if PrimitiveType::parse(raw).is_some() {
            return Ok(raw.to_string());
        }
        Ok(qualified.to_string())
    }

    fn struct_type_name(&self, property: &PropertyDescriptor<'_>) -> Result<QualifiedName> {
        let raw = self.raw_type_name(property)?;
        self.resolve(raw)
    }

    /// `minOccurs`/`maxOccurs`: an integer, or `unbounded` for `maxOccurs`
    fn parse_occurs(&self, property: &PropertyDescriptor<'_>, attr: &str) -> Result<Option<i32>> {
        let Some(raw) = property.node.attribute(attr) else {
            return Ok(None);
        };
        if attr == property_attrs::MAX_OCCURS && raw == UNBOUNDED {
            return Ok(Some(i32::MAX));
        }
        parse_int(raw).map(Some).ok_or_else(|| {
            Error::InvalidAttributeValue(format!(
                "The ECArrayProperty {} has an invalid '{}' attribute. '{}' is not a valid value.",
                self.property_full_name(property),
                attr,
                raw
            ))
        })
    }
}
