//! Custom-attribute discovery
//!
//! Custom attributes are applied through an `ECCustomAttributes` container
//! on a schema, a class, a property or a relationship constraint. Discovery
//! yields one [`CustomAttributeProvider`] per application: the qualified
//! attribute class name plus a [`PendingInstance`] that can be realized
//! later against the resolved class, any number of times.

use tracing::debug;

use crate::context::{ClassDefinition, SchemaItemLookup};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::items::{item_tags, ItemKind, SchemaItem};
use crate::limits::Limits;
use crate::names;
use crate::namespaces::{schema_name_from_marker, QualifiedName};
use crate::parsing::{ConstraintEnd, PropertyDescriptor, SchemaParser};
use crate::values::{coerce_properties, CustomAttributeInstance};

/// An application site whose values have not been read yet
#[derive(Debug, Clone, Copy)]
pub struct PendingInstance<'a> {
    node: &'a Element,
    limits: &'a Limits,
}

impl<'a> PendingInstance<'a> {
    /// Read the instance values against the attribute class definition.
    /// Only the raw subtree and the arguments are read, so calling this
    /// again yields an equal instance.
    pub fn realize(
        &self,
        class: &ClassDefinition,
        lookup: &dyn SchemaItemLookup,
    ) -> Result<CustomAttributeInstance> {
        Ok(CustomAttributeInstance {
            class_name: class.name.clone(),
            properties: coerce_properties(self.node, class, lookup, self.limits, 0)?,
        })
    }
}

/// One discovered custom-attribute application
#[derive(Debug, Clone)]
pub struct CustomAttributeProvider<'a> {
    /// Qualified name of the attribute class
    pub class_name: QualifiedName,
    /// Deferred instance values
    pub pending: PendingInstance<'a>,
}

impl SchemaParser {
    fn custom_attribute_providers<'a>(
        &'a self,
        owner: &'a Element,
        skip_is_mixin: bool,
    ) -> impl Iterator<Item = Result<CustomAttributeProvider<'a>>> + 'a {
        owner
            .first_child(item_tags::CUSTOM_ATTRIBUTES)
            .into_iter()
            .flat_map(|container| container.children.iter())
            .filter(move |node| !(skip_is_mixin && node.tag == item_tags::IS_MIXIN))
            .map(move |node| self.custom_attribute_provider(node))
    }

    fn custom_attribute_provider<'a>(&'a self, node: &'a Element) -> Result<CustomAttributeProvider<'a>> {
        if !names::is_valid_ec_name(&node.tag) {
            return Err(Error::InvalidAttributeValue(format!(
                "A custom attribute in {} has an invalid name. '{}' is not a valid ECName.",
                self.schema_name(),
                node.tag
            )));
        }

        let schema = match node.namespace() {
            Some(marker) => schema_name_from_marker(marker).ok_or_else(|| {
                Error::InvalidAttributeValue(format!(
                    "The custom attribute {} in {} has an invalid namespace marker '{}'.",
                    node.tag,
                    self.schema_name(),
                    marker
                ))
            })?,
            None => self.schema_name(),
        };

        let class_name = QualifiedName::new(schema, node.tag.as_str());
        debug!(schema = self.schema_name(), class = %class_name, "discovered custom attribute");
        Ok(CustomAttributeProvider {
            class_name,
            pending: PendingInstance {
                node,
                limits: self.limits(),
            },
        })
    }

    /// Custom attributes applied to the schema itself
    pub fn schema_custom_attribute_providers(
        &self,
    ) -> impl Iterator<Item = Result<CustomAttributeProvider<'_>>> {
        self.custom_attribute_providers(self.root(), false)
    }

    /// Custom attributes applied to a class. `IsMixin` is structural and is
    /// never returned here.
    pub fn class_custom_attribute_providers<'a>(
        &'a self,
        item: &SchemaItem<'a>,
    ) -> impl Iterator<Item = Result<CustomAttributeProvider<'a>>> + 'a {
        self.custom_attribute_providers(item.node, true)
    }

    /// Custom attributes applied to a property declaration
    pub fn property_custom_attribute_providers<'a>(
        &'a self,
        property: &PropertyDescriptor<'a>,
    ) -> impl Iterator<Item = Result<CustomAttributeProvider<'a>>> + 'a {
        self.custom_attribute_providers(property.node, false)
    }

    /// Custom attributes applied to one constraint of a relationship class.
    /// Other item kinds, and a relationship without that constraint, yield
    /// nothing.
    pub fn relationship_constraint_custom_attribute_providers<'a>(
        &'a self,
        item: &SchemaItem<'a>,
        end: ConstraintEnd,
    ) -> impl Iterator<Item = Result<CustomAttributeProvider<'a>>> + 'a {
        let constraint = if item.kind == ItemKind::RelationshipClass {
            item.node.first_child(end.tag())
        } else {
            None
        };
        constraint
            .into_iter()
            .flat_map(move |node| self.custom_attribute_providers(node, false))
    }
}
