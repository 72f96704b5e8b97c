//! Class item parsers: entity, mixin, struct, custom-attribute and
//! relationship classes

use super::{item_props, parse_bool_ignore_case, required, SchemaParser};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::items::{item_tags, SchemaItem};
use crate::namespaces::QualifiedName;
use crate::props::{
    ClassModifier, ClassProps, CustomAttributeClassProps, EntityClassProps, MixinProps,
    RelationshipClassProps, RelationshipConstraintProps, StrengthDirection, StrengthType,
    StructClassProps,
};

const BASE_CLASS: &str = "BaseClass";
const APPLIES_TO_ENTITY_CLASS: &str = "AppliesToEntityClass";

impl SchemaParser {
    /// Resolve every `BaseClass` child, in declaration order
    fn base_classes(&self, item: &SchemaItem<'_>) -> Result<Vec<QualifiedName>> {
        item.node
            .children_by_tag(BASE_CLASS)
            .map(|base| {
                let text = base.text().map(str::trim).unwrap_or_default();
                if text.is_empty() {
                    return Err(Error::InvalidAttributeValue(format!(
                        "The {} {} has an empty 'BaseClass' element.",
                        item.kind,
                        self.full_name(item)
                    )));
                }
                self.resolve(text)
            })
            .collect()
    }

    fn class_props(&self, item: &SchemaItem<'_>, base_classes: &[QualifiedName]) -> Result<ClassProps> {
        let modifier = match item.node.attribute("modifier") {
            None => None,
            Some(raw) => Some(ClassModifier::parse(raw).ok_or_else(|| {
                Error::InvalidAttributeValue(format!(
                    "The {} {} has an invalid 'modifier' attribute. '{}' is not a valid class modifier.",
                    item.kind,
                    self.full_name(item),
                    raw
                ))
            })?),
        };

        Ok(ClassProps {
            item: item_props(item.node),
            modifier,
            base_class: base_classes.first().cloned(),
        })
    }

    fn single_base_class(&self, item: &SchemaItem<'_>) -> Result<Vec<QualifiedName>> {
        let bases = self.base_classes(item)?;
        if bases.len() > 1 {
            return Err(Error::MultipleBaseClass(format!(
                "The {} {} has more than one 'BaseClass'. Only one is allowed.",
                item.kind,
                self.full_name(item)
            )));
        }
        Ok(bases)
    }

    /// Parse an entity class. The first base class is the base class, the
    /// remaining ones are mixins.
    pub fn parse_entity_class(&self, item: &SchemaItem<'_>) -> Result<EntityClassProps> {
        let bases = self.base_classes(item)?;
        let class = self.class_props(item, &bases)?;
        Ok(EntityClassProps {
            class,
            mixins: bases.into_iter().skip(1).collect(),
        })
    }

    /// Parse a mixin
    pub fn parse_mixin(&self, item: &SchemaItem<'_>) -> Result<MixinProps> {
        let bases = self.single_base_class(item)?;
        let class = self.class_props(item, &bases)?;
        let full_name = self.full_name(item);

        let is_mixin = item
            .node
            .first_child(item_tags::CUSTOM_ATTRIBUTES)
            .and_then(|container| container.first_child(item_tags::IS_MIXIN))
            .ok_or_else(|| {
                Error::MissingIsMixin(format!(
                    "The Mixin {} is missing the required 'IsMixin' tag.",
                    full_name
                ))
            })?;

        let applies_to = is_mixin
            .first_child(APPLIES_TO_ENTITY_CLASS)
            .and_then(Element::text)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::MissingAppliesToEntityClass(format!(
                    "The Mixin {} is missing the required 'AppliesToEntityClass' tag.",
                    full_name
                ))
            })?;

        Ok(MixinProps {
            class,
            applies_to: self.resolve(applies_to)?,
        })
    }

    /// Parse a struct class
    pub fn parse_struct_class(&self, item: &SchemaItem<'_>) -> Result<StructClassProps> {
        let bases = self.single_base_class(item)?;
        Ok(StructClassProps {
            class: self.class_props(item, &bases)?,
        })
    }

    /// Parse a custom-attribute class
    pub fn parse_custom_attribute_class(
        &self,
        item: &SchemaItem<'_>,
    ) -> Result<CustomAttributeClassProps> {
        let bases = self.single_base_class(item)?;
        let class = self.class_props(item, &bases)?;
        let applies_to = required(item.node, "appliesTo", || {
            format!(
                "The CustomAttributeClass {} is missing the required 'appliesTo' attribute.",
                self.full_name(item)
            )
        })?;
        Ok(CustomAttributeClassProps {
            class,
            applies_to: applies_to.to_string(),
        })
    }

    /// Parse a relationship class
    pub fn parse_relationship_class(&self, item: &SchemaItem<'_>) -> Result<RelationshipClassProps> {
        let bases = self.single_base_class(item)?;
        let class = self.class_props(item, &bases)?;
        let full_name = self.full_name(item);

        let raw_strength = required(item.node, "strength", || {
            format!(
                "The RelationshipClass {} is missing the required 'strength' attribute.",
                full_name
            )
        })?;
        let strength = StrengthType::parse(raw_strength).ok_or_else(|| {
            Error::InvalidAttributeValue(format!(
                "The RelationshipClass {} has an invalid 'strength' attribute. '{}' is not a valid StrengthType.",
                full_name, raw_strength
            ))
        })?;

        let strength_direction = match item.node.attribute("strengthDirection") {
            None => StrengthDirection::Forward,
            Some(raw) => StrengthDirection::parse(raw).ok_or_else(|| {
                Error::InvalidAttributeValue(format!(
                    "The RelationshipClass {} has an invalid 'strengthDirection' attribute. '{}' is not a valid StrengthDirection.",
                    full_name, raw
                ))
            })?,
        };

        let source = self.constraint(item, ConstraintEnd::Source)?;
        let target = self.constraint(item, ConstraintEnd::Target)?;

        Ok(RelationshipClassProps {
            class,
            strength,
            strength_direction,
            source,
            target,
        })
    }

    fn constraint(&self, item: &SchemaItem<'_>, end: ConstraintEnd) -> Result<RelationshipConstraintProps> {
        let full_name = self.full_name(item);
        let node = item.node.first_child(end.tag()).ok_or_else(|| {
            Error::MissingConstraint(format!(
                "The RelationshipClass {} is missing the required {} constraint tag.",
                full_name,
                end.tag()
            ))
        })?;

        let constraint_name = format!("{} Constraint of {}", end.tag(), full_name);
        let missing = |attr: &str| {
            format!(
                "The {} is missing the required '{}' attribute.",
                constraint_name, attr
            )
        };

        let multiplicity = required(node, "multiplicity", || missing("multiplicity"))?;
        let role_label = required(node, "roleLabel", || missing("roleLabel"))?;
        let raw_polymorphic = required(node, "polymorphic", || missing("polymorphic"))?;
        let polymorphic = parse_bool_ignore_case(raw_polymorphic).ok_or_else(|| {
            Error::InvalidAttributeValue(format!(
                "The {} has an invalid 'polymorphic' attribute with the value '{}'.",
                constraint_name, raw_polymorphic
            ))
        })?;

        let abstract_constraint = node
            .attribute("abstractConstraint")
            .map(|raw| self.resolve(raw))
            .transpose()?;

        let mut constraint_classes = Vec::new();
        for class in node.children_by_tag("Class") {
            let raw = required(class, "class", || {
                format!(
                    "A Class on the {} is missing the required 'class' attribute.",
                    constraint_name
                )
            })?;
            constraint_classes.push(self.resolve(raw)?);
        }
        if constraint_classes.is_empty() {
            return Err(Error::MissingConstraintClasses(format!(
                "The {} is missing the required Class tags.",
                constraint_name
            )));
        }

        Ok(RelationshipConstraintProps {
            multiplicity: multiplicity.to_string(),
            role_label: role_label.to_string(),
            polymorphic,
            abstract_constraint,
            constraint_classes,
        })
    }
}

/// Which end of a relationship a constraint describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintEnd {
    /// The `Source` constraint
    Source,
    /// The `Target` constraint
    Target,
}

impl ConstraintEnd {
    /// Element tag of the constraint
    pub fn tag(&self) -> &'static str {
        match self {
            ConstraintEnd::Source => "Source",
            ConstraintEnd::Target => "Target",
        }
    }
}
