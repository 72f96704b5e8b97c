//! Resolved class definitions and cross-schema lookup
//!
//! Custom-attribute instances are realized against a [`ClassDefinition`]:
//! the flattened property list of a class, base-class properties first.
//! Definitions come from a [`SchemaItemLookup`], which a single
//! [`SchemaParser`] implements for its own schema and a [`SchemaContext`]
//! implements across every schema added to it.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::custom_attributes::CustomAttributeProvider;
use crate::error::{Error, Result};
use crate::items::ItemKind;
use crate::limits::Limits;
use crate::namespaces::QualifiedName;
use crate::parsing::SchemaParser;
use crate::primitives::PrimitiveType;
use crate::props::{AnyPropertyProps, EnumerationProps, SchemaItemProps};
use crate::values::CustomAttributeInstance;

/// Declared type of a property, as needed to coerce instance values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "type")]
pub enum PropertyType {
    /// Primitive value
    Primitive(PrimitiveType),
    /// Enumeration value
    Enumeration(QualifiedName),
    /// Array of primitive values
    PrimitiveArray(PrimitiveType),
    /// Array of enumeration values
    EnumerationArray(QualifiedName),
    /// Struct value
    Struct(QualifiedName),
    /// Array of struct values
    StructArray(QualifiedName),
    /// Navigation to a related instance
    Navigation(QualifiedName),
}

/// A property as seen by instance realization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDefinition {
    /// Property name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

/// A class with its inherited properties flattened in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDefinition {
    /// Qualified class name
    pub name: QualifiedName,
    /// Class kind
    pub kind: ItemKind,
    /// Properties, base classes first; a redeclared property keeps the
    /// position of the base declaration
    pub properties: Vec<PropertyDefinition>,
}

impl ClassDefinition {
    /// Find a property by name (case-insensitive)
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Source of enumerations and class definitions
pub trait SchemaItemLookup {
    /// Find an enumeration by qualified name
    fn lookup_enumeration(&self, name: &QualifiedName) -> Result<Option<EnumerationProps>>;

    /// Find a class by qualified name, with its base-class properties
    fn lookup_class(&self, name: &QualifiedName) -> Result<Option<ClassDefinition>>;
}

/// One class in an inheritance chain, before flattening
#[derive(Debug, Clone)]
pub(crate) struct ClassLayer {
    kind: ItemKind,
    base_class: Option<QualifiedName>,
    properties: Vec<PropertyDefinition>,
}

/// Walk the base-class chain of `name` and flatten it into one definition.
/// A base class `find` cannot see ends the chain.
pub(crate) fn flatten_class<F>(
    name: &QualifiedName,
    limits: &Limits,
    find: F,
) -> Result<Option<ClassDefinition>>
where
    F: Fn(&QualifiedName) -> Result<Option<ClassLayer>>,
{
    let Some(first) = find(name)? else {
        return Ok(None);
    };
    let kind = first.kind;

    let mut chain = vec![first];
    let mut depth = 0;
    while let Some(base) = chain.last().and_then(|layer| layer.base_class.clone()) {
        depth += 1;
        limits.check_inheritance_depth(depth)?;
        match find(&base)? {
            Some(layer) => chain.push(layer),
            None => {
                debug!(class = %name, base = %base, "base class not available, inheritance chain ends");
                break;
            }
        }
    }

    let mut properties: IndexMap<String, PropertyDefinition> = IndexMap::new();
    for layer in chain.into_iter().rev() {
        for property in layer.properties {
            properties.insert(property.name.to_lowercase(), property);
        }
    }

    Ok(Some(ClassDefinition {
        name: name.clone(),
        kind,
        properties: properties.into_values().collect(),
    }))
}

fn qualified(type_name: &str) -> Result<QualifiedName> {
    type_name
        .parse()
        .map_err(|e: crate::namespaces::QualifiedNameParseError| {
            Error::InvalidAttributeValue(e.to_string())
        })
}

fn property_type(props: &AnyPropertyProps) -> Result<PropertyType> {
    Ok(match props {
        AnyPropertyProps::Primitive(p) => match PrimitiveType::parse(&p.type_name) {
            Some(primitive) => PropertyType::Primitive(primitive),
            None => PropertyType::Enumeration(qualified(&p.type_name)?),
        },
        AnyPropertyProps::PrimitiveArray(p) => match PrimitiveType::parse(&p.type_name) {
            Some(primitive) => PropertyType::PrimitiveArray(primitive),
            None => PropertyType::EnumerationArray(qualified(&p.type_name)?),
        },
        AnyPropertyProps::Struct(p) => PropertyType::Struct(p.type_name.clone()),
        AnyPropertyProps::StructArray(p) => PropertyType::StructArray(p.type_name.clone()),
        AnyPropertyProps::Navigation(p) => PropertyType::Navigation(p.relationship_name.clone()),
    })
}

impl SchemaParser {
    /// The class `name` declares directly, without its base classes.
    /// Names outside this schema are never found.
    pub(crate) fn class_layer(&self, name: &QualifiedName) -> Result<Option<ClassLayer>> {
        if !name.is_in_schema(self.schema_name()) {
            return Ok(None);
        }
        let Some(item) = self.find_item(&name.item)? else {
            return Ok(None);
        };
        if !item.kind.is_class() {
            return Ok(None);
        }

        let props = self.parse_item(&item)?;
        let base_class = props.class().and_then(|c| c.base_class.clone());

        let mut properties = Vec::new();
        for property in self.properties(&item) {
            let property = property?;
            let parsed = self.parse_property(&property)?;
            properties.push(PropertyDefinition {
                name: property.name.to_string(),
                property_type: property_type(&parsed)?,
            });
        }

        Ok(Some(ClassLayer {
            kind: item.kind,
            base_class,
            properties,
        }))
    }

    /// Flattened definition of a class declared in this schema
    pub fn class_definition(&self, name: &QualifiedName) -> Result<Option<ClassDefinition>> {
        flatten_class(name, self.limits(), |n| self.class_layer(n))
    }
}

impl SchemaItemLookup for SchemaParser {
    fn lookup_enumeration(&self, name: &QualifiedName) -> Result<Option<EnumerationProps>> {
        if !name.is_in_schema(self.schema_name()) {
            return Ok(None);
        }
        match self.find_item(&name.item)? {
            Some(item) if item.kind == ItemKind::Enumeration => match self.parse_item(&item)? {
                SchemaItemProps::Enumeration(props) => Ok(Some(props)),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn lookup_class(&self, name: &QualifiedName) -> Result<Option<ClassDefinition>> {
        self.class_definition(name)
    }
}

/// A set of parse sessions that can see each other's items
#[derive(Debug, Default)]
pub struct SchemaContext {
    /// Sessions keyed by lower-cased schema name, in insertion order
    schemas: IndexMap<String, SchemaParser>,
    /// Limits applied to cross-schema inheritance walks
    limits: Limits,
}

impl SchemaContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty context with explicit limits
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            schemas: IndexMap::new(),
            limits,
        }
    }

    /// Add a schema. Its envelope is validated first.
    pub fn add_schema(&mut self, parser: SchemaParser) -> Result<()> {
        let schema = parser.parse_schema()?;
        let key = schema.name.to_lowercase();
        if self.schemas.contains_key(&key) {
            return Err(Error::DuplicateSchema(format!(
                "The schema {} has already been added to this context.",
                schema.name
            )));
        }
        debug!(schema = %schema.name, version = %schema.version, "added schema to context");
        self.schemas.insert(key, parser);
        Ok(())
    }

    /// Session for a schema name (case-insensitive)
    pub fn schema(&self, name: &str) -> Option<&SchemaParser> {
        self.schemas.get(&name.to_lowercase())
    }

    /// Number of schemas in the context
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the context holds no schemas
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Realize a discovered custom attribute against the class its name
    /// refers to
    pub fn realize(&self, provider: &CustomAttributeProvider<'_>) -> Result<CustomAttributeInstance> {
        let class = self.lookup_class(&provider.class_name)?.ok_or_else(|| {
            Error::ClassNotFound(format!(
                "The custom attribute class '{}' could not be found.",
                provider.class_name
            ))
        })?;
        provider.pending.realize(&class, self)
    }
}

impl SchemaItemLookup for SchemaContext {
    fn lookup_enumeration(&self, name: &QualifiedName) -> Result<Option<EnumerationProps>> {
        match self.schema(&name.schema) {
            Some(parser) => parser.lookup_enumeration(name),
            None => Ok(None),
        }
    }

    fn lookup_class(&self, name: &QualifiedName) -> Result<Option<ClassDefinition>> {
        flatten_class(name, &self.limits, |n| match self.schema(&n.schema) {
            Some(parser) => parser.class_layer(n),
            None => Ok(None),
        })
    }
}
