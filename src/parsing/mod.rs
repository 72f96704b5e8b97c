//! ECSchema XML parsing
//!
//! [`SchemaParser`] is one parse session over one schema document. It owns
//! the element tree, the reference resolver and the item classification
//! cache; nothing is shared between sessions.
//!
//! ```rust,ignore
//! use ecschema::SchemaParser;
//!
//! let parser = SchemaParser::from_string(xml)?;
//! let schema = parser.parse_schema()?;
//! for item in parser.items() {
//!     let item = item?;
//!     let props = parser.parse_item(&item)?;
//! }
//! ```

mod classes;
mod properties;
mod units;

pub use classes::ConstraintEnd;
pub use properties::PropertyDescriptor;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use once_cell::unsync::OnceCell;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::items::{self, ItemKind, SchemaItem};
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::namespaces::{EcXmlVersion, QualifiedName, SchemaReference};
use crate::props::{ItemProps, SchemaItemProps, SchemaProps};
use crate::resolver::ReferenceResolver;

/// Schema envelope element and attribute names
mod schema_attrs {
    pub const SCHEMA: &str = "ECSchema";
    pub const SCHEMA_NAME: &str = "schemaName";
    pub const VERSION: &str = "version";
    pub const ALIAS: &str = "alias";
    pub const DESCRIPTION: &str = "description";
    pub const DISPLAY_LABEL: &str = "displayLabel";
    pub const LABEL: &str = "label";
}

static SCHEMA_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("valid schema version pattern"));

/// One parse session over one ECSchema document
#[derive(Debug)]
pub struct SchemaParser {
    /// The `ECSchema` element
    root: Element,
    /// `schemaName`, empty when absent
    schema_name: String,
    /// `alias`
    schema_alias: Option<String>,
    /// `version`
    schema_version: Option<String>,
    /// Resource limits for this session
    limits: Limits,
    /// Alias table, built on first use from the `ECSchemaReference` children
    resolver: OnceCell<ReferenceResolver>,
    /// Classified kinds keyed by child index of the root
    kinds: RefCell<HashMap<usize, ItemKind>>,
}

impl SchemaParser {
    /// Start a session over a parsed document
    pub fn new(document: Document) -> Result<Self> {
        Self::with_limits(document, Limits::default())
    }

    /// Start a session over a parsed document with explicit limits
    pub fn with_limits(document: Document, limits: Limits) -> Result<Self> {
        let root = document
            .root
            .ok_or_else(|| Error::InvalidSchemaXml("An ECSchema is missing the required metadata.".to_string()))?;

        let schema_name = root
            .attribute(schema_attrs::SCHEMA_NAME)
            .unwrap_or_default()
            .to_string();
        let schema_alias = root.attribute(schema_attrs::ALIAS).map(str::to_string);
        let schema_version = root.attribute(schema_attrs::VERSION).map(str::to_string);

        debug!(schema = %schema_name, "started schema parse session");

        Ok(Self {
            root,
            schema_name,
            schema_alias,
            schema_version,
            limits,
            resolver: OnceCell::new(),
            kinds: RefCell::new(HashMap::new()),
        })
    }

    /// Parse a schema from an XML string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::new(Document::from_string(xml)?)
    }

    /// Parse a schema from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let limits = Limits::default();
        let bytes = Loader::new().with_limits(limits.clone()).load_bytes(path.as_ref())?;
        Self::with_limits(Document::parse(&bytes, &limits)?, limits)
    }

    /// The schema name (empty when the markup has none)
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The limits this session enforces
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// The `ECSchema` element
    pub fn root(&self) -> &Element {
        &self.root
    }

    // =========================================================================
    // Envelope
    // =========================================================================

    /// Validate and read the schema envelope.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// namespace presence, namespace pattern, name, version, alias.
    pub fn parse_schema(&self) -> Result<SchemaProps> {
        if self.root.tag != schema_attrs::SCHEMA {
            return Err(Error::InvalidSchemaXml(format!(
                "An ECSchema is missing the required metadata. Expected root element '{}', got '{}'.",
                schema_attrs::SCHEMA,
                self.root.tag
            )));
        }

        let subject = if self.schema_name.is_empty() {
            "An ECSchema".to_string()
        } else {
            format!("The ECSchema {}", self.schema_name)
        };

        let namespace = self.root.namespace().ok_or_else(|| {
            Error::MissingXmlns(format!("{} is missing a required 'xmlns' attribute", subject))
        })?;

        let ec_version = EcXmlVersion::from_namespace(namespace).ok_or_else(|| {
            Error::InvalidXmlns(format!("{} has an invalid 'xmlns' attribute", subject))
        })?;

        if self.root.attribute(schema_attrs::SCHEMA_NAME).is_none() {
            return Err(Error::MissingSchemaName(
                "An ECSchema is missing a required 'schemaName' attribute".to_string(),
            ));
        }

        let version = self.schema_version.clone().ok_or_else(|| {
            Error::MissingVersion(format!("{} is missing a required 'version' attribute", subject))
        })?;

        let alias = self.schema_alias.clone().ok_or_else(|| {
            Error::MissingAlias(format!("{} is missing a required 'alias' attribute", subject))
        })?;

        if !SCHEMA_VERSION.is_match(&version) {
            return Err(Error::InvalidAttributeValue(format!(
                "{} has an invalid 'version' attribute. '{}' is not a valid version string.",
                subject, version
            )));
        }

        Ok(SchemaProps {
            name: self.schema_name.clone(),
            version,
            alias,
            label: self
                .root
                .attribute_any(&[schema_attrs::DISPLAY_LABEL, schema_attrs::LABEL])
                .map(str::to_string),
            description: self
                .root
                .attribute(schema_attrs::DESCRIPTION)
                .map(str::to_string),
            ec_spec_major_version: ec_version.major,
            ec_spec_minor_version: ec_version.minor,
        })
    }

    // =========================================================================
    // References
    // =========================================================================

    fn resolver(&self) -> Result<&ReferenceResolver> {
        self.resolver.get_or_try_init(|| self.scan_references())
    }

    fn scan_references(&self) -> Result<ReferenceResolver> {
        let mut resolver = ReferenceResolver::new(&self.schema_name, self.schema_alias.clone());

        for reference in self.root.children.iter().filter(|node| items::is_schema_reference(node)) {
            let missing = |attr: &str| {
                Error::MissingRequiredAttribute(format!(
                    "The schema {} has an invalid ECSchemaReference attribute. One of the references is missing the required '{}' attribute.",
                    self.schema_name, attr
                ))
            };
            let name = reference.attribute("name").ok_or_else(|| missing("name"))?;
            let version = reference.attribute("version").ok_or_else(|| missing("version"))?;
            let alias = reference.attribute("alias").ok_or_else(|| missing("alias"))?;
            resolver.record_reference(name, version, alias)?;
        }

        Ok(resolver)
    }

    /// Schemas referenced by this schema, deduplicated by name, in
    /// declaration order
    pub fn get_references(&self) -> Result<impl Iterator<Item = &SchemaReference>> {
        Ok(self.resolver()?.references())
    }

    /// Canonicalize a raw reference found in the markup
    pub fn resolve(&self, raw: &str) -> Result<QualifiedName> {
        self.resolver()?.resolve(raw)
    }

    // =========================================================================
    // Items
    // =========================================================================

    fn classify_at<'a>(&'a self, index: usize, node: &'a Element) -> Result<SchemaItem<'a>> {
        if let Some(kind) = self.kinds.borrow().get(&index).copied() {
            if let Some(name) = node.attribute("typeName") {
                return Ok(SchemaItem { name, kind, node });
            }
        }

        let item = items::classify(node, &self.schema_name)?;
        trace!(item = item.name, kind = %item.kind, "classified schema item");
        self.kinds.borrow_mut().insert(index, item.kind);
        Ok(item)
    }

    fn item_nodes(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.root
            .children
            .iter()
            .enumerate()
            .filter(|(_, node)| !items::is_schema_bookkeeping(node))
    }

    /// Lazily classify every top-level schema item. An invalid item fails
    /// when the iterator reaches it.
    pub fn items(&self) -> impl Iterator<Item = Result<SchemaItem<'_>>> {
        self.item_nodes()
            .enumerate()
            .map(move |(count, (index, node))| {
                self.limits.check_schema_items(count + 1)?;
                self.classify_at(index, node)
            })
    }

    /// Find a top-level item by name (case-insensitive). Items nested inside
    /// other elements are never found.
    pub fn find_item(&self, name: &str) -> Result<Option<SchemaItem<'_>>> {
        for (index, node) in self.item_nodes() {
            let matches = node
                .attribute("typeName")
                .map(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(false);
            if matches {
                return self.classify_at(index, node).map(Some);
            }
        }
        Ok(None)
    }

    /// Parse any item into its props bag
    pub fn parse_item(&self, item: &SchemaItem<'_>) -> Result<SchemaItemProps> {
        Ok(match item.kind {
            ItemKind::EntityClass => SchemaItemProps::EntityClass(self.parse_entity_class(item)?),
            ItemKind::Mixin => SchemaItemProps::Mixin(self.parse_mixin(item)?),
            ItemKind::StructClass => SchemaItemProps::StructClass(self.parse_struct_class(item)?),
            ItemKind::CustomAttributeClass => {
                SchemaItemProps::CustomAttributeClass(self.parse_custom_attribute_class(item)?)
            }
            ItemKind::RelationshipClass => {
                SchemaItemProps::RelationshipClass(self.parse_relationship_class(item)?)
            }
            ItemKind::Enumeration => SchemaItemProps::Enumeration(self.parse_enumeration(item)?),
            ItemKind::KindOfQuantity => {
                SchemaItemProps::KindOfQuantity(self.parse_kind_of_quantity(item)?)
            }
            ItemKind::PropertyCategory => {
                SchemaItemProps::PropertyCategory(self.parse_property_category(item)?)
            }
            ItemKind::Unit => SchemaItemProps::Unit(self.parse_unit(item)?),
            ItemKind::InvertedUnit => SchemaItemProps::InvertedUnit(self.parse_inverted_unit(item)?),
            ItemKind::UnitSystem => SchemaItemProps::UnitSystem(self.parse_unit_system(item)?),
            ItemKind::Phenomenon => SchemaItemProps::Phenomenon(self.parse_phenomenon(item)?),
            ItemKind::Constant => SchemaItemProps::Constant(self.parse_constant(item)?),
            ItemKind::Format => SchemaItemProps::Format(self.parse_format(item)?),
        })
    }

    /// `SchemaName.ItemName` of an item in this schema
    pub(crate) fn full_name(&self, item: &SchemaItem<'_>) -> String {
        format!("{}.{}", self.schema_name, item.name)
    }
}

// =============================================================================
// Attribute helpers
// =============================================================================

/// Label and description of an item element
pub(crate) fn item_props(node: &Element) -> ItemProps {
    ItemProps {
        label: node
            .attribute_any(&[schema_attrs::DISPLAY_LABEL, schema_attrs::LABEL])
            .map(str::to_string),
        description: node
            .attribute(schema_attrs::DESCRIPTION)
            .map(str::to_string),
    }
}

/// Read a required attribute
pub(crate) fn required<'a>(
    node: &'a Element,
    attr: &str,
    message: impl FnOnce() -> String,
) -> Result<&'a str> {
    node.attribute(attr)
        .ok_or_else(|| Error::MissingRequiredAttribute(message()))
}

/// Read an optional integer attribute
pub(crate) fn optional_int(
    node: &Element,
    attrs: &[&str],
    message: impl FnOnce() -> String,
) -> Result<Option<i32>> {
    match node.attribute_any(attrs) {
        None => Ok(None),
        Some(raw) => parse_int(raw)
            .map(Some)
            .ok_or_else(|| Error::InvalidAttributeValue(message())),
    }
}

/// Read an optional floating point attribute
pub(crate) fn optional_float(
    node: &Element,
    attrs: &[&str],
    message: impl FnOnce() -> String,
) -> Result<Option<f64>> {
    match node.attribute_any(attrs) {
        None => Ok(None),
        Some(raw) => parse_float(raw)
            .map(Some)
            .ok_or_else(|| Error::InvalidAttributeValue(message())),
    }
}

/// Parse a 32-bit integer token
pub(crate) fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Parse a finite floating point token
pub(crate) fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Boolean token, exact case: `true` or `false`
pub(crate) fn parse_bool_exact(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Boolean token, any case
pub(crate) fn parse_bool_ignore_case(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ECSchema schemaName="TestSchema" alias="ts" version="01.00.00" displayLabel="Test" description="A test schema" xmlns="http://www.bentley.com/schemas/Bentley.ECXML.3.1">
    <ECSchemaReference name="BisCore" version="01.00.00" alias="bis"/>
    <ECSchemaReference name="Units" version="01.00.00" alias="u"/>
    <ECSchemaReference name="BisCore" version="02.00.00" alias="bc"/>
    <ECEntityClass typeName="Pipe"/>
    <ECStructClass typeName="Point"/>
</ECSchema>"#;

    fn with_root(attrs: &str) -> SchemaParser {
        SchemaParser::from_string(&format!("<ECSchema {}/>", attrs)).unwrap()
    }

    #[test]
    fn test_parse_schema() {
        let parser = SchemaParser::from_string(ENVELOPE).unwrap();
        let props = parser.parse_schema().unwrap();
        assert_eq!(props.name, "TestSchema");
        assert_eq!(props.version, "01.00.00");
        assert_eq!(props.alias, "ts");
        assert_eq!(props.label.as_deref(), Some("Test"));
        assert_eq!(props.description.as_deref(), Some("A test schema"));
        assert_eq!(props.ec_spec_major_version, 3);
        assert_eq!(props.ec_spec_minor_version, 1);
    }

    #[test]
    fn test_envelope_checks_in_order() {
        let ns = r#"xmlns="http://www.bentley.com/schemas/Bentley.ECXML.3.1""#;

        let err = with_root(r#"schemaName="A""#).parse_schema().unwrap_err();
        assert!(matches!(err, Error::MissingXmlns(_)));
        assert_eq!(err.to_string(), "The ECSchema A is missing a required 'xmlns' attribute");

        let err = with_root(r#"xmlns="http://www.bentley.com/schemas/Bentley.ECXML""#)
            .parse_schema()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidXmlns(_)));

        let err = with_root(&format!(r#"{} version="01.00.00" alias="a""#, ns))
            .parse_schema()
            .unwrap_err();
        assert!(matches!(err, Error::MissingSchemaName(_)));

        let err = with_root(&format!(r#"{} schemaName="A" alias="a""#, ns))
            .parse_schema()
            .unwrap_err();
        assert!(matches!(err, Error::MissingVersion(_)));

        let err = with_root(&format!(r#"{} schemaName="A" version="01.00.00""#, ns))
            .parse_schema()
            .unwrap_err();
        assert!(matches!(err, Error::MissingAlias(_)));
    }

    #[test]
    fn test_unescaped_dots_in_namespace_do_not_match() {
        let err = with_root(r#"schemaName="A" version="1.0" alias="a" xmlns="http://wwwXbentleyXcom/schemas/BentleyXECXMLX3.1""#)
            .parse_schema()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidXmlns(_)));
    }

    #[test]
    fn test_wrong_root() {
        let parser = SchemaParser::from_string("<Schema/>").unwrap();
        assert!(matches!(parser.parse_schema(), Err(Error::InvalidSchemaXml(_))));
    }

    #[test]
    fn test_get_references_deduplicated() {
        let parser = SchemaParser::from_string(ENVELOPE).unwrap();
        let refs: Vec<_> = parser.get_references().unwrap().cloned().collect();
        assert_eq!(
            refs,
            vec![
                SchemaReference::new("BisCore", "01.00.00"),
                SchemaReference::new("Units", "01.00.00"),
            ]
        );
    }

    #[test]
    fn test_reference_missing_alias() {
        let parser = SchemaParser::from_string(
            r#"<ECSchema schemaName="A"><ECSchemaReference name="B" version="1.0"/></ECSchema>"#,
        )
        .unwrap();
        let err = parser.resolve("x:Y").unwrap_err();
        assert!(matches!(err, Error::MissingRequiredAttribute(_)));
        assert!(err.to_string().contains("'alias'"));
    }

    #[test]
    fn test_items_skip_bookkeeping() {
        let parser = SchemaParser::from_string(ENVELOPE).unwrap();
        let kinds: Vec<_> = parser.items().map(|i| i.unwrap().kind).collect();
        assert_eq!(kinds, vec![ItemKind::EntityClass, ItemKind::StructClass]);
    }

    #[test]
    fn test_lowercase_reference_is_not_an_item() {
        let parser = SchemaParser::from_string(
            r#"<ECSchema schemaName="A" alias="a" version="1.0.0" xmlns="http://www.bentley.com/schemas/Bentley.ECXML.3.1">
                <ecschemareference name="Units" version="01.00.00" alias="u"/>
                <ECEntityClass typeName="Pipe"/>
            </ECSchema>"#,
        )
        .unwrap();
        let kinds: Vec<_> = parser.items().map(|i| i.unwrap().kind).collect();
        assert_eq!(kinds, vec![ItemKind::EntityClass]);
        assert_eq!(parser.resolve("u:M").unwrap().to_string(), "Units.M");
    }

    #[test]
    fn test_items_fail_lazily() {
        let parser = SchemaParser::from_string(
            r#"<ECSchema schemaName="A"><ECEntityClass typeName="Good"/><ECEntityClass/></ECSchema>"#,
        )
        .unwrap();
        let mut iter = parser.items();
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(iter.next().unwrap(), Err(Error::MissingTypeName(_))));
    }

    #[test]
    fn test_find_item() {
        let parser = SchemaParser::from_string(ENVELOPE).unwrap();
        let item = parser.find_item("pipe").unwrap().unwrap();
        assert_eq!(item.name, "Pipe");
        assert!(parser.find_item("Missing").unwrap().is_none());
        // Cached classification is reused
        let again = parser.find_item("Pipe").unwrap().unwrap();
        assert_eq!(again.kind, ItemKind::EntityClass);
    }

    #[test]
    fn test_bool_tokens() {
        assert_eq!(parse_bool_exact("true"), Some(true));
        assert_eq!(parse_bool_exact("True"), None);
        assert_eq!(parse_bool_ignore_case("tRuE"), Some(true));
        assert_eq!(parse_bool_ignore_case("no"), None);
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(parse_int("12"), Some(12));
        assert_eq!(parse_int("1.5"), None);
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("NaN"), None);
    }
}
