//! # ecschema-xml
//!
//! A parser and validator for ECSchema XML documents.
//!
//! An ECSchema describes classes, enumerations, units, formats and the
//! custom attributes applied to them. This crate reads the XML form of a
//! schema, validates each item as it is visited and hands back typed props
//! bags in which every cross-reference is a canonical `SchemaName.ItemName`.
//!
//! ## Features
//!
//! - Schema envelope validation (namespace, name, version, alias)
//! - Alias resolution against `ECSchemaReference` declarations
//! - Lazy item and property iteration; the first invalid entry fails
//! - Per-kind props bags for all classes, enumerations and unit items
//! - Custom-attribute discovery with deferred, repeatable realization
//! - JSON serialization of every props bag and instance
//! - Protection against oversized or deeply nested input
//!
//! ## Example
//!
//! ```rust,ignore
//! use ecschema::SchemaParser;
//!
//! let parser = SchemaParser::from_file("path/to/Pipes.ecschema.xml")?;
//! let schema = parser.parse_schema()?;
//!
//! for item in parser.items() {
//!     let item = item?;
//!     let props = parser.parse_item(&item)?;
//!     println!("{}: {}", item.name, serde_json::to_string(&props)?);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and identity
pub mod names;
pub mod namespaces;
pub mod primitives;

// Resource loading
pub mod documents;
pub mod loaders;

// Schema parsing
pub mod items;
pub mod parsing;
pub mod props;
pub mod resolver;

// Custom attributes
pub mod context;
pub mod custom_attributes;
pub mod values;

// Re-exports for convenience
pub use context::{ClassDefinition, PropertyDefinition, PropertyType, SchemaContext, SchemaItemLookup};
pub use custom_attributes::{CustomAttributeProvider, PendingInstance};
pub use documents::{Document, Element};
pub use error::{Error, NameError, Result};
pub use items::{ItemKind, SchemaItem};
pub use limits::Limits;
pub use namespaces::{QualifiedName, SchemaReference};
pub use parsing::{ConstraintEnd, PropertyDescriptor, SchemaParser};
pub use primitives::PrimitiveType;
pub use props::{AnyPropertyProps, PropertyKind, SchemaItemProps, SchemaProps};
pub use values::{CustomAttributeInstance, Value};

/// Version of the ecschema-xml library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
