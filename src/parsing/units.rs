//! Non-class item parsers: enumerations, kinds of quantity, property
//! categories and the units/formats family

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    item_props, optional_float, optional_int, parse_bool_exact, parse_bool_ignore_case,
    parse_float, parse_int, required, SchemaParser,
};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::items::SchemaItem;
use crate::namespaces::QualifiedName;
use crate::props::{
    ConstantProps, EnumerationBackingType, EnumerationProps, EnumeratorProps, EnumeratorValue,
    FormatCompositeProps, FormatProps, FormatUnitProps, InvertedUnitProps, ItemProps,
    KindOfQuantityProps, PhenomenonProps, PropertyCategoryProps, UnitProps,
};

/// `FormatName(args)[unit|label][unit]...`
static PRESENTATION_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^\(\[]+)(\([^\)]*\))?((?:\[[^\]]*\])*)$").expect("valid presentation format pattern")
});

/// One `[unit|label]` override
static UNIT_OVERRIDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\|\]]*)(\|[^\]]*)?\]").expect("valid unit override pattern"));

const MAX_COMPOSITE_UNITS: usize = 4;

impl SchemaParser {
    fn missing_attribute(&self, item: &SchemaItem<'_>, attr: &str) -> String {
        format!(
            "The {} {} is missing the required '{}' attribute.",
            item.kind,
            self.full_name(item),
            attr
        )
    }

    fn invalid_attribute(&self, item: &SchemaItem<'_>, attr: &str, raw: &str) -> String {
        format!(
            "The {} {} has an invalid '{}' attribute. '{}' is not a valid value.",
            item.kind,
            self.full_name(item),
            attr,
            raw
        )
    }

    /// Read and resolve a required reference attribute
    fn required_reference(&self, item: &SchemaItem<'_>, attr: &str) -> Result<QualifiedName> {
        let raw = required(item.node, attr, || self.missing_attribute(item, attr))?;
        self.resolve(raw)
    }

    fn required_text(&self, item: &SchemaItem<'_>, attr: &str) -> Result<String> {
        required(item.node, attr, || self.missing_attribute(item, attr)).map(str::to_string)
    }

    fn optional_float_attr(&self, item: &SchemaItem<'_>, attr: &str) -> Result<Option<f64>> {
        optional_float(item.node, &[attr], || {
            self.invalid_attribute(item, attr, item.node.attribute(attr).unwrap_or_default())
        })
    }

    fn optional_int_attr(&self, item: &SchemaItem<'_>, attr: &str) -> Result<Option<i32>> {
        optional_int(item.node, &[attr], || {
            self.invalid_attribute(item, attr, item.node.attribute(attr).unwrap_or_default())
        })
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Parse an enumeration and its enumerators
    pub fn parse_enumeration(&self, item: &SchemaItem<'_>) -> Result<EnumerationProps> {
        let raw_backing = required(item.node, "backingTypeName", || {
            self.missing_attribute(item, "backingTypeName")
        })?;
        let backing_type = if raw_backing.eq_ignore_ascii_case("int") {
            EnumerationBackingType::Int
        } else if raw_backing.eq_ignore_ascii_case("string") {
            EnumerationBackingType::String
        } else {
            return Err(Error::InvalidAttributeValue(format!(
                "The Enumeration {} has an invalid 'backingTypeName' attribute. It should be either \"int\" or \"string\".",
                self.full_name(item)
            )));
        };

        let is_strict = match item.node.attribute("isStrict") {
            None => true,
            Some(raw) => parse_bool_exact(raw).ok_or_else(|| {
                Error::InvalidAttributeValue(format!(
                    "The Enumeration {} has an invalid 'isStrict' attribute. It should either be \"true\" or \"false\".",
                    self.full_name(item)
                ))
            })?,
        };

        let enumerators = item
            .node
            .children_by_tag("ECEnumerator")
            .map(|node| self.parse_enumerator(item, node, backing_type))
            .collect::<Result<Vec<_>>>()?;

        Ok(EnumerationProps {
            item: item_props(item.node),
            backing_type,
            is_strict,
            enumerators,
        })
    }

    fn parse_enumerator(
        &self,
        item: &SchemaItem<'_>,
        node: &Element,
        backing_type: EnumerationBackingType,
    ) -> Result<EnumeratorProps> {
        let full_name = self.full_name(item);
        let missing = |attr: &str| {
            format!(
                "An enumerator on {} is missing the required attribute '{}'.",
                full_name, attr
            )
        };
        let name = required(node, "name", || missing("name"))?;
        let raw_value = required(node, "value", || missing("value"))?;

        let value = match backing_type {
            EnumerationBackingType::String => EnumeratorValue::String(raw_value.to_string()),
            EnumerationBackingType::Int => {
                EnumeratorValue::Int(parse_int(raw_value).ok_or_else(|| {
                    Error::NonIntegerEnumeratorValue(format!(
                        "Enumerators on {} must have integer values. '{}' is not an integer.",
                        full_name, raw_value
                    ))
                })?)
            }
        };

        Ok(EnumeratorProps {
            name: name.to_string(),
            value,
            item: item_props(node),
        })
    }

    // =========================================================================
    // KindOfQuantity and PropertyCategory
    // =========================================================================

    /// Parse a kind of quantity
    pub fn parse_kind_of_quantity(&self, item: &SchemaItem<'_>) -> Result<KindOfQuantityProps> {
        let raw_error = required(item.node, "relativeError", || {
            self.missing_attribute(item, "relativeError")
        })?;
        let relative_error = parse_float(raw_error).ok_or_else(|| {
            Error::InvalidAttributeValue(format!(
                "The KindOfQuantity {} has an invalid 'relativeError' attribute. It should be of type 'number'.",
                self.full_name(item)
            ))
        })?;

        let persistence_unit = self.required_reference(item, "persistenceUnit")?;

        let presentation_units = match item.node.attribute("presentationUnits") {
            None => Vec::new(),
            Some(raw) => raw
                .split(';')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(|entry| self.qualify_presentation_format(item, entry))
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(KindOfQuantityProps {
            item: item_props(item.node),
            relative_error,
            persistence_unit,
            presentation_units,
        })
    }

    /// Rewrite one presentation format string so the format name and every
    /// unit override are qualified. Arguments and labels are kept verbatim.
    fn qualify_presentation_format(&self, item: &SchemaItem<'_>, entry: &str) -> Result<String> {
        let invalid = || {
            Error::InvalidAttributeValue(format!(
                "The KindOfQuantity {} has an invalid 'presentationUnits' attribute. '{}' is not a valid format string.",
                self.full_name(item),
                entry
            ))
        };

        let captures = PRESENTATION_FORMAT.captures(entry).ok_or_else(invalid)?;
        let format_name = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if format_name.is_empty() {
            return Err(invalid());
        }

        let mut qualified = self.resolve(format_name)?.to_string();
        if let Some(args) = captures.get(2) {
            qualified.push_str(args.as_str());
        }

        if let Some(overrides) = captures.get(3) {
            for unit in UNIT_OVERRIDE.captures_iter(overrides.as_str()) {
                let unit_name = unit.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                if unit_name.is_empty() {
                    return Err(invalid());
                }
                qualified.push('[');
                qualified.push_str(&self.resolve(unit_name)?.to_string());
                if let Some(label) = unit.get(2) {
                    qualified.push_str(label.as_str());
                }
                qualified.push(']');
            }
        }

        Ok(qualified)
    }

    /// Parse a property category
    pub fn parse_property_category(&self, item: &SchemaItem<'_>) -> Result<PropertyCategoryProps> {
        let raw = required(item.node, "priority", || self.missing_attribute(item, "priority"))?;
        let priority = parse_int(raw).ok_or_else(|| {
            Error::InvalidAttributeValue(format!(
                "The PropertyCategory {} has an invalid 'priority' attribute. It should be of type 'number'.",
                self.full_name(item)
            ))
        })?;
        Ok(PropertyCategoryProps {
            item: item_props(item.node),
            priority,
        })
    }

    // =========================================================================
    // Units
    // =========================================================================

    /// Parse a unit
    pub fn parse_unit(&self, item: &SchemaItem<'_>) -> Result<UnitProps> {
        Ok(UnitProps {
            item: item_props(item.node),
            phenomenon: self.required_reference(item, "phenomenon")?,
            unit_system: self.required_reference(item, "unitSystem")?,
            definition: self.required_text(item, "definition")?,
            numerator: self.optional_float_attr(item, "numerator")?,
            denominator: self.optional_float_attr(item, "denominator")?,
            offset: self.optional_float_attr(item, "offset")?,
        })
    }

    /// Parse an inverted unit
    pub fn parse_inverted_unit(&self, item: &SchemaItem<'_>) -> Result<InvertedUnitProps> {
        Ok(InvertedUnitProps {
            item: item_props(item.node),
            inverts_unit: self.required_reference(item, "invertsUnit")?,
            unit_system: self.required_reference(item, "unitSystem")?,
        })
    }

    /// Parse a unit system. Only label and description are carried.
    pub fn parse_unit_system(&self, item: &SchemaItem<'_>) -> Result<ItemProps> {
        Ok(item_props(item.node))
    }

    /// Parse a phenomenon
    pub fn parse_phenomenon(&self, item: &SchemaItem<'_>) -> Result<PhenomenonProps> {
        Ok(PhenomenonProps {
            item: item_props(item.node),
            definition: self.required_text(item, "definition")?,
        })
    }

    /// Parse a constant
    pub fn parse_constant(&self, item: &SchemaItem<'_>) -> Result<ConstantProps> {
        Ok(ConstantProps {
            item: item_props(item.node),
            phenomenon: self.required_reference(item, "phenomenon")?,
            definition: self.required_text(item, "definition")?,
            numerator: self.optional_float_attr(item, "numerator")?,
            denominator: self.optional_float_attr(item, "denominator")?,
        })
    }

    // =========================================================================
    // Format
    // =========================================================================

    /// Parse a format, including its composite
    pub fn parse_format(&self, item: &SchemaItem<'_>) -> Result<FormatProps> {
        let node = item.node;
        let text = |attr: &str| node.attribute(attr).map(str::to_string);
        let format_type = self.required_text(item, "type")?;
        let precision = self.optional_int_attr(item, "precision")?;
        let round_factor = self.optional_float_attr(item, "roundFactor")?;
        let min_width = self.optional_int_attr(item, "minWidth")?;
        let station_offset_size = self.optional_int_attr(item, "stationOffsetSize")?;

        let format_traits = node
            .attribute("formatTraits")
            .map(|raw| {
                raw.split('|')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let composite = node
            .first_child("Composite")
            .map(|composite| self.parse_composite(item, composite))
            .transpose()?;

        Ok(FormatProps {
            item: item_props(node),
            format_type,
            precision,
            round_factor,
            min_width,
            show_sign_option: text("showSignOption"),
            format_traits,
            decimal_separator: text("decimalSeparator"),
            thousand_separator: text("thousandSeparator"),
            uom_separator: text("uomSeparator"),
            scientific_type: text("scientificType"),
            station_offset_size,
            station_separator: text("stationSeparator"),
            composite,
        })
    }

    fn parse_composite(&self, item: &SchemaItem<'_>, composite: &Element) -> Result<FormatCompositeProps> {
        let unit_nodes: Vec<&Element> = composite.children_by_tag("Unit").collect();
        if unit_nodes.is_empty() || unit_nodes.len() > MAX_COMPOSITE_UNITS {
            return Err(Error::InvalidComposite(format!(
                "The Format {} has an invalid 'Composite' element. It should have 1-4 Unit elements.",
                self.full_name(item)
            )));
        }

        let include_zero = match composite.attribute("includeZero") {
            None => None,
            Some(raw) => Some(parse_bool_ignore_case(raw).ok_or_else(|| {
                Error::InvalidAttributeValue(format!(
                    "The Format {} has a Composite with an invalid 'includeZero' attribute. It should be either \"true\" or \"false\".",
                    self.full_name(item)
                ))
            })?),
        };

        let mut units = Vec::with_capacity(unit_nodes.len());
        for unit in unit_nodes {
            let name = unit.text().map(str::trim).unwrap_or_default();
            if name.is_empty() {
                return Err(Error::InvalidComposite(format!(
                    "The Format {} has a Composite Unit with no unit name.",
                    self.full_name(item)
                )));
            }
            units.push(FormatUnitProps {
                name: self.resolve(name)?,
                label: unit.attribute("label").map(str::to_string),
            });
        }

        Ok(FormatCompositeProps {
            spacer: composite.attribute("spacer").map(str::to_string),
            include_zero,
            units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser(body: &str) -> SchemaParser {
        SchemaParser::from_string(&format!(
            r#"<ECSchema schemaName="TestSchema" alias="ts" version="01.00.00" xmlns="http://www.bentley.com/schemas/Bentley.ECXML.3.2">
                <ECSchemaReference name="Units" version="01.00.00" alias="u"/>
                <ECSchemaReference name="Formats" version="01.00.00" alias="f"/>
                {}
            </ECSchema>"#,
            body
        ))
        .unwrap()
    }

    #[test]
    fn test_enumeration_int() {
        let p = parser(
            r#"<ECEnumeration typeName="Color" backingTypeName="int" displayLabel="Color">
                <ECEnumerator name="Red" value="1" displayLabel="Red"/>
                <ECEnumerator name="Green" value="2"/>
                <ECEnumerator name="Blue" value="3"/>
            </ECEnumeration>"#,
        );
        let item = p.find_item("Color").unwrap().unwrap();
        let props = p.parse_enumeration(&item).unwrap();
        assert!(props.is_strict);
        assert_eq!(props.backing_type, EnumerationBackingType::Int);
        let names: Vec<_> = props.enumerators.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Green", "Blue"]);
        assert_eq!(props.enumerators[0].value, EnumeratorValue::Int(1));
        assert_eq!(props.enumerators[0].item.label.as_deref(), Some("Red"));
    }

    #[test]
    fn test_enumeration_non_integer_value() {
        let p = parser(
            r#"<ECEnumeration typeName="Color" backingTypeName="int">
                <ECEnumerator name="Red" value="a"/>
            </ECEnumeration>"#,
        );
        let item = p.find_item("Color").unwrap().unwrap();
        assert!(matches!(
            p.parse_enumeration(&item),
            Err(Error::NonIntegerEnumeratorValue(_))
        ));
    }

    #[test]
    fn test_enumeration_backing_type_errors() {
        let p = parser(
            r#"<ECEnumeration typeName="NoBacking"/>
            <ECEnumeration typeName="BadBacking" backingTypeName="float"/>"#,
        );
        let item = p.find_item("NoBacking").unwrap().unwrap();
        let err = p.parse_enumeration(&item).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The Enumeration TestSchema.NoBacking is missing the required 'backingTypeName' attribute."
        );

        let item = p.find_item("BadBacking").unwrap().unwrap();
        assert!(matches!(
            p.parse_enumeration(&item),
            Err(Error::InvalidAttributeValue(_))
        ));
    }

    #[test]
    fn test_is_strict_is_exact_case() {
        let p = parser(
            r#"<ECEnumeration typeName="Loose" backingTypeName="string" isStrict="false"/>
            <ECEnumeration typeName="Shouty" backingTypeName="string" isStrict="False"/>"#,
        );
        let item = p.find_item("Loose").unwrap().unwrap();
        assert!(!p.parse_enumeration(&item).unwrap().is_strict);

        let item = p.find_item("Shouty").unwrap().unwrap();
        assert!(matches!(
            p.parse_enumeration(&item),
            Err(Error::InvalidAttributeValue(_))
        ));
    }

    #[test]
    fn test_kind_of_quantity_presentation_units() {
        let p = parser(
            r#"<KindOfQuantity typeName="Length" relativeError="0.0001" persistenceUnit="u:M"
                presentationUnits="f:DefaultRealU(4)[u:M|meters];f:AmerFI[u:FT|'][u:IN|&quot;];Fractional(8)"/>"#,
        );
        let item = p.find_item("Length").unwrap().unwrap();
        let props = p.parse_kind_of_quantity(&item).unwrap();
        assert_eq!(props.relative_error, 0.0001);
        assert_eq!(props.persistence_unit, QualifiedName::new("Units", "M"));
        assert_eq!(
            props.presentation_units,
            vec![
                "Formats.DefaultRealU(4)[Units.M|meters]".to_string(),
                "Formats.AmerFI[Units.FT|'][Units.IN|\"]".to_string(),
                "TestSchema.Fractional(8)".to_string(),
            ]
        );
    }

    #[test]
    fn test_kind_of_quantity_errors() {
        let p = parser(
            r#"<KindOfQuantity typeName="NoError" persistenceUnit="u:M"/>
            <KindOfQuantity typeName="BadError" relativeError="small" persistenceUnit="u:M"/>
            <KindOfQuantity typeName="BadAlias" relativeError="1" persistenceUnit="x:M"/>
            <KindOfQuantity typeName="BadFormat" relativeError="1" persistenceUnit="u:M" presentationUnits="f:Real(4"/>"#,
        );
        let item = p.find_item("NoError").unwrap().unwrap();
        assert!(matches!(
            p.parse_kind_of_quantity(&item),
            Err(Error::MissingRequiredAttribute(_))
        ));

        let item = p.find_item("BadError").unwrap().unwrap();
        assert!(matches!(
            p.parse_kind_of_quantity(&item),
            Err(Error::InvalidAttributeValue(_))
        ));

        let item = p.find_item("BadAlias").unwrap().unwrap();
        let err = p.parse_kind_of_quantity(&item).unwrap_err();
        assert_eq!(err.to_string(), "No valid schema found for alias x");

        let item = p.find_item("BadFormat").unwrap().unwrap();
        assert!(matches!(
            p.parse_kind_of_quantity(&item),
            Err(Error::InvalidAttributeValue(_))
        ));
    }

    #[test]
    fn test_property_category() {
        let p = parser(
            r#"<PropertyCategory typeName="Geometry" priority="200"/>
            <PropertyCategory typeName="Broken" priority="high"/>"#,
        );
        let item = p.find_item("Geometry").unwrap().unwrap();
        assert_eq!(p.parse_property_category(&item).unwrap().priority, 200);

        let item = p.find_item("Broken").unwrap().unwrap();
        assert!(matches!(
            p.parse_property_category(&item),
            Err(Error::InvalidAttributeValue(_))
        ));
    }

    #[test]
    fn test_units_family() {
        let p = parser(
            r#"<UnitSystem typeName="SI" displayLabel="Metric"/>
            <Phenomenon typeName="LENGTH" definition="LENGTH"/>
            <Unit typeName="MM" phenomenon="LENGTH" unitSystem="SI" definition="u:M" numerator="1" denominator="1000"/>
            <InvertedUnit typeName="PER_MM" invertsUnit="MM" unitSystem="SI"/>
            <Constant typeName="PI" phenomenon="u:ANGLE" definition="ONE" numerator="3.14159"/>"#,
        );

        let item = p.find_item("SI").unwrap().unwrap();
        assert_eq!(p.parse_unit_system(&item).unwrap().label.as_deref(), Some("Metric"));

        let item = p.find_item("LENGTH").unwrap().unwrap();
        assert_eq!(p.parse_phenomenon(&item).unwrap().definition, "LENGTH");

        let item = p.find_item("MM").unwrap().unwrap();
        let unit = p.parse_unit(&item).unwrap();
        assert_eq!(unit.phenomenon, QualifiedName::new("TestSchema", "LENGTH"));
        assert_eq!(unit.definition, "u:M");
        assert_eq!(unit.denominator, Some(1000.0));
        assert_eq!(unit.offset, None);

        let item = p.find_item("PER_MM").unwrap().unwrap();
        let inverted = p.parse_inverted_unit(&item).unwrap();
        assert_eq!(inverted.inverts_unit, QualifiedName::new("TestSchema", "MM"));

        let item = p.find_item("PI").unwrap().unwrap();
        let constant = p.parse_constant(&item).unwrap();
        assert_eq!(constant.phenomenon, QualifiedName::new("Units", "ANGLE"));
        assert_eq!(constant.numerator, Some(3.14159));
    }

    #[test]
    fn test_inverted_unit_requires_unit_system() {
        let p = parser(r#"<InvertedUnit typeName="PER_MM" invertsUnit="MM"/>"#);
        let item = p.find_item("PER_MM").unwrap().unwrap();
        let err = p.parse_inverted_unit(&item).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The InvertedUnit TestSchema.PER_MM is missing the required 'unitSystem' attribute."
        );
    }

    #[test]
    fn test_format() {
        let p = parser(
            r#"<Format typeName="AmerFI" type="Fractional" precision="8" roundFactor="0.5"
                formatTraits="keepSingleZero|showUnitLabel" uomSeparator="">
                <Composite spacer="" includeZero="True">
                    <Unit label="'">u:FT</Unit>
                    <Unit label="&quot;">u:IN</Unit>
                </Composite>
            </Format>"#,
        );
        let item = p.find_item("AmerFI").unwrap().unwrap();
        let props = p.parse_format(&item).unwrap();
        assert_eq!(props.format_type, "Fractional");
        assert_eq!(props.precision, Some(8));
        assert_eq!(props.round_factor, Some(0.5));
        assert_eq!(props.format_traits, vec!["keepSingleZero", "showUnitLabel"]);
        assert_eq!(props.uom_separator.as_deref(), Some(""));
        let composite = props.composite.unwrap();
        assert_eq!(composite.include_zero, Some(true));
        assert_eq!(
            composite.units,
            vec![
                FormatUnitProps {
                    name: QualifiedName::new("Units", "FT"),
                    label: Some("'".into()),
                },
                FormatUnitProps {
                    name: QualifiedName::new("Units", "IN"),
                    label: Some("\"".into()),
                },
            ]
        );
    }

    #[test]
    fn test_format_errors() {
        let p = parser(
            r#"<Format typeName="NoType"/>
            <Format typeName="BadPrecision" type="Decimal" precision="four"/>
            <Format typeName="Empty" type="Decimal"><Composite/></Format>
            <Format typeName="TooMany" type="Decimal">
                <Composite><Unit>A</Unit><Unit>B</Unit><Unit>C</Unit><Unit>D</Unit><Unit>E</Unit></Composite>
            </Format>"#,
        );
        let item = p.find_item("NoType").unwrap().unwrap();
        assert!(matches!(
            p.parse_format(&item),
            Err(Error::MissingRequiredAttribute(_))
        ));

        let item = p.find_item("BadPrecision").unwrap().unwrap();
        assert!(matches!(
            p.parse_format(&item),
            Err(Error::InvalidAttributeValue(_))
        ));

        for name in ["Empty", "TooMany"] {
            let item = p.find_item(name).unwrap().unwrap();
            assert!(matches!(p.parse_format(&item), Err(Error::InvalidComposite(_))));
        }
    }
}
