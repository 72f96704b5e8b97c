//! Primitive type tokens used by `typeName` attributes

use serde::{Deserialize, Serialize};
use std::fmt;

/// ECSchema primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveType {
    /// `binary`
    Binary,
    /// `boolean`
    Boolean,
    /// `dateTime`
    DateTime,
    /// `double`
    Double,
    /// `int`
    Integer,
    /// `long`
    Long,
    /// `point2d`
    Point2d,
    /// `point3d`
    Point3d,
    /// `string`
    String,
    /// `Bentley.Geometry.Common.IGeometry`
    IGeometry,
}

impl PrimitiveType {
    /// Parse a primitive type token (case-insensitive)
    pub fn parse(token: &str) -> Option<Self> {
        let lower = token.to_ascii_lowercase();
        Some(match lower.as_str() {
            "binary" => PrimitiveType::Binary,
            "boolean" | "bool" => PrimitiveType::Boolean,
            "datetime" => PrimitiveType::DateTime,
            "double" => PrimitiveType::Double,
            "int" => PrimitiveType::Integer,
            "long" => PrimitiveType::Long,
            "point2d" => PrimitiveType::Point2d,
            "point3d" => PrimitiveType::Point3d,
            "string" => PrimitiveType::String,
            "bentley.geometry.common.igeometry" => PrimitiveType::IGeometry,
            _ => return None,
        })
    }

    /// The canonical token
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Binary => "binary",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::DateTime => "dateTime",
            PrimitiveType::Double => "double",
            PrimitiveType::Integer => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Point2d => "point2d",
            PrimitiveType::Point3d => "point3d",
            PrimitiveType::String => "string",
            PrimitiveType::IGeometry => "Bentley.Geometry.Common.IGeometry",
        }
    }

    /// Whether values of this type are carried as uninterpreted text
    pub fn is_opaque(&self) -> bool {
        matches!(self, PrimitiveType::Binary | PrimitiveType::IGeometry)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(PrimitiveType::parse("int"), Some(PrimitiveType::Integer));
        assert_eq!(PrimitiveType::parse("dateTime"), Some(PrimitiveType::DateTime));
        assert_eq!(PrimitiveType::parse("Point3D"), Some(PrimitiveType::Point3d));
        assert_eq!(
            PrimitiveType::parse("Bentley.Geometry.Common.IGeometry"),
            Some(PrimitiveType::IGeometry)
        );
        assert_eq!(PrimitiveType::parse("Color"), None);
    }

    #[test]
    fn test_round_trip_token() {
        for t in [PrimitiveType::Long, PrimitiveType::Binary, PrimitiveType::String] {
            assert_eq!(PrimitiveType::parse(t.as_str()), Some(t));
        }
    }
}
