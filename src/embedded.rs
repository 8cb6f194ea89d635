//! Embedded-type registry - the static table mapping scalar wire types to
//! local value representations.
//!
//! Consulted only for `SCALAR` attributes; association, composition and
//! enum attributes are compared by canonical name instead.

use serde::{Deserialize, Serialize};

/// Local value representation of a scalar wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarType {
    String,
    Boolean,
    Int,
    Long,
    Double,
    Decimal,
    Date,
    DateTime,
    Time,
    Uuid,
    ByteArray,
}

/// Wire identifier to local scalar type, exhaustive for the wire types the
/// engine supports.
pub const EMBEDDED_TYPES: &[(&str, ScalarType)] = &[
    ("string", ScalarType::String),
    ("boolean", ScalarType::Boolean),
    ("int", ScalarType::Int),
    ("integer", ScalarType::Int),
    ("long", ScalarType::Long),
    ("double", ScalarType::Double),
    ("decimal", ScalarType::Decimal),
    ("date", ScalarType::Date),
    ("dateTime", ScalarType::DateTime),
    ("time", ScalarType::Time),
    ("uuid", ScalarType::Uuid),
    ("byteArray", ScalarType::ByteArray),
];

impl ScalarType {
    /// Resolve a wire type identifier.
    ///
    /// Returns `None` for identifiers the registry does not know; the
    /// caller reports that as a drift rather than guessing.
    pub fn resolve(wire: &str) -> Option<ScalarType> {
        EMBEDDED_TYPES
            .iter()
            .find(|(name, _)| *name == wire)
            .map(|(_, scalar)| *scalar)
    }

    /// Canonical wire spelling, used in diagnostics.
    pub fn wire_name(self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
            ScalarType::Int => "int",
            ScalarType::Long => "long",
            ScalarType::Double => "double",
            ScalarType::Decimal => "decimal",
            ScalarType::Date => "date",
            ScalarType::DateTime => "dateTime",
            ScalarType::Time => "time",
            ScalarType::Uuid => "uuid",
            ScalarType::ByteArray => "byteArray",
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
