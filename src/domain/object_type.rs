//! Exportable object types and their directory short names
//!
//! The catalog reports object types as keywords such as `PACKAGE BODY`,
//! while the metadata service and the output layout use a single-token
//! short name such as `PACKAGE_BODY`. The mapping is a fixed table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A database object type that can be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ObjectType {
    Cluster,
    DatabaseLink,
    Function,
    Index,
    JavaSource,
    Job,
    MaterializedView,
    MaterializedViewLog,
    Package,
    PackageBody,
    Procedure,
    Sequence,
    Synonym,
    Table,
    Trigger,
    Type,
    TypeBody,
    View,
}

impl ObjectType {
    /// Every supported object type, in the default export order
    pub const ALL: [ObjectType; 18] = [
        ObjectType::Cluster,
        ObjectType::DatabaseLink,
        ObjectType::Function,
        ObjectType::Index,
        ObjectType::JavaSource,
        ObjectType::Job,
        ObjectType::MaterializedView,
        ObjectType::MaterializedViewLog,
        ObjectType::Package,
        ObjectType::PackageBody,
        ObjectType::Procedure,
        ObjectType::Sequence,
        ObjectType::Synonym,
        ObjectType::Table,
        ObjectType::Trigger,
        ObjectType::Type,
        ObjectType::TypeBody,
        ObjectType::View,
    ];

    /// Keyword used by the catalog (`ALL_OBJECTS.OBJECT_TYPE`)
    pub fn catalog_name(&self) -> &'static str {
        match self {
            ObjectType::Cluster => "CLUSTER",
            ObjectType::DatabaseLink => "DATABASE LINK",
            ObjectType::Function => "FUNCTION",
            ObjectType::Index => "INDEX",
            ObjectType::JavaSource => "JAVA SOURCE",
            ObjectType::Job => "JOB",
            ObjectType::MaterializedView => "MATERIALIZED VIEW",
            ObjectType::MaterializedViewLog => "MATERIALIZED VIEW LOG",
            ObjectType::Package => "PACKAGE",
            ObjectType::PackageBody => "PACKAGE BODY",
            ObjectType::Procedure => "PROCEDURE",
            ObjectType::Sequence => "SEQUENCE",
            ObjectType::Synonym => "SYNONYM",
            ObjectType::Table => "TABLE",
            ObjectType::Trigger => "TRIGGER",
            ObjectType::Type => "TYPE",
            ObjectType::TypeBody => "TYPE BODY",
            ObjectType::View => "VIEW",
        }
    }

    /// Filesystem-safe short name.
    ///
    /// Used both as the directory segment and as the object type handed to
    /// the metadata service.
    pub fn short_name(&self) -> &'static str {
        match self {
            ObjectType::Cluster => "CLUSTER",
            ObjectType::DatabaseLink => "DB_LINK",
            ObjectType::Function => "FUNCTION",
            ObjectType::Index => "INDEX",
            ObjectType::JavaSource => "JAVA_SOURCE",
            ObjectType::Job => "PROCOBJ",
            ObjectType::MaterializedView => "MATERIALIZED_VIEW",
            ObjectType::MaterializedViewLog => "MATERIALIZED_VIEW_LOG",
            ObjectType::Package => "PACKAGE_SPEC",
            ObjectType::PackageBody => "PACKAGE_BODY",
            ObjectType::Procedure => "PROCEDURE",
            ObjectType::Sequence => "SEQUENCE",
            ObjectType::Synonym => "SYNONYM",
            ObjectType::Table => "TABLE",
            ObjectType::Trigger => "TRIGGER",
            ObjectType::Type => "TYPE_SPEC",
            ObjectType::TypeBody => "TYPE_BODY",
            ObjectType::View => "VIEW",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.catalog_name())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    /// Accepts either the catalog keyword or the short name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.catalog_name() == wanted || t.short_name() == wanted)
            .ok_or_else(|| format!("Unsupported object type: '{s}'"))
    }
}

impl TryFrom<String> for ObjectType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectType> for String {
    fn from(value: ObjectType) -> Self {
        value.catalog_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("PACKAGE", ObjectType::Package, "PACKAGE_SPEC")]
    #[test_case("PACKAGE BODY", ObjectType::PackageBody, "PACKAGE_BODY")]
    #[test_case("TYPE", ObjectType::Type, "TYPE_SPEC")]
    #[test_case("DATABASE LINK", ObjectType::DatabaseLink, "DB_LINK")]
    #[test_case("JOB", ObjectType::Job, "PROCOBJ")]
    #[test_case("materialized view log", ObjectType::MaterializedViewLog, "MATERIALIZED_VIEW_LOG")]
    fn test_catalog_keyword_maps_to_short_name(input: &str, expected: ObjectType, short: &str) {
        let parsed: ObjectType = input.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.short_name(), short);
    }

    #[test]
    fn test_short_names_are_single_tokens() {
        for object_type in ObjectType::ALL {
            assert!(!object_type.short_name().contains(' '));
        }
    }

    #[test]
    fn test_short_name_parses_back() {
        assert_eq!("PACKAGE_SPEC".parse::<ObjectType>(), Ok(ObjectType::Package));
        assert_eq!("type_body".parse::<ObjectType>(), Ok(ObjectType::TypeBody));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!("QUEUE".parse::<ObjectType>().is_err());
        assert!("".parse::<ObjectType>().is_err());
    }

    #[test]
    fn test_short_names_unique() {
        let mut names: Vec<&str> = ObjectType::ALL.iter().map(|t| t.short_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ObjectType::ALL.len());
    }

    #[test]
    fn test_serde_uses_catalog_keyword() {
        let json = serde_json::to_string(&ObjectType::PackageBody).unwrap();
        assert_eq!(json, "\"PACKAGE BODY\"");
        let back: ObjectType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ObjectType::PackageBody);
    }
}
