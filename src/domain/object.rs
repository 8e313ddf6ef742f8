//! Exportable object identity and retrieved DDL text

use super::object_type::ObjectType;
use serde::Serialize;
use std::fmt;

/// Identifies one exportable database object
///
/// Produced by the enumerator and consumed by the retriever and the
/// output layout. Never mutated.
///
/// # Examples
///
/// ```
/// use object_tracker::domain::{ObjectRef, ObjectType};
///
/// let object = ObjectRef::new("HR", ObjectType::Table, "EMPLOYEES");
/// assert_eq!(object.to_string(), "TABLE HR.EMPLOYEES");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectRef {
    pub schema: String,
    pub object_type: ObjectType,
    pub object_name: String,
}

impl ObjectRef {
    pub fn new(
        schema: impl Into<String>,
        object_type: ObjectType,
        object_name: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            object_type,
            object_name: object_name.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.object_type.catalog_name(),
            self.schema,
            self.object_name
        )
    }
}

/// DDL text for one object, always terminated by a newline
///
/// The content is opaque: it is never parsed or validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlText(String);

impl DdlText {
    /// Wraps rendered text, appending exactly one trailing newline
    pub fn from_rendered(rendered: impl Into<String>) -> Self {
        let mut text = rendered.into();
        text.push('\n');
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for DdlText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
