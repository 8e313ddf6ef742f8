//! Object types command implementation
//!
//! Prints the supported object types with the directory name each one is
//! written under.

use crate::cli::EXIT_OK;
use crate::domain::ObjectType;
use clap::Args;

/// Arguments for the object-types command
#[derive(Args, Debug)]
pub struct ObjectTypesArgs {}

impl ObjectTypesArgs {
    /// Execute the object-types command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        print!("{}", render_table());
        Ok(EXIT_OK)
    }
}

/// Two-column table of catalog keyword and short name
pub fn render_table() -> String {
    let width = ObjectType::ALL
        .iter()
        .map(|t| t.catalog_name().len())
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<width$}  {}\n", "OBJECT TYPE", "DIRECTORY");
    for object_type in ObjectType::ALL {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            object_type.catalog_name(),
            object_type.short_name()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_type() {
        let table = render_table();
        assert_eq!(table.lines().count(), ObjectType::ALL.len() + 1);
        assert!(table
            .lines()
            .any(|l| l.starts_with("PACKAGE BODY") && l.ends_with("PACKAGE_BODY")));
        assert!(table
            .lines()
            .any(|l| l.starts_with("DATABASE LINK") && l.ends_with("DB_LINK")));
    }
}
