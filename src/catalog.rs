//! Bulk ingredient catalog loading.
//!
//! Reads a JSON file of `{"name", "measurement_unit"}` entries and inserts
//! them into the ingredients table. Entries whose name is already present
//! are skipped, so re-running the load is safe.

use crate::db::DbConn;
use crate::models::NewIngredient;
use crate::schema::ingredients;
use diesel::prelude::*;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Db(diesel::result::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "failed to read catalog file: {}", e),
            CatalogError::Parse(e) => write!(f, "failed to parse catalog file: {}", e),
            CatalogError::Db(e) => write!(f, "failed to insert ingredients: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

impl From<diesel::result::Error> for CatalogError {
    fn from(e: diesel::result::Error) -> Self {
        CatalogError::Db(e)
    }
}

pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Load the catalog file and insert its entries, returning how many rows
/// were actually inserted (duplicates are not counted).
pub fn load_ingredients(conn: &mut DbConn, path: &Path) -> Result<usize, CatalogError> {
    let json = std::fs::read_to_string(path)?;
    let entries = parse_catalog(&json)?;

    let rows: Vec<NewIngredient> = entries
        .iter()
        .map(|e| NewIngredient {
            name: &e.name,
            measurement_unit: &e.measurement_unit,
        })
        .collect();

    let inserted = diesel::insert_into(ingredients::table)
        .values(&rows)
        .on_conflict_do_nothing()
        .execute(conn)?;

    tracing::info!(
        "Loaded ingredient catalog: {} entries in file, {} inserted",
        entries.len(),
        inserted
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_entries() {
        let json = r#"[
            {"name": "flour", "measurement_unit": "g"},
            {"name": "egg", "measurement_unit": "pcs"}
        ]"#;
        let entries = parse_catalog(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "flour");
        assert_eq!(entries[0].measurement_unit, "g");
        assert_eq!(entries[1].name, "egg");
        assert_eq!(entries[1].measurement_unit, "pcs");
    }

    #[test]
    fn empty_array_is_a_valid_catalog() {
        assert!(parse_catalog("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_entries_missing_the_unit() {
        let json = r#"[{"name": "flour"}]"#;
        assert!(parse_catalog(json).is_err());
    }

    #[test]
    fn rejects_a_non_array_document() {
        let json = r#"{"name": "flour", "measurement_unit": "g"}"#;
        assert!(parse_catalog(json).is_err());
    }
}
