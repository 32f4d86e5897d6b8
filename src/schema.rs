//! The fixed JSON Schema for `.meta.json` sidecar documents.
//!
//! The schema (Draft 7) lives in `schemas/table.schema.json` and is embedded
//! at compile time. Sidecars are validated against it every time a table is
//! loaded; a failing document is rejected as a whole.

use crate::error::{CatalogError, Result};
use serde_json::Value;
use std::sync::LazyLock;

/// Raw text of the sidecar schema.
pub const SCHEMA_JSON: &str = include_str!("../schemas/table.schema.json");

static SCHEMA: LazyLock<std::result::Result<Value, String>> =
    LazyLock::new(|| serde_json::from_str(SCHEMA_JSON).map_err(|e| e.to_string()));

/// The parsed sidecar schema.
pub fn schema() -> Result<&'static Value> {
    SCHEMA
        .as_ref()
        .map_err(|e| CatalogError::Json(format!("Embedded sidecar schema is not JSON: {e}")))
}

/// Check that the sidecar schema is itself a valid Draft 7 schema.
pub fn check_schema() -> Result<()> {
    jsonschema::draft7::meta::validate(schema()?)
        .map_err(|e| CatalogError::SchemaValidation(format!("Sidecar schema is invalid: {e}")))
}

/// Validate a sidecar document, reporting every violation at once.
pub fn validate_document(document: &Value) -> Result<()> {
    let validator = jsonschema::draft7::new(schema()?)
        .map_err(|e| CatalogError::SchemaValidation(format!("Cannot compile schema: {e}")))?;

    let problems: Vec<String> = validator
        .iter_errors(document)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{path}: {e}")
            }
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::SchemaValidation(problems.join("\n")))
    }
}
