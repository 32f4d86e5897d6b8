//! Provenance records shared by table, dataset and column metadata.

use super::take;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a piece of data came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    /// Name of the publishing organisation or product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Landing page for the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Direct link to the raw data that was ingested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_by: Option<String>,

    /// Day the raw data was retrieved (`YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_accessed: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
}

impl Source {
    pub fn from_dict(map: &Map<String, Value>) -> Self {
        Self {
            name: take(map, "name"),
            description: take(map, "description"),
            url: take(map, "url"),
            source_data_url: take(map, "source_data_url"),
            published_by: take(map, "published_by"),
            date_accessed: take(map, "date_accessed"),
            publication_date: take(map, "publication_date"),
            publication_year: take(map, "publication_year"),
        }
    }
}

/// Terms under which data may be reused.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    pub fn from_dict(map: &Map<String, Value>) -> Self {
        Self {
            name: take(map, "name"),
            url: take(map, "url"),
        }
    }
}

/// Parse a list of records, each through its own lenient constructor.
///
/// A malformed entry is skipped on its own instead of discarding the list.
pub(crate) fn records<T>(
    map: &Map<String, Value>,
    key: &str,
    from_dict: fn(&Map<String, Value>) -> T,
) -> Vec<T> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(from_dict(obj)),
                other => {
                    tracing::warn!("Dropping non-object entry in '{key}': {other}");
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            tracing::warn!("Dropping metadata key '{key}': expected a list, got {other}");
            Vec::new()
        }
    }
}
