use super::source::{License, Source, records};
use super::{take, take_list};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata describing a whole table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableMeta {
    /// Snake-case identifier, usually the file stem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Free-form text, may contain markdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The dataset this table was published in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetMeta>,

    /// Ordered key columns; empty when the table has no index
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl TableMeta {
    /// Build from a loose key/value mapping, ignoring unrecognised keys.
    pub fn from_dict(map: &Map<String, Value>) -> Self {
        Self {
            short_name: take(map, "short_name"),
            title: take(map, "title"),
            description: take(map, "description"),
            dataset: match map.get("dataset") {
                Some(Value::Object(obj)) => Some(DatasetMeta::from_dict(obj)),
                Some(Value::Null) | None => None,
                Some(other) => {
                    tracing::warn!(
                        "Dropping metadata key 'dataset': expected an object, got {other}"
                    );
                    None
                }
            },
            primary_key: take_list(map, "primary_key"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Metadata of the dataset a table belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Grouping of related datasets (usually the publishing institution)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,
}

impl DatasetMeta {
    pub fn from_dict(map: &Map<String, Value>) -> Self {
        Self {
            namespace: take(map, "namespace"),
            short_name: take(map, "short_name"),
            title: take(map, "title"),
            description: take(map, "description"),
            version: take(map, "version"),
            is_public: take(map, "is_public"),
            sources: records(map, "sources", Source::from_dict),
            licenses: records(map, "licenses", License::from_dict),
        }
    }
}
