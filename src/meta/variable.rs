use super::source::{License, Source, records};
use super::take;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Descriptive metadata for a single column.
///
/// Empty fields are left out when serialised, so a column without metadata
/// is written as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariableMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Free-form text, may contain markdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit of measurement (e.g. "international-$ in 2011 prices")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Abbreviated unit for charts (e.g. "$")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_unit: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,

    /// Presentation hints, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<Map<String, Value>>,
}

impl VariableMeta {
    /// Build from a loose key/value mapping, ignoring unrecognised keys.
    pub fn from_dict(map: &Map<String, Value>) -> Self {
        Self {
            title: take(map, "title"),
            description: take(map, "description"),
            unit: take(map, "unit"),
            short_unit: take(map, "short_unit"),
            sources: records(map, "sources", Source::from_dict),
            licenses: records(map, "licenses", License::from_dict),
            display: take(map, "display"),
            additional_info: take(map, "additional_info"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builder-style setter, handy when constructing metadata inline.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>, short_unit: Option<&str>) -> Self {
        self.unit = Some(unit.into());
        self.short_unit = short_unit.map(str::to_owned);
        self
    }
}
