//! Descriptive metadata value objects.
//!
//! Two levels of metadata are attached to a [`crate::Table`]:
//!
//! - [`TableMeta`]: describes the whole table (short name, title, description,
//!   primary key, the dataset it belongs to)
//! - [`VariableMeta`]: describes a single column (title, description, units,
//!   provenance)
//!
//! Both are plain values: every field is optional, `Default` is the "all
//! empty" state and equality is structural. Nothing here validates field
//! contents; the shape of persisted documents is checked by [`crate::schema`]
//! when a sidecar file is loaded.
//!
//! ## Forward compatibility
//!
//! `from_dict` constructors never fail. Recognised keys populate fields and
//! everything else is dropped, so documents written by newer or older
//! versions of the metadata shape can always be read:
//!
//! ```
//! use metatable::meta::TableMeta;
//! use serde_json::json;
//!
//! let doc = json!({"title": "GDP", "llama": "Sam"});
//! let meta = TableMeta::from_dict(doc.as_object().unwrap());
//! assert_eq!(meta.title.as_deref(), Some("GDP"));
//! ```

pub mod source;
pub mod table;
pub mod variable;

pub use source::{License, Source};
pub use table::{DatasetMeta, TableMeta};
pub use variable::VariableMeta;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Extract one recognised key from a loose mapping.
///
/// Missing keys, `null` values and values of the wrong shape all yield `None`;
/// the last case is logged since it usually means a producer bug.
pub(crate) fn take<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    match serde_json::from_value::<Option<T>>(value.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Dropping metadata key '{key}': {e}");
            None
        }
    }
}

/// Like [`take`] for list-valued keys, which default to empty.
pub(crate) fn take_list<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    take::<Vec<T>>(map, key).unwrap_or_default()
}

