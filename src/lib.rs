//! # metatable - tables that remember what their columns mean
//!
//! metatable wraps a polars `DataFrame` with descriptive metadata: one
//! [`meta::TableMeta`] for the table and one [`meta::VariableMeta`] for every
//! column. The metadata follows the data through slicing, column selection,
//! column overwrite, index changes and deduplication, and it round-trips
//! through a data file plus a `.meta.json` sidecar.
//!
//! ## Quick Start
//!
//! ```no_run
//! use metatable::Table;
//! use polars::prelude::*;
//!
//! # fn main() -> metatable::error::Result<()> {
//! let mut table = Table::new(df!(
//!     "country" => &["AU", "SE", "CH"],
//!     "gdp" => &[100i64, 102, 104]
//! )?)
//! .with_index(["country"])?;
//!
//! table.metadata_mut().title = Some("GDP by country".to_owned());
//! table.field_mut("gdp")?.unit = Some("international-$".to_owned());
//!
//! // writes gdp.feather and gdp.meta.json
//! table.to_feather("gdp.feather")?;
//!
//! let reloaded = Table::read_feather("gdp.feather")?;
//! assert_eq!(reloaded, table);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`meta`]: metadata value objects and lenient `from_dict` constructors
//! - [`variable`]: a single column bound to its metadata
//! - [`table`]: the metadata-aware table and its persistence
//! - [`schema`]: the JSON Schema every sidecar is validated against
//! - [`error`]: error types and handling utilities
//! - [`config`]: I/O settings
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;
pub mod meta;
pub mod schema;
pub mod table;
pub mod variable;

pub use config::IoSettings;
pub use error::{CatalogError, Result};
pub use meta::{TableMeta, VariableMeta};
pub use table::{Format, Table};
pub use variable::Variable;
