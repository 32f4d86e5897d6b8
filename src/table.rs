//! Tables that carry table-level and column-level metadata.
//!
//! A [`Table`] owns three things:
//!
//! - a polars [`DataFrame`] with every column, key columns included
//! - one [`TableMeta`]; its `primary_key` names the key (index) columns
//! - the **fields registry**: one [`VariableMeta`] per column name
//!
//! The registry is total. Construction creates an empty entry for every
//! column and every operation that adds, drops or renames columns keeps it in
//! step, so `fields().keys()` always equals the set of column names.
//!
//! ## Propagation rules
//!
//! - Row selections (`slice`, `head`, `tail`, `filter`, `drop_duplicates`)
//!   carry the table metadata and every registry entry unchanged.
//! - `insert` with a [`Variable`] moves its metadata into the registry; a
//!   plain [`Series`] resets the entry to empty.
//! - Index operations only touch `primary_key`, never the registry.
//!
//! ```
//! use metatable::Table;
//! use polars::prelude::*;
//!
//! # fn main() -> metatable::error::Result<()> {
//! let mut t = Table::new(df!(
//!     "gdp" => &[100i64, 102, 104],
//!     "country" => &["AU", "SE", "CH"]
//! )?);
//! t.field_mut("gdp")?.title = Some("GDP".to_owned());
//!
//! let first = t.head(1);
//! assert_eq!(first.column("gdp")?.metadata.title.as_deref(), Some("GDP"));
//! # Ok(())
//! # }
//! ```

pub mod io;

#[cfg(test)]
mod tests;

pub use io::{Format, sidecar_path};

use crate::error::{CatalogError, Result};
use crate::meta::{TableMeta, VariableMeta};
use crate::variable::Variable;
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};

/// Base name of the temporary column used while computing duplicate masks.
const ROW_NR: &str = "__metatable_row_nr";

/// A columnar table with descriptive metadata.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    metadata: TableMeta,
    fields: BTreeMap<String, VariableMeta>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(DataFrame::empty())
    }
}

impl From<DataFrame> for Table {
    fn from(df: DataFrame) -> Self {
        Self::new(df)
    }
}

impl PartialEq for Table {
    /// Tables are equal when data, table metadata and the whole registry
    /// (empty entries included) match. Numeric widths may differ, as they do
    /// after reading a CSV back.
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
            && self.metadata == other.metadata
            && self.fields == other.fields
    }
}

impl Table {
    /// Wrap a data frame, with empty metadata for the table and every column.
    pub fn new(df: DataFrame) -> Self {
        let fields = df
            .get_column_names()
            .into_iter()
            .map(|name| (name.to_string(), VariableMeta::default()))
            .collect();

        Self {
            df,
            metadata: TableMeta::default(),
            fields,
        }
    }

    /// Build from named columns, which must all have the same length.
    pub fn from_series(columns: Vec<Series>) -> Result<Self> {
        let columns = columns.into_iter().map(Column::from).collect();
        Ok(Self::new(DataFrame::new(columns)?))
    }

    /// Build from Variables, keeping each one's metadata.
    pub fn from_variables(variables: Vec<Variable>) -> Result<Self> {
        let mut table = Self::default();
        for variable in variables {
            let name = variable.name().to_owned();
            table.insert(&name, variable)?;
        }
        Ok(table)
    }

    // ------------------------------------------------------------------
    // Data accessors
    // ------------------------------------------------------------------

    pub fn data(&self) -> &DataFrame {
        &self.df
    }

    /// Drop the metadata and return the underlying data frame.
    pub fn into_data(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// `true` when the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.df.width() == 0
    }

    /// Every column name, key columns included, in frame order.
    pub fn all_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Non-key column names, in frame order.
    pub fn columns(&self) -> Vec<String> {
        self.all_columns()
            .into_iter()
            .filter(|name| !self.metadata.primary_key.contains(name))
            .collect()
    }

    pub fn primary_key(&self) -> &[String] {
        &self.metadata.primary_key
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    pub fn metadata(&self) -> &TableMeta {
        &self.metadata
    }

    /// Mutable table metadata.
    ///
    /// `primary_key` is normally managed by [`Self::set_index`]; editing it
    /// here is checked again when the table is saved.
    pub fn metadata_mut(&mut self) -> &mut TableMeta {
        &mut self.metadata
    }

    /// Replace the table metadata, keeping the current primary key.
    pub fn set_metadata(&mut self, metadata: TableMeta) {
        let primary_key = std::mem::take(&mut self.metadata.primary_key);
        self.metadata = TableMeta {
            primary_key,
            ..metadata
        };
    }

    /// The fields registry: metadata for every column name.
    pub fn fields(&self) -> &BTreeMap<String, VariableMeta> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Result<&VariableMeta> {
        self.fields
            .get(name)
            .ok_or_else(|| CatalogError::ColumnNotFound(name.to_owned()))
    }

    /// Edit a column's metadata in place. Later reads of the column see the
    /// change.
    pub fn field_mut(&mut self, name: &str) -> Result<&mut VariableMeta> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| CatalogError::ColumnNotFound(name.to_owned()))
    }

    pub fn set_field(&mut self, name: &str, metadata: VariableMeta) -> Result<()> {
        *self.field_mut(name)? = metadata;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Read a column together with its registry entry.
    pub fn column(&self, name: &str) -> Result<Variable> {
        let metadata = self.field(name)?.clone();
        let series = self.df.column(name)?.as_materialized_series().clone();
        Ok(Variable::new(series, metadata))
    }

    /// Add or overwrite a column.
    ///
    /// The registry entry for `name` becomes the metadata carried by `value`,
    /// which is empty when a plain [`Series`] is passed. Stale metadata never
    /// outlives the data it described.
    pub fn insert(&mut self, name: &str, value: impl Into<Variable>) -> Result<()> {
        let (series, metadata) = value.into().into_parts();
        let series = series.with_name(name.into());

        if self.df.width() == 0 {
            self.df = DataFrame::new(vec![Column::from(series)])?;
        } else {
            self.df.with_column(series)?;
        }

        tracing::debug!(column = name, empty = metadata.is_empty(), "Column assigned");
        self.fields.insert(name.to_owned(), metadata);
        Ok(())
    }

    /// Remove a column and its metadata. A key column also leaves the
    /// primary key.
    pub fn drop_column(&mut self, name: &str) -> Result<Variable> {
        let metadata = self
            .fields
            .remove(name)
            .ok_or_else(|| CatalogError::ColumnNotFound(name.to_owned()))?;
        let column = self.df.drop_in_place(name)?;
        self.metadata.primary_key.retain(|key| key != name);
        Ok(Variable::new(column.take_materialized_series(), metadata))
    }

    /// Rename a column; its metadata moves with it.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return self.field(from).map(|_| ());
        }
        if self.has_column(to) {
            return Err(CatalogError::DataProcessing(format!(
                "Cannot rename '{from}' to '{to}': column already exists"
            )));
        }
        let metadata = self
            .fields
            .remove(from)
            .ok_or_else(|| CatalogError::ColumnNotFound(from.to_owned()))?;
        if let Err(e) = self.df.rename(from, to.into()) {
            self.fields.insert(from.to_owned(), metadata);
            return Err(e.into());
        }
        for key in &mut self.metadata.primary_key {
            if key == from {
                to.clone_into(key);
            }
        }
        self.fields.insert(to.to_owned(), metadata);
        Ok(())
    }

    /// Keep only the named columns (plus the key columns).
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut keep: Vec<String> = self.metadata.primary_key.clone();
        for name in names {
            let name = name.as_ref();
            if !self.has_column(name) {
                return Err(CatalogError::ColumnNotFound(name.to_owned()));
            }
            if !keep.iter().any(|k| k == name) {
                keep.push(name.to_owned());
            }
        }
        let df = self.df.select(keep)?;
        Ok(self.derive(df))
    }

    // ------------------------------------------------------------------
    // Row selection
    // ------------------------------------------------------------------

    /// Positional slice; a negative offset counts from the end.
    pub fn slice(&self, offset: i64, length: usize) -> Self {
        self.derive(self.df.slice(offset, length))
    }

    pub fn head(&self, n: usize) -> Self {
        self.derive(self.df.head(Some(n)))
    }

    pub fn tail(&self, n: usize) -> Self {
        self.derive(self.df.tail(Some(n)))
    }

    /// Keep the rows where `mask` is true.
    pub fn filter(&self, mask: &BooleanChunked) -> Result<Self> {
        let df = self.df.filter(mask)?;
        Ok(self.derive(df))
    }

    // ------------------------------------------------------------------
    // Index
    // ------------------------------------------------------------------

    /// Mark columns as the table's key, in the given order.
    ///
    /// Key columns stay in the frame (moved to the front) and keep their
    /// registry entries.
    pub fn set_index<I, S>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for key in &keys {
            if !self.has_column(key) {
                return Err(CatalogError::ColumnNotFound(key.clone()));
            }
            if !seen.insert(key.as_str()) {
                return Err(CatalogError::DataProcessing(format!(
                    "Column '{key}' appears twice in the index"
                )));
            }
        }

        let order: Vec<String> = keys
            .iter()
            .cloned()
            .chain(self.all_columns().into_iter().filter(|c| !keys.contains(c)))
            .collect();
        self.df = self.df.select(order)?;
        self.metadata.primary_key = keys;
        Ok(())
    }

    /// By-value form of [`Self::set_index`], for chaining.
    pub fn with_index<I, S>(mut self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_index(keys)?;
        Ok(self)
    }

    /// Turn key columns back into ordinary columns.
    pub fn reset_index(&mut self) {
        self.metadata.primary_key.clear();
    }

    // ------------------------------------------------------------------
    // Duplicates
    // ------------------------------------------------------------------

    /// Mask of rows that repeat an earlier row. Key columns are left out of
    /// the comparison unless the table has nothing but key columns. The
    /// first occurrence of each row is not marked.
    pub fn duplicated(&self) -> Result<BooleanChunked> {
        let height = self.df.height();
        if self.df.width() == 0 {
            return Ok(BooleanChunked::full("duplicated".into(), false, height));
        }

        let mut subset = self.columns();
        if subset.is_empty() {
            subset = self.all_columns();
        }
        let row_nr = self.unused_column_name(ROW_NR);
        let numbered = self.df.with_row_index(row_nr.as_str().into(), None)?;
        let firsts =
            numbered.unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?;
        let kept: HashSet<IdxSize> = firsts
            .column(&row_nr)?
            .as_materialized_series()
            .idx()?
            .into_no_null_iter()
            .collect();

        Ok(BooleanChunked::from_iter_values(
            "duplicated".into(),
            (0..height).map(|i| !kept.contains(&(i as IdxSize))),
        ))
    }

    /// Remove repeated rows, keeping the first occurrence.
    pub fn drop_duplicates(&self) -> Result<Self> {
        let keep = !&self.duplicated()?;
        self.filter(&keep)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// `base`, suffixed until no column has that name.
    fn unused_column_name(&self, base: &str) -> String {
        let mut name = base.to_owned();
        let mut n = 0;
        while self.has_column(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        name
    }

    /// A new table over `df` with this table's metadata, restricted to the
    /// columns `df` still has.
    fn derive(&self, df: DataFrame) -> Self {
        let names: HashSet<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let mut fields: BTreeMap<String, VariableMeta> = self
            .fields
            .iter()
            .filter(|(name, _)| names.contains(*name))
            .map(|(name, meta)| (name.clone(), meta.clone()))
            .collect();
        for name in names {
            fields.entry(name).or_default();
        }

        let mut metadata = self.metadata.clone();
        metadata.primary_key.retain(|key| fields.contains_key(key));

        Self {
            df,
            metadata,
            fields,
        }
    }

    /// Rebuild from persisted parts; entries for unknown names are dropped
    /// and missing ones created empty.
    pub(crate) fn from_parts(
        df: DataFrame,
        metadata: TableMeta,
        mut fields: BTreeMap<String, VariableMeta>,
    ) -> Result<Self> {
        let mut table = Self::new(df);
        for (name, entry) in &mut table.fields {
            if let Some(stored) = fields.remove(name) {
                *entry = stored;
            }
        }
        if !fields.is_empty() {
            tracing::warn!(
                "Ignoring metadata for columns missing from the data: {:?}",
                fields.keys().collect::<Vec<_>>()
            );
        }

        let primary_key = metadata.primary_key.clone();
        table.metadata = metadata;
        table.set_index(primary_key)?;
        Ok(table)
    }
}
