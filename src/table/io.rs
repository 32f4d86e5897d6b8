//! Persistence of a [`Table`] as a data file plus a `.meta.json` sidecar.
//!
//! Saving `path/table.feather` writes two artifacts:
//!
//! - `path/table.feather`: the data, key columns written as ordinary columns
//! - `path/table.meta.json`: table metadata, `primary_key`, and a `fields`
//!   object with one entry per column (`{}` when a column has no metadata)
//!
//! Loading validates the sidecar against [`crate::schema`] before anything
//! else is read, then restores the key columns and every registry entry.
//!
//! The two writes are independent. A failure between them can leave a data
//! file next to a stale or missing sidecar; nothing here detects that.

use super::Table;
use crate::config::IoSettings;
use crate::error::{CatalogError, Result, ResultExt as _};
use crate::meta::{TableMeta, VariableMeta};
use crate::schema;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Supported encodings for the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    /// Arrow IPC, also known as Feather v2
    Feather,
    Parquet,
}

impl Format {
    /// Pick the encoding from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "feather" | "arrow" | "ipc" => Ok(Self::Feather),
            "parquet" => Ok(Self::Parquet),
            _ => Err(CatalogError::UnsupportedFormat(ext)),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Feather => "feather",
            Self::Parquet => "parquet",
        }
    }
}

/// Path of the metadata document that accompanies `path`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// On-disk shape of the sidecar.
#[derive(Serialize)]
struct SidecarRef<'a> {
    #[serde(flatten)]
    table: &'a TableMeta,
    fields: &'a BTreeMap<String, VariableMeta>,
}

#[derive(Deserialize)]
struct Sidecar {
    #[serde(flatten)]
    table: TableMeta,
    fields: BTreeMap<String, VariableMeta>,
}

impl Table {
    /// Save to `path`, choosing the encoding from its extension.
    pub fn save(&self, path: impl AsRef<Path>, settings: &IoSettings) -> Result<()> {
        let path = path.as_ref();
        self.save_as(path, Format::from_path(path)?, settings)
    }

    /// Save with an explicit encoding, whatever the extension.
    pub fn save_as(&self, path: &Path, format: Format, settings: &IoSettings) -> Result<()> {
        if self.is_empty() {
            return Err(CatalogError::EmptyTable);
        }
        if let Some(missing) = self.primary_key().iter().find(|k| !self.has_column(k)) {
            return Err(CatalogError::ColumnNotFound(missing.clone()));
        }

        let mut df = self.df.clone();
        write_data(&mut df, path, format, settings)?;

        let sidecar = sidecar_path(path);
        let document = SidecarRef {
            table: &self.metadata,
            fields: &self.fields,
        };
        let json = if settings.pretty_sidecar {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        std::fs::write(&sidecar, json)
            .with_context(|| format!("Failed to write sidecar: {}", sidecar.display()))?;

        tracing::info!(
            "Saved table {:?} ({} rows, {} columns) to {}",
            self.metadata.short_name.as_deref().unwrap_or("<unnamed>"),
            self.height(),
            self.width(),
            path.display()
        );
        Ok(())
    }

    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_as(path.as_ref(), Format::Csv, &IoSettings::default())
    }

    pub fn to_feather(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_as(path.as_ref(), Format::Feather, &IoSettings::default())
    }

    pub fn to_parquet(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_as(path.as_ref(), Format::Parquet, &IoSettings::default())
    }

    /// Load from `path`, choosing the encoding from its extension.
    pub fn load(path: impl AsRef<Path>, settings: &IoSettings) -> Result<Self> {
        let path = path.as_ref();
        Self::load_as(path, Format::from_path(path)?, settings)
    }

    /// Load with an explicit encoding.
    ///
    /// The sidecar must exist and pass schema validation; the data file is
    /// only read afterwards.
    pub fn load_as(path: &Path, format: Format, settings: &IoSettings) -> Result<Self> {
        let sidecar = read_sidecar(&sidecar_path(path))?;
        let df = read_data(path, format, settings)?;

        let table = Self::from_parts(df, sidecar.table, sidecar.fields)?;
        tracing::info!(
            "Loaded table from {} ({} rows, {} columns)",
            path.display(),
            table.height(),
            table.width()
        );
        Ok(table)
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_as(path.as_ref(), Format::Csv, &IoSettings::default())
    }

    pub fn read_feather(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_as(path.as_ref(), Format::Feather, &IoSettings::default())
    }

    pub fn read_parquet(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_as(path.as_ref(), Format::Parquet, &IoSettings::default())
    }
}

fn write_data(
    df: &mut DataFrame,
    path: &Path,
    format: Format,
    settings: &IoSettings,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create data file: {}", path.display()))?;

    match format {
        Format::Csv => {
            CsvWriter::new(file)
                .include_header(true)
                .finish(df)
                .context("Failed to write CSV file")?;
        }
        Format::Feather => {
            IpcWriter::new(file)
                .finish(df)
                .context("Failed to write Feather file")?;
        }
        Format::Parquet => {
            ParquetWriter::new(file)
                .with_row_group_size(settings.parquet_row_group_size)
                .finish(df)
                .context("Failed to write Parquet file")?;
        }
    }

    tracing::debug!("Wrote {:?} data to {}", format, path.display());
    Ok(())
}

fn read_data(path: &Path, format: Format, settings: &IoSettings) -> Result<DataFrame> {
    let df = match format {
        Format::Csv => LazyCsvReader::new(path)
            .with_infer_schema_length(settings.csv_infer_schema_length)
            .with_has_header(true)
            .with_try_parse_dates(settings.csv_try_parse_dates)
            .finish()?
            .collect()
            .context("Failed to read CSV")?,
        Format::Feather => IpcReader::new(open(path)?)
            .finish()
            .context("Failed to read Feather")?,
        Format::Parquet => ParquetReader::new(open(path)?)
            .finish()
            .context("Failed to read Parquet")?,
    };
    Ok(df)
}

fn read_sidecar(path: &Path) -> Result<Sidecar> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sidecar: {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Sidecar is not valid JSON: {}", path.display()))?;

    schema::validate_document(&document)
        .with_context(|| format!("Invalid sidecar {}", path.display()))?;

    // The schema cannot express every constraint (calendar dates, for one).
    let sidecar = serde_json::from_value(document).map_err(|e| {
        CatalogError::SchemaValidation(format!("Invalid sidecar {}: {e}", path.display()))
    })?;
    tracing::debug!("Read sidecar {}", path.display());
    Ok(sidecar)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open data file: {}", path.display()))
}
