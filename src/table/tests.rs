#![expect(clippy::unwrap_used)]
use super::*;
use crate::meta::{DatasetMeta, Source};
use anyhow::Result;
use polars::prelude::*;

fn gdp_table() -> Result<Table> {
    Ok(Table::new(df!(
        "gdp" => &[100i64, 102, 104],
        "country" => &["AU", "SE", "CH"]
    )?))
}

fn described(title: &str) -> TableMeta {
    TableMeta {
        short_name: Some("gdp".to_owned()),
        title: Some(title.to_owned()),
        description: Some(
            "## Well...\n\nI discovered this table in the Summer of '63...".to_owned(),
        ),
        dataset: Some(DatasetMeta {
            namespace: Some("worldbank".to_owned()),
            ..Default::default()
        }),
        primary_key: vec![],
    }
}

fn values_i64(table: &Table, name: &str) -> Vec<i64> {
    table
        .column(name)
        .unwrap()
        .series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

#[test]
fn test_create() -> Result<()> {
    let t = gdp_table()?;
    assert_eq!(values_i64(&t, "gdp"), vec![100, 102, 104]);
    assert_eq!(t.all_columns(), vec!["gdp", "country"]);
    assert_eq!(t.metadata(), &TableMeta::default());
    Ok(())
}

#[test]
fn test_registry_is_total_after_construction() -> Result<()> {
    let t = gdp_table()?;
    let keys: Vec<&String> = t.fields().keys().collect();
    assert_eq!(keys, vec!["country", "gdp"]);
    assert!(t.fields().values().all(VariableMeta::is_empty));
    Ok(())
}

#[test]
fn test_from_series_rejects_ragged_columns() {
    let result = Table::from_series(vec![
        Series::new("a".into(), &[1i64, 2, 3]),
        Series::new("b".into(), &[1i64, 2]),
    ]);
    assert!(matches!(result, Err(CatalogError::DataProcessing(_))));
}

#[test]
fn test_empty_table_metadata() {
    let t = Table::default();
    assert_eq!(t.metadata(), &TableMeta::default());
    assert!(t.is_empty());
    assert!(t.fields().is_empty());
}

#[test]
fn test_table_metadata_persists_with_slicing() -> Result<()> {
    let mut t = gdp_table()?;
    t.set_metadata(described("My table indeed"));

    let t2 = t.slice(0, 2);
    assert_eq!(t2.metadata(), t.metadata());
    assert_eq!(t2.height(), 2);
    Ok(())
}

#[test]
fn test_add_field_metadata() -> Result<()> {
    let mut t = gdp_table()?;
    let title = "GDP per capita in 2011 international $";

    assert_eq!(t.column("gdp")?.metadata, VariableMeta::default());

    t.field_mut("gdp")?.title = Some(title.to_owned());

    // single field access and whole-metadata access see the same entry
    assert_eq!(t.column("gdp")?.metadata.title.as_deref(), Some(title));
    assert_eq!(t.field("gdp")?, &VariableMeta::default().with_title(title));

    // field metadata persists across slices
    assert_eq!(t.head(1).column("gdp")?.metadata.title.as_deref(), Some(title));
    Ok(())
}

#[test]
fn test_row_selections_keep_all_field_metadata() -> Result<()> {
    let mut t = gdp_table()?;
    t.set_metadata(described("Selections"));
    t.field_mut("gdp")?.unit = Some("dollars".to_owned());

    let mask = t.column("gdp")?.series().gt(100)?;
    for selected in [t.head(2), t.tail(1), t.slice(-2, 2), t.filter(&mask)?] {
        assert_eq!(selected.metadata(), t.metadata());
        assert_eq!(selected.fields(), t.fields());
    }
    Ok(())
}

#[test]
fn test_slice_metadata_is_independent() -> Result<()> {
    let t = gdp_table()?;
    let mut slice = t.head(1);
    slice.field_mut("gdp")?.title = Some("Only in the slice".to_owned());
    slice.metadata_mut().title = Some("Slice".to_owned());

    assert!(t.field("gdp")?.is_empty());
    assert_eq!(t.metadata().title, None);
    Ok(())
}

#[test]
fn test_can_overwrite_column_with_apply() -> Result<()> {
    let mut table = Table::new(df!("a" => &[1i64, 2, 3], "b" => &[4i64, 5, 6])?);
    table.field_mut("a")?.title = Some("This thing is a".to_owned());

    let v = table.column("a")?.apply(|s| Ok(s + 1))?;
    assert_eq!(v.name(), "a");
    assert_eq!(v.metadata.title.as_deref(), Some("This thing is a"));

    table.insert("a", v)?;
    assert_eq!(values_i64(&table, "a"), vec![2, 3, 4]);
    assert_eq!(table.field("a")?.title.as_deref(), Some("This thing is a"));
    Ok(())
}

#[test]
fn test_plain_series_resets_field_metadata() -> Result<()> {
    let mut t = gdp_table()?;
    t.field_mut("gdp")?.title = Some("GDP".to_owned());

    t.insert("gdp", Series::new("whatever".into(), &[1i64, 2, 3]))?;
    assert_eq!(t.field("gdp")?, &VariableMeta::default());
    assert_eq!(t.column("gdp")?.name(), "gdp");
    Ok(())
}

#[test]
fn test_insert_new_column_registers_field() -> Result<()> {
    let mut t = gdp_table()?;
    t.insert("hdi", Series::new("hdi".into(), &[0.9f64, 0.95, 0.96]))?;

    assert_eq!(t.width(), 3);
    assert!(t.has_column("hdi"));
    assert_eq!(t.fields().len(), 3);
    Ok(())
}

#[test]
fn test_insert_rejects_wrong_length() -> Result<()> {
    let mut t = gdp_table()?;
    let result = t.insert("hdi", Series::new("hdi".into(), &[1i64, 2]));
    assert!(result.is_err());
    assert!(!t.has_column("hdi"));
    Ok(())
}

#[test]
fn test_field_metadata_copied_between_tables() -> Result<()> {
    let mut t1 = gdp_table()?;
    let mut t2 = Table::new(df!(
        "hdi" => &[73i64, 92, 45],
        "country" => &["AU", "SE", "CH"]
    )?);

    t1.field_mut("gdp")?.description = Some("A very important measurement".to_owned());

    t2.insert("gdp", t1.column("gdp")?)?;
    assert_eq!(t2.field("gdp")?, t1.field("gdp")?);

    // under another name too
    t2.insert("gdp_copy", t1.column("gdp")?)?;
    assert_eq!(t2.field("gdp_copy")?, t1.field("gdp")?);
    Ok(())
}

#[test]
fn test_field_access_can_be_typecast() -> Result<()> {
    let mut t = gdp_table()?.with_index(["country"])?;
    t.field_mut("gdp")?.description = Some("One two three".to_owned());

    let v = t.column("gdp")?.cast(&DataType::String)?;
    t.insert("gdp", v)?;

    assert_eq!(t.column("gdp")?.dtype(), &DataType::String);
    assert_eq!(t.field("gdp")?.description.as_deref(), Some("One two three"));
    Ok(())
}

#[test]
fn test_set_and_reset_index() -> Result<()> {
    let mut t = gdp_table()?;
    t.field_mut("country")?.title = Some("Country".to_owned());

    t.set_index(["country"])?;
    assert_eq!(t.primary_key(), ["country"]);
    assert_eq!(t.all_columns(), vec!["country", "gdp"]);
    assert_eq!(t.columns(), vec!["gdp"]);
    assert_eq!(t.field("country")?.title.as_deref(), Some("Country"));

    t.reset_index();
    assert!(t.primary_key().is_empty());
    assert_eq!(t.columns(), vec!["country", "gdp"]);
    assert_eq!(t.field("country")?.title.as_deref(), Some("Country"));
    Ok(())
}

#[test]
fn test_set_index_validates_columns() -> Result<()> {
    let mut t = gdp_table()?;
    assert!(matches!(
        t.set_index(["year"]),
        Err(CatalogError::ColumnNotFound(name)) if name == "year"
    ));
    assert!(t.set_index(["country", "country"]).is_err());
    assert!(t.primary_key().is_empty());
    Ok(())
}

#[test]
fn test_set_metadata_keeps_primary_key() -> Result<()> {
    let mut t = gdp_table()?.with_index(["country"])?;
    t.set_metadata(described("Replaced"));

    assert_eq!(t.primary_key(), ["country"]);
    assert_eq!(t.metadata().title.as_deref(), Some("Replaced"));
    Ok(())
}

#[test]
fn test_select_keeps_key_columns_and_fields() -> Result<()> {
    let mut t = Table::new(df!(
        "gdp" => &[100i64, 102, 104],
        "country" => &["AU", "SE", "CH"],
        "french_fries" => &["yes", "no", "yes"]
    )?)
    .with_index(["country"])?;
    t.field_mut("gdp")?.unit = Some("dollars".to_owned());

    let selected = t.select(&["gdp"])?;
    assert_eq!(selected.all_columns(), vec!["country", "gdp"]);
    assert_eq!(selected.primary_key(), ["country"]);
    assert_eq!(selected.field("gdp")?, t.field("gdp")?);
    assert!(!selected.has_column("french_fries"));
    assert!(matches!(t.select(&["nope"]), Err(CatalogError::ColumnNotFound(_))));
    Ok(())
}

#[test]
fn test_rename_moves_metadata() -> Result<()> {
    let mut t = gdp_table()?.with_index(["country"])?;
    t.field_mut("country")?.title = Some("Country".to_owned());

    t.rename_column("country", "entity")?;
    assert_eq!(t.primary_key(), ["entity"]);
    assert_eq!(t.field("entity")?.title.as_deref(), Some("Country"));
    assert!(!t.has_column("country"));

    // clashing rename leaves the table untouched
    assert!(t.rename_column("entity", "gdp").is_err());
    assert_eq!(t.field("entity")?.title.as_deref(), Some("Country"));
    Ok(())
}

#[test]
fn test_drop_column_removes_field() -> Result<()> {
    let mut t = gdp_table()?.with_index(["country"])?;
    t.field_mut("gdp")?.title = Some("GDP".to_owned());

    let dropped = t.drop_column("gdp")?;
    assert_eq!(dropped.metadata.title.as_deref(), Some("GDP"));
    assert!(!t.fields().contains_key("gdp"));

    t.drop_column("country")?;
    assert!(t.primary_key().is_empty());
    assert!(t.fields().is_empty());
    Ok(())
}

#[test]
fn test_from_variables_keeps_metadata() -> Result<()> {
    let gdp = Variable::new(
        Series::new("gdp".into(), &[1i64, 2]),
        VariableMeta::default().with_title("GDP"),
    );
    let t = Table::from_variables(vec![gdp, Series::new("country".into(), &["AU", "SE"]).into()])?;

    assert_eq!(t.field("gdp")?.title.as_deref(), Some("GDP"));
    assert!(t.field("country")?.is_empty());
    Ok(())
}

#[test]
fn test_tables_can_drop_duplicates() -> Result<()> {
    let mut t = Table::new(df!(
        "gdp" => &[100i64, 100, 102, 104],
        "country" => &["AU", "AU", "SE", "CH"]
    )?)
    .with_index(["country"])?;
    t.set_metadata(described("Duplicates"));
    t.field_mut("gdp")?.sources = vec![Source {
        name: Some("World Bank".to_owned()),
        ..Default::default()
    }];

    let dups = t.duplicated()?;
    assert_eq!(dups.dtype(), &DataType::Boolean);
    assert_eq!(dups.into_no_null_iter().collect::<Vec<_>>(), vec![false, true, false, false]);

    let t2 = t.drop_duplicates()?;
    assert_eq!(t2.height(), 3);
    assert_eq!(t2.metadata(), t.metadata());
    assert_eq!(t2.fields(), t.fields());
    assert_eq!(t2.primary_key(), ["country"]);
    Ok(())
}

#[test]
fn test_duplicated_ignores_key_columns() -> Result<()> {
    let t = Table::new(df!(
        "gdp" => &[100i64, 100],
        "country" => &["AU", "SE"]
    )?)
    .with_index(["country"])?;

    let dups = t.duplicated()?;
    assert_eq!(dups.into_no_null_iter().collect::<Vec<_>>(), vec![false, true]);
    assert_eq!(t.drop_duplicates()?.height(), 1);
    Ok(())
}

#[test]
fn test_duplicated_with_only_key_columns() -> Result<()> {
    let t = Table::new(df!("country" => &["AU", "SE", "AU"])?).with_index(["country"])?;

    let dups = t.duplicated()?;
    assert_eq!(dups.into_no_null_iter().collect::<Vec<_>>(), vec![false, false, true]);
    Ok(())
}

#[test]
fn test_duplicated_with_row_number_column_name() -> Result<()> {
    let t = Table::new(df!(
        "__metatable_row_nr" => &[1i64, 1, 2],
        "__metatable_row_nr_1" => &["a", "a", "b"]
    )?);

    let dups = t.duplicated()?;
    assert_eq!(dups.into_no_null_iter().collect::<Vec<_>>(), vec![false, true, false]);
    Ok(())
}

#[test]
fn test_duplicated_on_empty_table() -> Result<()> {
    let dups = Table::default().duplicated()?;
    assert_eq!(dups.dtype(), &DataType::Boolean);
    assert!(dups.is_empty());
    Ok(())
}

#[test]
fn test_tables_compare_whole_registry() -> Result<()> {
    let t1 = gdp_table()?;
    let mut t2 = gdp_table()?;
    assert_eq!(t1, t2);

    t2.field_mut("country")?.short_unit = Some(String::new());
    assert_ne!(t1, t2);
    Ok(())
}
