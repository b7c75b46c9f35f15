use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use csv::StringRecord;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::model::RawDataset;

// ---------------------------------------------------------------------------
// Source tables
// ---------------------------------------------------------------------------

/// The six input tables.  Each is looked up by file stem inside the dataset
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTable {
    Orders,
    OrderItems,
    Products,
    CategoryTranslation,
    Customers,
    Reviews,
}

impl SourceTable {
    pub fn file_stem(self) -> &'static str {
        match self {
            SourceTable::Orders => "orders_dataset",
            SourceTable::OrderItems => "order_items_dataset",
            SourceTable::Products => "products_dataset",
            SourceTable::CategoryTranslation => "product_category_name_translation",
            SourceTable::Customers => "customers_dataset",
            SourceTable::Reviews => "order_reviews_dataset",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Extensions tried, in order, when locating a source file.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "parquet", "pq"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{table}: no .csv or .parquet file found in {}", .dir.display())]
    Missing { table: SourceTable, dir: PathBuf },

    #[error("{table}: failed to read {}", .path.display())]
    Unreadable {
        table: SourceTable,
        path: PathBuf,
        #[source]
        cause: anyhow::Error,
    },
}

impl LoadError {
    /// The source table that stopped the load.
    pub fn table(&self) -> SourceTable {
        match self {
            LoadError::Missing { table, .. } | LoadError::Unreadable { table, .. } => *table,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load all six source tables from `dir`.
///
/// Stops at the first table that cannot be found or read; there is no
/// partially loaded dataset.
pub fn load_dataset(dir: &Path) -> Result<RawDataset, LoadError> {
    let dataset = RawDataset {
        orders: load_table(dir, SourceTable::Orders)?,
        order_items: load_table(dir, SourceTable::OrderItems)?,
        products: load_table(dir, SourceTable::Products)?,
        category_translations: load_table(dir, SourceTable::CategoryTranslation)?,
        customers: load_table(dir, SourceTable::Customers)?,
        reviews: load_table(dir, SourceTable::Reviews)?,
    };
    Ok(dataset)
}

/// Find the file backing `table` in `dir`, if any.
pub fn locate(dir: &Path, table: SourceTable) -> Option<PathBuf> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{ext}", table.file_stem())))
        .find(|path| path.is_file())
}

fn load_table<T: DeserializeOwned>(dir: &Path, table: SourceTable) -> Result<Vec<T>, LoadError> {
    let path = locate(dir, table).ok_or_else(|| LoadError::Missing {
        table,
        dir: dir.to_path_buf(),
    })?;

    let rows = read_file(&path).map_err(|cause| LoadError::Unreadable {
        table,
        path: path.clone(),
        cause,
    })?;

    log::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read one table file into typed records.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – header row with column names
/// * `.parquet` / `.pq` – any flat schema; cells are rendered to text and
///   parsed exactly like CSV cells
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "parquet" | "pq" => read_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    reader
        .deserialize()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Nulls become empty cells, which the record types read as missing values.
fn read_parquet<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let headers: StringRecord = schema.fields().iter().map(|f| f.name().as_str()).collect();

        for row in 0..batch.num_rows() {
            let row_no = rows.len();
            let mut record = StringRecord::new();
            for col in batch.columns() {
                if col.is_null(row) {
                    record.push_field("");
                } else {
                    let cell = array_value_to_string(col, row)
                        .with_context(|| format!("Parquet row {row_no}: rendering cell"))?;
                    record.push_field(&cell);
                }
            }
            let value: T = record
                .deserialize(Some(&headers))
                .with_context(|| format!("Parquet row {row_no}"))?;
            rows.push(value);
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{OrderItem, Review};

    const TABLES: [(&str, &str); 6] = [
        (
            "orders_dataset",
            "order_id,customer_id,order_status,order_purchase_timestamp,order_delivered_customer_date,order_estimated_delivery_date\n\
             o1,c1,delivered,2017-10-02 10:56:33,2017-10-10 21:25:13,2017-10-18 00:00:00\n\
             o2,c2,shipped,garbage,,2018-01-01 00:00:00\n",
        ),
        (
            "order_items_dataset",
            "order_id,order_item_id,product_id,price,freight_value\n\
             o1,1,p1,29.99,8.72\n\
             o2,1,p2,,3.10\n",
        ),
        (
            "products_dataset",
            "product_id,product_category_name\np1,brinquedos\np2,\n",
        ),
        (
            "product_category_name_translation",
            "product_category_name,product_category_name_english\nbrinquedos,toys\n",
        ),
        ("customers_dataset", "customer_id,customer_state\nc1,SP\nc2,RJ\n"),
        ("order_reviews_dataset", "review_id,order_id,review_score\nr1,o1,5\n"),
    ];

    fn write_tables(dir: &Path, skip: Option<&str>) {
        for (stem, body) in TABLES {
            if Some(stem) == skip {
                continue;
            }
            fs::write(dir.join(format!("{stem}.csv")), body).unwrap();
        }
    }

    #[test]
    fn loads_all_six_csv_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), None);

        let ds = load_dataset(dir.path()).unwrap();
        assert_eq!(ds.orders.len(), 2);
        assert_eq!(ds.order_items.len(), 2);
        assert_eq!(ds.products.len(), 2);
        assert_eq!(ds.category_translations.len(), 1);
        assert_eq!(ds.customers.len(), 2);
        assert_eq!(ds.reviews.len(), 1);

        assert!(ds.orders[0].purchased_at.is_some());
        assert_eq!(ds.orders[1].purchased_at, None);
        assert_eq!(ds.orders[1].delivered_at, None);
        assert_eq!(ds.order_items[0].price, Some(29.99));
        assert_eq!(ds.order_items[1].price, None);
        assert_eq!(ds.products[1].category_raw, None);
        assert_eq!(ds.reviews[0].review_score, Some(5));
    }

    #[test]
    fn missing_table_names_the_source() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), Some("customers_dataset"));

        let err = load_dataset(dir.path()).unwrap_err();
        assert_eq!(err.table(), SourceTable::Customers);
        assert!(matches!(err, LoadError::Missing { .. }));
        assert!(err.to_string().contains("customers_dataset"));
    }

    #[test]
    fn missing_column_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), None);
        fs::write(
            dir.path().join("order_reviews_dataset.csv"),
            "review_id,order_id\nr1,o1\n",
        )
        .unwrap();

        let err = load_dataset(dir.path()).unwrap_err();
        assert_eq!(err.table(), SourceTable::Reviews);
        assert!(matches!(err, LoadError::Unreadable { .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_items_dataset.xlsx");
        fs::write(&path, "").unwrap();
        assert!(read_file::<OrderItem>(&path).is_err());
    }

    #[test]
    fn csv_is_preferred_over_parquet() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path(), None);
        fs::write(dir.path().join("orders_dataset.parquet"), "").unwrap();
        let found = locate(dir.path(), SourceTable::Orders).unwrap();
        assert_eq!(found.extension().unwrap(), "csv");
    }

    #[test]
    fn reads_parquet_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_reviews_dataset.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("order_id", DataType::Utf8, false),
            Field::new("review_score", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["o1", "o2"])),
                Arc::new(Float64Array::from(vec![Some(4.0), None])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let reviews: Vec<Review> = read_file(&path).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].order_id, "o1");
        assert_eq!(reviews[0].review_score, Some(4));
        assert_eq!(reviews[1].review_score, None);
    }
}
