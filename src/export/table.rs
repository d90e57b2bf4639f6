//! Parquet output and string-table input
//!
//! Every column is written as nullable Utf8 with empty values as nulls.
//! Reading casts any column type back to Utf8 so master files written by
//! other tools can be indexed too.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch, StringArray};
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::export::{ColumnSelection, StringTable};
use crate::models::PersonRecord;
use crate::utils::logging::TimedOperation;

/// Build one Utf8 record batch from records
pub fn records_to_batch(
    records: &[PersonRecord],
    selection: &ColumnSelection,
    max_field_length: Option<usize>,
) -> Result<RecordBatch> {
    let mut values: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(records.len()); selection.len()];
    for record in records {
        for (column, value) in values.iter_mut().zip(selection.row(record, max_field_length)?) {
            column.push((!value.is_empty()).then_some(value));
        }
    }

    let schema = Schema::new(
        selection
            .columns()
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );
    let arrays: Vec<ArrayRef> = values
        .into_iter()
        .map(|column| Arc::new(StringArray::from(column)) as ArrayRef)
        .collect();
    Ok(RecordBatch::try_new(Arc::new(schema), arrays)?)
}

/// Write records to a Parquet file
pub fn write_records(
    path: &Path,
    records: &[PersonRecord],
    selection: &ColumnSelection,
    max_field_length: Option<usize>,
) -> Result<()> {
    let operation = TimedOperation::start("Writing PMI", path);
    let batch = records_to_batch(records, selection, max_field_length)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    operation.finish(records.len());
    Ok(())
}

/// Read a Parquet file with every column as text
pub fn read_string_table(path: &Path) -> Result<StringTable> {
    let file = safe_open_file(path, "master PMI")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();

    let mut rows = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        let text: Vec<ArrayRef> = batch
            .columns()
            .iter()
            .map(|array| cast::cast(array, &DataType::Utf8))
            .collect::<std::result::Result<_, _>>()?;
        for row in 0..batch.num_rows() {
            rows.push(
                text.iter()
                    .map(|array| {
                        let strings = array.as_string::<i32>();
                        if strings.is_null(row) {
                            String::new()
                        } else {
                            strings.value(row).to_string()
                        }
                    })
                    .collect(),
            );
        }
    }
    Ok(StringTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UrValue;

    #[test]
    fn test_batch_uses_nulls_for_empty_values() {
        let records = vec![
            PersonRecord {
                pid: 1,
                ur: UrValue::Number(100),
                ..PersonRecord::default()
            },
            PersonRecord {
                pid: 2,
                ur: UrValue::Number(101),
                alias: Some(UrValue::Number(100)),
                deleted: true,
                ..PersonRecord::default()
            },
        ];
        let batch = records_to_batch(&records, &ColumnSelection::all(), None).unwrap();
        assert_eq!(batch.num_rows(), 2);
        let alias = batch.column_by_name("Alias").unwrap().as_string::<i32>();
        assert!(alias.is_null(0));
        assert_eq!(alias.value(1), "100");
        let deleted = batch.column_by_name("Deleted").unwrap().as_string::<i32>();
        assert_eq!(deleted.value(1), "D");
    }
}
