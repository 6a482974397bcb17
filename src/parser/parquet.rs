//! Parquet file parser

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType as ArrowType, Date32Type, Date64Type, Float16Type, Float32Type,
    Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::Config;
use crate::model::{CellValue, Column, ColumnType, Table};

use super::Parser;

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Failed to create Parquet reader")?;

        let schema = builder.schema().clone();
        let reader = builder.build().context("Failed to build Parquet reader")?;

        // Create columns from schema
        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                Column::with_type(field.name().clone(), i, arrow_type_to_column_type(field.data_type()))
            })
            .collect();

        let mut table = Table::new(columns);

        let mut line_num = 0usize;
        for batch_result in reader {
            let batch = batch_result.context("Failed to read Parquet batch")?;

            for row_idx in 0..batch.num_rows() {
                line_num += 1;
                let cells: Vec<CellValue> = batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row_idx))
                    .collect();

                table.add_row(cells, line_num);
            }
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("parquet")
    }
}

fn arrow_type_to_column_type(arrow_type: &ArrowType) -> ColumnType {
    match arrow_type {
        ArrowType::Boolean => ColumnType::Boolean,
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64
        | ArrowType::Float16
        | ArrowType::Float32
        | ArrowType::Float64 => ColumnType::Numeric,
        ArrowType::Date32 | ArrowType::Date64 | ArrowType::Timestamp(_, _) => ColumnType::Datetime,
        // Strings and anything without a native counterpart
        _ => ColumnType::Text,
    }
}

fn primitive<T: ArrowPrimitiveType>(array: &ArrayRef, row_idx: usize) -> Option<T::Native> {
    array.as_primitive_opt::<T>().map(|arr| arr.value(row_idx))
}

fn int_cell(value: Option<i64>) -> CellValue {
    value.map(CellValue::Int).unwrap_or(CellValue::Null)
}

fn float_cell(value: Option<f64>) -> CellValue {
    value.map(CellValue::from).unwrap_or(CellValue::Null)
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    match array.data_type() {
        ArrowType::Boolean => array
            .as_boolean_opt()
            .map(|arr| CellValue::Bool(arr.value(row_idx)))
            .unwrap_or(CellValue::Null),
        ArrowType::Int8 => int_cell(primitive::<Int8Type>(array, row_idx).map(i64::from)),
        ArrowType::Int16 => int_cell(primitive::<Int16Type>(array, row_idx).map(i64::from)),
        ArrowType::Int32 => int_cell(primitive::<Int32Type>(array, row_idx).map(i64::from)),
        ArrowType::Int64 => int_cell(primitive::<Int64Type>(array, row_idx)),
        ArrowType::UInt8 => int_cell(primitive::<UInt8Type>(array, row_idx).map(i64::from)),
        ArrowType::UInt16 => int_cell(primitive::<UInt16Type>(array, row_idx).map(i64::from)),
        ArrowType::UInt32 => int_cell(primitive::<UInt32Type>(array, row_idx).map(i64::from)),
        ArrowType::UInt64 => match primitive::<UInt64Type>(array, row_idx) {
            Some(v) => i64::try_from(v)
                .map(CellValue::Int)
                .unwrap_or(CellValue::Float(v as f64)),
            None => CellValue::Null,
        },
        ArrowType::Float16 => float_cell(primitive::<Float16Type>(array, row_idx).map(f64::from)),
        ArrowType::Float32 => float_cell(primitive::<Float32Type>(array, row_idx).map(f64::from)),
        ArrowType::Float64 => float_cell(primitive::<Float64Type>(array, row_idx)),
        ArrowType::Utf8 => array
            .as_string_opt::<i32>()
            .map(|arr| CellValue::String(Cow::Owned(arr.value(row_idx).to_string())))
            .unwrap_or(CellValue::Null),
        ArrowType::LargeUtf8 => array
            .as_string_opt::<i64>()
            .map(|arr| CellValue::String(Cow::Owned(arr.value(row_idx).to_string())))
            .unwrap_or(CellValue::Null),
        ArrowType::Date32 => primitive::<Date32Type>(array, row_idx)
            .and_then(|days| NaiveDate::from_num_days_from_ce_opt(days + 719_163))
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        ArrowType::Date64 => primitive::<Date64Type>(array, row_idx)
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| CellValue::DateTime(dt.naive_utc()))
            .unwrap_or(CellValue::Null),
        ArrowType::Timestamp(unit, _) => {
            let timestamp = match unit {
                TimeUnit::Second => primitive::<TimestampSecondType>(array, row_idx)
                    .and_then(|s| DateTime::from_timestamp(s, 0)),
                TimeUnit::Millisecond => primitive::<TimestampMillisecondType>(array, row_idx)
                    .and_then(DateTime::from_timestamp_millis),
                TimeUnit::Microsecond => primitive::<TimestampMicrosecondType>(array, row_idx)
                    .and_then(DateTime::from_timestamp_micros),
                TimeUnit::Nanosecond => primitive::<TimestampNanosecondType>(array, row_idx)
                    .map(DateTime::from_timestamp_nanos),
            };
            timestamp
                .map(|dt| CellValue::DateTime(dt.naive_utc()))
                .unwrap_or(CellValue::Null)
        }
        _ => {
            // Fallback: convert to string
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default());
            match formatter {
                Ok(fmt) => CellValue::String(Cow::Owned(fmt.value(row_idx).to_string())),
                Err(_) => CellValue::Null,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn test_arrow_type_mapping() {
        assert_eq!(arrow_type_to_column_type(&ArrowType::Int32), ColumnType::Numeric);
        assert_eq!(arrow_type_to_column_type(&ArrowType::Utf8), ColumnType::Text);
        assert_eq!(arrow_type_to_column_type(&ArrowType::Date32), ColumnType::Datetime);
        assert_eq!(arrow_type_to_column_type(&ArrowType::Boolean), ColumnType::Boolean);
    }

    #[test]
    fn test_extract_values() {
        let ints: ArrayRef = Arc::new(Int32Array::from(vec![Some(7), None]));
        assert_eq!(extract_cell_value(&ints, 0), CellValue::Int(7));
        assert!(extract_cell_value(&ints, 1).is_null());

        let floats: ArrayRef = Arc::new(Float64Array::from(vec![f64::NAN, 1.5]));
        assert!(extract_cell_value(&floats, 0).is_null());
        assert_eq!(extract_cell_value(&floats, 1), CellValue::Float(1.5));
    }

    #[test]
    fn test_parse_written_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Name", ArrowType::Utf8, true),
            Field::new("Score", ArrowType::Int32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("a"), Some(" b ")])),
                Arc::new(Int32Array::from(vec![Some(1), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = ParquetParser.parse(&path, &Config::default()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns[0].column_type, ColumnType::Text);
        assert_eq!(table.columns[1].column_type, ColumnType::Numeric);
        assert_eq!(table.rows[1].cells[0], CellValue::from(" b "));
        assert!(table.rows[1].cells[1].is_null());
    }
}
