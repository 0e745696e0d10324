//! Parquet persistence for annotated bar history
//!
//! Decimal columns are stored as strings to preserve precision; the momentum
//! column is nullable so un-annotated bars round-trip as `None`.

use arrow::array::{Array, ArrayRef, Int32Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use super::{HistoryError, PriceHistory, PriceSample};

/// Annotated bar schema
pub fn bar_schema() -> Schema {
    Schema::new(vec![
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new("open", DataType::Utf8, false),
        Field::new("high", DataType::Utf8, false),
        Field::new("low", DataType::Utf8, false),
        Field::new("close", DataType::Utf8, false),
        Field::new("volume", DataType::Utf8, false),
        Field::new("momentum", DataType::Int32, true),
    ])
}

/// Write a full history to a Parquet file, replacing any existing file
pub fn save_history(path: impl AsRef<Path>, history: &PriceHistory) -> Result<(), HistoryError> {
    let schema = Arc::new(bar_schema());
    let file = File::create(path.as_ref())?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let samples = history.samples();
    let timestamps: Vec<i64> = samples.iter().map(|s| s.timestamp.timestamp_micros()).collect();
    let decimal_col = |f: fn(&PriceSample) -> Decimal| -> ArrayRef {
        let strings: Vec<String> = samples.iter().map(|s| f(s).to_string()).collect();
        Arc::new(StringArray::from(strings))
    };
    let momentum: Vec<Option<i32>> = samples.iter().map(|s| s.momentum).collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC")) as ArrayRef,
            decimal_col(|s| s.open),
            decimal_col(|s| s.high),
            decimal_col(|s| s.low),
            decimal_col(|s| s.close),
            decimal_col(|s| s.volume),
            Arc::new(Int32Array::from(momentum)) as ArrayRef,
        ],
    )?;

    writer.write(&batch)?;
    writer.close()?;

    tracing::debug!(path = ?path.as_ref(), bars = samples.len(), "Wrote history to Parquet");
    Ok(())
}

/// Load a full history from a Parquet file
pub fn load_history(path: impl AsRef<Path>) -> Result<PriceHistory, HistoryError> {
    let file = File::open(path.as_ref())?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut history = PriceHistory::new();
    for batch in reader {
        let batch = batch?;
        append_batch(&mut history, &batch)?;
    }

    tracing::debug!(path = ?path.as_ref(), bars = history.len(), "Loaded history from Parquet");
    Ok(history)
}

fn append_batch(history: &mut PriceHistory, batch: &RecordBatch) -> Result<(), HistoryError> {
    let timestamps = downcast::<TimestampMicrosecondArray>(batch, 0)?;
    let opens = downcast::<StringArray>(batch, 1)?;
    let highs = downcast::<StringArray>(batch, 2)?;
    let lows = downcast::<StringArray>(batch, 3)?;
    let closes = downcast::<StringArray>(batch, 4)?;
    let volumes = downcast::<StringArray>(batch, 5)?;
    let momentums = downcast::<Int32Array>(batch, 6)?;

    for row in 0..batch.num_rows() {
        let timestamp = DateTime::from_timestamp_micros(timestamps.value(row))
            .ok_or_else(|| HistoryError::Malformed(format!("bad timestamp at row {row}")))?;

        let mut sample = PriceSample::new(
            timestamp,
            parse_decimal(opens.value(row), row)?,
            parse_decimal(highs.value(row), row)?,
            parse_decimal(lows.value(row), row)?,
            parse_decimal(closes.value(row), row)?,
            parse_decimal(volumes.value(row), row)?,
        );
        if !momentums.is_null(row) {
            sample.momentum = Some(momentums.value(row));
        }
        history.push(sample)?;
    }
    Ok(())
}

fn downcast<'a, T: 'static>(batch: &'a RecordBatch, col: usize) -> Result<&'a T, HistoryError> {
    batch
        .column(col)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| HistoryError::Malformed(format!("unexpected type in column {col}")))
}

fn parse_decimal(raw: &str, row: usize) -> Result<Decimal, HistoryError> {
    raw.parse::<Decimal>()
        .map_err(|e| HistoryError::Malformed(format!("bad decimal at row {row}: {e}")))
}
