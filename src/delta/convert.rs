//! Columnar conversion - polars frames into Arrow record batches for Delta

use crate::error::{LakehouseError, Result};
use deltalake::arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use deltalake::arrow::datatypes::{DataType as ArrowDataType, Field, Schema, TimeUnit as ArrowTimeUnit};
use deltalake::arrow::record_batch::RecordBatch;
use polars::prelude::*;
use std::sync::Arc;

/// Delta stores timestamps as UTC microseconds
const DELTA_TIME_ZONE: &str = "UTC";

/// Convert a frame into one record batch using Delta-compatible types.
///
/// Integers widen to Int64, floats to Float64, datetimes become UTC
/// microsecond timestamps; anything without a direct mapping is written as text.
pub fn dataframe_to_record_batch(df: &DataFrame) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(df.width());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(df.width());

    for series in df.get_columns() {
        let (data_type, array) = convert_series(series)?;
        fields.push(Field::new(series.name(), data_type, true));
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .map_err(|e| LakehouseError::Delta(format!("Failed to build record batch: {}", e)))
}

fn convert_series(series: &Series) -> Result<(ArrowDataType, ArrayRef)> {
    let converted: (ArrowDataType, ArrayRef) = match series.dtype() {
        DataType::Boolean => {
            let array: BooleanArray = series.bool()?.into_iter().collect();
            (ArrowDataType::Boolean, Arc::new(array))
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let widened = series.cast(&DataType::Int64)?;
            let array: Int64Array = widened.i64()?.into_iter().collect();
            (ArrowDataType::Int64, Arc::new(array))
        }
        DataType::Float32 | DataType::Float64 => {
            let widened = series.cast(&DataType::Float64)?;
            let array: Float64Array = widened.f64()?.into_iter().collect();
            (ArrowDataType::Float64, Arc::new(array))
        }
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            let array: Date32Array = days.i32()?.into_iter().collect();
            (ArrowDataType::Date32, Arc::new(array))
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            // physical values are UTC epoch offsets whatever the display zone
            let physical = series.cast(&DataType::Int64)?;
            let array: TimestampMicrosecondArray = physical
                .i64()?
                .into_iter()
                .map(|v| v.map(|v| to_micros(v, unit)))
                .collect();
            (
                ArrowDataType::Timestamp(ArrowTimeUnit::Microsecond, Some(DELTA_TIME_ZONE.into())),
                Arc::new(array.with_timezone(DELTA_TIME_ZONE)),
            )
        }
        _ => {
            let text = series.cast(&DataType::String)?;
            let array: StringArray = text.str()?.into_iter().collect();
            (ArrowDataType::Utf8, Arc::new(array))
        }
    };
    Ok(converted)
}

fn to_micros(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => value / 1_000,
        TimeUnit::Microseconds => value,
        TimeUnit::Milliseconds => value * 1_000,
    }
}
