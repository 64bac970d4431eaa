//! Conversion between frames and Arrow record batches

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field as ArrowField, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::pretty::pretty_format_batches;

use dt_core::{get_field_display_name, DataFrame, Field, FieldType, Value, ValueVector};

use crate::DataError;

/// Build an Arrow record batch from a frame.
///
/// Columns are named by their display name within `frames`. A column whose
/// values do not all fit the field's type is rendered as text.
pub fn frame_to_record_batch(frame: &DataFrame, frames: &[DataFrame]) -> Result<RecordBatch, DataError> {
    let mut schema_fields = Vec::with_capacity(frame.fields.len());
    let mut columns = Vec::with_capacity(frame.fields.len());

    for field in &frame.fields {
        let name = get_field_display_name(field, Some(frame), frames).unwrap_or_else(|| field.name.clone());
        let column = field_to_array(field);
        schema_fields.push(ArrowField::new(name, column.data_type().clone(), true));
        columns.push(column);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(frame.length));
    let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(schema_fields)), columns, &options)?;
    Ok(batch)
}

fn field_to_array(field: &Field) -> ArrayRef {
    let values = field.values.as_slice();
    let all = |pred: fn(&Value) -> bool| values.iter().all(|v| v.is_null() || pred(v));

    match field.field_type {
        FieldType::Number if all(|v| matches!(v, Value::Number(_))) => {
            Arc::new(values.iter().map(Value::as_f64).collect::<Float64Array>())
        }
        FieldType::Time if all(|v| matches!(v, Value::Number(_))) => Arc::new(
            values
                .iter()
                .map(|v| v.as_f64().map(|ms| ms as i64))
                .collect::<TimestampMillisecondArray>(),
        ),
        FieldType::Boolean if all(|v| matches!(v, Value::Boolean(_))) => {
            Arc::new(values.iter().map(Value::as_bool).collect::<BooleanArray>())
        }
        _ => Arc::new(
            values
                .iter()
                .map(|v| if v.is_null() { None } else { Some(v.to_string()) })
                .collect::<StringArray>(),
        ),
    }
}

/// Build a frame from an Arrow record batch
pub fn record_batch_to_frame(batch: &RecordBatch) -> Result<DataFrame, DataError> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());

    for (arrow_field, column) in schema.fields().iter().zip(batch.columns()) {
        let (field_type, values) = array_to_values(column)?;
        fields.push(Field::new(arrow_field.name().clone(), field_type, values));
    }

    let mut frame = DataFrame::new(fields);
    frame.length = batch.num_rows();
    Ok(frame)
}

fn array_to_values(column: &ArrayRef) -> Result<(FieldType, ValueVector), DataError> {
    let data_type = column.data_type();

    if let DataType::Timestamp(_, _) = data_type {
        let millis = cast(column, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
        let millis = cast(&millis, &DataType::Int64)?;
        let array = downcast::<Int64Array>(&millis)?;
        return Ok((FieldType::Time, array.iter().map(Value::from).collect()));
    }

    if data_type.is_numeric() {
        let floats = cast(column, &DataType::Float64)?;
        let array = downcast::<Float64Array>(&floats)?;
        return Ok((FieldType::Number, array.iter().map(Value::from).collect()));
    }

    if let DataType::Boolean = data_type {
        let array = downcast::<BooleanArray>(column)?;
        return Ok((FieldType::Boolean, array.iter().map(Value::from).collect()));
    }

    let strings = cast(column, &DataType::Utf8)?;
    let array = downcast::<StringArray>(&strings)?;
    let field_type = if column.null_count() == column.len() && column.len() > 0 {
        FieldType::Other
    } else {
        FieldType::String
    };
    Ok((field_type, array.iter().map(|v| Value::from(v.map(str::to_string))).collect()))
}

fn downcast<T: 'static>(array: &ArrayRef) -> Result<&T, DataError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| DataError::SchemaDetection(format!("unexpected array type {}", array.data_type())))
}

/// Render frames as text tables, one per frame
pub fn pretty_format_frames(frames: &[DataFrame]) -> Result<String, DataError> {
    let mut out = String::new();

    for (idx, frame) in frames.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let title = frame.name.clone().unwrap_or_else(|| format!("Frame {}", idx + 1));
        out.push_str(&title);
        out.push('\n');

        if frame.fields.is_empty() {
            out.push_str("(no fields)\n");
            continue;
        }

        let batch = frame_to_record_batch(frame, frames)?;
        out.push_str(&pretty_format_batches(&[batch])?.to_string());
        out.push('\n');
    }

    Ok(out)
}
