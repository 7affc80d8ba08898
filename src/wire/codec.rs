use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;
use crate::types::{Value, WireType};
use crate::{EmbedSqlError, Result};
use super::{Field, FRAME_MAGIC, FRAME_VERSION};

/// Encode materialized rows into a columnar frame.
///
/// Every non-null cell must already match its field's wire type; the
/// executor is responsible for coercing values before they get here.
pub fn encode_batch(fields: &[Field], rows: &[Vec<Value>]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(64 + rows.len() * fields.len() * 8);

    dst.put_slice(FRAME_MAGIC);
    dst.put_u16(FRAME_VERSION);
    dst.put_u16(u16::try_from(fields.len()).map_err(|_| {
        EmbedSqlError::TypeConversion(format!("too many columns: {}", fields.len()))
    })?);

    for field in fields {
        let name = field.name.as_bytes();
        dst.put_u16(u16::try_from(name.len()).map_err(|_| {
            EmbedSqlError::TypeConversion(format!("column name too long: {}", field.name))
        })?);
        dst.put_slice(name);
        dst.put_u8(field.logical_type.to_tag());
        dst.put_u8(field.wire_type.to_tag());
    }

    // Rows without columns carry no data
    let num_rows = if fields.is_empty() { 0 } else { rows.len() };
    dst.put_u32(u32::try_from(num_rows).map_err(|_| {
        EmbedSqlError::TypeConversion(format!("too many rows: {}", num_rows))
    })?);

    for (col, field) in fields.iter().enumerate() {
        encode_column(&mut dst, field, col, rows)?;
    }

    debug!("Encoded frame: {} columns, {} rows, {} bytes", fields.len(), rows.len(), dst.len());
    Ok(dst.freeze())
}

fn encode_column(dst: &mut BytesMut, field: &Field, col: usize, rows: &[Vec<Value>]) -> Result<()> {
    // Validity bitmap, least significant bit first
    let mut bitmap = vec![0u8; rows.len().div_ceil(8)];
    for (i, row) in rows.iter().enumerate() {
        if !cell(row, col).is_null() {
            bitmap[i / 8] |= 1 << (i % 8);
        }
    }
    dst.put_slice(&bitmap);

    for row in rows {
        let value = cell(row, col);
        match (field.wire_type, value) {
            (_, Value::Null) => {}
            (WireType::Int64, Value::Integer(i)) => dst.put_i64(*i),
            (WireType::Float64, Value::Real(f)) => dst.put_f64(*f),
            (WireType::Float64, Value::Integer(i)) => dst.put_f64(*i as f64),
            (WireType::Utf8, Value::Text(s)) => {
                dst.put_u32(s.len() as u32);
                dst.put_slice(s.as_bytes());
            }
            (WireType::Binary, Value::Blob(b)) => {
                dst.put_u32(b.len() as u32);
                dst.put_slice(b);
            }
            (WireType::Time64Microsecond, Value::Time64(t)) => {
                dst.put_i64(t.micros);
                dst.put_i32(t.months);
            }
            (WireType::Interval, Value::Interval(i)) => {
                dst.put_i32(i.months);
                dst.put_i32(i.days);
                dst.put_i64(i.micros);
            }
            (wire_type, value) => {
                return Err(EmbedSqlError::TypeConversion(format!(
                    "column \"{}\" is {} but a row holds {:?}",
                    field.name, wire_type, value
                )));
            }
        }
    }

    Ok(())
}

fn cell(row: &[Value], col: usize) -> &Value {
    row.get(col).unwrap_or(&Value::Null)
}
