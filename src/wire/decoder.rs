use bytes::Buf;
use thiserror::Error;
use tracing::debug;
use crate::types::{Interval, LogicalType, Time64, Value, WireType};
use super::{Field, Table, FRAME_MAGIC, FRAME_VERSION};

/// Consumer-side failures while reading a result frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a result frame")]
    InvalidMagic,

    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u16),

    #[error("frame truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unknown type tag {0}")]
    UnknownTypeTag(u8),

    #[error("invalid UTF-8 in column \"{0}\"")]
    InvalidUtf8(String),

    #[error("column \"{column}\" has type {wire_type}, which this decoder cannot represent")]
    UnsupportedType { column: String, wire_type: WireType },
}

/// Which wire types a consumer knows how to materialize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderCapabilities {
    /// Native month/day/microsecond durations
    pub duration: bool,
}

impl Default for DecoderCapabilities {
    /// A consumer without native duration support
    fn default() -> Self {
        Self { duration: false }
    }
}

impl DecoderCapabilities {
    pub fn all() -> Self {
        Self { duration: true }
    }

    pub fn supports(&self, wire_type: WireType) -> bool {
        match wire_type {
            WireType::Interval => self.duration,
            _ => true,
        }
    }
}

/// Reads result frames produced by [`super::encode_batch`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    capabilities: DecoderCapabilities,
}

impl Decoder {
    pub fn new(capabilities: DecoderCapabilities) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> DecoderCapabilities {
        self.capabilities
    }

    /// Read only the schema and row count
    pub fn decode_schema(&self, frame: &[u8]) -> Result<(Vec<Field>, usize), DecodeError> {
        let mut buf = frame;
        let (fields, num_rows) = read_header(&mut buf)?;
        Ok((fields, num_rows))
    }

    /// Decode the full frame, failing on the first column this consumer cannot represent
    pub fn decode(&self, frame: &[u8]) -> Result<Table, DecodeError> {
        let mut buf = frame;
        let (fields, num_rows) = read_header(&mut buf)?;

        // A frame without columns has no bytes that could back its rows
        if fields.is_empty() && num_rows > 0 {
            return Err(DecodeError::Truncated {
                needed: num_rows.div_ceil(8),
                remaining: buf.len(),
            });
        }

        if let Some(field) = fields.iter().find(|f| !self.capabilities.supports(f.wire_type)) {
            debug!("Refusing to decode column {} of type {}", field.name, field.wire_type);
            return Err(DecodeError::UnsupportedType {
                column: field.name.clone(),
                wire_type: field.wire_type,
            });
        }

        let mut columns = Vec::with_capacity(fields.len());
        for field in &fields {
            columns.push(read_column(&mut buf, field, num_rows)?);
        }

        Ok(Table::from_columns(fields, columns, num_rows))
    }
}

fn ensure(buf: &[u8], needed: usize) -> Result<(), DecodeError> {
    if buf.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            remaining: buf.len(),
        });
    }
    Ok(())
}

fn read_header(buf: &mut &[u8]) -> Result<(Vec<Field>, usize), DecodeError> {
    ensure(buf, 8)?;
    if &buf[..4] != FRAME_MAGIC {
        return Err(DecodeError::InvalidMagic);
    }
    buf.advance(4);

    let version = buf.get_u16();
    if version != FRAME_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let field_count = buf.get_u16() as usize;
    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        ensure(buf, 2)?;
        let name_len = buf.get_u16() as usize;
        ensure(buf, name_len + 2)?;
        let name = std::str::from_utf8(&buf[..name_len])
            .map_err(|_| DecodeError::InvalidUtf8(String::from_utf8_lossy(&buf[..name_len]).into_owned()))?
            .to_string();
        buf.advance(name_len);

        let logical_tag = buf.get_u8();
        let wire_tag = buf.get_u8();
        let logical_type = LogicalType::from_tag(logical_tag).ok_or(DecodeError::UnknownTypeTag(logical_tag))?;
        let wire_type = WireType::from_tag(wire_tag).ok_or(DecodeError::UnknownTypeTag(wire_tag))?;
        fields.push(Field { name, logical_type, wire_type });
    }

    ensure(buf, 4)?;
    let num_rows = buf.get_u32() as usize;
    Ok((fields, num_rows))
}

fn read_column(buf: &mut &[u8], field: &Field, num_rows: usize) -> Result<Vec<Value>, DecodeError> {
    let bitmap_len = num_rows.div_ceil(8);
    ensure(buf, bitmap_len)?;
    let bitmap = buf[..bitmap_len].to_vec();
    buf.advance(bitmap_len);

    let mut values = Vec::with_capacity(num_rows);
    for i in 0..num_rows {
        if bitmap[i / 8] & (1 << (i % 8)) == 0 {
            values.push(Value::Null);
            continue;
        }

        let value = match field.wire_type {
            WireType::Null => Value::Null,
            WireType::Int64 => {
                ensure(buf, 8)?;
                Value::Integer(buf.get_i64())
            }
            WireType::Float64 => {
                ensure(buf, 8)?;
                Value::Real(buf.get_f64())
            }
            WireType::Utf8 => {
                let bytes = read_var(buf)?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| DecodeError::InvalidUtf8(field.name.clone()))?;
                Value::Text(text)
            }
            WireType::Binary => Value::Blob(read_var(buf)?),
            WireType::Time64Microsecond => {
                ensure(buf, 12)?;
                let micros = buf.get_i64();
                let months = buf.get_i32();
                Value::Time64(Time64 { micros, months })
            }
            WireType::Interval => {
                ensure(buf, 16)?;
                let months = buf.get_i32();
                let days = buf.get_i32();
                let micros = buf.get_i64();
                Value::Interval(Interval::new(months, days, micros))
            }
        };
        values.push(value);
    }

    Ok(values)
}

fn read_var(buf: &mut &[u8]) -> Result<Vec<u8>, DecodeError> {
    ensure(buf, 4)?;
    let len = buf.get_u32() as usize;
    ensure(buf, len)?;
    let bytes = buf[..len].to_vec();
    buf.advance(len);
    Ok(bytes)
}
