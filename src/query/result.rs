use bytes::Bytes;
use crate::wire::{DecodeError, Decoder, Field, Row, Table};

/// The outcome of one query: its schema plus the encoded columnar frame.
///
/// Decoding happens on the consumer side, so whether a column can be
/// materialized depends on the decoder used, not on the query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    fields: Vec<Field>,
    num_rows: usize,
    frame: Bytes,
}

impl QueryResult {
    pub fn new(fields: Vec<Field>, num_rows: usize, frame: Bytes) -> Self {
        Self { fields, num_rows, frame }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// The raw frame as it would cross a process or language boundary
    pub fn frame(&self) -> &Bytes {
        &self.frame
    }

    /// Decode with a consumer that has no native duration support
    pub fn to_table(&self) -> Result<Table, DecodeError> {
        self.to_table_with(&Decoder::default())
    }

    pub fn to_table_with(&self, decoder: &Decoder) -> Result<Table, DecodeError> {
        decoder.decode(&self.frame)
    }

    /// Decoded rows, in engine order
    pub fn to_array(&self) -> Result<Vec<Row>, DecodeError> {
        Ok(self.to_table()?.into_rows())
    }
}
