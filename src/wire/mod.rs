// Columnar result frames exchanged between the engine side and consumers
pub mod codec;
pub mod decoder;
pub mod table;

pub use codec::encode_batch;
pub use decoder::{DecodeError, Decoder, DecoderCapabilities};
pub use table::{Row, Table};

use crate::types::{LogicalType, WireType};

/// Frame magic: "EQRB"
pub const FRAME_MAGIC: &[u8; 4] = b"EQRB";
pub const FRAME_VERSION: u16 = 1;

/// One column of a result schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub logical_type: LogicalType,
    pub wire_type: WireType,
}

impl Field {
    pub fn new(name: impl Into<String>, logical_type: LogicalType, wire_type: WireType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            wire_type,
        }
    }
}
