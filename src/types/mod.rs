pub mod interval;
pub mod logical_type;
pub mod registry;
pub mod value;

pub use interval::{Interval, Time64};
pub use logical_type::{LogicalType, WireType};
pub use registry::{CoercionPolicy, ResultTypeRegistry};
pub use value::Value;
