// Module for rewriting client SQL into what the engine understands

mod interval_translator;
mod metadata;

pub use interval_translator::IntervalTranslator;
pub use metadata::{ColumnTypeHint, TranslationMetadata};
