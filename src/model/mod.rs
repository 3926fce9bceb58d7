//! Data model: diff records from the collector and line-separator handling.

pub mod record;
pub mod text;
