pub mod json;
pub mod tsv;

use crate::layout::table::ResultTable;

/// Trait for serializing a result table to an output format
pub trait TableSerializer {
    type Error;

    /// Serialize the table's schema and rows to an output string
    fn serialize(table: &ResultTable, pretty: bool) -> Result<String, Self::Error>;
}

pub use json::JsonSerializer;
pub use tsv::TsvSerializer;
