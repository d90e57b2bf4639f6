//! Output tables
//!
//! Records are exported by external column name: `columns` chooses and
//! checks the column set, `table` writes Parquet and reads tables back as
//! text for use as a master PMI.

pub mod columns;
pub mod table;

pub use columns::{ColumnSelection, RowCheck};
pub use table::{read_string_table, records_to_batch, write_records};

/// A table with every value as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StringTable {
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
