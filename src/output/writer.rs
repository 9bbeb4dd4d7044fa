//! Output writer trait definition.

use crate::error::Result;

/// Trait for writing result tables.
pub trait OutputWriter {
    /// Row type this writer accepts.
    type Record;

    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single row.
    fn write_record(&mut self, record: &Self::Record) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
