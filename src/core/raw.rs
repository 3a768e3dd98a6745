use crate::core::{error::SchemaError, schema::HeaderShape};

/// Cycle log as read from the export: header rows and data rows, all cells as text.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct RawTable {
    pub shape: HeaderShape,
    header: Vec<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Split the leading `shape.n_rows` records off as the header.
    pub fn from_records(shape: HeaderShape, mut records: Vec<Vec<String>>) -> Self {
        let rows = records.split_off(shape.n_rows.min(records.len()));
        Self { shape, header: records, rows }
    }

    pub const fn rows(&self) -> &[Vec<String>] {
        self.rows.as_slice()
    }

    /// Cell at the given column, absent trailing cells read as empty.
    pub fn cell(row: &[String], column: usize) -> &str {
        row.get(column).map_or("", String::as_str)
    }

    /// Flatten the header block to the field-level names.
    ///
    /// Upper header levels carry units and metadata and take no part in field identification.
    pub fn field_names(&self) -> Result<&[String], SchemaError> {
        if self.header.len() < self.shape.n_rows || self.shape.field_row >= self.shape.n_rows {
            return Err(SchemaError::TruncatedHeader {
                expected: self.shape.n_rows.max(self.shape.field_row + 1),
                found: self.header.len(),
            });
        }
        Ok(self.header[self.shape.field_row].as_slice())
    }
}
