//! Cycle log export reader.

use std::{ffi::OsStr, fs::File, io::Read, path::Path};

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::{
    core::{raw::RawTable, schema::HeaderShape},
    prelude::*,
};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// File extensions of the spreadsheet exports, compared case-insensitively.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct InputOptions {
    pub shape: HeaderShape,

    /// CSV field delimiter, spreadsheets ignore it.
    pub delimiter: u8,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self { shape: HeaderShape::default(), delimiter: b',' }
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputFormat {
    Csv,
    Workbook,
}

impl InputFormat {
    /// Spreadsheet exports are recognized by their extension, anything else is CSV.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(extension)
                if WORKBOOK_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(extension)) =>
            {
                Self::Workbook
            }
            _ => Self::Csv,
        }
    }
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_cycle_log(path: &Path, options: InputOptions) -> Result<RawTable> {
    let format = InputFormat::of(path);
    let table = match format {
        InputFormat::Csv => {
            let file =
                File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
            read_csv(file, options)
        }
        InputFormat::Workbook => read_workbook(path, options.shape),
    }
    .with_context(|| format!("failed to read `{}`", path.display()))?;
    info!(?format, n_rows = table.rows().len(), "loaded the cycle log");
    Ok(table)
}

/// Read all the records as text, the leading ones become the header.
///
/// Rows may have any number of cells.
pub fn read_csv<R: Read>(reader: R, options: InputOptions) -> Result<RawTable> {
    let mut records = Vec::new();
    for record in csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader)
        .into_records()
    {
        let record = record.context("malformed CSV record")?;
        records.push(record.iter().map(ToString::to_string).collect::<Vec<_>>());
    }
    if let Some(first_cell) = records.first_mut().and_then(|record| record.first_mut())
        && let Some(stripped) = first_cell.strip_prefix(BYTE_ORDER_MARK)
    {
        *first_cell = stripped.to_string();
    }
    Ok(RawTable::from_records(options.shape, records))
}

/// Read the first worksheet of the spreadsheet export.
pub fn read_workbook(path: &Path, shape: HeaderShape) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("failed to open the workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("the workbook has no worksheets")?
        .context("failed to read the first worksheet")?;
    Ok(read_range(&range, shape))
}

/// Convert the worksheet cells to text, empty cells become empty strings.
fn read_range(range: &Range<Data>, shape: HeaderShape) -> RawTable {
    let records: Vec<Vec<String>> =
        range.rows().map(|row| row.iter().map(ToString::to_string).collect()).collect();
    RawTable::from_records(shape, records)
}
