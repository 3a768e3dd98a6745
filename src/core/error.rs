use std::fmt::{Display, Formatter};

use enumset::EnumSet;
use itertools::Itertools;

use crate::core::schema::RequiredColumn;

/// Failure that aborts the report generation.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("the cycle table has no rows to aggregate")]
    EmptyTable,

    #[error("invalid {parameter} `{value}`: {reason}")]
    InvalidConfig { parameter: &'static str, value: f64, reason: &'static str },
}

/// Structural mismatch between the input table and the expected cycle log layout.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("required columns are missing: {}", .missing.iter().join(", "))]
    MissingColumns { missing: EnumSet<RequiredColumn> },

    #[error("expected {expected} header row(s), but the input has only {found}")]
    TruncatedHeader { expected: usize, found: usize },
}

/// Cell which could not be interpreted and has been taken as missing.
///
/// Collected along the normalized table, never raised.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CellCoercionWarning {
    /// One-based data row number, header rows excluded.
    pub row: usize,

    pub column: RequiredColumn,

    /// Offending raw cell text.
    pub value: String,
}

impl Display for CellCoercionWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "row #{}: {} value `{}` is taken as missing", self.row, self.column, self.value)
    }
}
