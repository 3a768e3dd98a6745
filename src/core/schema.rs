//! Input contract of the cycle log export.

use std::fmt::{Display, Formatter};

use enumset::{EnumSet, EnumSetType};

/// Raw columns the cycle log must provide.
#[derive(Debug, EnumSetType)]
pub enum RequiredColumn {
    AhDischarged,
    AhCharged,
    MaxTemperature,
    MinTemperature,
    FullChargeFlag,
}

impl Display for RequiredColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}`", self.header())
    }
}

impl RequiredColumn {
    pub fn all() -> EnumSet<Self> {
        EnumSet::all()
    }

    /// Header text as exported by the charger.
    pub const fn header(self) -> &'static str {
        match self {
            Self::AhDischarged => "Ah Discharged",
            Self::AhCharged => "Ah Charged In Charge Phase",
            Self::MaxTemperature => "Max. Temperature At Cycle (℃)",
            Self::MinTemperature => "Min. Temperature At Cycle (℃)",
            Self::FullChargeFlag => "Full Charge In Cycle [True/False]",
        }
    }

    /// Field name in the normalized cycle table.
    pub const fn field(self) -> &'static str {
        match self {
            Self::AhDischarged => "ah_discharged",
            Self::AhCharged => "ah_charged",
            Self::MaxTemperature => "t_max_c",
            Self::MinTemperature => "t_min_c",
            Self::FullChargeFlag => "full_charge",
        }
    }

    /// Whether the header cell names this column.
    ///
    /// Surrounding whitespace is insignificant, everything else must match exactly.
    pub fn matches(self, header: &str) -> bool {
        header.trim() == self.header()
    }
}

/// Shape of the header block on top of the data rows.
///
/// The export carries units and metadata on the first row and the field names on the second one,
/// so only the field row takes part in column resolution.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HeaderShape {
    /// Number of header rows preceding the data rows.
    pub n_rows: usize,

    /// Zero-based index of the header row that holds the field names.
    pub field_row: usize,
}

impl HeaderShape {
    /// Metadata row followed by the field-name row.
    pub const TWO_LEVEL: Self = Self { n_rows: 2, field_row: 1 };

    /// Single field-name row.
    pub const FLAT: Self = Self { n_rows: 1, field_row: 0 };

    /// Header shape with the field names on the last of `n_rows` header rows.
    pub const fn with_rows(n_rows: usize) -> Self {
        Self { n_rows, field_row: n_rows.saturating_sub(1) }
    }
}

impl Default for HeaderShape {
    fn default() -> Self {
        Self::TWO_LEVEL
    }
}
