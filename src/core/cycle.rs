use derive_more::{Deref, From, IntoIterator};
use serde::Serialize;

use crate::quantity::{charge::AmpHours, ratios::Percentage, temperature::Celsius};

/// Single charge/discharge cycle of the battery.
///
/// Missing fields stand for absent or uninterpretable cells.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct CycleRecord {
    pub ah_discharged: Option<AmpHours>,
    pub ah_charged: Option<AmpHours>,

    #[serde(rename = "t_max_c")]
    pub t_max: Option<Celsius>,

    #[serde(rename = "t_min_c")]
    pub t_min: Option<Celsius>,

    /// Whether the charge phase has reached the full state.
    pub full_charge: Option<bool>,

    /// Discharged amp-hours relative to the nominal capacity.
    #[serde(rename = "dod_pct")]
    pub depth_of_discharge: Option<Percentage>,
}

impl CycleRecord {
    /// Definitive full charge, missing flags do not qualify.
    pub fn is_full_charge(&self) -> bool {
        self.full_charge == Some(true)
    }
}

/// Normalized cycle log in the input row order.
#[must_use]
#[derive(Clone, Debug, Default, Deref, From, IntoIterator, PartialEq, Serialize)]
#[into_iterator(owned, ref)]
#[serde(transparent)]
pub struct CycleTable(Vec<CycleRecord>);

impl FromIterator<CycleRecord> for CycleTable {
    fn from_iter<I: IntoIterator<Item = CycleRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
