use derive_more::Display;

use crate::{core::metrics::MetricsReport, quantity::ratios::Percentage};

/// Deep discharges above this share call for limiting them.
pub const DEFAULT_DEEP_DISCHARGE_ADVISORY_THRESHOLD: Percentage = Percentage(5.0);

/// Operating advice for the battery owner.
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum Advisory {
    #[display("Check the incomplete charges to reduce sulphation.")]
    CheckIncompleteCharges,

    #[display("Monitor closely the cycles in which the temperature approaches the threshold.")]
    MonitorTemperature,

    #[display(
        "Limit deep discharges (>{_0:.0} DoD) by rescheduling the shifts or installing discharge limiters to preserve the battery lifetime."
    )]
    LimitDeepDischarges(Percentage),
}

impl Advisory {
    /// Standing advice followed by the advice triggered by the report.
    #[must_use]
    pub fn from_report(report: &MetricsReport, deep_discharge_threshold: Percentage) -> Vec<Self> {
        let mut advisories = vec![Self::CheckIncompleteCharges, Self::MonitorTemperature];
        if report.deep_discharge_percentage() > deep_discharge_threshold {
            advisories.push(Self::LimitDeepDischarges(
                report.deep_discharge_threshold.percentage_of(report.nominal_capacity),
            ));
        }
        advisories
    }
}
