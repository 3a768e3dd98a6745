use std::fmt::{Display, Formatter};

use bon::bon;
use serde::Serialize;

use crate::{
    core::error::ReportError,
    quantity::{charge::AmpHours, temperature::Celsius},
};

/// Cycles above this maximum temperature are counted as hot.
///
/// The deployed reports disagree between 45 °C and 55 °C, the latter is used unless overridden.
pub const DEFAULT_THERMAL_THRESHOLD: Celsius = Celsius(55.0);

/// Discharges reaching this share of the nominal capacity are deep.
pub const DEFAULT_DEEP_DISCHARGE_RATIO: f64 = 0.8;

/// Rated capacity of the battery, always positive and finite.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct NominalCapacity(AmpHours);

impl NominalCapacity {
    pub fn try_new(capacity: AmpHours) -> Result<Self, ReportError> {
        if capacity.is_finite() && capacity > AmpHours::ZERO {
            Ok(Self(capacity))
        } else {
            Err(ReportError::InvalidConfig {
                parameter: "nominal capacity",
                value: capacity.0,
                reason: "must be a positive number of amp-hours",
            })
        }
    }

    pub const fn get(self) -> AmpHours {
        self.0
    }
}

impl TryFrom<AmpHours> for NominalCapacity {
    type Error = ReportError;

    fn try_from(capacity: AmpHours) -> Result<Self, Self::Error> {
        Self::try_new(capacity)
    }
}

/// How the coulombic efficiency is derived from the cycle log.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EfficiencyPolicy {
    /// Total discharged over total charged plus the nominal capacity.
    ///
    /// The extra capacity accounts for the initial full charge that precedes the log.
    #[default]
    Aggregate,

    /// Mean of the per-cycle discharged-to-charged ratios.
    ///
    /// Cycles without a positive charged value are left out.
    PerCycle,
}

impl Display for EfficiencyPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aggregate => write!(f, "Σ discharged / (Σ charged + C nom)"),
            Self::PerCycle => write!(f, "mean of discharged / charged"),
        }
    }
}

#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct ReportConfig {
    pub nominal_capacity: NominalCapacity,
    pub thermal_threshold: Celsius,
    pub efficiency_policy: EfficiencyPolicy,

    /// Share of the nominal capacity, `0..=1`.
    pub deep_discharge_ratio: f64,
}

#[bon]
impl ReportConfig {
    #[builder]
    pub fn new(
        nominal_capacity: AmpHours,
        #[builder(default = DEFAULT_THERMAL_THRESHOLD)] thermal_threshold: Celsius,
        #[builder(default)] efficiency_policy: EfficiencyPolicy,
        #[builder(default = DEFAULT_DEEP_DISCHARGE_RATIO)] deep_discharge_ratio: f64,
    ) -> Result<Self, ReportError> {
        let nominal_capacity = NominalCapacity::try_new(nominal_capacity)?;
        if !thermal_threshold.is_finite() {
            return Err(ReportError::InvalidConfig {
                parameter: "thermal threshold",
                value: thermal_threshold.0,
                reason: "must be a finite temperature",
            });
        }
        if !(deep_discharge_ratio > 0.0 && deep_discharge_ratio <= 1.0) {
            return Err(ReportError::InvalidConfig {
                parameter: "deep discharge ratio",
                value: deep_discharge_ratio,
                reason: "must be within (0, 1]",
            });
        }
        Ok(Self { nominal_capacity, thermal_threshold, efficiency_policy, deep_discharge_ratio })
    }
}

impl ReportConfig {
    pub fn deep_discharge_threshold(&self) -> AmpHours {
        self.nominal_capacity.get() * self.deep_discharge_ratio
    }
}
