//! Chart series for an external renderer.

use std::path::Path;

use serde::Serialize;

use crate::{
    core::cycle::CycleTable,
    export,
    prelude::*,
    quantity::{charge::AmpHours, temperature::Celsius},
};

/// X-axis ticks are placed every so many cycles.
const TICK_STEP: usize = 20;

#[must_use]
#[derive(Debug, Serialize)]
pub struct Charts {
    /// One-based cycle numbers to label on the x-axis.
    pub ticks: Vec<usize>,

    pub charge: Vec<ChargeBar>,
    pub temperature: TemperatureLine,
}

/// Charged and discharged amp-hours of a cycle, marked by the full charge outcome.
#[must_use]
#[derive(Debug, Serialize)]
pub struct ChargeBar {
    pub cycle: usize,
    pub ah_charged: Option<AmpHours>,
    pub ah_discharged: Option<AmpHours>,
    pub marker: char,
}

#[must_use]
#[derive(Debug, Serialize)]
pub struct TemperatureLine {
    pub threshold: Celsius,
    pub points: Vec<TemperaturePoint>,
}

#[must_use]
#[derive(Debug, Serialize)]
pub struct TemperaturePoint {
    pub cycle: usize,
    pub t_max: Option<Celsius>,
}

impl Charts {
    pub fn new(table: &CycleTable, thermal_threshold: Celsius) -> Self {
        let charge = table
            .iter()
            .enumerate()
            .map(|(index, record)| ChargeBar {
                cycle: index + 1,
                ah_charged: record.ah_charged,
                ah_discharged: record.ah_discharged,
                marker: full_charge_marker(record.is_full_charge()),
            })
            .collect();
        let points = table
            .iter()
            .enumerate()
            .map(|(index, record)| TemperaturePoint { cycle: index + 1, t_max: record.t_max })
            .collect();
        Self {
            ticks: ticks(table.len()),
            charge,
            temperature: TemperatureLine { threshold: thermal_threshold, points },
        }
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write_json(&self, path: &Path) -> Result {
        export::write_json(path, self).context("failed to save the chart data")?;
        info!(n_cycles = self.charge.len(), "saved the chart data");
        Ok(())
    }
}

pub const fn full_charge_marker(is_full_charge: bool) -> char {
    if is_full_charge { '✓' } else { '✗' }
}

/// Every [`TICK_STEP`]-th cycle starting from the first one, plus the last cycle.
fn ticks(n_cycles: usize) -> Vec<usize> {
    let mut ticks: Vec<usize> = (1..=n_cycles).step_by(TICK_STEP).collect();
    if n_cycles != 0 && ticks.last() != Some(&n_cycles) {
        ticks.push(n_cycles);
    }
    ticks
}
