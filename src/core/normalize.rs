use enumset::EnumSet;

use crate::{
    core::{
        config::NominalCapacity,
        cycle::{CycleRecord, CycleTable},
        error::{CellCoercionWarning, ReportError, SchemaError},
        raw::RawTable,
        schema::RequiredColumn,
    },
    prelude::*,
    quantity::{charge::AmpHours, temperature::Celsius},
};

/// Normalized cycle table along with the cells that had to be dropped on the way.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Normalized {
    pub table: CycleTable,
    pub warnings: Vec<CellCoercionWarning>,
}

/// Positions of the required columns within the raw rows.
#[derive(Copy, Clone)]
struct ColumnIndices {
    ah_discharged: usize,
    ah_charged: usize,
    t_max: usize,
    t_min: usize,
    full_charge: usize,
}

impl ColumnIndices {
    fn resolve(field_names: &[String]) -> Result<Self, SchemaError> {
        let position = |column: RequiredColumn| field_names.iter().position(|name| column.matches(name));
        let missing: EnumSet<RequiredColumn> =
            RequiredColumn::all().iter().filter(|column| position(*column).is_none()).collect();
        match (
            position(RequiredColumn::AhDischarged),
            position(RequiredColumn::AhCharged),
            position(RequiredColumn::MaxTemperature),
            position(RequiredColumn::MinTemperature),
            position(RequiredColumn::FullChargeFlag),
        ) {
            (Some(ah_discharged), Some(ah_charged), Some(t_max), Some(t_min), Some(full_charge)) => {
                Ok(Self { ah_discharged, ah_charged, t_max, t_min, full_charge })
            }
            _ => Err(SchemaError::MissingColumns { missing }),
        }
    }
}

/// Map the raw cycle log onto the cycle table.
///
/// The raw table stays untouched. Uninterpretable cells become missing values and get reported
/// as warnings, only structural problems fail the normalization.
#[instrument(skip_all, fields(n_rows = raw.rows().len()))]
pub fn normalize(raw: &RawTable, nominal_capacity: NominalCapacity) -> Result<Normalized, ReportError> {
    let indices = ColumnIndices::resolve(raw.field_names()?)?;
    let mut warnings = Vec::new();

    let table: CycleTable = raw
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut cells = RowCells { row, number: index + 1, warnings: &mut warnings };
            let ah_discharged =
                cells.number(RequiredColumn::AhDischarged, indices.ah_discharged).map(AmpHours);
            CycleRecord {
                ah_discharged,
                ah_charged: cells.number(RequiredColumn::AhCharged, indices.ah_charged).map(AmpHours),
                t_max: cells.number(RequiredColumn::MaxTemperature, indices.t_max).map(Celsius),
                t_min: cells.number(RequiredColumn::MinTemperature, indices.t_min).map(Celsius),
                full_charge: cells.flag(RequiredColumn::FullChargeFlag, indices.full_charge),
                depth_of_discharge: ah_discharged
                    .map(|ah_discharged| ah_discharged.percentage_of(nominal_capacity.get())),
            }
        })
        .collect();

    if !warnings.is_empty() {
        warn!(n_warnings = warnings.len(), first = %warnings[0], "some cells are taken as missing");
    }
    debug!(n_cycles = table.len(), "normalized");
    Ok(Normalized { table, warnings })
}

/// Cell reader for a single raw row which records the coercion failures.
struct RowCells<'a> {
    row: &'a [String],
    number: usize,
    warnings: &'a mut Vec<CellCoercionWarning>,
}

impl RowCells<'_> {
    /// Parse a numeric cell, empty cells are silently missing.
    fn number(&mut self, column: RequiredColumn, index: usize) -> Option<f64> {
        let text = RawTable::cell(self.row, index).trim();
        if text.is_empty() {
            return None;
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                self.warn(column, text);
                None
            }
        }
    }

    /// Map the `T`/`F` flag, any other token is missing.
    ///
    /// The tokens must match exactly, blank cells are silently missing.
    fn flag(&mut self, column: RequiredColumn, index: usize) -> Option<bool> {
        match RawTable::cell(self.row, index) {
            "T" => Some(true),
            "F" => Some(false),
            text if text.trim().is_empty() => None,
            text => {
                self.warn(column, text);
                None
            }
        }
    }

    fn warn(&mut self, column: RequiredColumn, text: &str) {
        self.warnings.push(CellCoercionWarning { row: self.number, column, value: text.to_string() });
    }
}
