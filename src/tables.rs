use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    advisory::Advisory,
    chart::full_charge_marker,
    core::{config::ReportConfig, cycle::CycleTable, metrics::MetricsReport},
    quantity::{charge::AmpHours, temperature::Celsius},
};

/// Customer and vehicle the battery belongs to.
#[must_use]
pub struct ReportHeader<'a> {
    pub customer: &'a str,
    pub truck: &'a str,
    pub nominal_capacity: AmpHours,
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_header_table(header: &ReportHeader<'_>) -> Table {
    let mut table = new_table();
    table
        .add_row(vec![Cell::new("Customer").add_attribute(Attribute::Bold), Cell::new(header.customer)])
        .add_row(vec![
            Cell::new("Truck type/serial").add_attribute(Attribute::Bold),
            Cell::new(header.truck),
        ])
        .add_row(vec![
            Cell::new("Nominal capacity").add_attribute(Attribute::Bold),
            Cell::new(format!("{:.0}", header.nominal_capacity)),
        ]);
    table
}

pub fn build_metrics_table(report: &MetricsReport) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Indicator", "Value"]);
    for (label, value) in report.entries() {
        table.add_row(vec![Cell::new(label), Cell::new(value).set_alignment(CellAlignment::Right)]);
    }
    table
}

pub fn build_advisories_table(advisories: &[Advisory]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Advice"]);
    for advisory in advisories {
        let cell = Cell::new(advisory);
        table.add_row(vec![match advisory {
            Advisory::LimitDeepDischarges(_) => cell.fg(Color::Red),
            Advisory::CheckIncompleteCharges | Advisory::MonitorTemperature => cell,
        }]);
    }
    table
}

pub fn build_cycles_table(cycles: &CycleTable, config: &ReportConfig) -> Table {
    let deep_discharge_threshold = config.deep_discharge_threshold();

    let mut table = new_table();
    table.set_header(vec!["#", "Charged", "Discharged", "DoD", "Full", "Tmax", "Tmin"]);
    for (index, cycle) in cycles.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).add_attribute(Attribute::Dim),
            optional_cell(cycle.ah_charged),
            optional_cell(cycle.ah_discharged).fg(
                if cycle.ah_discharged.is_some_and(|ah| ah >= deep_discharge_threshold) {
                    Color::Red
                } else {
                    Color::Reset
                },
            ),
            optional_cell(cycle.depth_of_discharge),
            Cell::new(full_charge_marker(cycle.is_full_charge()))
                .set_alignment(CellAlignment::Center)
                .fg(if cycle.is_full_charge() { Color::Green } else { Color::Red }),
            optional_cell(cycle.t_max).fg(temperature_color(cycle.t_max, config.thermal_threshold)),
            optional_cell(cycle.t_min).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

fn optional_cell<T: std::fmt::Display>(value: Option<T>) -> Cell {
    value
        .map_or_else(|| Cell::new("").add_attribute(Attribute::Dim), Cell::new)
        .set_alignment(CellAlignment::Right)
}

fn temperature_color(t_max: Option<Celsius>, threshold: Celsius) -> Color {
    match t_max {
        Some(t_max) if t_max > threshold => Color::Red,
        Some(t_max) if t_max > threshold - Celsius(5.0) => Color::DarkYellow,
        _ => Color::Reset,
    }
}
