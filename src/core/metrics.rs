use std::fmt::{Display, Formatter};

use average::Mean;
use serde::Serialize;

use crate::{
    core::{
        config::{EfficiencyPolicy, ReportConfig},
        cycle::{CycleRecord, CycleTable},
        error::ReportError,
    },
    prelude::*,
    quantity::{charge::AmpHours, ratios::Percentage, temperature::Celsius},
};

/// Number of cycles matching a criterion and their share among all the cycles.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Share {
    pub count: usize,
    pub percentage: Percentage,
}

impl Share {
    fn of(count: usize, total: usize) -> Result<Self, ReportError> {
        let percentage = Percentage::of_count(count, total).ok_or(ReportError::EmptyTable)?;
        Ok(Self { count, percentage })
    }
}

impl Display for Share {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.1})", self.count, self.percentage)
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CoulombicEfficiency {
    pub policy: EfficiencyPolicy,

    /// Discharged-to-charged ratio, `None` when the log provides nothing to compute it from.
    pub value: Option<f64>,
}

/// Fixed-shape battery health indicators derived from the cycle table.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct MetricsReport {
    pub nominal_capacity: AmpHours,
    pub n_cycles: usize,

    pub deep_discharge_threshold: AmpHours,
    pub deep_discharges: Share,

    pub full_charges: Share,

    /// Cycles without a definitive full charge, including those with a missing flag.
    pub partial_charges: Share,

    pub mean_ah_discharged: Option<AmpHours>,
    pub mean_depth_of_discharge: Option<Percentage>,
    pub coulombic_efficiency: CoulombicEfficiency,

    pub thermal_threshold: Celsius,
    pub hot_cycles: Share,
    pub mean_t_max: Option<Celsius>,
}

/// Aggregate the normalized cycle table into the report.
///
/// Missing values never satisfy a threshold and are left out of the means,
/// but the respective cycles still count towards the total.
#[instrument(skip_all, fields(n_cycles = table.len()))]
pub fn aggregate(table: &CycleTable, config: &ReportConfig) -> Result<MetricsReport, ReportError> {
    let n_cycles = table.len();
    if n_cycles == 0 {
        return Err(ReportError::EmptyTable);
    }

    let deep_discharge_threshold = config.deep_discharge_threshold();
    let deep_discharges = Share::of(
        count(table, |record| record.ah_discharged.is_some_and(|ah| ah >= deep_discharge_threshold)),
        n_cycles,
    )?;

    let full_charges = Share::of(count(table, CycleRecord::is_full_charge), n_cycles)?;
    let partial_charges = Share {
        count: n_cycles - full_charges.count,
        percentage: Percentage::HUNDRED - full_charges.percentage,
    };

    let hot_cycles = Share::of(
        count(table, |record| record.t_max.is_some_and(|t_max| t_max > config.thermal_threshold)),
        n_cycles,
    )?;

    let report = MetricsReport {
        nominal_capacity: config.nominal_capacity.get(),
        n_cycles,
        deep_discharge_threshold,
        deep_discharges,
        full_charges,
        partial_charges,
        mean_ah_discharged: mean(table.iter().filter_map(|record| record.ah_discharged.map(|ah| ah.0)))
            .map(AmpHours),
        mean_depth_of_discharge: mean(
            table.iter().filter_map(|record| record.depth_of_discharge.map(|dod| dod.0)),
        )
        .map(Percentage),
        coulombic_efficiency: CoulombicEfficiency {
            policy: config.efficiency_policy,
            value: coulombic_efficiency(table, config),
        },
        thermal_threshold: config.thermal_threshold,
        hot_cycles,
        mean_t_max: mean(table.iter().filter_map(|record| record.t_max.map(|t_max| t_max.0)))
            .map(Celsius),
    };
    info!(
        n_cycles,
        deep_discharges = %report.deep_discharges,
        full_charges = %report.full_charges,
        hot_cycles = %report.hot_cycles,
        "aggregated",
    );
    Ok(report)
}

fn count(table: &CycleTable, predicate: impl Fn(&CycleRecord) -> bool) -> usize {
    table.iter().filter(|record| predicate(record)).count()
}

/// Arithmetic mean, `None` for no values.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let estimate: Mean = values.collect();
    if estimate.is_empty() { None } else { Some(estimate.mean()) }
}

fn coulombic_efficiency(table: &CycleTable, config: &ReportConfig) -> Option<f64> {
    match config.efficiency_policy {
        EfficiencyPolicy::Aggregate => {
            let discharged: Vec<AmpHours> =
                table.iter().filter_map(|record| record.ah_discharged).collect();
            if discharged.is_empty() {
                return None;
            }
            let total_charged: AmpHours = table.iter().filter_map(|record| record.ah_charged).sum();
            let denominator = total_charged + config.nominal_capacity.get();
            (denominator > AmpHours::ZERO)
                .then(|| discharged.into_iter().sum::<AmpHours>() / denominator)
        }
        EfficiencyPolicy::PerCycle => mean(table.iter().filter_map(|record| {
            match (record.ah_discharged, record.ah_charged) {
                (Some(discharged), Some(charged)) if charged > AmpHours::ZERO => {
                    Some(discharged / charged)
                }
                _ => None,
            }
        })),
    }
}

impl MetricsReport {
    /// Share of deep discharges, drives the deep discharge advisory.
    pub const fn deep_discharge_percentage(&self) -> Percentage {
        self.deep_discharges.percentage
    }

    /// Ordered indicator labels and their formatted values.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        vec![
            ("Nominal capacity".to_string(), format!("{:.0}", self.nominal_capacity)),
            ("Total cycles".to_string(), self.n_cycles.to_string()),
            (
                format!(
                    "Deep discharges (≥ {:.0} of nominal)",
                    self.deep_discharge_threshold.percentage_of(self.nominal_capacity),
                ),
                self.deep_discharges.to_string(),
            ),
            ("Complete charges".to_string(), self.full_charges.to_string()),
            ("Partial charges".to_string(), self.partial_charges.to_string()),
            ("Mean Ah discharged".to_string(), format_optional(self.mean_ah_discharged)),
            ("Mean DoD".to_string(), format_optional(self.mean_depth_of_discharge)),
            (
                format!("Coulombic efficiency ({})", self.coulombic_efficiency.policy),
                self.coulombic_efficiency
                    .value
                    .map_or_else(|| UNDEFINED.to_string(), |value| format!("{value:.3}")),
            ),
            (
                format!("Cycles with Tmax > {:.0}", self.thermal_threshold),
                self.hot_cycles.to_string(),
            ),
            ("Mean Tmax".to_string(), format_optional(self.mean_t_max)),
        ]
    }
}

/// Placeholder for indicators which cannot be computed from the log.
pub const UNDEFINED: &str = "n/a";

fn format_optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |value| format!("{value:.1}"))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn record(ah_discharged: f64, ah_charged: f64, t_max: f64, full_charge: Option<bool>) -> CycleRecord {
        CycleRecord {
            ah_discharged: Some(AmpHours(ah_discharged)),
            ah_charged: Some(AmpHours(ah_charged)),
            t_max: Some(Celsius(t_max)),
            t_min: Some(Celsius(20.0)),
            full_charge,
            depth_of_discharge: Some(AmpHours(ah_discharged).percentage_of(AmpHours(500.0))),
        }
    }

    fn config(thermal_threshold: f64, efficiency_policy: EfficiencyPolicy) -> ReportConfig {
        ReportConfig::builder()
            .nominal_capacity(AmpHours(500.0))
            .thermal_threshold(Celsius(thermal_threshold))
            .efficiency_policy(efficiency_policy)
            .build()
            .unwrap()
    }

    fn example_table() -> CycleTable {
        CycleTable::from(vec![
            record(450.0, 480.0, 50.0, Some(true)),
            record(100.0, 120.0, 60.0, Some(false)),
        ])
    }

    #[test]
    fn test_example() {
        let report = aggregate(&example_table(), &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.n_cycles, 2);
        assert_eq!(report.deep_discharge_threshold, AmpHours(400.0));
        assert_eq!(report.deep_discharges.count, 1);
        assert_abs_diff_eq!(report.deep_discharge_percentage().0, 50.0);
        assert_eq!(report.full_charges.count, 1);
        assert_eq!(report.partial_charges.count, 1);
        assert_eq!(report.hot_cycles.count, 2);
        assert_abs_diff_eq!(report.hot_cycles.percentage.0, 100.0);
        assert_abs_diff_eq!(report.mean_t_max.unwrap().0, 55.0);
        assert_abs_diff_eq!(report.mean_ah_discharged.unwrap().0, 275.0);
        assert_abs_diff_eq!(report.mean_depth_of_discharge.unwrap().0, 55.0);
        assert_abs_diff_eq!(report.coulombic_efficiency.value.unwrap(), 550.0 / 1100.0);
    }

    #[test]
    fn test_default_thermal_threshold() {
        let config = ReportConfig::builder().nominal_capacity(AmpHours(500.0)).build().unwrap();
        let report = aggregate(&example_table(), &config).unwrap();
        assert_eq!(report.hot_cycles.count, 1);
    }

    #[test]
    fn test_thermal_threshold_is_exclusive() {
        let table = CycleTable::from(vec![record(1.0, 1.0, 45.0, None)]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.hot_cycles.count, 0);
    }

    #[test]
    fn test_deep_discharge_threshold_is_inclusive() {
        let table = CycleTable::from(vec![record(400.0, 400.0, 20.0, None)]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.deep_discharges.count, 1);
    }

    #[test]
    fn test_per_cycle_efficiency() {
        let table = CycleTable::from(vec![
            record(450.0, 500.0, 50.0, Some(true)),
            record(100.0, 0.0, 60.0, Some(false)),
            CycleRecord { ah_charged: None, ..record(100.0, 0.0, 60.0, None) },
            record(100.0, 200.0, 60.0, Some(false)),
        ]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::PerCycle)).unwrap();
        assert_eq!(report.coulombic_efficiency.policy, EfficiencyPolicy::PerCycle);
        assert_abs_diff_eq!(report.coulombic_efficiency.value.unwrap(), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_per_cycle_efficiency_not_computable() {
        let table = CycleTable::from(vec![record(100.0, 0.0, 60.0, Some(false))]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::PerCycle)).unwrap();
        assert_eq!(report.coulombic_efficiency.value, None);
    }

    #[test]
    fn test_empty_table() {
        let result = aggregate(&CycleTable::default(), &config(45.0, EfficiencyPolicy::Aggregate));
        assert!(matches!(result, Err(ReportError::EmptyTable)));
    }

    #[test]
    fn test_full_and_partial_charges_add_up() {
        let table = CycleTable::from(vec![
            record(1.0, 1.0, 20.0, Some(true)),
            record(1.0, 1.0, 20.0, Some(false)),
            record(1.0, 1.0, 20.0, None),
            record(1.0, 1.0, 20.0, Some(true)),
            record(1.0, 1.0, 20.0, None),
        ]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.full_charges.count + report.partial_charges.count, report.n_cycles);
        assert_eq!(report.full_charges.count, 2);
        assert_eq!(report.partial_charges.count, 3);
        assert_abs_diff_eq!(report.full_charges.percentage.0, 40.0);
        assert_abs_diff_eq!(report.partial_charges.percentage.0, 60.0);
    }

    #[test]
    fn test_all_full_charges() {
        let table = CycleTable::from(vec![record(1.0, 1.0, 20.0, Some(true)); 7]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.partial_charges.count, 0);
        assert_abs_diff_eq!(report.partial_charges.percentage.0, 0.0);
    }

    #[test]
    fn test_all_deep_discharges() {
        let table = CycleTable::from(vec![
            record(400.0, 1.0, 20.0, None),
            record(500.0, 1.0, 20.0, None),
            record(600.0, 1.0, 20.0, None),
        ]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.deep_discharges.count, 3);
        assert_eq!(report.deep_discharge_percentage(), Percentage(100.0));
    }

    #[test]
    fn test_percentages_are_bounded() {
        for n_hot in 0..=4 {
            let table: CycleTable = (0..4)
                .map(|i| record(f64::from(i) * 150.0, 1.0, if i < n_hot { 80.0 } else { 20.0 }, None))
                .collect();
            let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
            for share in [report.deep_discharges, report.hot_cycles] {
                assert!((0.0..=100.0).contains(&share.percentage.0), "{share:?}");
            }
            assert_eq!(report.hot_cycles.count, n_hot as usize);
        }
    }

    #[test]
    fn test_row_order_invariance() {
        let records = vec![
            record(450.0, 480.0, 50.0, Some(true)),
            record(100.0, 120.0, 60.0, Some(false)),
            CycleRecord { ah_discharged: None, depth_of_discharge: None, ..record(0.0, 300.0, 41.0, None) },
            record(420.0, 455.0, 47.5, Some(true)),
            record(30.0, 0.0, 39.0, Some(false)),
        ];
        let mut shuffled = records.clone();
        shuffled.rotate_left(1);
        shuffled.swap(0, 2);

        for policy in [EfficiencyPolicy::Aggregate, EfficiencyPolicy::PerCycle] {
            let config = config(45.0, policy);
            let expected = aggregate(&CycleTable::from(records.clone()), &config).unwrap();
            let actual = aggregate(&CycleTable::from(shuffled.clone()), &config).unwrap();

            assert_eq!(actual.n_cycles, expected.n_cycles);
            assert_eq!(actual.deep_discharges, expected.deep_discharges);
            assert_eq!(actual.full_charges, expected.full_charges);
            assert_eq!(actual.partial_charges, expected.partial_charges);
            assert_eq!(actual.hot_cycles, expected.hot_cycles);
            assert_eq!(actual.coulombic_efficiency.policy, policy);
            assert_abs_diff_eq!(
                actual.mean_ah_discharged.unwrap().0,
                expected.mean_ah_discharged.unwrap().0,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                actual.mean_depth_of_discharge.unwrap().0,
                expected.mean_depth_of_discharge.unwrap().0,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                actual.coulombic_efficiency.value.unwrap(),
                expected.coulombic_efficiency.value.unwrap(),
                epsilon = 1e-12
            );
            assert_abs_diff_eq!(actual.mean_t_max.unwrap().0, expected.mean_t_max.unwrap().0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_non_numeric_discharge_still_counts() {
        let table = CycleTable::from(vec![
            CycleRecord { ah_discharged: None, depth_of_discharge: None, ..record(0.0, 480.0, 50.0, Some(true)) },
            record(450.0, 480.0, 50.0, Some(false)),
        ]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.n_cycles, 2);
        assert_eq!(report.deep_discharges.count, 1);
        assert_abs_diff_eq!(report.deep_discharge_percentage().0, 50.0);
        assert_eq!(report.full_charges.count, 1);
        assert_eq!(report.partial_charges.count, 1);
        assert_abs_diff_eq!(report.mean_ah_discharged.unwrap().0, 450.0);
        assert_abs_diff_eq!(report.mean_depth_of_discharge.unwrap().0, 90.0);
    }

    #[test]
    fn test_all_missing_columns_are_undefined() {
        let table = CycleTable::from(vec![CycleRecord::default(); 3]);
        let report = aggregate(&table, &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        assert_eq!(report.n_cycles, 3);
        assert_eq!(report.deep_discharges.count, 0);
        assert_eq!(report.hot_cycles.count, 0);
        assert_eq!(report.partial_charges.count, 3);
        assert_eq!(report.mean_ah_discharged, None);
        assert_eq!(report.mean_depth_of_discharge, None);
        assert_eq!(report.mean_t_max, None);
        assert_eq!(report.coulombic_efficiency.value, None);

        let entries = report.entries();
        assert_eq!(entries[5], ("Mean Ah discharged".to_string(), UNDEFINED.to_string()));
        assert_eq!(entries[9], ("Mean Tmax".to_string(), UNDEFINED.to_string()));
    }

    #[test]
    fn test_entries() {
        let report = aggregate(&example_table(), &config(45.0, EfficiencyPolicy::Aggregate)).unwrap();
        let entries = report.entries();
        let values: Vec<(&str, &str)> =
            entries.iter().map(|(label, value)| (label.as_str(), value.as_str())).collect();
        assert_eq!(values, [
            ("Nominal capacity", "500 Ah"),
            ("Total cycles", "2"),
            ("Deep discharges (≥ 80 % of nominal)", "1 (50.0 %)"),
            ("Complete charges", "1 (50.0 %)"),
            ("Partial charges", "1 (50.0 %)"),
            ("Mean Ah discharged", "275.0 Ah"),
            ("Mean DoD", "55.0 %"),
            ("Coulombic efficiency (Σ discharged / (Σ charged + C nom))", "0.500"),
            ("Cycles with Tmax > 45 °C", "2 (100.0 %)"),
            ("Mean Tmax", "55.0 °C"),
        ]);
    }
}
