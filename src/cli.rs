use std::path::PathBuf;

use clap::Parser;

use crate::{
    advisory::DEFAULT_DEEP_DISCHARGE_ADVISORY_THRESHOLD,
    core::{
        config::{DEFAULT_THERMAL_THRESHOLD, EfficiencyPolicy},
        schema::HeaderShape,
    },
    ingest::InputOptions,
    quantity::{charge::AmpHours, ratios::Percentage, temperature::Celsius},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Cycle log exported from the charger, as CSV or a spreadsheet.
    #[clap(env = "CYCLE_LOG_PATH")]
    pub input: PathBuf,

    /// Rated battery capacity in amp-hours, as on the nameplate.
    #[clap(long = "nominal-capacity", env = "NOMINAL_CAPACITY_AH")]
    pub nominal_capacity: AmpHours,

    #[clap(flatten)]
    pub report: ReportArgs,

    #[clap(flatten)]
    pub input_format: InputFormatArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Customer name to print in the report header.
    #[clap(long, env = "CUSTOMER", default_value = "")]
    pub customer: String,

    /// Truck type or serial number to print in the report header.
    #[clap(long, env = "TRUCK", default_value = "")]
    pub truck: String,
}

#[derive(Copy, Clone, Parser)]
pub struct ReportArgs {
    /// Cycles with the maximum temperature above this one, in °C, are counted as hot.
    #[clap(
        long = "thermal-threshold",
        env = "THERMAL_THRESHOLD_CELSIUS",
        default_value_t = DEFAULT_THERMAL_THRESHOLD.0,
    )]
    pub thermal_threshold_celsius: f64,

    #[clap(long = "efficiency-policy", env = "EFFICIENCY_POLICY", default_value = "aggregate")]
    pub efficiency_policy: EfficiencyPolicy,

    /// Share of deep discharges above which limiting them is advised.
    #[clap(
        long = "deep-discharge-advisory-percent",
        env = "DEEP_DISCHARGE_ADVISORY_PERCENT",
        default_value_t = DEFAULT_DEEP_DISCHARGE_ADVISORY_THRESHOLD.0,
        value_parser = parse_percent,
    )]
    pub deep_discharge_advisory_percent: f64,
}

impl ReportArgs {
    pub const fn thermal_threshold(self) -> Celsius {
        Celsius(self.thermal_threshold_celsius)
    }

    pub const fn deep_discharge_advisory_threshold(self) -> Percentage {
        Percentage(self.deep_discharge_advisory_percent)
    }
}

fn parse_percent(value: &str) -> Result<f64, String> {
    let percent: f64 = value.trim().parse().map_err(|error| format!("`{value}`: {error}"))?;
    if (0.0..=100.0).contains(&percent) {
        Ok(percent)
    } else {
        Err(format!("`{value}` is not within 0 to 100 percent"))
    }
}

#[derive(Copy, Clone, Parser)]
pub struct InputFormatArgs {
    /// Number of header rows, the field names are expected on the last one.
    #[clap(
        long = "header-rows",
        env = "HEADER_ROWS",
        default_value = "2",
        value_parser = clap::value_parser!(u8).range(1..=2),
    )]
    pub n_header_rows: u8,

    /// Single-byte CSV field delimiter.
    #[clap(long, env = "CSV_DELIMITER", default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [delimiter] => Ok(*delimiter),
        _ => Err(format!("`{value}` is not a single-byte delimiter")),
    }
}

impl InputFormatArgs {
    pub fn input_options(self) -> InputOptions {
        InputOptions {
            shape: HeaderShape::with_rows(usize::from(self.n_header_rows)),
            delimiter: self.delimiter,
        }
    }
}

#[derive(Parser)]
pub struct OutputArgs {
    /// Also print the normalized cycle table.
    #[clap(long = "show-cycles", env = "SHOW_CYCLES")]
    pub show_cycles: bool,

    /// Save the chart series as JSON.
    #[clap(long = "chart-data", env = "CHART_DATA_PATH")]
    pub chart_data: Option<PathBuf>,

    /// Save the indicators along with the normalized cycles as JSON.
    #[clap(long = "report-json", env = "REPORT_JSON_PATH")]
    pub report_json: Option<PathBuf>,
}
