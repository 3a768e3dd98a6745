#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod advisory;
mod chart;
mod cli;
mod core;
mod export;
mod ingest;
mod prelude;
mod quantity;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    advisory::Advisory,
    chart::Charts,
    cli::Args,
    core::{
        config::ReportConfig,
        metrics::{MetricsReport, aggregate},
        normalize::{Normalized, normalize},
        raw::RawTable,
    },
    export::ReportExport,
    ingest::read_cycle_log,
    prelude::*,
    tables::{
        ReportHeader,
        build_advisories_table,
        build_cycles_table,
        build_header_table,
        build_metrics_table,
    },
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let config = ReportConfig::builder()
        .nominal_capacity(args.nominal_capacity)
        .thermal_threshold(args.report.thermal_threshold())
        .efficiency_policy(args.report.efficiency_policy)
        .build()?;

    let raw = read_cycle_log(&args.input, args.input_format.input_options())?;
    let (normalized, report) = generate(&raw, &config)?;

    let header = ReportHeader {
        customer: &args.customer,
        truck: &args.truck,
        nominal_capacity: args.nominal_capacity,
    };
    println!("{}", build_header_table(&header));
    println!("{}", build_metrics_table(&report));
    println!(
        "{}",
        build_advisories_table(&Advisory::from_report(
            &report,
            args.report.deep_discharge_advisory_threshold(),
        )),
    );
    if args.output.show_cycles {
        println!("{}", build_cycles_table(&normalized.table, &config));
    }
    if let Some(path) = &args.output.chart_data {
        Charts::new(&normalized.table, config.thermal_threshold).write_json(path)?;
    }
    if let Some(path) = &args.output.report_json {
        ReportExport {
            customer: &args.customer,
            truck: &args.truck,
            report: &report,
            cycles: &normalized.table,
        }
        .write_json(path)?;
    }

    info!("done!");
    Ok(())
}

/// Normalize the raw cycle log and aggregate it into the report.
fn generate(raw: &RawTable, config: &ReportConfig) -> Result<(Normalized, MetricsReport)> {
    let normalized =
        normalize(raw, config.nominal_capacity).context("failed to normalize the cycle log")?;
    for warning in &normalized.warnings {
        debug!(%warning, "coerced");
    }
    let report = aggregate(&normalized.table, config).context("failed to aggregate the cycle log")?;
    Ok((normalized, report))
}
