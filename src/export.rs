//! JSON files for downstream tooling.

use std::{fs::File, io::BufWriter, path::Path};

use serde::Serialize;

use crate::{
    core::{cycle::CycleTable, metrics::MetricsReport},
    prelude::*,
};

/// Indicators along with the normalized cycles they were derived from.
#[must_use]
#[derive(Serialize)]
pub struct ReportExport<'a> {
    pub customer: &'a str,
    pub truck: &'a str,
    pub report: &'a MetricsReport,
    pub cycles: &'a CycleTable,
}

impl ReportExport<'_> {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write_json(&self, path: &Path) -> Result {
        write_json(path, self).context("failed to save the report")?;
        info!(n_cycles = self.cycles.len(), "saved the report");
        Ok(())
    }
}

/// Pretty-print the value into a newly created file.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result {
    let file = File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("failed to serialize into `{}`", path.display()))
}
