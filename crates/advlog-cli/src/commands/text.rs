//! Text command implementation: aggregate a rendered text report.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use advlog_core::{AggregateOptions, DeviceAggregator, read_reports};
use anyhow::{Context, Result};
use tracing::info;

use super::format_devices;
use crate::cli::OutputFormat;
use crate::util::write_output;

pub fn cmd_text(
    file: &Path,
    options: AggregateOptions,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    options.validate()?;
    let reader = File::open(file)
        .map(BufReader::new)
        .with_context(|| format!("Failed to open text report: {}", file.display()))?;

    // Ignored fields are dropped while reading, together with their info lines.
    let reports = read_reports(reader, &options.ignore_fields)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    info!("Read {} reports from {}", reports.len(), file.display());

    let mut aggregator = DeviceAggregator::new(options);
    aggregator.extend(reports);
    let devices = aggregator.finish();

    write_output(output, &format_devices(&devices, format)?)
}
