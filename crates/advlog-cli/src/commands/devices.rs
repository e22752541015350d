//! Devices command implementation.

use std::path::{Path, PathBuf};

use advlog_core::{AggregateOptions, Device, DeviceAggregator, Lookup, render_device};
use anyhow::Result;
use tracing::info;

use crate::cli::OutputFormat;
use crate::util::{for_each_report, to_json, write_output};

pub fn cmd_devices(
    log: &Path,
    options: AggregateOptions,
    format: OutputFormat,
    output: Option<&PathBuf>,
    lookup: &dyn Lookup,
) -> Result<()> {
    options.validate()?;
    let mut aggregator = DeviceAggregator::new(options);
    for_each_report(log, lookup, |report| aggregator.push(report))?;

    let stats = aggregator.stats();
    info!(
        reports = stats.reports,
        devices = stats.devices,
        missing_key = stats.missing_key,
        "Aggregated {}",
        log.display()
    );

    let devices = aggregator.finish();
    write_output(output, &format_devices(&devices, format)?)
}

/// Render devices, separated by blank lines in text form.
pub fn format_devices(devices: &[Device], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => to_json(devices)?,
        OutputFormat::Text => devices
            .iter()
            .map(render_device)
            .collect::<Vec<_>>()
            .join("\n"),
    })
}
