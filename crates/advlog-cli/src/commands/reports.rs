//! Reports command implementation.

use std::path::{Path, PathBuf};

use advlog_core::{Lookup, render_report};
use anyhow::Result;

use crate::cli::OutputFormat;
use crate::util::{for_each_report, to_json, write_output};

pub fn cmd_reports(
    log: &Path,
    format: OutputFormat,
    output: Option<&PathBuf>,
    lookup: &dyn Lookup,
) -> Result<()> {
    let content = match format {
        OutputFormat::Text => {
            let mut text = String::new();
            for_each_report(log, lookup, |report| text.push_str(&render_report(&report)))?;
            text
        }
        OutputFormat::Json => {
            let mut reports = Vec::new();
            for_each_report(log, lookup, |report| reports.push(report))?;
            to_json(&reports)?
        }
    };
    write_output(output, &content)
}
