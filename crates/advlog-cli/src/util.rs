//! Shared helpers for command implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use advlog_core::{Error as CoreError, LogReader, Lookup, Report, ReportStream};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Pretty JSON with a trailing newline.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    json.push('\n');
    Ok(json)
}

/// Visit every report in a capture log.
///
/// A corrupt trailing frame ends the walk with a warning; the reports
/// before it are still delivered. Any other error is returned.
pub fn for_each_report<F>(log: &Path, lookup: &dyn Lookup, mut visit: F) -> Result<()>
where
    F: FnMut(Report),
{
    let frames = LogReader::open(log)
        .with_context(|| format!("Failed to open capture log: {}", log.display()))?;

    for report in ReportStream::new(frames, lookup) {
        match report {
            Ok(report) => visit(report),
            Err(e @ CoreError::CorruptFrame { .. }) => {
                warn!("Stopping at corrupt frame in {}: {}", log.display(), e);
                break;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", log.display()));
            }
        }
    }
    Ok(())
}
