//! Frames command implementation.

use std::path::{Path, PathBuf};

use advlog_core::LogReader;
use advlog_core::util::hex_string;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::util::{to_json, write_output};

#[derive(Debug, Serialize)]
struct FrameRow {
    timestamp: u64,
    length: usize,
    payload: String,
}

pub fn cmd_frames(log: &Path, format: OutputFormat, output: Option<&PathBuf>) -> Result<()> {
    let reader = LogReader::open(log)
        .with_context(|| format!("Failed to open capture log: {}", log.display()))?;

    let mut rows = Vec::new();
    for frame in reader {
        match frame {
            Ok(frame) => rows.push(FrameRow {
                timestamp: frame.timestamp,
                length: frame.payload.len(),
                payload: hex_string(&frame.payload),
            }),
            Err(e @ advlog_core::Error::CorruptFrame { .. }) => {
                warn!("Stopping at corrupt frame: {}", e);
                break;
            }
            Err(e) => return Err(e).context("Failed to read frame"),
        }
    }

    let content = match format {
        OutputFormat::Json => to_json(&rows)?,
        OutputFormat::Text => rows
            .iter()
            .map(|row| format!("{} {} {}\n", row.timestamp, row.length, row.payload))
            .collect(),
    };
    write_output(output, &content)
}
