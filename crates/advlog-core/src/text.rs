//! Indented text rendering of reports and devices, and the reader that
//! rebuilds reports from that text.
//!
//! ```text
//! > Report [advlog] 12.000000
//!         Address: 00:1A:7D:DA:71:13
//!           OUI 00-1A-7D
//!         Flags: 0x06
//!           LE General Discoverable Mode
//!           BR/EDR Not Supported
//! ```
//!
//! A line starting with `>` opens a report. Field lines are indented by
//! eight spaces and written `name: value`, optionally followed by an inline
//! `(info)`. Lines indented by ten spaces are further info lines of the
//! preceding field.

use std::collections::HashSet;
use std::io::BufRead;

use tracing::debug;

use advlog_types::{Device, Field, Report};

use crate::error::Result;

/// Tag written in report headers.
pub const REPORT_TAG: &str = "advlog";

const FIELD_INDENT: usize = 8;
const INFO_INDENT: usize = 10;

/// Render one report.
pub fn render_report(report: &Report) -> String {
    let mut out = format!("> Report [{REPORT_TAG}] {}.000000\n", report.timestamp);
    for field in &report.fields {
        push_field(&mut out, field);
    }
    out
}

/// Render one device with its observation count.
pub fn render_device(device: &Device) -> String {
    let mut out = format!("Nb Adv : {}\n", device.observation_count);
    for field in &device.fields {
        push_field(&mut out, field);
    }
    out
}

fn push_field(out: &mut String, field: &Field) {
    out.push_str(&" ".repeat(FIELD_INDENT));
    out.push_str(&field.name);
    out.push_str(": ");
    out.push_str(&field.value);
    out.push('\n');
    for line in &field.info {
        out.push_str(&" ".repeat(INFO_INDENT));
        out.push_str(line);
        out.push('\n');
    }
}

/// Rebuild reports from rendered text.
///
/// Fields named in `ignore_fields` are skipped along with their info lines.
/// Fields are appended in the order read, so duplicates are kept. A final
/// line without a newline is skipped.
pub fn read_reports<R: BufRead>(
    mut reader: R,
    ignore_fields: &HashSet<String>,
) -> Result<Vec<Report>> {
    let mut reports = Vec::new();
    let mut current: Option<Report> = None;
    // Whether info lines attach to the last field of `current`.
    let mut in_field = false;
    let mut buf = Vec::new();
    let mut line_no = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let Some(raw) = buf.strip_suffix(b"\n") else {
            debug!(line_no, "Skipping unterminated last line");
            continue;
        };
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);

        if line.starts_with('>') {
            if let Some(done) = current.take() {
                reports.push(done);
            }
            current = Some(Report::new(parse_timestamp(&line)));
            in_field = false;
            continue;
        }

        let Some(report) = current.as_mut() else {
            continue;
        };

        let body = line.trim_start_matches(' ');
        let indent = line.len() - body.len();

        match indent {
            FIELD_INDENT => {
                in_field = false;
                let Some(field) = parse_field_line(body) else {
                    debug!(line_no, "Malformed field line");
                    continue;
                };
                if ignore_fields.contains(&field.name) {
                    continue;
                }
                report.fields.append(field);
                in_field = true;
            }
            INFO_INDENT if in_field => {
                if let Some(field) = report.fields.last_mut() {
                    field.push_info(body);
                }
            }
            _ => in_field = false,
        }
    }

    if let Some(done) = current {
        reports.push(done);
    }
    Ok(reports)
}

/// Seconds after the last `]` of a header, up to the `.`.
fn parse_timestamp(line: &str) -> u64 {
    let tail = line.rsplit_once(']').map_or(line, |(_, tail)| tail);
    let seconds = tail.trim_start().split('.').next().unwrap_or_default();
    seconds.trim().parse().unwrap_or_else(|_| {
        debug!(header = line, "Header without a timestamp");
        0
    })
}

/// `name: value (info)`.
fn parse_field_line(body: &str) -> Option<Field> {
    let (name, rest) = body.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    let (value, info) = match rest.split_once('(') {
        Some((value, info)) => {
            let info = info.split_once(')').map_or(info, |(inner, _)| inner);
            (value, Some(info))
        }
        None => (rest, None),
    };

    let mut field = Field::new(name, value.trim());
    if let Some(info) = info.filter(|i| !i.is_empty()) {
        field.push_info(info);
    }
    Some(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str, ignore: &[&str]) -> Vec<Report> {
        let ignore = ignore.iter().map(|s| s.to_string()).collect();
        read_reports(Cursor::new(text.as_bytes()), &ignore).unwrap()
    }

    fn sample_report() -> Report {
        let mut report = Report::new(42);
        report.insert(Field::new("Address", "00:1A:7D:DA:71:13").with_info("OUI 00-1A-7D"));
        report.insert(
            Field::new("Flags", "0x06")
                .with_info("LE General Discoverable Mode")
                .with_info("BR/EDR Not Supported"),
        );
        report.insert(Field::new("Service Data (UUID 0xfe9f)", ""));
        report
    }

    #[test]
    fn test_render_report_layout() {
        let text = render_report(&sample_report());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "> Report [advlog] 42.000000");
        assert_eq!(lines[1], "        Address: 00:1A:7D:DA:71:13");
        assert_eq!(lines[2], "          OUI 00-1A-7D");
        assert_eq!(lines[3], "        Flags: 0x06");
        assert_eq!(lines.len(), 7);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_rendered_report_reads_back() {
        let report = sample_report();
        let back = read(&render_report(&report), &[]);
        assert_eq!(back, [report]);
    }

    #[test]
    fn test_render_device() {
        let mut device = Device::new("A");
        device.observation_count = 3;
        device.fields.append(Field::new("Address", "A"));
        assert_eq!(render_device(&device), "Nb Adv : 3\n        Address: A\n");
    }

    #[test]
    fn test_inline_info_is_split() {
        let reports = read(
            "> HCI Event: LE Meta Event (0x3e) plen 43  [hci0] 17.504328\n        Address type: Random (0x01)\n",
            &[],
        );
        assert_eq!(reports[0].timestamp, 17);
        let field = reports[0].field("Address type").unwrap();
        assert_eq!(field.value, "Random");
        assert_eq!(field.info, ["0x01"]);
    }

    #[test]
    fn test_preamble_is_skipped() {
        let reports = read(
            "Bluetooth monitor\n        Flags: 0x06\n> Report [advlog] 1.000000\n        Flags: 0x02\n",
            &[],
        );
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].fields.len(), 1);
        assert_eq!(reports[0].field("Flags").unwrap().value, "0x02");
    }

    #[test]
    fn test_ignored_field_drops_info_lines() {
        let reports = read(
            "> Report [advlog] 1.000000\n        Flags: 0x06\n          LE General Discoverable Mode\n        RSSI: -40 dBm\n          0xd8\n",
            &["RSSI"],
        );
        let fields: Vec<_> = reports[0].fields.iter().collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].info, ["LE General Discoverable Mode"]);
    }

    #[test]
    fn test_duplicates_are_appended() {
        let reports = read(
            "> Report [advlog] 1.000000\n        Flags: 0x06\n        Flags: 0x02\n",
            &[],
        );
        assert_eq!(reports[0].fields.get_all("Flags").count(), 2);
    }

    #[test]
    fn test_unterminated_last_line_is_skipped() {
        let reports = read("> Report [advlog] 1.000000\n        Flags: 0x06", &[]);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].fields.is_empty());
    }

    #[test]
    fn test_other_indentation_ends_info() {
        let reports = read(
            "> Report [advlog] 1.000000\n        Flags: 0x06\n    stray\n          orphan\n",
            &[],
        );
        assert!(reports[0].field("Flags").unwrap().info.is_empty());
    }

    #[test]
    fn test_multiple_reports_and_crlf() {
        let reports = read(
            "> Report [advlog] 1.000000\r\n        Flags: 0x06\r\n> Report [advlog] 2.000000\r\n        Flags: 0x02\r\n",
            &[],
        );
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].timestamp, 2);
        assert_eq!(reports[1].field("Flags").unwrap().value, "0x02");
    }

    #[test]
    fn test_header_without_timestamp() {
        let reports = read("> Report\n", &[]);
        assert_eq!(reports[0].timestamp, 0);
    }

    #[test]
    fn test_line_without_colon_is_malformed() {
        let reports = read("> Report [advlog] 1.000000\n        no colon here\n          info\n", &[]);
        assert!(reports[0].fields.is_empty());
    }
}
