//! Building [`Report`]s from captured frames.
//!
//! Each advertising report becomes one [`Report`] with the header fields
//! first, the decoded AD fields next and the signal strength last:
//!
//! `Num reports`, `Event type`, `Address type`, `Address`, `Data length`,
//! AD fields..., `RSSI`.

use std::collections::VecDeque;

use tracing::debug;

use advlog_types::{Field, Report};

use crate::ad::{DecodeContext, address_info, address_value, decode_fields};
use crate::error::Result;
use crate::hci::{AdvertisingReport, parse_event};
use crate::log::Frame;
use crate::lookup::Lookup;

/// Build the report for one advertising report of an event.
pub fn build_report(
    timestamp: u64,
    adv: &AdvertisingReport,
    num_reports: u8,
    lookup: &dyn Lookup,
) -> Report {
    let mut report = Report::new(timestamp);

    report.insert(Field::new("Num reports", num_reports.to_string()));
    report.insert(
        Field::new("Event type", adv.event_type.to_string())
            .with_info(format!("0x{:02x}", adv.event_type.as_u8())),
    );
    report.insert(
        Field::new("Address type", adv.address_type.to_string())
            .with_info(format!("0x{:02x}", adv.address_type.as_u8())),
    );

    let mut address = Field::new("Address", address_value(&adv.address, adv.address_type));
    address.info = address_info(&adv.address, adv.address_type, lookup, true);
    report.insert(address);

    report.insert(Field::new("Data length", adv.ad_data.len().to_string()));

    for field in decode_fields(&adv.ad_data, DecodeContext::LE, lookup) {
        report.insert(field);
    }

    let rssi = if adv.rssi_valid() {
        format!("{} dBm", adv.rssi)
    } else {
        "invalid".to_string()
    };
    report.insert(Field::new("RSSI", rssi).with_info(format!("0x{:02x}", adv.rssi as u8)));

    report
}

/// Parse one frame and build a report for every advertising report in it.
pub fn frame_to_reports(frame: &Frame, lookup: &dyn Lookup) -> Vec<Report> {
    let event = parse_event(&frame.payload);
    if event.is_truncated() {
        debug!(
            timestamp = frame.timestamp,
            declared = event.num_reports,
            decoded = event.reports.len(),
            "Frame holds fewer reports than declared"
        );
    }
    event
        .reports
        .iter()
        .map(|adv| build_report(frame.timestamp, adv, event.num_reports, lookup))
        .collect()
}

/// Adapts an iterator of frames into an iterator of reports.
///
/// The first error from the frame source is passed through once, after
/// which the stream ends.
pub struct ReportStream<I, L> {
    frames: I,
    lookup: L,
    pending: VecDeque<Report>,
    failed: bool,
}

impl<I, L> ReportStream<I, L>
where
    I: Iterator<Item = Result<Frame>>,
    L: Lookup,
{
    pub fn new(frames: I, lookup: L) -> Self {
        Self {
            frames,
            lookup,
            pending: VecDeque::new(),
            failed: false,
        }
    }
}

impl<I, L> Iterator for ReportStream<I, L>
where
    I: Iterator<Item = Result<Frame>>,
    L: Lookup,
{
    type Item = Result<Report>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(report) = self.pending.pop_front() {
                return Some(Ok(report));
            }
            if self.failed {
                return None;
            }
            match self.frames.next()? {
                Ok(frame) => self.pending.extend(frame_to_reports(&frame, &self.lookup)),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hci::{EventType, encode_advertising_event};
    use crate::lookup::{NoLookup, TableLookup};
    use advlog_types::AddressType;

    fn adv(addr: &str, ad: &[u8], rssi: i8) -> AdvertisingReport {
        AdvertisingReport {
            event_type: EventType::AdvInd,
            address_type: AddressType::Public,
            address: addr.parse().unwrap(),
            ad_data: ad.to_vec(),
            rssi,
        }
    }

    fn names(report: &Report) -> Vec<&str> {
        report.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_field_order() {
        let report = build_report(
            7,
            &adv("00:1A:7D:DA:71:13", &[0x02, 0x01, 0x06, 0x02, 0x0a, 0x08], -60),
            1,
            &NoLookup,
        );
        assert_eq!(report.timestamp, 7);
        assert_eq!(
            names(&report),
            [
                "Num reports",
                "Event type",
                "Address type",
                "Address",
                "Data length",
                "Flags",
                "TX power",
                "RSSI",
            ]
        );
        let address = report.field("Address").unwrap();
        assert_eq!(address.value, "00:1A:7D:DA:71:13");
        assert_eq!(address.info, ["OUI 00-1A-7D"]);
        assert_eq!(report.field("Data length").unwrap().value, "6");
        let rssi = report.field("RSSI").unwrap();
        assert_eq!(rssi.value, "-60 dBm");
        assert_eq!(rssi.info, ["0xc4"]);
    }

    #[test]
    fn test_event_and_address_type_annotations() {
        let mut r = adv("C0:00:00:00:00:01", &[], 127);
        r.event_type = EventType::ScanRsp;
        r.address_type = AddressType::Random;
        let report = build_report(0, &r, 1, &NoLookup);

        let event = report.field("Event type").unwrap();
        assert_eq!(event.value, "Scan response - SCAN_RSP");
        assert_eq!(event.info, ["0x04"]);
        assert_eq!(report.field("Address type").unwrap().value, "Random");
        assert_eq!(report.field("Address").unwrap().info, ["Static"]);
        assert_eq!(report.field("RSSI").unwrap().value, "invalid");
    }

    #[test]
    fn test_company_name_from_lookup() {
        let lookup = TableLookup::new().with_oui("00-1A-7D", "cyber-blue(HK)Ltd");
        let report = build_report(0, &adv("00:1A:7D:DA:71:13", &[], -1), 1, &lookup);
        assert_eq!(report.field("Address").unwrap().info, ["cyber-blue(HK)Ltd"]);
    }

    #[test]
    fn test_duplicate_ad_record_replaces_earlier() {
        let report = build_report(
            0,
            &adv("00:00:00:00:00:01", &[0x02, 0x01, 0x01, 0x02, 0x01, 0x02], -1),
            1,
            &NoLookup,
        );
        let flags: Vec<_> = report.fields.get_all("Flags").collect();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].value, "0x02");
    }

    #[test]
    fn test_frame_with_two_reports() {
        let payload = encode_advertising_event(&[
            adv("00:00:00:00:00:01", &[0x02, 0x01, 0x06], -40),
            adv("00:00:00:00:00:02", &[], -50),
        ]).unwrap();
        let reports = frame_to_reports(&Frame::new(3, payload), &NoLookup);
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.timestamp == 3));
        assert_eq!(reports[0].field("Num reports").unwrap().value, "2");
        assert_eq!(reports[1].field("Address").unwrap().value, "00:00:00:00:00:02");
    }

    #[test]
    fn test_report_stream_stops_after_error() {
        let ok = Frame::new(1, encode_advertising_event(&[adv("00:00:00:00:00:01", &[], -1)]).unwrap());
        let frames = vec![
            Ok(ok.clone()),
            Err(Error::CorruptFrame {
                offset: 0,
                expected: 4,
                actual: 0,
            }),
            Ok(ok),
        ];
        let results: Vec<_> = ReportStream::new(frames.into_iter(), NoLookup).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::CorruptFrame { .. })));
    }

    #[test]
    fn test_report_stream_skips_non_advertising_frames() {
        let frames = vec![
            Ok::<_, Error>(Frame::new(1, vec![0x01, 0x00])),
            Ok(Frame::new(
                2,
                encode_advertising_event(&[adv("00:00:00:00:00:09", &[], -1)]).unwrap(),
            )),
        ];
        let reports: Vec<Report> = ReportStream::new(frames.into_iter(), NoLookup)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].timestamp, 2);
    }
}
