//! HCI LE Advertising Report parsing.
//!
//! A captured frame payload holds one LE Meta event with the HCI packet
//! type byte and the 2-byte event header already stripped:
//!
//! - byte 0: sub-event code (`0x02` for LE Advertising Report)
//! - byte 1: number of reports
//! - then, per report: event type (1), address type (1), address (6, LE),
//!   data length (1), AD data (length), RSSI (1, signed)
//!
//! Parsing never fails. A report whose declared length runs past the end of
//! the payload is dropped along with anything after it, and the reports
//! decoded before it are returned.

use core::fmt;

use bytes::Buf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use advlog_types::{AddressType, BdAddr, ParseError};

use crate::error::Result;

/// LE Meta sub-event code for advertising reports.
pub const LE_ADVERTISING_REPORT: u8 = 0x02;

/// Fixed bytes per report besides the AD data (type, addr type, addr, len, rssi).
const REPORT_OVERHEAD: usize = 1 + 1 + 6 + 1 + 1;

/// Advertising PDU type of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Connectable undirected.
    AdvInd,
    /// Connectable directed.
    AdvDirectInd,
    /// Scannable undirected.
    AdvScanInd,
    /// Non connectable undirected.
    AdvNonconnInd,
    /// Scan response.
    ScanRsp,
    Reserved(u8),
}

impl EventType {
    pub fn as_u8(&self) -> u8 {
        match self {
            EventType::AdvInd => 0x00,
            EventType::AdvDirectInd => 0x01,
            EventType::AdvScanInd => 0x02,
            EventType::AdvNonconnInd => 0x03,
            EventType::ScanRsp => 0x04,
            EventType::Reserved(v) => *v,
        }
    }
}

impl From<u8> for EventType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => EventType::AdvInd,
            0x01 => EventType::AdvDirectInd,
            0x02 => EventType::AdvScanInd,
            0x03 => EventType::AdvNonconnInd,
            0x04 => EventType::ScanRsp,
            other => EventType::Reserved(other),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventType::AdvInd => "Connectable undirected - ADV_IND",
            EventType::AdvDirectInd => "Connectable directed - ADV_DIRECT_IND",
            EventType::AdvScanInd => "Scannable undirected - ADV_SCAN_IND",
            EventType::AdvNonconnInd => "Non connectable undirected - ADV_NONCONN_IND",
            EventType::ScanRsp => "Scan response - SCAN_RSP",
            EventType::Reserved(_) => "Reserved",
        };
        f.write_str(label)
    }
}

/// One advertising report from an LE Advertising Report event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisingReport {
    pub event_type: EventType,
    pub address_type: AddressType,
    pub address: BdAddr,
    /// Raw AD structure bytes.
    pub ad_data: Vec<u8>,
    /// Signal strength in dBm; 127 means unavailable.
    pub rssi: i8,
}

impl AdvertisingReport {
    /// Whether the RSSI byte carries a real measurement.
    pub fn rssi_valid(&self) -> bool {
        self.rssi as u8 != 0x99 && self.rssi != 127
    }
}

/// Reports decoded from one event, with the count the controller declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvertisingEvent {
    /// Number of reports the event claimed to carry.
    pub num_reports: u8,
    /// Reports that were fully contained in the payload.
    pub reports: Vec<AdvertisingReport>,
}

impl AdvertisingEvent {
    /// True when some declared reports were missing or truncated.
    pub fn is_truncated(&self) -> bool {
        self.reports.len() < usize::from(self.num_reports)
    }
}

/// Parse a captured LE Meta event payload into its advertising reports.
///
/// Other sub-events produce an empty list.
pub fn parse_advertising_event(payload: &[u8]) -> Vec<AdvertisingReport> {
    parse_event(payload).reports
}

/// Like [`parse_advertising_event`] but keeps the declared report count.
pub fn parse_event(payload: &[u8]) -> AdvertisingEvent {
    match payload.split_first() {
        Some((&LE_ADVERTISING_REPORT, body)) => parse_reports_body(body),
        Some((&subevent, _)) => {
            debug!(subevent, "Skipping non-advertising LE Meta sub-event");
            AdvertisingEvent::default()
        }
        None => AdvertisingEvent::default(),
    }
}

/// Parse an event body that starts at the report-count byte.
pub fn parse_advertising_reports(body: &[u8]) -> Vec<AdvertisingReport> {
    parse_reports_body(body).reports
}

fn parse_reports_body(body: &[u8]) -> AdvertisingEvent {
    let mut buf = body;
    if !buf.has_remaining() {
        return AdvertisingEvent::default();
    }
    let num_reports = buf.get_u8();
    let mut reports = Vec::with_capacity(usize::from(num_reports));

    for index in 0..num_reports {
        match parse_one(&mut buf) {
            Some(report) => reports.push(report),
            None => {
                debug!(
                    index,
                    num_reports,
                    remaining = buf.remaining(),
                    "Advertising report truncated, dropping the rest of the event"
                );
                break;
            }
        }
    }

    AdvertisingEvent {
        num_reports,
        reports,
    }
}

fn parse_one(buf: &mut &[u8]) -> Option<AdvertisingReport> {
    if buf.remaining() < REPORT_OVERHEAD {
        return None;
    }
    let data_len = usize::from(buf[8]);
    if buf.remaining() < REPORT_OVERHEAD + data_len {
        return None;
    }

    let event_type = EventType::from(buf.get_u8());
    let address_type = AddressType::from(buf.get_u8());
    let address = BdAddr::from_le_slice(buf.chunk())?;
    buf.advance(6);
    buf.advance(1);
    let ad_data = buf.copy_to_bytes(data_len).to_vec();
    let rssi = buf.get_i8();

    Some(AdvertisingReport {
        event_type,
        address_type,
        address,
        ad_data,
        rssi,
    })
}

/// Encode reports back into an LE Meta payload; used to build test fixtures
/// and synthetic logs.
///
/// The report count and each AD data length are single bytes on the wire,
/// so more than 255 of either is rejected with [`ParseError::InvalidData`].
pub fn encode_advertising_event(reports: &[AdvertisingReport]) -> Result<Vec<u8>> {
    let count = u8::try_from(reports.len()).map_err(|_| {
        ParseError::InvalidData(format!(
            "{} reports in one event (maximum 255)",
            reports.len()
        ))
    })?;

    let mut out = vec![LE_ADVERTISING_REPORT, count];
    for report in reports {
        let len = u8::try_from(report.ad_data.len()).map_err(|_| {
            ParseError::InvalidData(format!(
                "{} bytes of AD data (maximum 255)",
                report.ad_data.len()
            ))
        })?;
        out.push(report.event_type.as_u8());
        out.push(report.address_type.as_u8());
        out.extend_from_slice(report.address.as_le_bytes());
        out.push(len);
        out.extend_from_slice(&report.ad_data);
        out.push(report.rssi as u8);
    }
    Ok(out)
}


/// Property-based tests for advertising report parsing.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing random payloads never panics.
        #[test]
        fn parse_event_never_panics(data: Vec<u8>) {
            let _ = parse_advertising_event(&data);
        }

        /// Reports never exceed the declared count.
        #[test]
        fn report_count_bounded(data in proptest::collection::vec(any::<u8>(), 2..300)) {
            let mut payload = data;
            payload[0] = LE_ADVERTISING_REPORT;
            let event = parse_event(&payload);
            prop_assert!(event.reports.len() <= usize::from(event.num_reports));
        }
    }
}
