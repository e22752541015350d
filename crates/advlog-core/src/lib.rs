//! Capture, decode and aggregate BLE advertising reports.
//!
//! This crate turns raw LE Advertising Report events into per-device
//! records. The pipeline has four stages, each usable on its own:
//!
//! - **Capture log**: [`LogWriter`] frames each raw event with a timestamp
//!   and length; [`LogReader`] reads the frames back in order.
//! - **Event parsing**: [`parse_advertising_event`] splits one event into
//!   its [`AdvertisingReport`]s.
//! - **AD decoding**: [`ad::decode_fields`] walks the length-prefixed AD
//!   records of a report and renders them as named [`Field`]s, and
//!   [`build_report`] wraps them with the report header fields.
//! - **Aggregation**: [`DeviceAggregator`] folds [`Report`]s sharing a key
//!   field into [`Device`]s under an ignore/merge policy.
//!
//! [`text`] renders reports and devices as indented text and reads that
//! text back. [`capture()`] drives an [`EventSource`] into a log.
//!
//! # Malformed input
//!
//! Over-the-air data is untrusted. Nothing past the frame layer returns an
//! error: truncated reports are dropped, short AD records are skipped, and
//! bytes the AD scan cannot consume come out as an `Unparsed data` field.
//!
//! # Quick Start
//!
//! ```no_run
//! use advlog_core::{AggregateOptions, DeviceAggregator, LogReader, NoLookup, ReportStream};
//!
//! fn main() -> advlog_core::Result<()> {
//!     let frames = LogReader::open("capture.log")?;
//!     let mut aggregator = DeviceAggregator::new(AggregateOptions::default());
//!     for report in ReportStream::new(frames, NoLookup) {
//!         aggregator.push(report?);
//!     }
//!     for device in aggregator.finish() {
//!         println!("{}: {} observations", device.key, device.observation_count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod ad;
pub mod aggregate;
pub mod capture;
pub mod error;
pub mod hci;
pub mod log;
pub mod lookup;
pub mod report;
pub mod text;
pub mod util;

// Re-export the value types so most users need only this crate
pub use advlog_types::types;
pub use advlog_types::{AddressType, BdAddr, Device, Field, FieldList, Report};

// Core exports
pub use ad::{AdRecord, AdScan, DecodeContext, decode_fields, decode_records};
pub use aggregate::{
    AggregateOptions, AggregateStats, DEFAULT_IGNORE_FIELDS, DEFAULT_KEY_FIELD,
    DEFAULT_MERGE_FIELDS, DeviceAggregator, aggregate,
};
pub use capture::{CaptureSummary, Clock, EventSource, MonotonicClock, capture};
pub use error::{Error, Result};
pub use hci::{AdvertisingEvent, AdvertisingReport, EventType, parse_advertising_event};
pub use log::{Frame, LogReader, LogWriter};
pub use lookup::{Lookup, NoLookup, TableLookup, VendorModel};
pub use report::{ReportStream, build_report, frame_to_reports};
pub use text::{read_reports, render_device, render_report};

// Re-export from advlog-types
pub use advlog_types::uuid as uuids;
