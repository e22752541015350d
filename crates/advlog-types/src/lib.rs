//! Shared types for decoded BLE advertisements.
//!
//! This crate provides the value types produced by the advlog decoding
//! pipeline and consumed by the device aggregator.
//!
//! # Features
//!
//! - [`Field`], [`Report`] and [`Device`] records
//! - [`FieldList`], an insertion-ordered container with upsert and append
//! - Bluetooth address types ([`BdAddr`], [`AddressType`])
//! - Bluetooth UUID helpers and assigned-number names
//! - Error types for value parsing
//!
//! # Example
//!
//! ```
//! use advlog_types::{Field, Report};
//!
//! let mut report = Report::new(12);
//! report.insert(Field::new("Address", "AA:BB:CC:DD:EE:FF"));
//! report.insert(Field::new("Flags", "0x06").with_info("LE General Discoverable Mode"));
//!
//! assert_eq!(report.field("Flags").unwrap().info.len(), 1);
//! ```

pub mod address;
pub mod error;
pub mod types;
pub mod uuid;

pub use address::{AddressType, BdAddr, RandomAddressKind};
pub use error::{ParseError, ParseResult};
pub use types::{Device, Field, FieldList, Report};
pub use uuid as uuids;
