//! AD/EIR structure decoding.
//!
//! Advertising data is a sequence of `length | type | data` records, where
//! `length` counts the type byte plus the data. Decoding runs in two steps:
//!
//! 1. [`decode_records`] scans the TLV sequence into typed [`AdRecord`]s,
//!    keeping any unparseable remainder as [`AdScan::trailing`].
//! 2. [`AdRecord::to_field`] renders each record as a [`Field`], consulting
//!    a [`Lookup`] for company and vendor names.
//!
//! [`decode_fields`] does both. Decoding never fails: a record shorter than
//! its type requires is skipped, and a length running past the buffer ends
//! the scan.
//!
//! # Example
//!
//! ```
//! use advlog_core::ad::{decode_fields, DecodeContext};
//! use advlog_core::NoLookup;
//!
//! let data = [0x02, 0x01, 0x06, 0x05, 0x09, b'T', b'a', b'g', b'1'];
//! let fields = decode_fields(&data, DecodeContext::LE, &NoLookup);
//! assert_eq!(fields[0].name, "Flags");
//! assert_eq!(fields[0].value, "0x06");
//! assert_eq!(fields[1].name, "Name (complete)");
//! assert_eq!(fields[1].value, "Tag1");
//! ```

mod appearance;
mod class;
mod vendor;

pub use appearance::appearance_name;
pub use class::ClassOfDevice;
pub use vendor::{APPLE, APPLE_SWAPPED, AppleData, AppleRecord, ManufacturerData, apple_type_name};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use advlog_types::{
    AddressType, BdAddr, Field, RandomAddressKind, uuid::uuid16_name, uuid::uuid32_name,
    uuid::uuid128_from_le,
};

use crate::lookup::Lookup;
use crate::util::{hex_string, hexdump_lines, le16, le32, printable_text};

/// AD type codes.
pub mod tags {
    pub const FLAGS: u8 = 0x01;
    pub const UUID16_SOME: u8 = 0x02;
    pub const UUID16_ALL: u8 = 0x03;
    pub const UUID32_SOME: u8 = 0x04;
    pub const UUID32_ALL: u8 = 0x05;
    pub const UUID128_SOME: u8 = 0x06;
    pub const UUID128_ALL: u8 = 0x07;
    pub const NAME_SHORT: u8 = 0x08;
    pub const NAME_COMPLETE: u8 = 0x09;
    pub const TX_POWER: u8 = 0x0a;
    pub const CLASS_OF_DEV: u8 = 0x0d;
    pub const SSP_HASH_P192: u8 = 0x0e;
    pub const SSP_RANDOMIZER_P192: u8 = 0x0f;
    /// Device ID on BR/EDR, SMP TK on LE.
    pub const DEVICE_ID: u8 = 0x10;
    pub const SMP_OOB_FLAGS: u8 = 0x11;
    pub const SLAVE_CONN_INTERVAL: u8 = 0x12;
    pub const SERVICE_UUID16: u8 = 0x14;
    pub const SERVICE_UUID128: u8 = 0x15;
    pub const SERVICE_DATA: u8 = 0x16;
    pub const PUBLIC_ADDRESS: u8 = 0x17;
    pub const RANDOM_ADDRESS: u8 = 0x18;
    pub const GAP_APPEARANCE: u8 = 0x19;
    pub const SSP_HASH_P256: u8 = 0x1d;
    pub const SSP_RANDOMIZER_P256: u8 = 0x1e;
    pub const INFO_3D: u8 = 0x3d;
    pub const MANUFACTURER_DATA: u8 = 0xff;
}

/// Longest local name kept, in bytes.
pub const MAX_NAME_LEN: usize = 238;

/// Name of the field that carries bytes the scan could not consume.
pub const UNPARSED_FIELD: &str = "Unparsed data";

const FLAG_NAMES: [(u8, &str); 5] = [
    (0, "LE Limited Discoverable Mode"),
    (1, "LE General Discoverable Mode"),
    (2, "BR/EDR Not Supported"),
    (3, "Simultaneous LE and BR/EDR (Controller)"),
    (4, "Simultaneous LE and BR/EDR (Host)"),
];

const FEATURES_3D: [(u8, &str); 4] = [
    (0, "Association Notification"),
    (1, "Battery Level Reporting"),
    (2, "Send Battery Level Report on Start-up Synchronization"),
    (7, "Factory Test Mode"),
];

/// Transport the data was received on.
///
/// Only type 0x10 depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeContext {
    pub le: bool,
}

impl DecodeContext {
    pub const LE: Self = Self { le: true };
    pub const BREDR: Self = Self { le: false };
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self::LE
    }
}

/// Which service UUID list a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UuidListKind {
    Partial,
    Complete,
    /// Types 0x14/0x15, labelled without a qualifier.
    Solicited,
}

impl UuidListKind {
    fn label(&self, bits: u32) -> String {
        match self {
            UuidListKind::Partial => format!("{bits}-bit Service UUIDs (partial)"),
            UuidListKind::Complete => format!("{bits}-bit Service UUIDs (complete)"),
            UuidListKind::Solicited => format!("{bits}-bit Service UUIDs"),
        }
    }
}

/// Elliptic curve of an out-of-band pairing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Curve {
    P192,
    P256,
}

impl Curve {
    fn suffix(&self) -> &'static str {
        match self {
            Curve::P192 => "P-192",
            Curve::P256 => "P-256",
        }
    }
}

/// Device ID record (BR/EDR type 0x10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    pub source: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl DeviceId {
    pub fn source_name(&self) -> &'static str {
        match self.source {
            0x0001 => "Bluetooth SIG assigned",
            0x0002 => "USB Implementer's Forum assigned",
            _ => "Reserved",
        }
    }

    /// Key for vendor/model lookup, if the source is assigned.
    pub fn modalias(&self) -> Option<String> {
        let bus = match self.source {
            0x0001 => "bluetooth",
            0x0002 => "usb",
            _ => return None,
        };
        Some(format!(
            "{bus}:v{:04X}p{:04X}d{:04X}",
            self.vendor, self.product, self.version
        ))
    }

    /// `major.minor.sub` from the BCD-ish version word.
    pub fn version_string(&self) -> String {
        format!(
            "{}.{}.{}",
            (self.version & 0xff00) >> 8,
            (self.version & 0x00f0) >> 4,
            self.version & 0x000f
        )
    }
}

/// One decoded AD record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdRecord {
    Flags(u8),
    Uuid16List {
        kind: UuidListKind,
        uuids: Vec<u16>,
    },
    Uuid32List {
        kind: UuidListKind,
        uuids: Vec<u32>,
    },
    Uuid128List {
        kind: UuidListKind,
        uuids: Vec<Uuid>,
    },
    LocalName {
        complete: bool,
        name: String,
    },
    /// dBm.
    TxPower(i8),
    ClassOfDevice(ClassOfDevice),
    SspHash {
        curve: Curve,
        hash: [u8; 16],
    },
    SspRandomizer {
        curve: Curve,
        randomizer: [u8; 16],
    },
    SmpTk(Vec<u8>),
    DeviceId(DeviceId),
    SmpOobFlags(u8),
    SlaveConnInterval {
        min: u16,
        max: u16,
    },
    ServiceData {
        uuid: u16,
        data: Vec<u8>,
    },
    PublicAddress(BdAddr),
    RandomAddress(BdAddr),
    Appearance(u16),
    Info3d(Vec<u8>),
    Manufacturer {
        company_id: u16,
        data: ManufacturerData,
    },
    /// Any type without a decoder.
    Unknown {
        tag: u8,
        data: Vec<u8>,
    },
}

/// Result of scanning an AD buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdScan {
    pub records: Vec<AdRecord>,
    /// Bytes from the first record whose length ran past the buffer.
    pub trailing: Option<Vec<u8>>,
}

impl AdScan {
    /// Render every record, then the unparsed remainder if there is one.
    pub fn to_fields(&self, lookup: &dyn Lookup) -> Vec<Field> {
        let mut fields: Vec<Field> = self.records.iter().map(|r| r.to_field(lookup)).collect();
        if let Some(trailing) = &self.trailing {
            fields.push(unparsed_field(trailing));
        }
        fields
    }
}

/// Scan `data` into typed records.
pub fn decode_records(data: &[u8], ctx: DecodeContext) -> AdScan {
    let mut scan = AdScan::default();
    let mut offset = 0usize;

    while offset + 1 < data.len() {
        let field_len = usize::from(data[offset]);
        if field_len == 0 {
            break;
        }
        let end = offset + field_len + 1;
        if end > data.len() {
            debug!(
                offset,
                field_len,
                available = data.len() - offset - 1,
                "AD record length runs past the buffer"
            );
            break;
        }

        let tag = data[offset + 1];
        let body = &data[offset + 2..end];
        match decode_record(tag, body, ctx) {
            Some(record) => scan.records.push(record),
            None => debug!(tag, len = body.len(), "Skipping short AD record"),
        }
        offset = end;
    }

    if offset < data.len() && data[offset] != 0 {
        scan.trailing = Some(data[offset..].to_vec());
    }
    scan
}

/// Scan and render `data` in one step.
pub fn decode_fields(data: &[u8], ctx: DecodeContext, lookup: &dyn Lookup) -> Vec<Field> {
    decode_records(data, ctx).to_fields(lookup)
}

fn decode_record(tag: u8, body: &[u8], ctx: DecodeContext) -> Option<AdRecord> {
    use tags::*;

    let record = match tag {
        FLAGS => AdRecord::Flags(*body.first()?),
        UUID16_SOME | UUID16_ALL | SERVICE_UUID16 => AdRecord::Uuid16List {
            kind: list_kind(tag),
            uuids: min_len(body, 2)?
                .chunks_exact(2)
                .filter_map(le16)
                .collect(),
        },
        UUID32_SOME | UUID32_ALL => AdRecord::Uuid32List {
            kind: list_kind(tag),
            uuids: min_len(body, 4)?
                .chunks_exact(4)
                .filter_map(le32)
                .collect(),
        },
        UUID128_SOME | UUID128_ALL | SERVICE_UUID128 => AdRecord::Uuid128List {
            kind: list_kind(tag),
            uuids: min_len(body, 16)?
                .chunks_exact(16)
                .filter_map(array::<16>)
                .map(|wire| uuid128_from_le(&wire))
                .collect(),
        },
        NAME_SHORT | NAME_COMPLETE => AdRecord::LocalName {
            complete: tag == NAME_COMPLETE,
            name: local_name(body),
        },
        TX_POWER => AdRecord::TxPower(*body.first()? as i8),
        CLASS_OF_DEV => AdRecord::ClassOfDevice(ClassOfDevice(array(body)?)),
        SSP_HASH_P192 | SSP_HASH_P256 => AdRecord::SspHash {
            curve: curve(tag == SSP_HASH_P256),
            hash: array(body)?,
        },
        SSP_RANDOMIZER_P192 | SSP_RANDOMIZER_P256 => AdRecord::SspRandomizer {
            curve: curve(tag == SSP_RANDOMIZER_P256),
            randomizer: array(body)?,
        },
        DEVICE_ID if ctx.le => AdRecord::SmpTk(body.to_vec()),
        DEVICE_ID => {
            let body = min_len(body, 8)?;
            AdRecord::DeviceId(DeviceId {
                source: le16(body)?,
                vendor: le16(&body[2..])?,
                product: le16(&body[4..])?,
                version: le16(&body[6..])?,
            })
        }
        SMP_OOB_FLAGS => AdRecord::SmpOobFlags(*body.first()?),
        SLAVE_CONN_INTERVAL => AdRecord::SlaveConnInterval {
            min: le16(body)?,
            max: le16(body.get(2..)?)?,
        },
        SERVICE_DATA => AdRecord::ServiceData {
            uuid: le16(body)?,
            data: body[2..].to_vec(),
        },
        PUBLIC_ADDRESS => AdRecord::PublicAddress(BdAddr::from_le_slice(body)?),
        RANDOM_ADDRESS => AdRecord::RandomAddress(BdAddr::from_le_slice(body)?),
        GAP_APPEARANCE => AdRecord::Appearance(le16(body)?),
        INFO_3D => AdRecord::Info3d(body.to_vec()),
        MANUFACTURER_DATA => {
            let company_id = le16(body)?;
            AdRecord::Manufacturer {
                company_id,
                data: ManufacturerData::decode(company_id, &body[2..]),
            }
        }
        _ => AdRecord::Unknown {
            tag,
            data: body.to_vec(),
        },
    };
    Some(record)
}

fn list_kind(tag: u8) -> UuidListKind {
    match tag {
        tags::UUID16_SOME | tags::UUID32_SOME | tags::UUID128_SOME => UuidListKind::Partial,
        tags::UUID16_ALL | tags::UUID32_ALL | tags::UUID128_ALL => UuidListKind::Complete,
        _ => UuidListKind::Solicited,
    }
}

fn curve(p256: bool) -> Curve {
    if p256 { Curve::P256 } else { Curve::P192 }
}

fn min_len(body: &[u8], min: usize) -> Option<&[u8]> {
    (body.len() >= min).then_some(body)
}

/// First `N` bytes as an array.
fn array<const N: usize>(body: &[u8]) -> Option<[u8; N]> {
    body.get(..N)?.try_into().ok()
}

/// Name bytes up to the first NUL, bounded to [`MAX_NAME_LEN`], with
/// control characters masked.
fn local_name(body: &[u8]) -> String {
    let bounded = &body[..body.len().min(MAX_NAME_LEN)];
    let end = bounded.iter().position(|&b| b == 0).unwrap_or(bounded.len());
    printable_text(&bounded[..end])
}

impl AdRecord {
    /// Field name this record renders under.
    pub fn field_name(&self) -> String {
        match self {
            AdRecord::Flags(_) => "Flags".to_string(),
            AdRecord::Uuid16List { kind, .. } => kind.label(16),
            AdRecord::Uuid32List { kind, .. } => kind.label(32),
            AdRecord::Uuid128List { kind, .. } => kind.label(128),
            AdRecord::LocalName { complete: true, .. } => "Name (complete)".to_string(),
            AdRecord::LocalName { complete: false, .. } => "Name (short)".to_string(),
            AdRecord::TxPower(_) => "TX power".to_string(),
            AdRecord::ClassOfDevice(_) => "Class".to_string(),
            AdRecord::SspHash { curve, .. } => format!("Hash C from {}", curve.suffix()),
            AdRecord::SspRandomizer { curve, .. } => {
                format!("Randomizer R with {}", curve.suffix())
            }
            AdRecord::SmpTk(_) => "SMP TK".to_string(),
            AdRecord::DeviceId(_) => "Device ID".to_string(),
            AdRecord::SmpOobFlags(_) => "SMP OOB Flags".to_string(),
            AdRecord::SlaveConnInterval { .. } => "Slave Conn. Interval".to_string(),
            AdRecord::ServiceData { uuid, .. } => format!("Service Data (UUID 0x{uuid:04x})"),
            AdRecord::PublicAddress(_) => "Public Address".to_string(),
            AdRecord::RandomAddress(_) => "Random Address".to_string(),
            AdRecord::Appearance(_) => "Appearance".to_string(),
            AdRecord::Info3d(_) => "3D Information Data".to_string(),
            AdRecord::Manufacturer { .. } => "Company".to_string(),
            AdRecord::Unknown { tag, .. } => format!("Unknown EIR field 0x{tag:02x}"),
        }
    }

    /// Render as a field. Annotations go to info lines, so the value only
    /// contains `(` when a device name does.
    pub fn to_field(&self, lookup: &dyn Lookup) -> Field {
        let name = self.field_name();
        let (value, info) = match self {
            AdRecord::Flags(flags) => (format!("0x{flags:02x}"), flag_lines(*flags)),
            AdRecord::Uuid16List { uuids, .. } => (
                entries(uuids.len()),
                uuids
                    .iter()
                    .map(|u| format!("{} (0x{u:04x})", uuid16_name(*u)))
                    .collect(),
            ),
            AdRecord::Uuid32List { uuids, .. } => (
                entries(uuids.len()),
                uuids
                    .iter()
                    .map(|u| format!("{} (0x{u:08x})", uuid32_name(*u)))
                    .collect(),
            ),
            AdRecord::Uuid128List { uuids, .. } => (
                entries(uuids.len()),
                uuids.iter().map(Uuid::to_string).collect(),
            ),
            AdRecord::LocalName { name, .. } => (name.clone(), Vec::new()),
            AdRecord::TxPower(power) => (format!("{power} dBm"), Vec::new()),
            AdRecord::ClassOfDevice(class) => (class.value(), class.info_lines()),
            AdRecord::SspHash { hash: key, .. }
            | AdRecord::SspRandomizer {
                randomizer: key, ..
            } => (hex_string(key), Vec::new()),
            AdRecord::SmpTk(data) => (hex_string(data), Vec::new()),
            AdRecord::DeviceId(id) => (id.source_name().to_string(), device_id_lines(id, lookup)),
            AdRecord::SmpOobFlags(flags) => (format!("0x{flags:02x}"), Vec::new()),
            AdRecord::SlaveConnInterval { min, max } => {
                (format!("0x{min:04x} - 0x{max:04x}"), Vec::new())
            }
            AdRecord::ServiceData { data, .. } => (hex_string(data), Vec::new()),
            AdRecord::PublicAddress(addr) => (
                address_value(addr, AddressType::Public),
                address_info(addr, AddressType::Public, lookup, true),
            ),
            AdRecord::RandomAddress(addr) => (
                address_value(addr, AddressType::Random),
                address_info(addr, AddressType::Random, lookup, true),
            ),
            AdRecord::Appearance(appearance) => (
                appearance_name(*appearance).to_string(),
                vec![format!("0x{appearance:04x}")],
            ),
            AdRecord::Info3d(data) => {
                let info = match data.as_slice() {
                    [features, path_loss, ..] => info_3d_lines(*features, *path_loss),
                    _ => Vec::new(),
                };
                (hex_string(data), info)
            }
            AdRecord::Manufacturer { company_id, data } => {
                let mut info: Vec<String> = lookup.company_name(*company_id).into_iter().collect();
                info.extend(data.info_lines());
                (format!("0x{company_id:04x}"), info)
            }
            AdRecord::Unknown { data, .. } => (hex_string(data), Vec::new()),
        };
        Field { name, value, info }
    }
}

/// `"<n> bytes"` plus a hexdump of the unparsed remainder.
pub fn unparsed_field(data: &[u8]) -> Field {
    Field {
        name: UNPARSED_FIELD.to_string(),
        value: format!("{} bytes", data.len()),
        info: hexdump_lines(data),
    }
}

fn entries(count: usize) -> String {
    if count == 1 {
        "1 entry".to_string()
    } else {
        format!("{count} entries")
    }
}

fn flag_lines(flags: u8) -> Vec<String> {
    let mut mask = flags;
    let mut lines = Vec::new();
    for (bit, name) in FLAG_NAMES {
        if flags & (1 << bit) != 0 {
            lines.push(name.to_string());
            mask &= !(1 << bit);
        }
    }
    if mask != 0 {
        lines.push(format!("Unknown flags (0x{mask:02x})"));
    }
    lines
}

fn info_3d_lines(features: u8, path_loss: u8) -> Vec<String> {
    let mut mask = features;
    let mut lines = vec![format!("Features: 0x{features:02x}")];
    for (bit, name) in FEATURES_3D {
        if features & (1 << bit) != 0 {
            lines.push(name.to_string());
            mask &= !(1 << bit);
        }
    }
    if mask != 0 {
        lines.push(format!("Unknown features (0x{mask:02x})"));
    }
    lines.push(format!("Path Loss Threshold: {path_loss}"));
    lines
}

fn device_id_lines(id: &DeviceId, lookup: &dyn Lookup) -> Vec<String> {
    let model = id
        .modalias()
        .and_then(|alias| lookup.vendor_model(&alias))
        .unwrap_or_default();

    let vendor = if id.source == 0x0001 {
        lookup.company_name(id.vendor)
    } else {
        model.vendor
    };

    vec![
        format!("0x{:04x}", id.source),
        annotated("Vendor", vendor.as_deref(), id.vendor),
        annotated("Product", model.product.as_deref(), id.product),
        format!("Version: {} (0x{:04x})", id.version_string(), id.version),
    ]
}

fn annotated(label: &str, name: Option<&str>, value: u16) -> String {
    match name {
        Some(name) => format!("{label}: {name} (0x{value:04x})"),
        None => format!("{label}: 0x{value:04x}"),
    }
}

/// Display form of an address; reserved types use `-` separators.
pub fn address_value(address: &BdAddr, address_type: AddressType) -> String {
    match address_type {
        AddressType::Reserved(_) => address.to_dashed_string(),
        _ => address.to_string(),
    }
}

/// Annotation lines for an address.
///
/// Public addresses get the OUI company (or the bare OUI), random ones
/// their sub-kind. With `resolve`, a resolvable private address is looked
/// up and its identity appended.
pub fn address_info(
    address: &BdAddr,
    address_type: AddressType,
    lookup: &dyn Lookup,
    resolve: bool,
) -> Vec<String> {
    if address_type.is_public() {
        return vec![
            lookup
                .oui_company(address)
                .unwrap_or_else(|| address.oui_label()),
        ];
    }
    if !address_type.is_random() {
        return Vec::new();
    }

    let kind = address.random_kind();
    let mut lines = vec![kind.to_string()];
    if resolve && kind == RandomAddressKind::Resolvable {
        if let Some((identity, identity_type)) = lookup.resolve_identity(address) {
            let label = match identity_type {
                AddressType::Public | AddressType::Random => identity_type.to_string(),
                _ => "Reserved".to_string(),
            };
            lines.push(format!(
                "Identity type: {label} (0x{:02x})",
                identity_type.as_u8()
            ));
            let annotation = address_info(&identity, identity_type, lookup, false).join(", ");
            let value = address_value(&identity, identity_type);
            if annotation.is_empty() {
                lines.push(format!("Identity: {value}"));
            } else {
                lines.push(format!("Identity: {value} ({annotation})"));
            }
        }
    }
    lines
}


/// Property-based tests for the AD scan.
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::lookup::NoLookup;
    use proptest::prelude::*;

    proptest! {
        /// Decoding arbitrary bytes never panics.
        #[test]
        fn decode_never_panics(data: Vec<u8>, le: bool) {
            let _ = decode_fields(&data, DecodeContext { le }, &NoLookup);
        }

        /// Decoding is a pure function of its input.
        #[test]
        fn decode_is_deterministic(data: Vec<u8>) {
            let first = decode_records(&data, DecodeContext::LE);
            let second = decode_records(&data, DecodeContext::LE);
            prop_assert_eq!(first, second);
        }

        /// A record that runs past the buffer yields exactly the records
        /// before it plus the unconsumed bytes.
        #[test]
        fn overlong_record_keeps_prefix(
            name in proptest::collection::vec(b'a'..=b'z', 1..20),
            claimed in 9u8..=255,
            tail in proptest::collection::vec(any::<u8>(), 0..8),
        ) {
            let mut data = vec![0x02, 0x01, 0x06];
            data.push(name.len() as u8 + 1);
            data.push(0x09);
            data.extend_from_slice(&name);
            let cut = data.len();
            data.push(claimed);
            data.extend_from_slice(&tail);

            let scan = decode_records(&data, DecodeContext::LE);
            prop_assert_eq!(scan.records.len(), 2);
            prop_assert_eq!(scan.trailing, Some(data[cut..].to_vec()));
        }

        /// Apart from local names, which carry device-chosen text, no
        /// rendered value contains `(`.
        #[test]
        fn rendered_values_have_no_parenthesis(data: Vec<u8>) {
            let scan = decode_records(&data, DecodeContext::BREDR);
            for record in &scan.records {
                if matches!(record, AdRecord::LocalName { .. }) {
                    continue;
                }
                prop_assert!(!record.to_field(&NoLookup).value.contains('('));
            }
        }
    }
}
