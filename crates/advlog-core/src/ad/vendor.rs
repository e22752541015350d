//! Manufacturer-specific data (EIR type 0xFF) sub-decoders.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use advlog_types::uuid::uuid128_from_le;

use crate::util::{hex_string, hexdump_lines, le16, printable_text};

/// Apple, Inc.
pub const APPLE: u16 = 76;
/// Apple's company id with its bytes swapped, seen from some firmware.
pub const APPLE_SWAPPED: u16 = 19456;

/// Longest identifier string kept from an Apple identifier record.
const MAX_IDENTIFIER_LEN: usize = 98;

/// Payload length of an iBeacon sub-record.
const IBEACON_LEN: usize = 0x15;

/// Manufacturer data after the 2-byte company id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManufacturerData {
    Apple(AppleData),
    /// Any other company; bytes are shown as hex.
    Raw(Vec<u8>),
}

impl ManufacturerData {
    pub fn decode(company_id: u16, data: &[u8]) -> Self {
        match company_id {
            APPLE | APPLE_SWAPPED => ManufacturerData::Apple(AppleData::decode(data)),
            _ => ManufacturerData::Raw(data.to_vec()),
        }
    }

    pub fn info_lines(&self) -> Vec<String> {
        match self {
            ManufacturerData::Apple(apple) => apple.info_lines(),
            ManufacturerData::Raw(data) => vec![format!("Data: {}", hex_string(data))],
        }
    }
}

/// One Apple sub-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppleRecord {
    /// Sub-type 0x01: a NUL-terminated identifier string.
    Identifier(String),
    /// Sub-type 0x02 with the 21-byte iBeacon layout.
    Beacon {
        uuid: Uuid,
        major: u16,
        minor: u16,
        tx_power: i8,
    },
    /// Any other sub-record, possibly empty.
    Data { kind: u8, data: Vec<u8> },
    /// Header whose declared length runs past the data.
    Truncated { kind: u8 },
}

impl AppleRecord {
    fn kind(&self) -> Option<u8> {
        match self {
            AppleRecord::Identifier(_) => None,
            AppleRecord::Beacon { .. } => Some(0x02),
            AppleRecord::Data { kind, .. } | AppleRecord::Truncated { kind } => Some(*kind),
        }
    }

    pub fn info_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(kind) = self.kind() {
            lines.push(format!("Type: {} ({kind})", apple_type_name(kind)));
        }
        match self {
            AppleRecord::Identifier(id) => lines.push(format!("Identifier: {id}")),
            AppleRecord::Beacon {
                uuid,
                major,
                minor,
                tx_power,
            } => {
                lines.push(format!("UUID: {uuid}"));
                lines.push(format!("Version: {major}.{minor}"));
                lines.push(format!("TX power: {tx_power} dB"));
            }
            AppleRecord::Data { data, .. } if !data.is_empty() => {
                lines.push(format!("Data: {}", hex_string(data)));
            }
            AppleRecord::Data { .. } | AppleRecord::Truncated { .. } => {}
        }
        lines
    }
}

/// Name of an Apple sub-record type.
pub fn apple_type_name(kind: u8) -> &'static str {
    match kind {
        0x02 => "iBeacon",
        0x05 => "AirDrop",
        0x09 => "Apple TV",
        _ => "Unknown",
    }
}

/// Decoded Apple manufacturer data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppleData {
    pub records: Vec<AppleRecord>,
    /// Bytes left over after a truncated sub-record.
    pub trailing: Vec<u8>,
}

impl AppleData {
    /// Decode the `(type, len, payload)` sequence.
    ///
    /// Type 0x00 is padding. A leading type 0x01 makes the whole payload an
    /// identifier string instead.
    pub fn decode(data: &[u8]) -> Self {
        let mut out = AppleData::default();

        if let Some((&0x01, rest)) = data.split_first() {
            let end = rest
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(rest.len())
                .min(MAX_IDENTIFIER_LEN);
            let id = printable_text(&rest[..end]);
            out.records.push(AppleRecord::Identifier(id));
            return out;
        }

        let mut rest = data;
        while let Some((&kind, tail)) = rest.split_first() {
            rest = tail;
            if kind == 0x00 {
                continue;
            }
            let Some((&len, tail)) = rest.split_first() else {
                break;
            };
            rest = tail;

            let len = usize::from(len);
            if len > rest.len() {
                out.records.push(AppleRecord::Truncated { kind });
                break;
            }
            let (body, tail) = rest.split_at(len);
            rest = tail;

            let record = if kind == 0x02 && len == IBEACON_LEN {
                decode_beacon(body)
            } else {
                AppleRecord::Data {
                    kind,
                    data: body.to_vec(),
                }
            };
            out.records.push(record);
        }

        out.trailing = rest.to_vec();
        out
    }

    pub fn info_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.records.iter().flat_map(AppleRecord::info_lines).collect();
        lines.extend(hexdump_lines(&self.trailing));
        lines
    }
}

fn decode_beacon(body: &[u8]) -> AppleRecord {
    let mut wire = [0u8; 16];
    wire.copy_from_slice(&body[..16]);
    AppleRecord::Beacon {
        uuid: uuid128_from_le(&wire),
        major: le16(&body[16..]).unwrap_or_default(),
        minor: le16(&body[18..]).unwrap_or_default(),
        tx_power: body[20] as i8,
    }
}
