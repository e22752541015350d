//! Bluetooth device addresses and address types.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A 6-byte Bluetooth device address.
///
/// Bytes are stored in wire order (least significant byte first), exactly as
/// they appear in an HCI event. [`Display`](fmt::Display) renders the usual
/// most-significant-first `AA:BB:CC:DD:EE:FF` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BdAddr(pub [u8; 6]);

impl BdAddr {
    /// Build an address from wire-order bytes.
    pub const fn from_le_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice holding at least 6 wire-order bytes.
    ///
    /// Returns `None` when the slice is too short.
    pub fn from_le_slice(data: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = data.get(..6)?.try_into().ok()?;
        Some(Self(bytes))
    }

    /// The wire-order bytes.
    pub const fn as_le_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// The organizationally unique identifier, most significant byte first.
    pub fn oui(&self) -> [u8; 3] {
        [self.0[5], self.0[4], self.0[3]]
    }

    /// `OUI AA-BB-CC` annotation used when no company name is known.
    pub fn oui_label(&self) -> String {
        let [a, b, c] = self.oui();
        format!("OUI {a:02X}-{b:02X}-{c:02X}")
    }

    /// Sub-kind of a random address, taken from the two top bits.
    pub fn random_kind(&self) -> RandomAddressKind {
        match (self.0[5] & 0xc0) >> 6 {
            0x00 => RandomAddressKind::NonResolvable,
            0x01 => RandomAddressKind::Resolvable,
            0x03 => RandomAddressKind::Static,
            _ => RandomAddressKind::Reserved,
        }
    }

    /// Render with `-` separators, used for reserved address types.
    pub fn to_dashed_string(&self) -> String {
        let b = &self.0;
        format!(
            "{:02X}-{:02X}-{:02X}-{:02X}-{:02X}-{:02X}",
            b[5], b[4], b[3], b[2], b[1], b[0]
        )
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[5], b[4], b[3], b[2], b[1], b[0]
        )
    }
}

impl FromStr for BdAddr {
    type Err = ParseError;

    /// Parse the display form `AA:BB:CC:DD:EE:FF` back into wire order.
    ///
    /// # Examples
    ///
    /// ```
    /// use advlog_types::BdAddr;
    ///
    /// let addr: BdAddr = "AA:BB:CC:DD:EE:FF".parse().unwrap();
    /// assert_eq!(addr.as_le_bytes(), &[0xFF, 0xEE, 0xDD, 0xCC, 0xBB, 0xAA]);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(ParseError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(ParseError::InvalidAddress(s.to_string()));
            }
            bytes[5 - i] = u8::from_str_radix(part, 16)
                .map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

/// Sub-kind of a random device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RandomAddressKind {
    NonResolvable,
    Resolvable,
    Static,
    Reserved,
}

impl fmt::Display for RandomAddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomAddressKind::NonResolvable => write!(f, "Non-Resolvable"),
            RandomAddressKind::Resolvable => write!(f, "Resolvable"),
            RandomAddressKind::Static => write!(f, "Static"),
            RandomAddressKind::Reserved => write!(f, "Reserved"),
        }
    }
}

/// Peer address type carried in an advertising report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AddressType {
    Public,
    Random,
    ResolvedPublic,
    ResolvedRandom,
    Reserved(u8),
}

impl AddressType {
    /// The raw HCI value.
    pub fn as_u8(&self) -> u8 {
        match self {
            AddressType::Public => 0x00,
            AddressType::Random => 0x01,
            AddressType::ResolvedPublic => 0x02,
            AddressType::ResolvedRandom => 0x03,
            AddressType::Reserved(v) => *v,
        }
    }

    /// True for public and resolved-public identities.
    pub fn is_public(&self) -> bool {
        matches!(self, AddressType::Public | AddressType::ResolvedPublic)
    }

    /// True for random and resolved-random identities.
    pub fn is_random(&self) -> bool {
        matches!(self, AddressType::Random | AddressType::ResolvedRandom)
    }
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => AddressType::Public,
            0x01 => AddressType::Random,
            0x02 => AddressType::ResolvedPublic,
            0x03 => AddressType::ResolvedRandom,
            other => AddressType::Reserved(other),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::Public => write!(f, "Public"),
            AddressType::Random => write!(f, "Random"),
            AddressType::ResolvedPublic => write!(f, "Resolved Public"),
            AddressType::ResolvedRandom => write!(f, "Resolved Random"),
            AddressType::Reserved(_) => write!(f, "Reserved"),
        }
    }
}
