//! Bluetooth UUIDs and assigned numbers.
//!
//! This module contains the Bluetooth base UUID, conversions between the
//! short and 128-bit forms, and names for the commonly advertised 16-bit
//! service UUIDs.

use uuid::{Uuid, uuid};

/// Bluetooth SIG base UUID; short UUIDs are offsets into its first group.
pub const BASE_UUID: Uuid = uuid!("00000000-0000-1000-8000-00805f9b34fb");

// --- GATT services ---

/// Generic Access Profile (GAP) service.
pub const GAP_SERVICE: u16 = 0x1800;

/// Generic Attribute Profile (GATT) service.
pub const GATT_SERVICE: u16 = 0x1801;

/// Device Information service.
pub const DEVICE_INFO_SERVICE: u16 = 0x180a;

/// Heart Rate service.
pub const HEART_RATE_SERVICE: u16 = 0x180d;

/// Battery service.
pub const BATTERY_SERVICE: u16 = 0x180f;

/// Eddystone beacon service.
pub const EDDYSTONE_SERVICE: u16 = 0xfeaa;

/// Exposure Notification service.
pub const EXPOSURE_NOTIFICATION_SERVICE: u16 = 0xfd6f;

const UUID16_NAMES: &[(u16, &str)] = &[
    (0x1800, "Generic Access Profile"),
    (0x1801, "Generic Attribute Profile"),
    (0x1802, "Immediate Alert"),
    (0x1803, "Link Loss"),
    (0x1804, "Tx Power"),
    (0x1805, "Current Time Service"),
    (0x1806, "Reference Time Update Service"),
    (0x1807, "Next DST Change Service"),
    (0x1808, "Glucose"),
    (0x1809, "Health Thermometer"),
    (0x180a, "Device Information"),
    (0x180d, "Heart Rate"),
    (0x180e, "Phone Alert Status Service"),
    (0x180f, "Battery Service"),
    (0x1810, "Blood Pressure"),
    (0x1811, "Alert Notification Service"),
    (0x1812, "Human Interface Device"),
    (0x1813, "Scan Parameters"),
    (0x1814, "Running Speed and Cadence"),
    (0x1815, "Automation IO"),
    (0x1816, "Cycling Speed and Cadence"),
    (0x1818, "Cycling Power"),
    (0x1819, "Location and Navigation"),
    (0x181a, "Environmental Sensing"),
    (0x181b, "Body Composition"),
    (0x181c, "User Data"),
    (0x181d, "Weight Scale"),
    (0x181e, "Bond Management"),
    (0x181f, "Continuous Glucose Monitoring"),
    (0x1820, "Internet Protocol Support"),
    (0x1821, "Indoor Positioning"),
    (0x1822, "Pulse Oximeter"),
    (0x1823, "HTTP Proxy"),
    (0x1824, "Transport Discovery"),
    (0x1825, "Object Transfer"),
    (0x1826, "Fitness Machine"),
    (0x1827, "Mesh Provisioning"),
    (0x1828, "Mesh Proxy"),
    (0xfd6f, "Exposure Notification Service"),
    (0xfe9f, "Google"),
    (0xfeaa, "Eddystone"),
    (0xfeed, "Tile, Inc."),
    (0xfef3, "Google"),
];

/// Name of a 16-bit UUID, or `"Unknown"`.
///
/// # Examples
///
/// ```
/// use advlog_types::uuid::uuid16_name;
///
/// assert_eq!(uuid16_name(0x180d), "Heart Rate");
/// assert_eq!(uuid16_name(0x0001), "Unknown");
/// ```
pub fn uuid16_name(uuid: u16) -> &'static str {
    UUID16_NAMES
        .binary_search_by_key(&uuid, |&(value, _)| value)
        .map(|index| UUID16_NAMES[index].1)
        .unwrap_or("Unknown")
}

/// Name of a 32-bit UUID; only values in the 16-bit range are known.
pub fn uuid32_name(uuid: u32) -> &'static str {
    u16::try_from(uuid).map(uuid16_name).unwrap_or("Unknown")
}

/// Expand a 16-bit UUID into its 128-bit form.
pub fn uuid16_to_uuid(short: u16) -> Uuid {
    uuid32_to_uuid(u32::from(short))
}

/// Expand a 32-bit UUID into its 128-bit form.
pub fn uuid32_to_uuid(short: u32) -> Uuid {
    let mut bytes = *BASE_UUID.as_bytes();
    bytes[..4].copy_from_slice(&short.to_be_bytes());
    Uuid::from_bytes(bytes)
}

/// Decode a 128-bit UUID transmitted as 16 little-endian bytes.
///
/// The whole blob is byte-reversed, which yields the canonical grouping.
///
/// # Examples
///
/// ```
/// use advlog_types::uuid::uuid128_from_le;
///
/// let wire = [
///     0xfb, 0x34, 0x9b, 0x5f, 0x80, 0x00, 0x00, 0x80,
///     0x00, 0x10, 0x00, 0x00, 0x0d, 0x18, 0x00, 0x00,
/// ];
/// assert_eq!(
///     uuid128_from_le(&wire).to_string(),
///     "0000180d-0000-1000-8000-00805f9b34fb"
/// );
/// ```
pub fn uuid128_from_le(wire: &[u8; 16]) -> Uuid {
    let mut bytes = *wire;
    bytes.reverse();
    Uuid::from_bytes(bytes)
}
