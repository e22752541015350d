//! Class of Device (EIR type 0x0D).

use serde::{Deserialize, Serialize};

const SERVICE_CLASSES: [(u8, &str); 8] = [
    (0, "Positioning (Location identification)"),
    (1, "Networking (LAN, Ad hoc)"),
    (2, "Rendering (Printing, Speaker)"),
    (3, "Capturing (Scanner, Microphone)"),
    (4, "Object Transfer (v-Inbox, v-Folder)"),
    (5, "Audio (Speaker, Microphone, Headset)"),
    (6, "Telephony (Cordless telephony, Modem, Headset)"),
    (7, "Information (WEB-server, WAP-server)"),
];

const COMPUTER_MINOR: &[(u8, &str)] = &[
    (0x00, "Uncategorized, code for device not assigned"),
    (0x01, "Desktop workstation"),
    (0x02, "Server-class computer"),
    (0x03, "Laptop"),
    (0x04, "Handheld PC/PDA (clam shell)"),
    (0x05, "Palm sized PC/PDA"),
    (0x06, "Wearable computer (Watch sized)"),
    (0x07, "Tablet"),
];

const PHONE_MINOR: &[(u8, &str)] = &[
    (0x00, "Uncategorized, code for device not assigned"),
    (0x01, "Cellular"),
    (0x02, "Cordless"),
    (0x03, "Smart phone"),
    (0x04, "Wired modem or voice gateway"),
    (0x05, "Common ISDN Access"),
];

const AV_MINOR: &[(u8, &str)] = &[
    (0x00, "Uncategorized, code for device not assigned"),
    (0x01, "Wearable Headset Device"),
    (0x02, "Hands-free Device"),
    (0x04, "Microphone"),
    (0x05, "Loudspeaker"),
    (0x06, "Headphones"),
    (0x07, "Portable Audio"),
    (0x08, "Car audio"),
    (0x09, "Set-top box"),
    (0x0a, "HiFi Audio Device"),
    (0x0b, "VCR"),
    (0x0c, "Video Camera"),
    (0x0d, "Camcorder"),
    (0x0e, "Video Monitor"),
    (0x0f, "Video Display and Loudspeaker"),
    (0x10, "Video Conferencing"),
    (0x12, "Gaming/Toy"),
];

const WEARABLE_MINOR: &[(u8, &str)] = &[
    (0x01, "Wrist Watch"),
    (0x02, "Pager"),
    (0x03, "Jacket"),
    (0x04, "Helmet"),
    (0x05, "Glasses"),
];

/// Major class name and, where one exists, the minor-class table for it.
const MAJOR_CLASSES: &[(u8, &str, Option<&[(u8, &str)]>)] = &[
    (0x00, "Miscellaneous", None),
    (
        0x01,
        "Computer (desktop, notebook, PDA, organizers)",
        Some(COMPUTER_MINOR),
    ),
    (
        0x02,
        "Phone (cellular, cordless, payphone, modem)",
        Some(PHONE_MINOR),
    ),
    (0x03, "LAN /Network Access point", None),
    (
        0x04,
        "Audio/Video (headset, speaker, stereo, video, vcr)",
        Some(AV_MINOR),
    ),
    (0x05, "Peripheral (mouse, joystick, keyboards)", None),
    (0x06, "Imaging (printing, scanner, camera, display)", None),
    (0x07, "Wearable", Some(WEARABLE_MINOR)),
    (0x08, "Toy", None),
    (0x09, "Health", None),
    (0x1f, "Uncategorized, specific device code not specified", None),
];

/// A 3-byte Class of Device in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassOfDevice(pub [u8; 3]);

impl ClassOfDevice {
    /// Format type bits; only `0` is defined.
    pub fn format_type(&self) -> u8 {
        self.0[0] & 0x03
    }

    pub fn major(&self) -> u8 {
        self.0[1] & 0x1f
    }

    pub fn minor(&self) -> u8 {
        (self.0[0] & 0xfc) >> 2
    }

    pub fn limited_discoverable(&self) -> bool {
        self.0[1] & 0x20 != 0
    }

    /// Service class byte (bits 16..24 of the class).
    pub fn services(&self) -> u8 {
        self.0[2]
    }

    /// `0xSSMMmm`, most significant byte first.
    pub fn value(&self) -> String {
        format!("0x{:02x}{:02x}{:02x}", self.0[2], self.0[1], self.0[0])
    }

    /// Major class name, if assigned.
    pub fn major_name(&self) -> Option<&'static str> {
        MAJOR_CLASSES
            .iter()
            .find(|(val, _, _)| *val == self.major())
            .map(|(_, name, _)| *name)
    }

    /// Minor class name within the major class, if assigned.
    pub fn minor_name(&self) -> Option<&'static str> {
        let &(_, _, table) = MAJOR_CLASSES
            .iter()
            .find(|(val, _, _)| *val == self.major())?;
        table?
            .iter()
            .find(|(val, _)| *val == self.minor())
            .map(|(_, name)| *name)
    }

    /// Decoded detail lines.
    pub fn info_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if self.format_type() != 0 {
            lines.push(format!("Format type: 0x{:02x}", self.format_type()));
            lines.push("invalid format type".to_string());
            return lines;
        }

        match self.major_name() {
            Some(major) => {
                lines.push(format!("Major class: {major}"));
                match self.minor_name() {
                    Some(minor) => lines.push(format!("Minor class: {minor}")),
                    None => lines.push(format!("Minor class: 0x{:02x}", self.minor())),
                }
            }
            None => {
                lines.push(format!("Major class: 0x{:02x}", self.major()));
                lines.push(format!("Minor class: 0x{:02x}", self.minor()));
            }
        }

        if self.limited_discoverable() {
            lines.push("Limited Discoverable Mode".to_string());
        }

        if self.0[1] & 0xc0 != 0 {
            lines.push("invalid service class".to_string());
            return lines;
        }

        for (bit, name) in SERVICE_CLASSES {
            if self.services() & (1 << bit) != 0 {
                lines.push(name.to_string());
            }
        }

        lines
    }
}
