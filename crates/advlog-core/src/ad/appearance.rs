//! GAP Appearance names (EIR type 0x19).

/// `(value, generic, name)`, sorted by value. Generic entries name a
/// category and serve as the fallback for unlisted sub-types.
const APPEARANCES: &[(u16, bool, &str)] = &[
    (0, true, "Unknown"),
    (64, true, "Phone"),
    (128, true, "Computer"),
    (192, true, "Watch"),
    (193, false, "Sports Watch"),
    (256, true, "Clock"),
    (320, true, "Display"),
    (384, true, "Remote Control"),
    (448, true, "Eye-glasses"),
    (512, true, "Tag"),
    (576, true, "Keyring"),
    (640, true, "Media Player"),
    (704, true, "Barcode Scanner"),
    (768, true, "Thermometer"),
    (769, false, "Thermometer: Ear"),
    (832, true, "Heart Rate Sensor"),
    (833, false, "Heart Rate Belt"),
    (896, true, "Blood Pressure"),
    (897, false, "Blood Pressure: Arm"),
    (898, false, "Blood Pressure: Wrist"),
    (960, true, "Human Interface Device"),
    (961, false, "Keyboard"),
    (962, false, "Mouse"),
    (963, false, "Joystick"),
    (964, false, "Gamepad"),
    (965, false, "Digitizer Tablet"),
    (966, false, "Card Reader"),
    (967, false, "Digital Pen"),
    (968, false, "Barcode Scanner"),
    (1024, true, "Glucose Meter"),
    (1088, true, "Running Walking Sensor"),
    (1089, false, "Running Walking Sensor: In-Shoe"),
    (1090, false, "Running Walking Sensor: On-Shoe"),
    (1091, false, "Running Walking Sensor: On-Hip"),
    (1152, true, "Cycling"),
    (1153, false, "Cycling: Cycling Computer"),
    (1154, false, "Cycling: Speed Sensor"),
    (1155, false, "Cycling: Cadence Sensor"),
    (1156, false, "Cycling: Power Sensor"),
    (1157, false, "Cycling: Speed and Cadence Sensor"),
    (1216, true, "Undefined"),
    (3136, true, "Pulse Oximeter"),
    (3137, false, "Pulse Oximeter: Fingertip"),
    (3138, false, "Pulse Oximeter: Wrist Worn"),
    (3200, true, "Weight Scale"),
    (3264, true, "Undefined"),
    (5184, true, "Outdoor Sports Activity"),
    (5185, false, "Location Display Device"),
    (5186, false, "Location and Navigation Display Device"),
    (5187, false, "Location Pod"),
    (5188, false, "Location and Navigation Pod"),
    (5248, true, "Undefined"),
];

/// Name for an appearance value.
///
/// Exact matches win; otherwise the nearest generic category at or below
/// the value is used.
pub fn appearance_name(appearance: u16) -> &'static str {
    let mut generic = APPEARANCES[0].2;
    for &(value, is_generic, name) in APPEARANCES {
        if is_generic {
            if appearance < value {
                break;
            }
            generic = name;
        }
        if value == appearance {
            return name;
        }
    }
    generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matches() {
        assert_eq!(appearance_name(0), "Unknown");
        assert_eq!(appearance_name(193), "Sports Watch");
        assert_eq!(appearance_name(962), "Mouse");
        assert_eq!(appearance_name(5188), "Location and Navigation Pod");
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(appearance_name(194), "Watch");
        assert_eq!(appearance_name(1000), "Human Interface Device");
        assert_eq!(appearance_name(2000), "Undefined");
        assert_eq!(appearance_name(u16::MAX), "Undefined");
        assert_eq!(appearance_name(63), "Unknown");
    }

    #[test]
    fn test_table_is_sorted() {
        assert!(APPEARANCES.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
