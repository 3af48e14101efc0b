//! Class-of-device decoding
//!
//! Pure lookup over the Bluetooth SIG class-of-device bitfield (assigned
//! numbers, "Baseband"): major service classes in bits 13..=23, major device
//! class in bits 8..=12. Minor classes are ignored; the registry only wants
//! coarse categories.

/// Major service class bits and their category names
const SERVICE_CLASSES: [(u32, &str); 8] = [
    (16, "positioning"),
    (17, "networking"),
    (18, "rendering"),
    (19, "capturing"),
    (20, "object-transfer"),
    (21, "audio"),
    (22, "telephony"),
    (23, "information"),
];

/// Decode a raw class-of-device value into human-readable categories
///
/// Unknown or uncategorized values decode to an empty list, never an error.
pub fn decode(cod: u32) -> Vec<String> {
    let mut classes = Vec::new();

    for (bit, name) in SERVICE_CLASSES {
        if cod & (1 << bit) != 0 {
            classes.push(name.to_string());
        }
    }

    if let Some(major) = major_device_class(cod) {
        classes.push(major.to_string());
    }

    classes
}

/// Decode the hex string form found in raw advertisement payloads
/// (advertisement data type 0x0D carries the class as hex octets).
pub fn decode_hex(value: &str) -> Vec<String> {
    match u32::from_str_radix(value.trim(), 16) {
        Ok(cod) => decode(cod),
        Err(_) => Vec::new(),
    }
}

fn major_device_class(cod: u32) -> Option<&'static str> {
    match (cod >> 8) & 0x1f {
        1 => Some("computer"),
        2 => Some("phone"),
        3 => Some("network"),
        4 => Some("audio-video"),
        5 => Some("peripheral"),
        6 => Some("imaging"),
        7 => Some("wearable"),
        8 => Some("toy"),
        9 => Some("health"),
        // 0 is "miscellaneous" and 31 "uncategorized"; neither tells the
        // registry anything useful
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_phone() {
        // Major device class 2 (phone), minor smartphone
        let classes = decode(0x00020c);
        assert_eq!(classes, vec!["phone".to_string()]);
    }

    #[test]
    fn test_decode_computer() {
        let classes = decode(0x000104);
        assert_eq!(classes, vec!["computer".to_string()]);
    }

    #[test]
    fn test_decode_audio_headset() {
        // Audio service bit (21) + audio-video major class (4)
        let classes = decode(0x200404);
        assert_eq!(
            classes,
            vec!["audio".to_string(), "audio-video".to_string()]
        );
    }

    #[test]
    fn test_decode_multiple_service_bits() {
        // Networking (17) + object transfer (20) + computer major
        let classes = decode((1 << 17) | (1 << 20) | (1 << 8));
        assert_eq!(
            classes,
            vec![
                "networking".to_string(),
                "object-transfer".to_string(),
                "computer".to_string()
            ]
        );
    }

    #[test]
    fn test_decode_uncategorized_is_empty() {
        assert!(decode(0).is_empty());
        assert!(decode(0x1f << 8).is_empty());
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("00020c"), vec!["phone".to_string()]);
        assert_eq!(decode_hex("0x0c"), Vec::<String>::new());
        assert!(decode_hex("not hex").is_empty());
    }
}
