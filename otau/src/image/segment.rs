//! Segments (sub-elements) of an OTAU image.

/// Length of a segment record header: 2-byte tag plus 4-byte length.
pub const SEGMENT_HEADER_LENGTH: usize = 6;

/// First tag value of the manufacturer specific range.
pub const MANUFACTURER_SPECIFIC_TAG: u16 = 0xF000;

/// One entry of the segment table following the image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub tag: u16,
    /// Bytes consumed by this segment, including its 6-byte record header.
    pub length: usize,
}

impl Segment {
    /// Human readable name of the segment tag.
    pub fn description(&self) -> Option<&'static str> {
        tag_description(self.tag)
    }

    /// Payload length, excluding the record header.
    pub fn data_length(&self) -> usize {
        self.length.saturating_sub(SEGMENT_HEADER_LENGTH)
    }
}

/// Look up the name of a segment tag.
///
/// Every tag from 0xF000 upwards is manufacturer specific.
pub fn tag_description(tag: u16) -> Option<&'static str> {
    match tag.min(MANUFACTURER_SPECIFIC_TAG) {
        0x0000 => Some("Upgrade Image"),
        0x0001 => Some("ECDSA Signature"),
        0x0002 => Some("ECDSA Signing Certificate"),
        0x0003 => Some("Image Integrity Code"),
        0x0004 => Some("Picture Data"),
        MANUFACTURER_SPECIFIC_TAG => Some("Manufacturer Specific"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(tag_description(0x0000), Some("Upgrade Image"));
        assert_eq!(tag_description(0x0001), Some("ECDSA Signature"));
        assert_eq!(tag_description(0x0004), Some("Picture Data"));
    }

    #[test]
    fn test_manufacturer_specific_range() {
        assert_eq!(tag_description(0xF000), Some("Manufacturer Specific"));
        assert_eq!(tag_description(0xF123), Some("Manufacturer Specific"));
        assert_eq!(tag_description(0xFFFF), Some("Manufacturer Specific"));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(tag_description(0x0005), None);
        assert_eq!(tag_description(0xEFFF), None);
    }

    #[test]
    fn test_data_length() {
        let segment = Segment {
            tag: 0,
            length: 106,
        };
        assert_eq!(segment.data_length(), 100);
        assert_eq!(segment.description(), Some("Upgrade Image"));
    }
}
