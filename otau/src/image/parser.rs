//! Byte-exact decoder for OTAU firmware images.

use super::error::ImageError;
use super::header::{
    HardwareVersionRange, HeaderControl, ImageHeader, DEVICE_ADDRESS_LENGTH,
    HARDWARE_VERSIONS_LENGTH, HEADER_LENGTH, HEADER_MAGIC, HEADER_STRING_LENGTH, HEADER_VERSION,
    SECURITY_VERSION_LENGTH,
};
use super::segment::{Segment, SEGMENT_HEADER_LENGTH};

/// A decoded OTAU image: header plus segment table.
///
/// Parsing never mutates or retains the input buffer.
///
/// # Example
///
/// ```
/// use otau::image::{ImageError, OtauImage};
///
/// let result = OtauImage::parse(&[0u8; 128]);
/// assert_eq!(result.unwrap_err(), ImageError::NotAnImage);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtauImage {
    pub header: ImageHeader,
    pub segments: Vec<Segment>,
}

impl OtauImage {
    /// Decode an OTAU image from a raw buffer.
    ///
    /// The header is located by scanning for the magic number, so images
    /// wrapped in a vendor container are still recognised.
    pub fn parse(buffer: &[u8]) -> Result<Self, ImageError> {
        let offset = find_header(buffer).ok_or(ImageError::NotAnImage)?;

        let version = read_u16(buffer, offset + 4)?;
        if version != HEADER_VERSION {
            return Err(ImageError::UnsupportedVersion { version });
        }

        let header_length = read_u16(buffer, offset + 6)?;
        let control = HeaderControl::new(read_u16(buffer, offset + 8)?);
        let manufacturer_code = read_u16(buffer, offset + 10)?;
        let image_type = read_u16(buffer, offset + 12)?;
        let file_version = read_u32(buffer, offset + 14)?;
        let zigbee_stack_version = read_u16(buffer, offset + 18)?;
        let header_string = read_header_string(buffer, offset + 20)?;
        let image_size = read_u32(buffer, offset + 52)?;

        let expected = control.expected_header_length() as u16;
        if header_length != expected {
            return Err(ImageError::HeaderLengthMismatch {
                stored: header_length,
                expected,
            });
        }

        let mut cursor = offset + HEADER_LENGTH;

        // Read as 32 bits but advance by the single byte counted in the header
        // length. Unconfirmed against a captured image with this bit set.
        let security_version = if control.has_security_version() {
            let value = read_u32(buffer, cursor)?;
            cursor += SECURITY_VERSION_LENGTH;
            Some(value)
        } else {
            None
        };

        let device_address = if control.has_device_address() {
            let value = read_u64(buffer, cursor)?;
            cursor += DEVICE_ADDRESS_LENGTH;
            Some(value)
        } else {
            None
        };

        let hardware_versions = if control.has_hardware_versions() {
            let min = read_u16(buffer, cursor)?;
            let max = read_u16(buffer, cursor + 2)?;
            cursor += HARDWARE_VERSIONS_LENGTH;
            Some(HardwareVersionRange { min, max })
        } else {
            None
        };

        let header = ImageHeader {
            offset,
            header_length,
            control,
            manufacturer_code,
            image_type,
            file_version,
            zigbee_stack_version,
            header_string,
            image_size,
            security_version,
            device_address,
            hardware_versions,
        };

        let segments = walk_segments(buffer, cursor)?;

        Ok(Self { header, segments })
    }

    /// Total bytes covered by the segment table.
    pub fn segments_length(&self) -> usize {
        self.segments.iter().map(|s| s.length).sum()
    }
}

/// Find the first offset holding the header magic number.
///
/// Offsets `0..=len - 56` are scanned, so a buffer that is exactly one fixed
/// header still matches.
fn find_header(buffer: &[u8]) -> Option<usize> {
    if buffer.len() < HEADER_LENGTH {
        return None;
    }
    (0..=buffer.len() - HEADER_LENGTH)
        .find(|&offset| read_u32(buffer, offset).is_ok_and(|magic| magic == HEADER_MAGIC))
}

/// Walk the segment table starting at `start`.
///
/// A segment whose declared length reaches the end of the buffer is clamped
/// to the remaining bytes and ends the walk.
fn walk_segments(buffer: &[u8], start: usize) -> Result<Vec<Segment>, ImageError> {
    let mut segments = Vec::new();
    let mut cursor = start;

    while buffer.len().saturating_sub(cursor) >= SEGMENT_HEADER_LENGTH {
        let remaining = buffer.len() - cursor;
        let tag = read_u16(buffer, cursor)?;
        let declared = read_u32(buffer, cursor + 2)? as usize;

        let length = if declared >= remaining {
            remaining
        } else {
            (declared + SEGMENT_HEADER_LENGTH).min(remaining)
        };

        segments.push(Segment { tag, length });
        cursor += length;
    }

    Ok(segments)
}

fn read_header_string(buffer: &[u8], offset: usize) -> Result<String, ImageError> {
    let bytes = read_bytes(buffer, offset, HEADER_STRING_LENGTH)?;
    if bytes[0] == 0 {
        return Ok(String::new());
    }
    Ok(String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string())
}

fn read_bytes(buffer: &[u8], offset: usize, len: usize) -> Result<&[u8], ImageError> {
    buffer
        .get(offset..offset + len)
        .ok_or(ImageError::Truncated { offset })
}

fn read_u16(buffer: &[u8], offset: usize) -> Result<u16, ImageError> {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(read_bytes(buffer, offset, 2)?);
    Ok(u16::from_le_bytes(raw))
}

fn read_u32(buffer: &[u8], offset: usize) -> Result<u32, ImageError> {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(read_bytes(buffer, offset, 4)?);
    Ok(u32::from_le_bytes(raw))
}

fn read_u64(buffer: &[u8], offset: usize) -> Result<u64, ImageError> {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(read_bytes(buffer, offset, 8)?);
    Ok(u64::from_le_bytes(raw))
}
