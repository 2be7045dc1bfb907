//! OTAU image header types.
//!
//! The header is a 56-byte little-endian record followed by up to 13 bytes
//! of optional fields. Which optional fields are present is decided by the
//! header control bitmask:
//!
//! ```text
//! offset  size  field
//!  0       4    magic number (0x0BEEF11E)
//!  4       2    header version (0x0100)
//!  6       2    header length
//!  8       2    header control
//! 10       2    manufacturer code
//! 12       2    image type
//! 14       4    file version
//! 18       2    zigbee stack version
//! 20      31    header string
//! 52       4    total image size
//! 56       -    optional fields (security version, device address, hw versions)
//! ```

use std::fmt;

/// OTAU header magic number.
pub const HEADER_MAGIC: u32 = 0x0BEE_F11E;

/// The only supported header version.
pub const HEADER_VERSION: u16 = 0x0100;

/// Length of the fixed part of the header.
pub const HEADER_LENGTH: usize = 56;

/// Width of the header string field.
pub const HEADER_STRING_LENGTH: usize = 31;

/// Width of the optional security version field, as counted in the header length.
pub const SECURITY_VERSION_LENGTH: usize = 1;

/// Width of the optional upgrade file destination (device address) field.
pub const DEVICE_ADDRESS_LENGTH: usize = 8;

/// Width of the optional min/max hardware version pair.
pub const HARDWARE_VERSIONS_LENGTH: usize = 4;

/// Header control bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderControl(u16);

impl HeaderControl {
    /// Bit 0: security credential version present.
    pub const SECURITY_VERSION: u16 = 1 << 0;
    /// Bit 1: device specific file (IEEE address) present.
    pub const DEVICE_ADDRESS: u16 = 1 << 1;
    /// Bit 2: hardware versions present.
    pub const HARDWARE_VERSIONS: u16 = 1 << 2;

    pub fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn has_security_version(&self) -> bool {
        self.0 & Self::SECURITY_VERSION != 0
    }

    pub fn has_device_address(&self) -> bool {
        self.0 & Self::DEVICE_ADDRESS != 0
    }

    pub fn has_hardware_versions(&self) -> bool {
        self.0 & Self::HARDWARE_VERSIONS != 0
    }

    /// Header length implied by the control bits.
    pub fn expected_header_length(&self) -> usize {
        let mut length = HEADER_LENGTH;
        if self.has_security_version() {
            length += SECURITY_VERSION_LENGTH;
        }
        if self.has_device_address() {
            length += DEVICE_ADDRESS_LENGTH;
        }
        if self.has_hardware_versions() {
            length += HARDWARE_VERSIONS_LENGTH;
        }
        length
    }
}

/// Range of hardware versions an image applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareVersionRange {
    pub min: u16,
    pub max: u16,
}

/// Parsed OTAU image header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    /// Byte offset of the header within the scanned buffer.
    pub offset: usize,
    pub header_length: u16,
    pub control: HeaderControl,
    pub manufacturer_code: u16,
    pub image_type: u16,
    pub file_version: u32,
    pub zigbee_stack_version: u16,
    /// Header string; empty when the field starts with a NUL.
    pub header_string: String,
    /// Total image size as declared in the header.
    pub image_size: u32,
    pub security_version: Option<u32>,
    pub device_address: Option<u64>,
    pub hardware_versions: Option<HardwareVersionRange>,
}

impl ImageHeader {
    /// Name of the manufacturer, if the code is a well-known one.
    pub fn manufacturer_name(&self) -> Option<&'static str> {
        manufacturer_name(self.manufacturer_code)
    }

    pub fn min_hardware_version(&self) -> Option<u16> {
        self.hardware_versions.map(|range| range.min)
    }

    pub fn max_hardware_version(&self) -> Option<u16> {
        self.hardware_versions.map(|range| range.max)
    }
}

impl fmt::Display for ImageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "manufacturer {:#06x}", self.manufacturer_code)?;
        if let Some(name) = self.manufacturer_name() {
            write!(f, " ({})", name)?;
        }
        write!(
            f,
            ", image type {:#06x}, file version {:#010x}, size {}",
            self.image_type, self.file_version, self.image_size
        )
    }
}

/// Look up the name of a well-known Zigbee manufacturer code.
pub fn manufacturer_name(code: u16) -> Option<&'static str> {
    match code {
        0x0000 => Some("unknown"),
        0x100B => Some("Philips"),
        0x10F2 => Some("ubisys"),
        0x110C => Some("OSRAM"),
        0x1135 => Some("dresden elektronik"),
        0x1144 => Some("Lutron"),
        0x117C => Some("IKEA"),
        0x1189 => Some("Ledvance"),
        0x1246 => Some("Danfoss"),
        _ => None,
    }
}
