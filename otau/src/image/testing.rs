//! Synthetic image construction for tests.

use super::header::{HeaderControl, HEADER_MAGIC, HEADER_STRING_LENGTH, HEADER_VERSION};

/// Builds OTAU image buffers field by field.
///
/// Optional header fields are only emitted when the matching control bit is
/// set, so callers can supply values unconditionally.
pub struct ImageBuilder {
    version: u16,
    header_length: Option<u16>,
    control: u16,
    manufacturer_code: u16,
    image_type: u16,
    file_version: u32,
    stack_version: u16,
    header_string: String,
    image_size: Option<u32>,
    security_version: u8,
    device_address: u64,
    hardware_versions: (u16, u16),
    segments: Vec<(u16, Vec<u8>)>,
}

impl ImageBuilder {
    pub fn new(manufacturer_code: u16, image_type: u16, file_version: u32) -> Self {
        Self {
            version: HEADER_VERSION,
            header_length: None,
            control: 0,
            manufacturer_code,
            image_type,
            file_version,
            stack_version: 2,
            header_string: String::new(),
            image_size: None,
            security_version: 0,
            device_address: 0,
            hardware_versions: (0, 0),
            segments: Vec::new(),
        }
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn header_length(mut self, length: u16) -> Self {
        self.header_length = Some(length);
        self
    }

    pub fn control(mut self, bits: u16) -> Self {
        self.control = bits;
        self
    }

    pub fn stack_version(mut self, version: u16) -> Self {
        self.stack_version = version;
        self
    }

    pub fn header_string(mut self, value: &str) -> Self {
        self.header_string = value.to_string();
        self
    }

    pub fn image_size(mut self, size: u32) -> Self {
        self.image_size = Some(size);
        self
    }

    pub fn security_version(mut self, version: u8) -> Self {
        self.security_version = version;
        self
    }

    pub fn device_address(mut self, address: u64) -> Self {
        self.device_address = address;
        self
    }

    pub fn hardware_versions(mut self, min: u16, max: u16) -> Self {
        self.hardware_versions = (min, max);
        self
    }

    pub fn segment(mut self, tag: u16, data: &[u8]) -> Self {
        self.segments.push((tag, data.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let control = HeaderControl::new(self.control);
        let header_length = self
            .header_length
            .unwrap_or(control.expected_header_length() as u16);

        let mut optional = Vec::new();
        if control.has_security_version() {
            optional.push(self.security_version);
        }
        if control.has_device_address() {
            optional.extend_from_slice(&self.device_address.to_le_bytes());
        }
        if control.has_hardware_versions() {
            optional.extend_from_slice(&self.hardware_versions.0.to_le_bytes());
            optional.extend_from_slice(&self.hardware_versions.1.to_le_bytes());
        }

        let mut table = Vec::new();
        for (tag, data) in &self.segments {
            table.extend_from_slice(&tag.to_le_bytes());
            table.extend_from_slice(&(data.len() as u32).to_le_bytes());
            table.extend_from_slice(data);
        }

        let total = 56 + optional.len() + table.len();
        let mut header_string = [0u8; HEADER_STRING_LENGTH];
        let raw = self.header_string.as_bytes();
        let n = raw.len().min(HEADER_STRING_LENGTH);
        header_string[..n].copy_from_slice(&raw[..n]);

        let mut buffer = Vec::with_capacity(total);
        buffer.extend_from_slice(&HEADER_MAGIC.to_le_bytes());
        buffer.extend_from_slice(&self.version.to_le_bytes());
        buffer.extend_from_slice(&header_length.to_le_bytes());
        buffer.extend_from_slice(&self.control.to_le_bytes());
        buffer.extend_from_slice(&self.manufacturer_code.to_le_bytes());
        buffer.extend_from_slice(&self.image_type.to_le_bytes());
        buffer.extend_from_slice(&self.file_version.to_le_bytes());
        buffer.extend_from_slice(&self.stack_version.to_le_bytes());
        buffer.extend_from_slice(&header_string);
        buffer.push(0);
        buffer.extend_from_slice(&self.image_size.unwrap_or(total as u32).to_le_bytes());
        buffer.extend_from_slice(&optional);
        buffer.extend_from_slice(&table);
        buffer
    }
}
