//! Advisory integrity checks for downloaded payloads.
//!
//! Every check yields a [`Finding`] instead of an error. Findings are logged
//! by the caller and never stop a payload from being written.

mod checksum;

use std::fmt;

use crate::image::{ImageError, OtauImage};
use crate::index::ImageDescriptor;

pub use checksum::{calculate_checksum, calculate_file_checksum, digest_matches};

/// Header field cross-checked against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    ManufacturerCode,
    ImageType,
    FileVersion,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeaderField::ManufacturerCode => "manufacturer code",
            HeaderField::ImageType => "image type",
            HeaderField::FileVersion => "file version",
        })
    }
}

/// A discrepancy between a payload and its index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    SizeMismatch { expected: u64, actual: u64 },
    DigestMismatch { expected: String, actual: String },
    Unparsed(ImageError),
    FieldMismatch {
        field: HeaderField,
        expected: u32,
        actual: u32,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: index {} bytes, payload {} bytes", expected, actual)
            }
            Finding::DigestMismatch { expected, actual } => {
                write!(f, "sha512 mismatch: index {}, payload {}", expected, actual)
            }
            Finding::Unparsed(err) => write!(f, "payload is unreadable: {}", err),
            Finding::FieldMismatch {
                field,
                expected,
                actual,
            } => write!(f, "{} mismatch: index {:#x}, header {:#x}", field, expected, actual),
        }
    }
}

/// Check `payload` against the metadata of `descriptor`.
///
/// Size and digest are only compared when the index declares them. Header
/// fields are compared only when the payload parses.
pub fn validate(descriptor: &ImageDescriptor, payload: &[u8]) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(expected) = descriptor.declared_size {
        let actual = payload.len() as u64;
        if actual != expected {
            findings.push(Finding::SizeMismatch { expected, actual });
        }
    }

    if let Some(expected) = &descriptor.declared_digest {
        let actual = calculate_checksum(payload);
        if !digest_matches(expected, &actual) {
            findings.push(Finding::DigestMismatch {
                expected: expected.clone(),
                actual,
            });
        }
    }

    let header = match OtauImage::parse(payload) {
        Ok(image) => image.header,
        Err(err) => {
            findings.push(Finding::Unparsed(err));
            return findings;
        }
    };

    let checks = [
        (
            HeaderField::ManufacturerCode,
            u32::from(descriptor.manufacturer_code),
            u32::from(header.manufacturer_code),
        ),
        (
            HeaderField::ImageType,
            u32::from(descriptor.image_type),
            u32::from(header.image_type),
        ),
        (
            HeaderField::FileVersion,
            descriptor.file_version,
            header.file_version,
        ),
    ];
    findings.extend(
        checks
            .into_iter()
            .filter(|(_, expected, actual)| expected != actual)
            .map(|(field, expected, actual)| Finding::FieldMismatch {
                field,
                expected,
                actual,
            }),
    );

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::testing::ImageBuilder;

    fn image() -> Vec<u8> {
        ImageBuilder::new(0x117C, 0x2101, 0x2301_4631)
            .segment(0x0000, &[0xAA; 32])
            .build()
    }

    fn descriptor() -> ImageDescriptor {
        ImageDescriptor::new(0x117C, 0x2101, 0x2301_4631, "https://example.com/a.ota")
    }

    #[test]
    fn test_clean_payload_has_no_findings() {
        let payload = image();
        let descriptor = descriptor()
            .with_size(payload.len() as u64)
            .with_digest(calculate_checksum(&payload).to_uppercase());
        assert!(validate(&descriptor, &payload).is_empty());
    }

    #[test]
    fn test_size_and_digest_mismatch() {
        let payload = image();
        let descriptor = descriptor().with_size(1).with_digest("00");
        let findings = validate(&descriptor, &payload);

        assert_eq!(findings.len(), 2);
        assert_eq!(
            findings[0],
            Finding::SizeMismatch {
                expected: 1,
                actual: payload.len() as u64
            }
        );
        assert!(matches!(findings[1], Finding::DigestMismatch { .. }));
    }

    #[test]
    fn test_unparsed_payload_stops_checks() {
        let descriptor = descriptor().with_size(3);
        let findings = validate(&descriptor, b"abc");
        assert_eq!(findings, vec![Finding::Unparsed(ImageError::NotAnImage)]);
    }

    #[test]
    fn test_field_mismatch_per_field() {
        let payload = ImageBuilder::new(0x117C, 0x2102, 0x0000_0001).build();
        let findings = validate(&descriptor(), &payload);

        assert_eq!(
            findings,
            vec![
                Finding::FieldMismatch {
                    field: HeaderField::ImageType,
                    expected: 0x2101,
                    actual: 0x2102,
                },
                Finding::FieldMismatch {
                    field: HeaderField::FileVersion,
                    expected: 0x2301_4631,
                    actual: 1,
                },
            ]
        );
    }

    #[test]
    fn test_finding_display() {
        let finding = Finding::FieldMismatch {
            field: HeaderField::ManufacturerCode,
            expected: 0x117C,
            actual: 0x100B,
        };
        assert_eq!(
            finding.to_string(),
            "manufacturer code mismatch: index 0x117c, header 0x100b"
        );
    }
}
