//! Error types for OTAU image parsing.

use thiserror::Error;

/// Errors that can occur while decoding an OTAU image.
///
/// All variants are recoverable at the call site: callers log them and treat
/// the buffer as unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// The buffer contains no OTAU header magic number.
    #[error("not an OTAU image")]
    NotAnImage,

    /// The header magic was found but the header version is not 0x0100.
    #[error("invalid OTAU image (unsupported header version {version:#06x})")]
    UnsupportedVersion { version: u16 },

    /// The stored header length disagrees with the header control flags.
    #[error("invalid OTAU image (header length {stored}, expected {expected})")]
    HeaderLengthMismatch { stored: u16, expected: u16 },

    /// An optional header field extends past the end of the buffer.
    #[error("truncated OTAU image at offset {offset}")]
    Truncated { offset: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_an_image_display() {
        assert_eq!(ImageError::NotAnImage.to_string(), "not an OTAU image");
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = ImageError::UnsupportedVersion { version: 0x0200 };
        assert_eq!(
            err.to_string(),
            "invalid OTAU image (unsupported header version 0x0200)"
        );
    }

    #[test]
    fn test_header_length_mismatch_display() {
        let err = ImageError::HeaderLengthMismatch {
            stored: 60,
            expected: 57,
        };
        assert!(err.to_string().contains("60"));
        assert!(err.to_string().contains("57"));
    }
}
