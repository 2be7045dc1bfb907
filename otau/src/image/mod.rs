//! Zigbee OTAU firmware image format.
//!
//! Decodes the fixed image header, the optional header fields gated by the
//! header control bitmask, and the table of tagged segments that follows.
//!
//! ```text
//! ┌──────────────────────┐
//! │ fixed header (56)    │  magic, version, ids, header string, size
//! ├──────────────────────┤
//! │ optional (0-13)      │  security version, device address, hw versions
//! ├──────────────────────┤
//! │ segment: tag|len|data│  upgrade image, signature, certificate, ...
//! │ segment: tag|len|data│
//! │ ...                  │
//! └──────────────────────┘
//! ```

mod error;
mod header;
mod parser;
mod segment;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ImageError;
pub use header::{
    manufacturer_name, HardwareVersionRange, HeaderControl, ImageHeader, HEADER_LENGTH,
    HEADER_MAGIC, HEADER_VERSION,
};
pub use parser::OtauImage;
pub use segment::{tag_description, Segment, SEGMENT_HEADER_LENGTH};
