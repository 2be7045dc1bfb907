//! Output filename conventions.
//!
//! Downloaded images are stored under the name the deCONZ OTAU plugin looks
//! for: `{manufacturer:04X}-{image type:04X}-{file version:08X}.zigbee`.
//! Entries sharing the identifying triple with another entry get their model
//! id appended so they do not overwrite each other.

use super::descriptor::ImageDescriptor;

/// Extension of stored OTAU images.
pub const IMAGE_EXTENSION: &str = "zigbee";

/// Derive the output filename for an index entry.
///
/// # Examples
///
/// ```
/// use otau::index::{image_filename, ImageDescriptor};
///
/// let descriptor = ImageDescriptor::new(0x117C, 0x2101, 0x2301_4631, "https://example.com/a");
/// assert_eq!(image_filename(&descriptor), "117C-2101-23014631.zigbee");
/// ```
pub fn image_filename(descriptor: &ImageDescriptor) -> String {
    let mut name = descriptor.identity().to_string();
    if descriptor.duplicate {
        if let Some(model_id) = &descriptor.model_id {
            name.push('-');
            // Model ids are free text; keep the name a single path component.
            name.extend(
                model_id
                    .to_string()
                    .chars()
                    .map(|c| if matches!(c, '/' | '\\') { '_' } else { c }),
            );
        }
    }
    format!("{}.{}", name, IMAGE_EXTENSION)
}
