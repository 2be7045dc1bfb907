//! Firmware index: descriptors, retrieval, ordering and file naming.

mod descriptor;
mod error;
mod fetcher;
mod naming;
mod sort;

pub use descriptor::{ImageDescriptor, ImageIdentity, ModelId};
pub use error::IndexError;
pub use fetcher::{IndexFetcher, DEFAULT_INDEX_URL, INDEX_AUDIT_FILE};
pub use naming::{image_filename, IMAGE_EXTENSION};
pub use sort::sort_descriptors;
