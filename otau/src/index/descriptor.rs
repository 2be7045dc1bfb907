//! Firmware index entries.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Device model identifier attached to an index entry.
///
/// The upstream index carries both numeric and textual model ids. Numeric ids
/// order numerically and sort before textual ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelId {
    Number(u64),
    Text(String),
}

impl Ord for ModelId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ModelId::Number(a), ModelId::Number(b)) => a.cmp(b),
            (ModelId::Number(_), ModelId::Text(_)) => Ordering::Less,
            (ModelId::Text(_), ModelId::Number(_)) => Ordering::Greater,
            (ModelId::Text(a), ModelId::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ModelId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelId::Number(n) => write!(f, "{}", n),
            ModelId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        ModelId::Text(value.to_string())
    }
}

impl From<u64> for ModelId {
    fn from(value: u64) -> Self {
        ModelId::Number(value)
    }
}

/// Identifying triple of a firmware image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageIdentity {
    pub manufacturer_code: u16,
    pub image_type: u16,
    pub file_version: u32,
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}-{:04X}-{:08X}",
            self.manufacturer_code, self.image_type, self.file_version
        )
    }
}

/// One entry of the remote firmware index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    pub manufacturer_code: u16,
    pub image_type: u16,
    pub file_version: u32,
    #[serde(default)]
    pub model_id: Option<ModelId>,
    pub url: String,
    #[serde(default, rename = "fileSize")]
    pub declared_size: Option<u64>,
    /// Hex encoded SHA-512 of the image file.
    #[serde(default, rename = "sha512")]
    pub declared_digest: Option<String>,
    /// Set when another entry shares the identifying triple.
    #[serde(skip)]
    pub duplicate: bool,
}

impl ImageDescriptor {
    pub fn new(
        manufacturer_code: u16,
        image_type: u16,
        file_version: u32,
        url: impl Into<String>,
    ) -> Self {
        Self {
            manufacturer_code,
            image_type,
            file_version,
            model_id: None,
            url: url.into(),
            declared_size: None,
            declared_digest: None,
            duplicate: false,
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<ModelId>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.declared_digest = Some(digest.into());
        self
    }

    pub fn identity(&self) -> ImageIdentity {
        ImageIdentity {
            manufacturer_code: self.manufacturer_code,
            image_type: self.image_type,
            file_version: self.file_version,
        }
    }
}
