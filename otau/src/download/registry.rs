//! Filename ownership across concurrent jobs.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Result of claiming a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The filename was free and now belongs to the caller's URL.
    Claimed,
    /// The filename already belongs to the same URL.
    AlreadyOwned,
    /// The filename belongs to a different URL.
    Conflict { owner: String },
}

/// Append-only map from output filename to the URL that owns it.
///
/// Claims are atomic: of two jobs racing for one filename with different
/// URLs, exactly one wins.
#[derive(Debug, Default)]
pub struct FilenameRegistry {
    owners: DashMap<String, String>,
}

impl FilenameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, filename: &str, url: &str) -> Claim {
        match self.owners.entry(filename.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(url.to_string());
                Claim::Claimed
            }
            Entry::Occupied(entry) if entry.get() == url => Claim::AlreadyOwned,
            Entry::Occupied(entry) => Claim::Conflict {
                owner: entry.get().clone(),
            },
        }
    }

    pub fn owner(&self, filename: &str) -> Option<String> {
        self.owners.get(filename).map(|url| url.value().clone())
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
