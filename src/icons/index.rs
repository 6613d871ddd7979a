//! In-memory icon lookup index

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

use super::manifest::{IconManifest, derive_key};

/// Handle shared by the catalog (writer) and resolvers (readers).
///
/// A refresh stores a whole new index; readers load an `Arc` to a complete
/// index and never see a half-built one.
pub type SharedIconIndex = Arc<ArcSwap<IconIndex>>;

/// Immutable mapping from icon key to icon file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconIndex {
    entries: HashMap<String, String>,
}

impl IconIndex {
    /// Build from manifest entries. Entries without a stored key get one
    /// derived from their file name; on duplicate keys the later entry wins.
    pub fn from_manifest(manifest: &IconManifest) -> Self {
        let entries = manifest
            .apps
            .iter()
            .filter(|entry| !entry.file.is_empty())
            .map(|entry| {
                let key = if entry.key.is_empty() {
                    derive_key(&entry.file).to_string()
                } else {
                    entry.key.clone()
                };
                (key, entry.file.clone())
            })
            .collect();
        Self { entries }
    }

    pub fn shared(self) -> SharedIconIndex {
        Arc::new(ArcSwap::from_pointee(self))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for IconIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
