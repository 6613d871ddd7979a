//! Icon bundle manifest
//!
//! The upstream bundle ships a `list.json` describing every app icon. After a
//! fresh download the catalog derives a lookup key for each entry and writes
//! the result to `applications_index.json`, which is what later cold starts
//! read back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{IconError, IconResult};

/// Manifest file name inside the downloaded bundle
pub const RAW_MANIFEST_FILE: &str = "list.json";
/// Manifest persisted in the cache directory, keys included
pub const MANIFEST_FILE: &str = "applications_index.json";
/// Directory holding one file per icon
pub const ICONS_DIR: &str = "icons";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconManifest {
    #[serde(rename = "appcount", default)]
    pub app_count: usize,
    #[serde(default)]
    pub apps: Vec<IconManifestEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconManifestEntry {
    /// Lookup key derived from `file`
    #[serde(rename = "icon_name", default)]
    pub key: String,
    #[serde(rename = "icon", default)]
    pub file: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(rename = "website", default)]
    pub homepage: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub description: String,
}

/// Lookup key for an icon file: everything before the first `.`
///
/// `plex.png` becomes `plex`; a multi-dot name such as `home.assistant.svg`
/// becomes `home`.
pub fn derive_key(file: &str) -> &str {
    match file.split_once('.') {
        Some((key, _)) => key,
        None => file,
    }
}

impl IconManifest {
    pub fn parse(bytes: &[u8], origin: &Path) -> IconResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| IconError::manifest(origin, e))
    }

    pub fn read(path: &Path) -> IconResult<Self> {
        let bytes = fs::read(path).map_err(|e| IconError::io(path, e))?;
        Self::parse(&bytes, path)
    }

    /// Fill in every entry's key from its file name
    pub fn with_derived_keys(mut self) -> Self {
        for entry in &mut self.apps {
            entry.key = derive_key(&entry.file).to_string();
        }
        self
    }

    /// Write the manifest as pretty JSON, replacing `path` atomically
    pub fn write(&self, path: &Path) -> IconResult<()> {
        let data = serde_json::to_vec_pretty(self).map_err(|e| IconError::manifest(path, e))?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, data).map_err(|e| IconError::io(&staging, e))?;
        fs::rename(&staging, path).map_err(|e| IconError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const RAW: &str = r#"{
        "appcount": 3,
        "apps": [
            {"appid": "1", "name": "Plex", "website": "https://plex.tv", "license": "proprietary", "description": "Media", "icon": "plex.png"},
            {"appid": "2", "name": "Home Assistant", "website": "https://home-assistant.io", "license": "Apache-2.0", "description": "Automation", "icon": "homeassistant.svg"},
            {"appid": "3", "name": "Odd", "icon": "a.b.svg"}
        ]
    }"#;

    #[rstest]
    #[case("plex.png", "plex")]
    #[case("homeassistant.svg", "homeassistant")]
    #[case("a.b.svg", "a")]
    #[case("noext", "noext")]
    #[case(".hidden", "")]
    fn test_derive_key(#[case] file: &str, #[case] key: &str) {
        assert_eq!(derive_key(file), key);
    }

    #[test]
    fn test_parse_raw_manifest_ignores_unknown_fields() {
        let manifest = IconManifest::parse(RAW.as_bytes(), Path::new("list.json")).unwrap();
        assert_eq!(manifest.app_count, 3);
        assert_eq!(manifest.apps.len(), 3);
        assert_eq!(manifest.apps[0].display_name, "Plex");
        assert_eq!(manifest.apps[0].homepage, "https://plex.tv");
        assert!(manifest.apps[0].key.is_empty());
    }

    #[test]
    fn test_parse_invalid_manifest() {
        let err = IconManifest::parse(b"{not json", Path::new("list.json")).unwrap_err();
        assert!(matches!(err, IconError::Manifest { .. }));
    }

    #[test]
    fn test_persisted_manifest_keeps_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MANIFEST_FILE);

        let manifest = IconManifest::parse(RAW.as_bytes(), Path::new("list.json"))
            .unwrap()
            .with_derived_keys();
        manifest.write(&path).unwrap();

        let reloaded = IconManifest::read(&path).unwrap();
        assert_eq!(reloaded, manifest);
        let keys: Vec<_> = reloaded.apps.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["plex", "homeassistant", "a"]);

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["apps"][0]["icon_name"], "plex");
        assert!(!dir.path().join("applications_index.json.tmp").exists());
    }
}
