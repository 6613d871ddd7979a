//! Shared fixtures: an icon bundle zip laid out like the upstream archive,
//! and an application state wired against a temporary cache.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

use homedash::{
    config::Config,
    icons::{CatalogPaths, FileArchiveSource, IconCatalog},
    models::Item,
    registry::SourceRegistry,
    web::AppState,
};

pub const BUNDLE_ROOT: &str = "Heimdall-Apps-gh-pages";

pub const LIST_JSON: &str = r#"{
    "appcount": 3,
    "apps": [
        {"appid": "a1", "name": "Plex", "website": "https://plex.tv", "license": "proprietary", "description": "Media server", "icon": "plex.png"},
        {"appid": "a2", "name": "Sonarr", "website": "https://sonarr.tv", "license": "GPL-3.0", "description": "TV", "icon": "sonarr.svg"},
        {"appid": "a3", "name": "Grafana", "website": "https://grafana.com", "license": "AGPL-3.0", "description": "Dashboards", "icon": "grafana.png"}
    ]
}"#;

pub const SONARR_SVG: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";

/// Write a zip with `entries`; names ending in `/` become directories
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// A well-formed bundle, optionally with extra entries
pub fn write_bundle(path: &Path, extra: &[(&str, &[u8])]) {
    let plex = format!("{BUNDLE_ROOT}/icons/plex.png");
    let sonarr = format!("{BUNDLE_ROOT}/icons/sonarr.svg");
    let grafana = format!("{BUNDLE_ROOT}/icons/grafana.png");
    let list = format!("{BUNDLE_ROOT}/list.json");

    let mut entries: Vec<(&str, &[u8])> = vec![
        (plex.as_str(), b"plex-png".as_slice()),
        (sonarr.as_str(), SONARR_SVG),
        (grafana.as_str(), b"grafana-png".as_slice()),
        (list.as_str(), LIST_JSON.as_bytes()),
    ];
    entries.extend_from_slice(extra);
    write_zip(path, &entries);
}

pub struct TestEnv {
    pub dir: TempDir,
    pub catalog: Arc<IconCatalog>,
    pub registry: SourceRegistry,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir.path().join("bundle.zip"), &[]);
        let catalog = Arc::new(IconCatalog::new(
            CatalogPaths::new(dir.path().join("cache"), dir.path().join("tmp")),
            Arc::new(FileArchiveSource::new(dir.path().join("bundle.zip"))),
        ));
        Self {
            dir,
            catalog,
            registry: SourceRegistry::new(),
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.path().join("bundle.zip")
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.icons.cache_dir = self.dir.path().join("cache");
        config.icons.tmp_dir = self.dir.path().join("tmp");
        config.static_items.apps = vec![
            Item::new("Router", "http://192.168.1.1", "openwrt").with_comment("static"),
            Item::new("grafana", "http://grafana.lan", "grafana"),
        ];
        config
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.config(), self.registry.clone(), Arc::clone(&self.catalog))
    }
}

/// Address of a server that accepts connections and never answers
pub async fn spawn_silent_server() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}
