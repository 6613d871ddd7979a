//! Icon catalog: ingestion of the upstream icon bundle, the lookup index and
//! key resolution.

pub mod archive;
pub mod catalog;
pub mod fetch;
pub mod index;
pub mod manifest;
pub mod resolver;

pub use catalog::{CatalogPaths, IconCatalog, RefreshJob};
pub use fetch::{ArchiveSource, FileArchiveSource, HttpArchiveSource};
pub use index::{IconIndex, SharedIconIndex};
pub use manifest::{IconManifest, IconManifestEntry, derive_key};
pub use resolver::IconResolver;
