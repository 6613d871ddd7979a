//! Archive extraction and bundle installation
//!
//! Everything here is blocking file system work; the catalog runs it on the
//! blocking thread pool.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

use super::manifest::{ICONS_DIR, RAW_MANIFEST_FILE};
use crate::errors::{IconError, IconResult};

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// What an extraction wrote and what it refused to write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub files: usize,
    pub directories: usize,
    pub skipped: Vec<String>,
}

/// Location of the icons directory and raw manifest inside an extracted archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    pub icons_dir: PathBuf,
    pub manifest: PathBuf,
}

/// Relative path for an archive entry, or `None` if the entry would land
/// outside the destination (absolute paths, drive prefixes, `..` segments).
pub fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// Extract `archive_path` into `dest`.
///
/// Entries that would escape `dest` and symbolic links are skipped and
/// reported; extraction carries on with the remaining entries.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> IconResult<ExtractReport> {
    let file = File::open(archive_path).map_err(|e| IconError::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file)?;
    fs::create_dir_all(dest).map_err(|e| IconError::io(dest, e))?;

    let mut report = ExtractReport::default();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        let Some(relative) = sanitize_entry_path(&name) else {
            warn!("Skipping archive entry outside extraction directory: {}", name);
            report.skipped.push(name);
            continue;
        };

        if entry
            .unix_mode()
            .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
        {
            warn!("Skipping symbolic link in archive: {}", name);
            report.skipped.push(name);
            continue;
        }

        let out_path = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| IconError::io(&out_path, e))?;
            report.directories += 1;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| IconError::io(parent, e))?;
        }
        let mut out_file = File::create(&out_path).map_err(|e| IconError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out_file).map_err(|e| IconError::io(&out_path, e))?;
        report.files += 1;
    }

    debug!(
        "Extracted {} files and {} directories from {} ({} skipped)",
        report.files,
        report.directories,
        archive_path.display(),
        report.skipped.len()
    );
    Ok(report)
}

/// Find the directory holding `icons/` and `list.json`.
///
/// Checks `root` itself, then each immediate subdirectory in name order;
/// GitHub archives wrap their content in a single top-level directory.
pub fn locate_bundle(root: &Path) -> IconResult<BundleLayout> {
    let mut candidates = vec![root.to_path_buf()];
    let mut children: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| IconError::io(root, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    children.sort();
    candidates.extend(children);

    candidates
        .into_iter()
        .map(|dir| BundleLayout {
            icons_dir: dir.join(ICONS_DIR),
            manifest: dir.join(RAW_MANIFEST_FILE),
        })
        .find(|layout| layout.icons_dir.is_dir() && layout.manifest.is_file())
        .ok_or_else(|| IconError::BundleNotFound(root.to_path_buf()))
}

/// Move a file or directory, copying when a rename is not possible
/// (for instance across file systems).
pub fn move_path(from: &Path, to: &Path) -> IconResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    debug!(
        "Rename {} -> {} failed, falling back to copy",
        from.display(),
        to.display()
    );
    if from.is_dir() {
        copy_dir(from, to)?;
        fs::remove_dir_all(from).map_err(|e| IconError::io(from, e))
    } else {
        fs::copy(from, to).map_err(|e| IconError::io(to, e))?;
        fs::remove_file(from).map_err(|e| IconError::io(from, e))
    }
}

fn copy_dir(from: &Path, to: &Path) -> IconResult<()> {
    fs::create_dir_all(to).map_err(|e| IconError::io(to, e))?;
    for entry in fs::read_dir(from).map_err(|e| IconError::io(from, e))? {
        let entry = entry.map_err(|e| IconError::io(from, e))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        if source.is_dir() {
            copy_dir(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(|e| IconError::io(&target, e))?;
        }
    }
    Ok(())
}

/// Remove a directory tree if it exists
pub fn remove_dir_if_exists(path: &Path) -> IconResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IconError::io(path, e)),
    }
}
