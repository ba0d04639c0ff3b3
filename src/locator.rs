//! Finds the package file produced by the build.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::model::ArtifactFile;
use crate::util::compare_modified_desc;

/// File extensions treated as uploadable packages. Matched case-sensitively.
pub const PACKAGE_EXTENSIONS: [&str; 2] = ["ipa", "apk"];

/// Returns the package under `dir`, preferring the most recently modified one.
pub fn locate_artifact(dir: &Path) -> Result<ArtifactFile, UploadError> {
    let root = match std::path::absolute(dir) {
        Ok(root) => root,
        Err(_) => {
            warn!("Scan dir: {:?}", dir);
            return Err(UploadError::DirectoryNotFound(dir.to_path_buf()));
        }
    };
    if !root.is_dir() {
        warn!("Scan dir: {}", root.display());
        return Err(UploadError::DirectoryNotFound(root));
    }

    let mut candidates = Vec::new();
    collect_packages(&root, true, &mut candidates)?;
    debug!("found {} package files under {}", candidates.len(), root.display());

    match candidates.len() {
        0 => Err(UploadError::NoArtifactFound(root)),
        1 => Ok(candidates.remove(0)),
        count => {
            candidates.sort_by(compare_modified_desc);
            let latest = candidates.remove(0);
            info!(
                "Found {} files, the default choice of the latest modified file!",
                count
            );
            info!("The latest modified file is {}", latest.path.display());
            Ok(latest)
        }
    }
}

pub fn is_package_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PACKAGE_EXTENSIONS.contains(&ext))
}

/// Walks `dir` depth first. Only a failure to read the scan root is an error;
/// unreadable entries below it are skipped.
fn collect_packages(
    dir: &Path,
    is_root: bool,
    out: &mut Vec<ArtifactFile>,
) -> Result<(), UploadError> {
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) if !is_root => {
            warn!("skipping {}: {}", dir.display(), e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for (path, file_type) in entries {
        if file_type.is_dir() {
            collect_packages(&path, false, out)?;
        } else if is_package_file(&path) {
            let modified = match fs::metadata(&path) {
                Ok(m) if m.is_file() => m.modified(),
                Ok(_) => continue,
                Err(e) => Err(e),
            };
            match modified {
                Ok(modified) => out.push(ArtifactFile { path, modified }),
                Err(e) => warn!("skipping {}: {}", path.display(), e),
            }
        }
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<(PathBuf, fs::FileType)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        match entry.and_then(|e| Ok((e.path(), e.file_type()?))) {
            Ok(pair) => entries.push(pair),
            Err(e) => warn!("skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
