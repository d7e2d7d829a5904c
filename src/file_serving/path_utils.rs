use log::{debug, warn};
use percent_encoding::percent_decode_str;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::ServeError;

pub const INDEX_FILE: &str = "index.html";

/// A servable file. `path` is canonical and is what gets opened; `served_as` is the
/// request mapped onto the root without following symlinks, and names the content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub served_as: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    File(ResolvedFile),
    /// Directory asked for without its trailing slash; holds the `Location` to send.
    Redirect(String),
}

/// Drops the query string and fragment from a request target.
pub fn strip_query(target: &str) -> &str {
    target.split(['?', '#']).next().unwrap_or(target)
}

pub fn decode_path(path: &str) -> Result<String, ServeError> {
    percent_decode_str(path)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ServeError::BadRequest(format!("path is not UTF-8: {}", e)))
}

/// Turns a decoded request path into a relative path. Any `..` segment is refused.
fn clean_path(decoded_path: &str) -> Result<PathBuf, ServeError> {
    let mut cleaned_path = PathBuf::new();
    for component in Path::new(decoded_path).components() {
        match component {
            Component::Normal(part) => cleaned_path.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                warn!("Rejected traversal attempt: {}", decoded_path);
                return Err(ServeError::Forbidden);
            }
        }
    }
    debug!("Cleaned path: {}", cleaned_path.display());
    Ok(cleaned_path)
}

/// Canonicalizes `requested_path`, which has to land under `base_dir` (already
/// canonical) even after symlinks are followed.
fn contain(base_dir: &Path, requested_path: &Path) -> Result<PathBuf, ServeError> {
    match fs::canonicalize(requested_path) {
        Ok(path) if path.starts_with(base_dir) => Ok(path),
        Ok(path) => {
            warn!("Path escapes base directory: {}", path.display());
            Err(ServeError::Forbidden)
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(ServeError::Io(e)),
        Err(e) => {
            debug!("Cannot canonicalize {}: {}", requested_path.display(), e);
            Err(ServeError::NotFound)
        }
    }
}

/// Finds what a request target names: the exact file, else a redirect for a directory
/// missing its trailing slash, else `index.html` inside the directory, else nothing.
pub fn resolve_file(base_dir: &Path, target: &str) -> Result<Resolution, ServeError> {
    debug!(
        "Resolving path - base: {}, request: {}",
        base_dir.display(),
        target
    );
    let path_part = strip_query(target);
    let decoded_path = decode_path(path_part)?;
    let requested_path = base_dir.join(clean_path(&decoded_path)?);
    let path = contain(base_dir, &requested_path)?;
    let metadata = fs::metadata(&path).map_err(ServeError::from_fs)?;

    if metadata.is_dir() {
        if !decoded_path.ends_with('/') {
            let location = format!("{}/{}", path_part, &target[path_part.len()..]);
            debug!("Redirecting directory request to {}", location);
            return Ok(Resolution::Redirect(location));
        }

        let served_as = requested_path.join(INDEX_FILE);
        let index = contain(base_dir, &served_as)?;
        if fs::metadata(&index).map_err(ServeError::from_fs)?.is_file() {
            debug!("Serving directory index: {}", index.display());
            return Ok(Resolution::File(ResolvedFile {
                path: index,
                served_as,
            }));
        }
        debug!("Directory has no {}: {}", INDEX_FILE, path.display());
        return Err(ServeError::NotFound);
    }

    if !metadata.is_file() {
        warn!("Path exists but is not a regular file: {}", path.display());
        return Err(ServeError::NotFound);
    }

    // A trailing slash asks for a directory
    if decoded_path.ends_with('/') {
        debug!("File requested with trailing slash: {}", path.display());
        return Err(ServeError::NotFound);
    }

    Ok(Resolution::File(ResolvedFile {
        path,
        served_as: requested_path,
    }))
}
