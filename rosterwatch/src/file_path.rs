//! Symlink-aware access to a single file through a `cap_std` directory.
//!
//! `Dir` handles refuse to follow links that leave the directory, so a file
//! path is resolved to its real location before the parent is opened.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};

const MAX_LINK_HOPS: usize = 40;

/// Open the directory that really holds `path` and return it with the file
/// name to use inside it.
///
/// Symlinks on the final component are followed, including dangling ones, so
/// a later write lands on the link target instead of replacing the link.
pub(crate) fn open_parent(path: &Path) -> io::Result<(Dir, OsString)> {
    let resolved = resolve_links(path)?;
    let file_name = resolved
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path must name a file"))?
        .to_os_string();
    let parent = resolved
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

fn resolve_links(path: &Path) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_HOPS {
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                let target = fs::read_link(&current)?;
                current = match current.parent() {
                    Some(parent) if target.is_relative() => parent.join(target),
                    _ => target,
                };
            }
            Ok(_) => return Ok(current),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(current),
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::other(format!(
        "too many levels of symbolic links at '{}'",
        path.display()
    )))
}
