//! Replace-by-rename file writes.
//!
//! The snapshot is written to a hidden sibling first and renamed over the
//! target, so a crash mid-write leaves the previous snapshot intact.

use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `contents` to `file_name` inside `dir`, replacing any existing file.
///
/// # Errors
///
/// Returns the first I/O error hit while writing, syncing, or renaming. The
/// temporary file is removed on a best-effort basis when a step fails.
pub(super) fn write_atomic(dir: &Dir, file_name: &OsStr, contents: &[u8]) -> io::Result<()> {
    let tmp_name = temp_name_for(file_name);

    write_temp_file(dir, &tmp_name, contents)?;
    if let Err(err) = replace_target(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    sync_directory(dir);
    Ok(())
}

fn temp_name_for(file_name: &OsStr) -> OsString {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());

    let mut name = OsString::from(".");
    name.push(file_name);
    name.push(format!(".tmp.{}.{nanos}.{counter}", std::process::id()));
    name
}

fn write_temp_file(dir: &Dir, tmp_name: &OsStr, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;

    let written = file.write_all(contents).and_then(|()| file.sync_all());
    if let Err(err) = written {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(err);
    }
    Ok(())
}

#[cfg(windows)]
fn replace_target(dir: &Dir, tmp_name: &OsStr, file_name: &OsStr) -> io::Result<()> {
    // Rename refuses to overwrite here.
    match dir.remove_file(file_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, file_name)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, tmp_name: &OsStr, file_name: &OsStr) -> io::Result<()> {
    dir.rename(tmp_name, dir, file_name)
}

fn sync_directory(dir: &Dir) {
    // Best effort: not every platform can sync a directory handle.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}
