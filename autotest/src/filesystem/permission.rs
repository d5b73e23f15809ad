//! Arrange the working directory before any script runs
//!
//! Submission files and test scripts are owned by the supervisor, the test
//! identity only reaches them through the "other" bits. After staging, the
//! test identity may read and execute everything but modify nothing that
//! already exists (new files are still allowed by the directory itself).
use std::{
    fs::{self, Permissions},
    io,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use super::Error;

/// rw-r--r--
const FILE_MODE: u32 = 0o644;
/// rwxr-xr-x
const DIR_MODE: u32 = 0o755;
/// rwxr-xr-x
const SCRIPT_MODE: u32 = 0o755;

fn set_mode(path: &Path, mode: u32, failures: &mut Vec<(PathBuf, io::Error)>) {
    if let Err(err) = fs::set_permissions(path, Permissions::from_mode(mode)) {
        failures.push((path.to_path_buf(), err));
    }
}

/// `chmod -Rf u+w,go-w,ugo-x+rX` on `path`, symlinks are left alone
fn restrict(path: &Path, failures: &mut Vec<(PathBuf, io::Error)>) {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) => return failures.push((path.to_path_buf(), err)),
    };
    if meta.file_type().is_symlink() {
        return;
    }
    if !meta.is_dir() {
        return set_mode(path, FILE_MODE, failures);
    }

    // entries first, the directory may lose write permission
    match fs::read_dir(path) {
        Ok(entries) => {
            for entry in entries {
                match entry {
                    Ok(entry) => restrict(&entry.path(), failures),
                    Err(err) => failures.push((path.to_path_buf(), err)),
                }
            }
        }
        Err(err) => failures.push((path.to_path_buf(), err)),
    }
    set_mode(path, DIR_MODE, failures);
}

fn stage_blocking(root: &Path, scripts: &[String]) -> Result<(), Error> {
    let entries = fs::read_dir(root).map_err(|source| Error::Staging {
        path: root.to_path_buf(),
        source,
    })?;

    let mut failures = Vec::new();
    // the root keeps its own mode (sticky, shared with the test identity)
    for entry in entries {
        match entry {
            Ok(entry) => restrict(&entry.path(), &mut failures),
            Err(err) => failures.push((root.to_path_buf(), err)),
        }
    }
    for script in scripts {
        set_mode(&root.join(script), SCRIPT_MODE, &mut failures);
    }

    for (path, err) in failures {
        log::warn!("Fail setting permission of {:?}: {}", path, err);
    }
    Ok(())
}

/// Restrict permissions under `root` and make `scripts` executable
///
/// Best effort per entry; fails only if `root` itself is unusable,
/// in which case no script may run.
pub async fn stage(root: &Path, scripts: &[String]) -> Result<(), Error> {
    let root = root.to_path_buf();
    let scripts = scripts.to_vec();
    tokio::task::spawn_blocking(move || stage_blocking(&root, &scripts)).await?
}
