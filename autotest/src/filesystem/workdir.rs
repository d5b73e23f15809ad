use std::{io, path::Path};

use tokio::fs;

use super::Error;
use crate::sandbox::prelude::Switch;

/// Remove the working directory, a missing directory is not an error
pub async fn remove(path: &Path) -> Result<(), Error> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::Cleanup(err)),
    }
}

/// Kill leftovers of the test identity, then remove the working directory
///
/// Both steps are always attempted. Failures are logged and swallowed,
/// the report is final by the time this runs.
pub async fn reclaim<S: Switch>(switch: &S, path: &Path) {
    if switch.is_alternate() {
        if let Err(err) = switch.reclaim(path).await {
            log::warn!("Fail reclaiming {:?} from test identity: {}", path, err);
        }
    }
    match remove(path).await {
        Ok(()) => log::debug!("working directory {:?} removed", path),
        Err(err) => log::warn!("{}", err),
    }
}
