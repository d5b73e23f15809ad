//! Permissions and lifetime of the working directory
pub mod permission;
pub mod workdir;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to stage {path:?}: `{source}`")]
    Staging {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to remove working directory: `{0}`")]
    Cleanup(std::io::Error),
    #[error("Blocking task failed: `{0}`")]
    Join(#[from] tokio::task::JoinError),
}
