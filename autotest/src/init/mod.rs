use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod check;
pub mod config;
pub mod logger;

/// load config and setup logger
pub async fn new(config_path: impl AsRef<Path>) -> Result<(), Error> {
    let path = config_path.as_ref();
    config::init(path).await?;
    let config = config::CONFIG.get().ok_or(Error::Uninitialized)?;
    logger::init(config.log_level);
    log::info!("load config from {:?}", path);
    Ok(())
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("config have been set twice")]
    ConfigTwice,
    #[error("config is not loaded")]
    Uninitialized,
    #[error("config file {0:?} should not be symlink or folder")]
    NotAFile(PathBuf),
    #[error("unable to access config: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("unable to parse config: `{0}`")]
    Parse(#[from] toml::de::Error),
    #[error("unable to generate default config: `{0}`")]
    Generate(#[from] toml::ser::Error),
}
