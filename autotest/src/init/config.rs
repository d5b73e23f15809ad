use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{fs, sync::OnceCell};

use super::Error;

pub static CONFIG: OnceCell<GlobalConfig> = OnceCell::const_new();

pub static CONFIG_PATH: &str = "config/config.toml";

// config
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub log_level: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Runtime {
    /// root of persisted output, nothing is persisted if unset
    #[serde(default)]
    pub results: Option<PathBuf>,
    pub drain_grace_ms: u64,
    pub reap_grace_ms: u64,
}

impl Runtime {
    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
    pub fn reap_grace(&self) -> Duration {
        Duration::from_millis(self.reap_grace_ms)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            results: None,
            drain_grace_ms: 100,
            reap_grace_ms: 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    pub sudo: PathBuf,
    pub command_timeout_ms: u64,
}

impl Identity {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            sudo: PathBuf::from("sudo"),
            command_timeout_ms: 10 * 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Report {
    pub enabled: bool,
    pub auth_scheme: String,
    pub timeout_ms: u64,
}

impl Report {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_scheme: "MarkUsAuth".to_owned(),
            timeout_ms: 30 * 1000,
        }
    }
}

async fn load(path: &Path) -> Result<GlobalConfig, Error> {
    match fs::metadata(path).await {
        Ok(meta) if !meta.is_file() => Err(Error::NotAFile(path.to_path_buf())),
        Ok(_) => {
            let raw = fs::read_to_string(path).await?;
            Ok(toml::from_str(&raw)?)
        }
        Err(_) => {
            // logger is not ready yet
            eprintln!("Unable to find {:?}, generating default config", path);

            let config = GlobalConfig::default();
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir).await?;
            }
            fs::write(path, toml::to_string(&config)?).await?;

            Ok(config)
        }
    }
}

pub async fn init(path: impl AsRef<Path>) -> Result<(), Error> {
    if CONFIG.get().is_some() {
        return Err(Error::ConfigTwice);
    }
    let config = load(path.as_ref()).await?;
    CONFIG.set(config).map_err(|_| Error::ConfigTwice)
}
