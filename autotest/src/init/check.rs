use std::path::{Path, PathBuf};

use super::config::GlobalConfig;

fn locate(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    })
}

// Check if the environment is able to isolate scripts as requested
//
// none of the findings is fatal, they only degrade isolation
pub fn init(config: &GlobalConfig, test_username: Option<&str>) {
    let uid = rustix::process::getuid();

    match test_username {
        None if uid.is_root() => {
            log::warn!("no test identity is given, test scripts will run as root");
        }
        None => {}
        Some(user) => {
            if locate(&config.identity.sudo).is_none() {
                log::warn!(
                    "{:?} is not found, scripts cannot be switched to user {}",
                    config.identity.sudo,
                    user
                );
            }
        }
    }

    if config.runtime.drain_grace_ms == 0 {
        log::warn!("config.runtime.drain_grace_ms is 0, output written right before exit may be lost");
    }
}
