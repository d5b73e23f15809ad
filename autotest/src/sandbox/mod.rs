pub(super) mod capture;
pub(super) mod identity;
pub(super) mod process;

use std::{process::ExitStatus, time::Duration};

use thiserror::Error;

pub mod prelude {
    pub use super::identity::{Direct, Sudo, Switch};
    pub use super::process::{ExecutionResult, Supervisor};
    pub use super::Error;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: `{0}`")]
    IO(#[from] std::io::Error),
    #[error("Fail to signal process group: `{0}`")]
    Kill(std::io::Error),
    #[error("Command as test identity exit with {0}")]
    Switch(ExitStatus),
    #[error("Command as test identity does not finish within {0:?}")]
    SwitchTimeout(Duration),
}
