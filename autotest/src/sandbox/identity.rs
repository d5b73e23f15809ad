//! Run and signal processes as a (possibly different) OS identity
//!
//! The engine only talks to [`Switch`], so how the identity is switched
//! (direct signaling, `sudo`, ...) can be replaced per platform.
use std::{
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use rustix::{
    io::Errno,
    process::{kill_process_group, Pid, Signal},
};
use tokio::{process::Command, time};

use super::Error;

pub trait Switch {
    /// command that executes `program` as this identity
    fn command(&self, program: &Path) -> Command;
    /// `SIGKILL` the whole process group
    async fn kill_group(&self, pgid: Pid) -> Result<(), Error>;
    /// open permissions under `dir` and kill every process left by this identity
    async fn reclaim(&self, dir: &Path) -> Result<(), Error>;
    /// whether scripts run as someone else than the supervisor
    fn is_alternate(&self) -> bool;
}

/// Scripts run as the supervisor itself
#[derive(Debug, Default, Clone, Copy)]
pub struct Direct;

impl Switch for Direct {
    fn command(&self, program: &Path) -> Command {
        Command::new(program)
    }
    async fn kill_group(&self, pgid: Pid) -> Result<(), Error> {
        match kill_process_group(pgid, Signal::Kill) {
            // the group is already gone
            Ok(()) | Err(Errno::SRCH) => Ok(()),
            Err(err) => Err(Error::Kill(err.into())),
        }
    }
    async fn reclaim(&self, _dir: &Path) -> Result<(), Error> {
        Ok(())
    }
    fn is_alternate(&self) -> bool {
        false
    }
}

/// Scripts run as `user`, every command is re-executed through `sudo`
#[derive(Debug, Clone)]
pub struct Sudo {
    user: String,
    program: PathBuf,
    timeout: Duration,
}

impl Sudo {
    pub fn new(user: impl Into<String>, program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            user: user.into(),
            program: program.into(),
            timeout,
        }
    }
    fn as_user(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        // never wait for a password prompt
        cmd.arg("-n").arg("-u").arg(&self.user).arg("--");
        cmd
    }
    /// run a bookkeeping command as the identity, bounded by the timeout
    async fn exec(&self, mut cmd: Command) -> Result<ExitStatus, Error> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let output = time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| Error::SwitchTimeout(self.timeout))??;
        if !output.status.success() {
            log::debug!(
                "command as {} exit with {}: {}",
                self.user,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output.status)
    }
    /// `SIGKILL` every process owned by the identity
    async fn killall(&self) -> Result<ExitStatus, Error> {
        let mut cmd = self.as_user();
        cmd.arg("killall").arg("-KILL").arg("-u").arg(&self.user);
        self.exec(cmd).await
    }
}

impl Switch for Sudo {
    fn command(&self, program: &Path) -> Command {
        let mut cmd = self.as_user();
        cmd.arg(program);
        cmd
    }
    async fn kill_group(&self, pgid: Pid) -> Result<(), Error> {
        let mut cmd = self.as_user();
        cmd.arg("bash")
            .arg("-c")
            .arg(format!("kill -KILL -{}", pgid.as_raw_nonzero()));
        let status = self.exec(cmd).await?;
        if status.success() {
            return Ok(());
        }

        // with `use_pty` the script is outside the group of `sudo` and out of reach
        log::warn!(
            "group kill as {} exit with {}, kill every process of {}",
            self.user,
            status,
            self.user
        );
        match self.killall().await? {
            fallback if fallback.success() => Ok(()),
            _ => Err(Error::Switch(status)),
        }
    }
    async fn reclaim(&self, dir: &Path) -> Result<(), Error> {
        let mut chmod = self.as_user();
        chmod.arg("chmod").arg("-Rf").arg("ugo+rwX").arg(dir);
        let chmod = self.exec(chmod).await;

        // non-zero when nothing is left, which is the common case
        self.killall().await?;

        match chmod? {
            status if status.success() => Ok(()),
            status => Err(Error::Switch(status)),
        }
    }
    fn is_alternate(&self) -> bool {
        true
    }
}
