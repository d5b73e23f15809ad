use std::{
    ffi::OsString,
    path::PathBuf,
    process::Stdio,
    time::Duration,
};

use rustix::process::Pid;
use tokio::{
    process::*,
    time::{self, Instant},
};

use super::{corpse::Corpse, result::ExecutionResult};
use crate::{
    job::ScriptSpec,
    sandbox::{capture::Capture, identity::Switch, Error},
};

/// Runs scripts of one working directory, one at a time
pub struct Supervisor<S: Switch> {
    switch: S,
    workdir: PathBuf,
    args: Vec<OsString>,
    drain_grace: Duration,
    reap_grace: Duration,
}

impl<S: Switch> Supervisor<S> {
    /// a relative `workdir` is resolved against the current directory
    pub fn new(switch: S, workdir: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        let workdir = workdir.into();
        Self {
            switch,
            // the child changes into `workdir` before the script path is resolved
            workdir: std::path::absolute(&workdir).unwrap_or(workdir),
            args,
            drain_grace: Duration::from_millis(100),
            reap_grace: Duration::from_secs(1),
        }
    }
    /// how long pipes are drained after the child exited by itself
    pub fn drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }
    /// how long to wait for a killed child to be reaped
    pub fn reap_grace(mut self, grace: Duration) -> Self {
        self.reap_grace = grace;
        self
    }
    pub fn switch(&self) -> &S {
        &self.switch
    }
    /// spawn a raw process in its own process group
    fn spawn_raw_process(&self, script: &ScriptSpec) -> Result<Child, Error> {
        let program = self.workdir.join(&script.name);
        let mut cmd = self.switch.command(&program);
        cmd.args(&self.args)
            .current_dir(&self.workdir)
            .process_group(0)
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("spawn process {:?}", program);
        Ok(cmd.spawn()?)
    }
    /// run one script to completion or until its timeout
    ///
    /// Never fails, a script that cannot start still has a result.
    pub async fn run(&self, script: &ScriptSpec) -> ExecutionResult {
        let start = Instant::now();
        match self.spawn_raw_process(script) {
            Ok(child) => {
                let corpse = self.wait(child, script, start).await;
                if !corpse.succeed() {
                    log::debug!("{} exit with {:?}", script.name, corpse.code);
                }
                ExecutionResult::from_corpse(script.clone(), corpse)
            }
            Err(err) => {
                log::warn!("Fail spawning {}: {}", script.name, err);
                ExecutionResult::unspawned(script.clone(), start.elapsed(), err)
            }
        }
    }
    async fn wait(&self, mut process: Child, script: &ScriptSpec, start: Instant) -> Corpse {
        let pgid = process.id().and_then(|id| Pid::from_raw(id as i32));

        // attach readers before anything else
        let stdout = Capture::spawn(process.stdout.take());
        let stderr = Capture::spawn(process.stderr.take());

        let code = tokio::select! {
            x = process.wait() => Some(x),
            _ = time::sleep(script.timeout) => None,
        };

        match code {
            Some(code) => {
                let (stdout, stderr) = tokio::join!(
                    stdout.finish(self.drain_grace),
                    stderr.finish(self.drain_grace)
                );
                Corpse {
                    code: code.map_err(|err| log::warn!("Fail waiting child: {}", err)).ok(),
                    timed_out: false,
                    stdout,
                    stderr,
                    elapsed: start.elapsed(),
                }
            }
            None => {
                // freeze first, nothing printed after the deadline counts
                let stdout = stdout.freeze();
                let stderr = stderr.freeze();

                log::warn!(
                    "{} is still running after {:?}, kill process group",
                    script.name,
                    script.timeout
                );
                if let Some(pgid) = pgid {
                    if let Err(err) = self.switch.kill_group(pgid).await {
                        log::warn!("Fail killing process group of {}: {}", script.name, err);
                    }
                }
                // the leader itself, only effective under the same identity
                process.start_kill().ok();
                let code = match time::timeout(self.reap_grace, process.wait()).await {
                    Ok(code) => code.ok(),
                    Err(_) => {
                        log::warn!("{} is not reaped after {:?}", script.name, self.reap_grace);
                        None
                    }
                };
                Corpse {
                    code,
                    timed_out: true,
                    stdout,
                    stderr,
                    elapsed: start.elapsed(),
                }
            }
        }
    }
}
