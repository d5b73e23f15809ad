use std::{process::ExitStatus, time::Duration};

/// What is left of a child after it exited or was killed
pub struct Corpse {
    /// exit status, `None` if the status could not be collected
    pub(super) code: Option<ExitStatus>,
    /// killed by the supervisor after the timeout
    pub(super) timed_out: bool,
    /// If the process is killed, the stdout may be incomplete(but ordered)
    pub(super) stdout: Vec<u8>,
    pub(super) stderr: Vec<u8>,
    pub(super) elapsed: Duration,
}

impl Corpse {
    /// whether the child exited by itself with status zero
    pub fn succeed(&self) -> bool {
        !self.timed_out && self.code.map(|x| x.success()).unwrap_or_default()
    }
}
