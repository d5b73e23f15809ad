use std::{fmt::Display, time::Duration};

use crate::job::ScriptSpec;

use super::corpse::Corpse;

/// marks the output a script printed before it was killed
pub const PARTIAL_MARKER: &str = "\n\n[TEST RESULTS BEFORE TIMEOUT OCCURED]:\n";

/// Outcome of exactly one script
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub script: ScriptSpec,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
    pub timed_out: bool,
}

fn timeout_block(script: &ScriptSpec) -> Vec<u8> {
    format!(
        "<test>
  <name>All tests</name>
  <input></input>
  <expected></expected>
  <actual>{} seconds timeout expired</actual>
  <marks_earned>0</marks_earned>
  <marks_total>0</marks_total>
  <status>error</status>
</test>",
        script.timeout_display()
    )
    .into_bytes()
}

impl ExecutionResult {
    pub(super) fn from_corpse(script: ScriptSpec, corpse: Corpse) -> Self {
        if !corpse.timed_out {
            return Self {
                script,
                stdout: corpse.stdout,
                stderr: corpse.stderr,
                duration: corpse.elapsed,
                timed_out: false,
            };
        }

        let mut stderr = corpse.stderr;
        if !corpse.stdout.is_empty() {
            stderr.extend_from_slice(PARTIAL_MARKER.as_bytes());
            stderr.extend_from_slice(&corpse.stdout);
        }
        Self {
            stdout: timeout_block(&script),
            script,
            stderr,
            duration: corpse.elapsed,
            timed_out: true,
        }
    }
    /// the script never started, the reason goes to the error log
    pub(super) fn unspawned(script: ScriptSpec, duration: Duration, reason: impl Display) -> Self {
        Self {
            stderr: format!("{}: unable to start: {}\n", script.name, reason).into_bytes(),
            script,
            stdout: Vec::new(),
            duration,
            timed_out: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn corpse(timed_out: bool, stdout: &[u8], stderr: &[u8]) -> Corpse {
        Corpse {
            code: None,
            timed_out,
            stdout: stdout.to_vec(),
            stderr: stderr.to_vec(),
            elapsed: Duration::from_millis(1234),
        }
    }

    #[test]
    fn exited_is_untouched() {
        let script = ScriptSpec::new("t1", Duration::from_secs(5));
        let result = ExecutionResult::from_corpse(script.clone(), corpse(false, b"ok", b"warn"));
        assert_eq!(result.stdout, b"ok");
        assert_eq!(result.stderr, b"warn");
        assert!(!result.timed_out);
        assert_eq!(result.script, script);
    }

    #[test]
    fn timeout_relocates_partial() {
        let script = ScriptSpec::new("t2", Duration::from_secs(1));
        let result = ExecutionResult::from_corpse(script, corpse(true, b"<test>half", b"err"));
        assert!(result.timed_out);

        let stdout = String::from_utf8(result.stdout).unwrap();
        assert!(stdout.contains("<actual>1 seconds timeout expired</actual>"));
        assert!(stdout.contains("<marks_earned>0</marks_earned>"));
        assert!(stdout.contains("<status>error</status>"));
        assert_eq!(
            result.stderr,
            [b"err".as_slice(), PARTIAL_MARKER.as_bytes(), b"<test>half"].concat()
        );
    }

    #[test]
    fn timeout_without_output() {
        let script = ScriptSpec::new("t2", Duration::from_secs(3));
        let result = ExecutionResult::from_corpse(script, corpse(true, b"", b""));
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn unspawned_reports_reason() {
        let script = ScriptSpec::new("missing.sh", Duration::from_secs(3));
        let result = ExecutionResult::unspawned(script, Duration::ZERO, "No such file");
        assert!(result.stdout.is_empty());
        assert!(!result.timed_out);
        assert_eq!(
            String::from_utf8(result.stderr).unwrap(),
            "missing.sh: unable to start: No such file\n"
        );
    }
}
