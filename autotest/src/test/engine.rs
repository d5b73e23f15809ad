use std::{fs, path::PathBuf, sync::Mutex, time::Duration};

use tempfile::TempDir;

use super::*;
use crate::{
    engine::{Engine, Settings},
    filesystem,
    job::{Job, JobBuilder, ScriptSpec},
    report::{prelude::*, Error as ReportError},
    Error,
};

#[derive(Default)]
struct Recorder(Mutex<Vec<(RunContext, FinishedReport)>>);

impl Sink for Recorder {
    async fn deliver(&self, ctx: &RunContext, report: &FinishedReport) -> Result<(), ReportError> {
        self.0.lock().unwrap().push((ctx.clone(), report.clone()));
        Ok(())
    }
}

impl Recorder {
    fn take(&self) -> Vec<(RunContext, FinishedReport)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

struct Refuse;

impl Sink for Refuse {
    async fn deliver(&self, _: &RunContext, _: &FinishedReport) -> Result<(), ReportError> {
        Err(ReportError::IO(std::io::ErrorKind::ConnectionRefused.into()))
    }
}

/// scratch area, the working dir lives inside so its removal is observable
struct Scratch {
    root: TempDir,
}

impl Scratch {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("tests")).unwrap();
        Self { root }
    }
    fn workdir(&self) -> PathBuf {
        self.root.path().join("tests")
    }
    fn results(&self) -> PathBuf {
        self.root.path().join("results")
    }
    fn job(&self, scripts: Vec<ScriptSpec>) -> Job {
        JobBuilder::default()
            .scripts(scripts)
            .working_dir(self.workdir())
            .context(context())
            .build()
            .unwrap()
    }
}

fn engine(results: Option<PathBuf>) -> Engine {
    Engine::new(Settings {
        results,
        ..Default::default()
    })
}

#[tokio::test]
async fn single_script() {
    let scratch = Scratch::new();
    // staging adds the execute bit
    script(&scratch.workdir(), "t1", "sleep 1\nprintf ok", false);
    fs::write(scratch.workdir().join("submission.py"), "print(1)").unwrap();
    let job = scratch.job(vec![ScriptSpec::new("t1", Duration::from_secs(5))]);
    let sink = Recorder::default();

    let report = engine(Some(scratch.results()))
        .run(&job, &sink)
        .await
        .unwrap();

    assert_eq!(report.scripts, vec!["t1"]);
    assert_eq!(report.timed_out, vec![false]);
    assert!(report.document.starts_with("<testrun>\n<test_script>\n  <file_name>t1</file_name>"));
    assert!(report.document.ends_with("  ok\n</test_script>\n</testrun>"));
    assert_eq!(report.errors, None);

    let delivered = sink.take();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, context());
    assert_eq!(delivered[0].1, report);

    assert!(!scratch.workdir().exists());

    let run_dir = fs::read_dir(scratch.results().join("http:__host/a3/g4/s5"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    assert_eq!(
        fs::read_to_string(run_dir.join("output.txt")).unwrap(),
        report.document
    );
    assert!(!run_dir.join("errors.txt").exists());
}

#[tokio::test]
async fn timeout_then_success() {
    let scratch = Scratch::new();
    let pid_file = scratch.root.path().join("slow.pid");
    script(
        &scratch.workdir(),
        "slow",
        &format!("sleep 10 &\necho $! > {}\nsleep 10", pid_file.display()),
        false,
    );
    script(&scratch.workdir(), "fast", "echo '<test>pass</test>'", false);
    let job = scratch.job(vec![
        ScriptSpec::new("slow", Duration::from_secs(1)),
        ScriptSpec::new("fast", Duration::from_secs(5)),
    ]);
    let sink = Recorder::default();

    let report = engine(None).run(&job, &sink).await.unwrap();

    assert_eq!(report.scripts, vec!["slow", "fast"]);
    assert_eq!(report.timed_out, vec![true, false]);
    let slow = report.document.find("<file_name>slow</file_name>").unwrap();
    let fast = report.document.find("<file_name>fast</file_name>").unwrap();
    assert!(slow < fast);
    assert_eq!(report.document.matches("seconds timeout expired").count(), 1);
    assert!(report.document.contains("<test>pass</test>"));
    assert_eq!(report.errors, None);

    assert_eq!(sink.take().len(), 1);
    assert!(wait_dead(read_pid(&pid_file), Duration::from_secs(2)).await);
}

#[tokio::test]
async fn spawn_failure_continues() {
    let scratch = Scratch::new();
    script(&scratch.workdir(), "t2", "echo second\necho warn >&2", false);
    let job = scratch.job(vec![
        ScriptSpec::new("missing", Duration::from_secs(5)),
        ScriptSpec::new("t2", Duration::from_secs(5)),
    ]);
    let sink = Recorder::default();

    let report = engine(None).run(&job, &sink).await.unwrap();

    assert_eq!(report.scripts, vec!["missing", "t2"]);
    assert!(report.document.contains("<file_name>missing</file_name>"));
    assert!(report.document.contains("second"));
    let errors = report.errors.unwrap();
    assert!(errors.starts_with("missing: unable to start"));
    assert!(errors.ends_with("warn"));
}

#[tokio::test]
async fn no_scripts() {
    let scratch = Scratch::new();
    let sink = Recorder::default();

    let report = engine(None)
        .run(&scratch.job(Vec::new()), &sink)
        .await
        .unwrap();

    assert_eq!(report.document, "<testrun>\n</testrun>");
    assert_eq!(sink.take().len(), 1);
    assert!(!scratch.workdir().exists());
}

#[tokio::test]
async fn staging_failure_is_fatal() {
    let scratch = Scratch::new();
    let mut job = scratch.job(vec![ScriptSpec::new("t1", Duration::from_secs(5))]);
    job.working_dir = scratch.root.path().join("never-created");
    let sink = Recorder::default();

    let result = engine(Some(scratch.results())).run(&job, &sink).await;

    assert!(matches!(
        result,
        Err(Error::Filesystem(filesystem::Error::Staging { .. }))
    ));
    assert!(sink.take().is_empty());
    assert!(!scratch.results().exists());
}

#[tokio::test]
async fn sink_failure_is_not_fatal() {
    let scratch = Scratch::new();
    script(&scratch.workdir(), "t1", "printf ok", false);
    let job = scratch.job(vec![ScriptSpec::new("t1", Duration::from_secs(5))]);

    let report = engine(None).run(&job, &Refuse).await.unwrap();

    assert_eq!(report.scripts, vec!["t1"]);
    assert!(!scratch.workdir().exists());
}
