//! One test run: stage, execute every script, report, clean up
use std::{path::PathBuf, time::Duration};

use crate::{
    filesystem::{permission, workdir},
    init::config::GlobalConfig,
    job::Job,
    report::{prelude::*, store},
    sandbox::prelude::*,
    Error,
};

/// Knobs of the engine, copied out of the global config
#[derive(Debug, Clone)]
pub struct Settings {
    pub results: Option<PathBuf>,
    pub drain_grace: Duration,
    pub reap_grace: Duration,
    pub sudo: PathBuf,
    pub command_timeout: Duration,
}

impl From<&GlobalConfig> for Settings {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            results: config.runtime.results.clone(),
            drain_grace: config.runtime.drain_grace(),
            reap_grace: config.runtime.reap_grace(),
            sudo: config.identity.sudo.clone(),
            command_timeout: config.identity.command_timeout(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&GlobalConfig::default())
    }
}

pub struct Engine {
    settings: Settings,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
    /// Run `job` as its test identity, or as ourself if it has none
    pub async fn run(&self, job: &Job, sink: &impl Sink) -> Result<FinishedReport, Error> {
        match &job.test_username {
            Some(user) => {
                let switch = Sudo::new(
                    user.as_str(),
                    &self.settings.sudo,
                    self.settings.command_timeout,
                );
                self.run_as(switch, job, sink).await
            }
            None => self.run_as(Direct, job, sink).await,
        }
    }
    /// Only a staging failure is returned, in which case nothing ran
    /// and nothing is reported.
    pub async fn run_as<S: Switch>(
        &self,
        switch: S,
        job: &Job,
        sink: &impl Sink,
    ) -> Result<FinishedReport, Error> {
        let supervisor = Supervisor::new(switch, &job.working_dir, job.context.positional_args())
            .drain_grace(self.settings.drain_grace)
            .reap_grace(self.settings.reap_grace);

        let names: Vec<String> = job.scripts.iter().map(|x| x.name.clone()).collect();
        if let Err(err) = permission::stage(&job.working_dir, &names).await {
            log::error!("{}, abort before running any script", err);
            workdir::reclaim(supervisor.switch(), &job.working_dir).await;
            return Err(err.into());
        }
        log::info!("{:?} staged, {} scripts to run", job.working_dir, names.len());

        let mut report = RunReport::new();
        for script in &job.scripts {
            let result = supervisor.run(script).await;
            log::info!(
                "{} finished in {}ms{}",
                script.name,
                result.duration.as_millis(),
                if result.timed_out { ", timed out" } else { "" }
            );
            report.push(result);
        }
        let report = report.finish();

        if let Some(root) = &self.settings.results {
            let dir = store::results_dir(
                root,
                &job.context,
                chrono::Utc::now().timestamp_millis(),
                std::process::id(),
            );
            match store::persist(&dir, &report).await {
                Ok(()) => log::info!("results stored in {:?}", dir),
                Err(err) => log::warn!("Fail storing results in {:?}: {}", dir, err),
            }
        }

        workdir::reclaim(supervisor.switch(), &job.working_dir).await;

        if let Err(err) = sink.deliver(&job.context, &report).await {
            log::error!("Fail delivering report: {}", err);
        }
        Ok(report)
    }
}
