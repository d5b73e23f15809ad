use std::{path::PathBuf, process::ExitCode};

use autotest::{
    engine::{Engine, Settings},
    init::{self, config::CONFIG},
    job::Job,
    report::prelude::*,
    Error,
};
use clap::Parser;
use tokio::io::AsyncReadExt;

#[derive(Debug, Parser)]
#[command(version, about = "Run test scripts against a submission and report the results")]
struct Cli {
    /// config file, generated with default values if missing
    #[arg(long, env = "CONFIG_PATH", default_value = init::config::CONFIG_PATH)]
    config: PathBuf,
    /// job description (JSON), read from stdin if omitted or `-`
    job: Option<PathBuf>,
}

async fn read_job(path: Option<PathBuf>) -> Result<Job, Error> {
    let raw = match path {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read(path).await?,
        _ => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };
    Ok(Job::from_json(&raw)?)
}

async fn run(cli: Cli) -> Result<(), Error> {
    init::new(&cli.config).await?;
    let config = CONFIG.get().ok_or(init::Error::Uninitialized)?;

    let job = read_job(cli.job).await?;
    init::check::init(config, job.test_username.as_deref());

    let engine = Engine::new(Settings::from(config));
    let report = match config.report.enabled {
        true => {
            let sink = HttpSink::new(config.report.auth_scheme.as_str(), config.report.timeout())?;
            engine.run(&job, &sink).await?
        }
        false => engine.run(&job, &Noop).await?,
    };

    log::info!(
        "run finished, {} scripts, {} timed out",
        report.scripts.len(),
        report.timed_out.iter().filter(|x| **x).count()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("autotest: {}", err);
            ExitCode::FAILURE
        }
    }
}
