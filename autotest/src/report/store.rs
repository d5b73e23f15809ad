use std::path::{Path, PathBuf};

use tokio::fs;

use super::{document::FinishedReport, Error};
use crate::job::RunContext;

/// `root/<address>/a<assignment>/g<group>/s<submission>/run_<ms>_<pid>`
pub fn results_dir(root: &Path, ctx: &RunContext, timestamp_ms: i64, pid: u32) -> PathBuf {
    let submission = ctx
        .submission_id
        .map(|x| x.to_string())
        .unwrap_or_default();
    root.join(ctx.address.replace('/', "_"))
        .join(format!("a{}", ctx.assignment_id))
        .join(format!("g{}", ctx.group_id))
        .join(format!("s{}", submission))
        .join(format!("run_{}_{}", timestamp_ms, pid))
}

/// write `output.txt`, and `errors.txt` if there are errors
pub async fn persist(dir: &Path, report: &FinishedReport) -> Result<(), Error> {
    fs::create_dir_all(dir).await?;
    fs::write(dir.join("output.txt"), &report.document).await?;
    if let Some(errors) = &report.errors {
        fs::write(dir.join("errors.txt"), errors).await?;
    }
    Ok(())
}
