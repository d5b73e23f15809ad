use std::time::Duration;

use reqwest::{header, Client};

use super::{document::FinishedReport, Error};
use crate::job::RunContext;

/// Receiver of the finished report, called once per run
pub trait Sink {
    async fn deliver(&self, ctx: &RunContext, report: &FinishedReport) -> Result<(), Error>;
}

/// Reporting is disabled
pub struct Noop;

impl Sink for Noop {
    async fn deliver(&self, _ctx: &RunContext, _report: &FinishedReport) -> Result<(), Error> {
        log::debug!("reporting disabled, drop report");
        Ok(())
    }
}

/// Post the report back to the address the job came from
pub struct HttpSink {
    client: Client,
    auth_scheme: String,
}

impl HttpSink {
    pub fn new(auth_scheme: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            auth_scheme: auth_scheme.into(),
        })
    }
}

fn endpoint(ctx: &RunContext) -> String {
    format!(
        "{}/api/assignments/{}/groups/{}/test_script_results",
        ctx.address.trim_end_matches('/'),
        ctx.assignment_id,
        ctx.group_id
    )
}

/// form body, optional fields are left out rather than sent empty
fn form(ctx: &RunContext, report: &FinishedReport) -> Vec<(&'static str, String)> {
    let mut form = vec![("requested_by", ctx.user_api_key.clone())];
    form.extend(
        report
            .scripts
            .iter()
            .map(|name| ("test_scripts[]", name.clone())),
    );
    form.push(("test_output", report.document.clone()));
    if let Some(errors) = &report.errors {
        form.push(("test_errors", errors.clone()));
    }
    if let Some(submission_id) = ctx.submission_id {
        form.push(("submission_id", submission_id.to_string()));
    }
    form
}

impl Sink for HttpSink {
    async fn deliver(&self, ctx: &RunContext, report: &FinishedReport) -> Result<(), Error> {
        let url = endpoint(ctx);
        log::debug!("deliver report to {}", url);
        let res = self
            .client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("{} {}", self.auth_scheme, ctx.server_api_key),
            )
            .header(header::ACCEPT, "application/json")
            .form(&form(ctx, report))
            .send()
            .await?;

        match res.status() {
            status if status.is_success() => Ok(()),
            status => Err(Error::Rejected(status)),
        }
    }
}
