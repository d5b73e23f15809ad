//! Input of a single test run, as handed over by the job queue
use std::{ffi::OsString, fmt::Display, path::PathBuf, time::Duration};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One test script, executed in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSpec {
    #[serde(alias = "file_name")]
    pub name: String,
    #[serde(with = "seconds")]
    pub timeout: Duration,
}

impl ScriptSpec {
    pub fn new(name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            timeout,
        }
    }
    /// human readable timeout, in seconds
    pub fn timeout_display(&self) -> impl Display {
        Seconds(self.timeout)
    }
}

struct Seconds(Duration);

impl Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.subsec_nanos() {
            0 => write!(f, "{}", self.0.as_secs()),
            _ => write!(f, "{}", self.0.as_secs_f64()),
        }
    }
}

mod seconds {
    use super::*;

    pub fn serialize<S: Serializer>(dur: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        match dur.subsec_nanos() {
            0 => ser.serialize_u64(dur.as_secs()),
            _ => ser.serialize_f64(dur.as_secs_f64()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(de)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Opaque values passed verbatim to every script
///
/// They also key the persisted artifacts and address the reporting sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    pub address: String,
    pub user_api_key: String,
    pub server_api_key: String,
    pub assignment_id: i64,
    pub group_id: i64,
    pub group_repo_name: String,
    #[serde(default)]
    pub submission_id: Option<i64>,
}

impl RunContext {
    /// positional arguments of every script invocation
    pub fn positional_args(&self) -> Vec<OsString> {
        vec![
            OsString::from(&self.address),
            OsString::from(&self.user_api_key),
            OsString::from(self.assignment_id.to_string()),
            OsString::from(self.group_id.to_string()),
            OsString::from(&self.group_repo_name),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct Job {
    pub scripts: Vec<ScriptSpec>,
    pub working_dir: PathBuf,
    #[serde(default)]
    #[builder(default)]
    pub test_username: Option<String>,
    pub context: RunContext,
}

impl Job {
    pub fn from_json(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}
