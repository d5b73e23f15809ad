//! Aggregation of script results and everything done with the final report
pub mod document;
pub mod sink;
pub mod store;

use thiserror::Error;

pub mod prelude {
    pub use super::document::{FinishedReport, RunReport};
    pub use super::sink::{HttpSink, Noop, Sink};
    pub use super::Error;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("reqwest error `{0}`")]
    Reqwest(#[from] reqwest::Error),
    #[error("report rejected with `{0}`")]
    Rejected(reqwest::StatusCode),
    #[error("IO error: `{0}`")]
    IO(#[from] std::io::Error),
}
