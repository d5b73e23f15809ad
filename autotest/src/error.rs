#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Init(#[from] crate::init::Error),
    #[error("{0}")]
    Filesystem(#[from] crate::filesystem::Error),
    #[error("{0}")]
    Report(#[from] crate::report::Error),
    #[error("invalid job: `{0}`")]
    Job(#[from] serde_json::Error),
    #[error("unable to read job: `{0}`")]
    IO(#[from] std::io::Error),
}
