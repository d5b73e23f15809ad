pub mod engine;
pub mod error;
pub mod filesystem;
pub mod init;
pub mod job;
pub mod report;
pub mod sandbox;
#[cfg(test)]
mod test;

pub use error::Error;
