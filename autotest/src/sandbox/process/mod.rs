mod corpse;
mod process;
mod result;

pub use process::Supervisor;
pub use result::ExecutionResult;
