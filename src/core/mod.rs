// Public modules
pub mod command;
pub mod config;
pub mod deploy;
pub mod error;
pub mod git;
pub mod image;
pub mod provision;

// Re-export common types for convenience
pub use command::{CommandRunner, CommandSpec, FinishedProcess, SystemRunner};
pub use error::{Error, Result};
