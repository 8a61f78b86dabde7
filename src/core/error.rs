use std::path::PathBuf;

use thiserror::Error;

use crate::command::FinishedProcess;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{}' has non-zero return code {}", .process.command_line(), .process.exit_code)]
    CommandFailed { process: FinishedProcess },

    #[error("failed to load environment config '{}': {reason}", .path.display())]
    ConfigLoad { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::LaunchFailed { .. } => "LAUNCH_FAILED",
            Error::CommandFailed { .. } => "COMMAND_FAILED",
            Error::ConfigLoad { .. } => "CONFIG_LOAD_FAILED",
        }
    }

    /// Process exit status for this error.
    ///
    /// A failed external command propagates its own exit code so the
    /// caller can tell which tool failed; everything else maps to 1.
    /// A non-positive stored code would read as success once clamped
    /// to the u8 exit range, so it is floored at 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { process } if process.exit_code > 0 => process.exit_code,
            _ => 1,
        }
    }
}
