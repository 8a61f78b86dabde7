//! Subprocess execution primitives with consistent error handling.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

/// One external-tool invocation: program, argv, optional working
/// directory, and environment overrides applied on top of the current
/// process environment (overrides win on key collision).
///
/// Args are passed to the child exactly as given; there is no shell
/// interpretation anywhere in the pipeline.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn cwd(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Full command line, program and args space-joined, for log and
    /// error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Result of one completed subprocess: the command that ran, its exit
/// code, and its captured output with trailing whitespace trimmed.
#[derive(Debug, Clone)]
pub struct FinishedProcess {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl FinishedProcess {
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Executes external commands. The deploy steps take this as an
/// injected seam so orchestration can be tested without spawning the
/// real tools.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<FinishedProcess>;
}

/// Runner backed by `std::process::Command`, waiting for completion
/// and capturing both streams in full. Every command is attempted
/// exactly once; there are no timeouts and no retries.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<FinishedProcess> {
        debug!("executing command '{}'", spec.command_line());

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        // envs() layers on top of the inherited parent environment,
        // so overrides win on collision
        cmd.envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let output = cmd.output().map_err(|e| Error::LaunchFailed {
            program: spec.program.clone(),
            source: e,
        })?;

        let done = FinishedProcess {
            program: spec.program.clone(),
            args: spec.args.clone(),
            cwd: spec.cwd.clone(),
            exit_code: exit_code_of(&output.status),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        };

        debug!("stdout: {}", done.stdout);
        debug!("stderr: {}", done.stderr);

        if !output.status.success() {
            return Err(Error::CommandFailed { process: done });
        }

        Ok(done)
    }
}

/// Exit code of a finished child. A signal-killed child has no code;
/// report the conventional shell status 128+N so it still surfaces as
/// a failure instead of clamping to success.
fn exit_code_of(status: &std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{CommandRunner, CommandSpec, FinishedProcess};
    use crate::error::{Error, Result};

    pub fn finished(spec: &CommandSpec, exit_code: i32, stdout: &str) -> FinishedProcess {
        FinishedProcess {
            program: spec.program.clone(),
            args: spec.args.clone(),
            cwd: spec.cwd.clone(),
            exit_code,
            stdout: stdout.trim_end().to_string(),
            stderr: String::new(),
        }
    }

    /// Replays canned responses in order and records every spec it was
    /// asked to run.
    pub struct ScriptedRunner {
        pub calls: RefCell<Vec<CommandSpec>>,
        responses: RefCell<VecDeque<ScriptedResponse>>,
    }

    pub enum ScriptedResponse {
        Ok(String),
        Fail(i32),
        LaunchError,
    }

    impl ScriptedRunner {
        pub fn new<I>(responses: I) -> Self
        where
            I: IntoIterator<Item = ScriptedResponse>,
        {
            Self {
                calls: RefCell::new(Vec::new()),
                responses: RefCell::new(responses.into_iter().collect()),
            }
        }

        pub fn call_lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.command_line()).collect()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, spec: &CommandSpec) -> Result<FinishedProcess> {
            self.calls.borrow_mut().push(spec.clone());

            let response = self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(ScriptedResponse::Ok(String::new()));

            match response {
                ScriptedResponse::Ok(stdout) => Ok(finished(spec, 0, &stdout)),
                ScriptedResponse::Fail(code) => Err(Error::CommandFailed {
                    process: finished(spec, code, ""),
                }),
                ScriptedResponse::LaunchError => Err(Error::LaunchFailed {
                    program: spec.program.clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }
}
