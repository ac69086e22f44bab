use bytes::Bytes;
use thiserror::Error;

use crate::process_reactor::ProcessTermination;

/// What a command printed before it exited with a status the tool documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub exit_code: i32,
    pub stdout: Bytes,
    pub stderr: Bytes,
}

impl CommandFailure {
    /// The most useful text for a human: stderr, or stdout if the tool printed its error there.
    pub fn diagnostic(&self) -> String {
        let stderr = String::from_utf8_lossy(&self.stderr).trim().to_string();
        if stderr.is_empty() {
            String::from_utf8_lossy(&self.stdout).trim().to_string()
        } else {
            stderr
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// Exit status 1.
    #[error("command failed: {}", .0.diagnostic())]
    CommandFailed(CommandFailure),
    /// Exit status 2.
    #[error("invalid arguments: {}", .0.diagnostic())]
    BadArguments(CommandFailure),
    /// Any other way of not succeeding, as reported by the process reactor.
    #[error("command {0}")]
    Process(#[from] ProcessTermination),
}

pub const COMMAND_FAILED_EXIT_CODE: i32 = 1;
pub const BAD_ARGUMENTS_EXIT_CODE: i32 = 2;

impl CommandError {
    pub fn classify(termination: ProcessTermination, stdout: Bytes, stderr: Bytes) -> Self {
        match termination {
            ProcessTermination::Exited(COMMAND_FAILED_EXIT_CODE) => {
                Self::CommandFailed(CommandFailure {
                    exit_code: COMMAND_FAILED_EXIT_CODE,
                    stdout,
                    stderr,
                })
            }
            ProcessTermination::Exited(BAD_ARGUMENTS_EXIT_CODE) => {
                Self::BadArguments(CommandFailure {
                    exit_code: BAD_ARGUMENTS_EXIT_CODE,
                    stdout,
                    stderr,
                })
            }
            termination => Self::Process(termination),
        }
    }
}
