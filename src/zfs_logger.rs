use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use crate::{command_error::CommandError, process_reactor::ProcessTermination};

pub const ZFS_ERROR: &str = "filesystem:zfs:error";

/// How a best-effort command failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    Exited(i32),
    Signaled(i32),
    Spawn { errno: Option<i32> },
    Io { errno: Option<i32> },
}

impl ErrorStatus {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exited(_) => "exited",
            Self::Signaled(_) => "signaled",
            Self::Spawn { .. } => "spawn",
            Self::Io { .. } => "io",
        }
    }

    /// Exit code, signal number or OS error number; -1 when none is known.
    pub fn code(&self) -> i32 {
        match *self {
            Self::Exited(code) | Self::Signaled(code) => code,
            Self::Spawn { errno } | Self::Io { errno } => errno.unwrap_or(-1),
        }
    }
}

impl Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.code())
    }
}

impl From<&CommandError> for ErrorStatus {
    fn from(error: &CommandError) -> Self {
        match error {
            CommandError::CommandFailed(failure) | CommandError::BadArguments(failure) => {
                Self::Exited(failure.exit_code)
            }
            CommandError::Process(ProcessTermination::Exited(code)) => Self::Exited(*code),
            CommandError::Process(ProcessTermination::Signaled(signal)) => Self::Signaled(*signal),
            CommandError::Process(ProcessTermination::Spawn(e)) => Self::Spawn {
                errno: e.raw_os_error(),
            },
            CommandError::Process(ProcessTermination::Io(e)) => Self::Io {
                errno: e.raw_os_error(),
            },
        }
    }
}

/// A `filesystem:zfs:error` log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZfsErrorRecord {
    pub status: ErrorStatus,
    /// The command line, argv joined with spaces.
    pub zfs_command: String,
    /// Whatever the command or the OS had to say about the failure. May be empty.
    pub output: String,
}

impl ZfsErrorRecord {
    pub fn new(zfs_command: String, error: &CommandError) -> Self {
        let output = match error {
            CommandError::CommandFailed(failure) | CommandError::BadArguments(failure) => {
                failure.diagnostic()
            }
            CommandError::Process(ProcessTermination::Spawn(e) | ProcessTermination::Io(e)) => {
                e.to_string()
            }
            CommandError::Process(termination) => termination.to_string(),
        };
        Self {
            status: error.into(),
            zfs_command,
            output,
        }
    }

    pub fn message_type(&self) -> &'static str {
        ZFS_ERROR
    }
}

/// Where the driver sends records about failures it doesn't propagate.
pub trait ZfsLogger {
    fn zfs_error(&self, record: ZfsErrorRecord);
}

/// Emits records as `tracing` events with target `filesystem:zfs:error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingZfsLogger;

impl ZfsLogger for TracingZfsLogger {
    fn zfs_error(&self, record: ZfsErrorRecord) {
        let ZfsErrorRecord {
            status,
            zfs_command,
            output,
        } = record;
        tracing::error!(
            target: "filesystem:zfs:error",
            status = status.code(),
            status_kind = status.kind(),
            zfs_command = %zfs_command,
            output = %output,
            "zfs command failed"
        );
    }
}

/// Keeps records in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryZfsLogger {
    records: Arc<Mutex<Vec<ZfsErrorRecord>>>,
}

impl MemoryZfsLogger {
    pub fn records(&self) -> Vec<ZfsErrorRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ZfsLogger for MemoryZfsLogger {
    fn zfs_error(&self, record: ZfsErrorRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
