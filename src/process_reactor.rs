use std::{
    ffi::OsString,
    io,
    os::unix::process::ExitStatusExt,
    process::{ExitStatus, Stdio},
};

use bytes::Bytes;
use futures::{stream, StreamExt};
use thiserror::Error;
use tokio::{process::Command, sync::mpsc};
use tokio_util::io::ReaderStream;

pub const STDOUT: u32 = 1;
pub const STDERR: u32 = 2;

/// Everything a spawned process reports back, in the order it happened.
#[derive(Debug)]
pub enum ProcessEvent {
    ChildData { fd: u32, data: Bytes },
    /// Always the last event. `Ok` means the process exited with status 0.
    Ended(Result<(), ProcessTermination>),
}

/// Why a process did not exit successfully.
#[derive(Debug, Error)]
pub enum ProcessTermination {
    #[error("exited with status {0}")]
    Exited(i32),
    #[error("killed by signal {0}")]
    Signaled(i32),
    #[error("could not be started: {0}")]
    Spawn(#[source] io::Error),
    #[error("failed while running: {0}")]
    Io(#[source] io::Error),
}

impl ProcessTermination {
    pub fn from_exit_status(status: ExitStatus) -> Result<(), Self> {
        match (status.code(), status.signal()) {
            (Some(0), _) => Ok(()),
            (Some(code), _) => Err(Self::Exited(code)),
            (None, Some(signal)) => Err(Self::Signaled(signal)),
            // Neither a code nor a signal only happens for stopped processes, which we never wait for
            (None, None) => Err(Self::Io(io::Error::other(format!(
                "unexpected exit status: {status}"
            )))),
        }
    }
}

pub type ProcessEvents = mpsc::UnboundedReceiver<ProcessEvent>;

/// Starts processes and reports what they do as [`ProcessEvent`]s.
///
/// `args` is the full argv, so `args[0]` is conventionally `executable`. The child gets exactly
/// `env` as its environment.
pub trait ProcessReactor {
    fn spawn_process(
        &self,
        executable: &str,
        args: Vec<String>,
        env: Vec<(OsString, OsString)>,
    ) -> ProcessEvents;
}

/// Spawns real processes with [`tokio::process`]. Must be called from within a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessReactor;

impl ProcessReactor for TokioProcessReactor {
    fn spawn_process(
        &self,
        executable: &str,
        args: Vec<String>,
        env: Vec<(OsString, OsString)>,
    ) -> ProcessEvents {
        let (sender, receiver) = mpsc::unbounded_channel();
        let child = Command::new(executable)
            .args(args.iter().skip(1))
            .env_clear()
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        match child {
            Ok(child) => {
                tokio::spawn(pump_child(child, sender));
            }
            Err(e) => {
                let _ = sender.send(ProcessEvent::Ended(Err(ProcessTermination::Spawn(e))));
            }
        }
        receiver
    }
}

async fn pump_child(mut child: tokio::process::Child, sender: mpsc::UnboundedSender<ProcessEvent>) {
    let stdout = child
        .stdout
        .take()
        .map(|stdout| ReaderStream::new(stdout).map(|chunk| (STDOUT, chunk)).boxed());
    let stderr = child
        .stderr
        .take()
        .map(|stderr| ReaderStream::new(stderr).map(|chunk| (STDERR, chunk)).boxed());
    let mut output = stream::select(
        stdout.unwrap_or_else(|| stream::empty().boxed()),
        stderr.unwrap_or_else(|| stream::empty().boxed()),
    );
    let mut read_error = None;
    while let Some((fd, chunk)) = output.next().await {
        match chunk {
            Ok(data) => {
                // The receiver may have been dropped, but the child still has to be reaped
                let _ = sender.send(ProcessEvent::ChildData { fd, data });
            }
            Err(e) => {
                read_error = Some(e);
                break;
            }
        }
    }
    drop(output);
    let result = match (child.wait().await, read_error) {
        (Err(e), _) | (Ok(_), Some(e)) => Err(ProcessTermination::Io(e)),
        (Ok(status), None) => ProcessTermination::from_exit_status(status),
    };
    let _ = sender.send(ProcessEvent::Ended(result));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut events: ProcessEvents) -> (Vec<u8>, Vec<u8>, Result<(), ProcessTermination>) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                ProcessEvent::ChildData { fd: STDOUT, data } => stdout.extend_from_slice(&data),
                ProcessEvent::ChildData { data, .. } => stderr.extend_from_slice(&data),
                ProcessEvent::Ended(result) => return (stdout, stderr, result),
            }
        }
        panic!("events ended without a termination");
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[tokio::test]
    async fn reports_output_then_success() {
        let events = TokioProcessReactor.spawn_process(
            "sh",
            sh("printf abc; printf oops >&2; printf def"),
            std::env::vars_os().collect(),
        );
        let (stdout, stderr, result) = collect(events).await;
        assert_eq!(stdout, b"abcdef");
        assert_eq!(stderr, b"oops");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn reports_exit_code() {
        let events =
            TokioProcessReactor.spawn_process("sh", sh("exit 99"), std::env::vars_os().collect());
        let (_, _, result) = collect(events).await;
        assert!(matches!(result, Err(ProcessTermination::Exited(99))));
    }

    #[tokio::test]
    async fn reports_signal() {
        let events =
            TokioProcessReactor.spawn_process("sh", sh("kill -9 $$"), std::env::vars_os().collect());
        let (_, _, result) = collect(events).await;
        assert!(matches!(result, Err(ProcessTermination::Signaled(9))));
    }

    #[tokio::test]
    async fn reports_spawn_failure() {
        let events = TokioProcessReactor.spawn_process(
            "nonsense garbage made up no such command",
            vec!["nonsense garbage made up no such command".into()],
            std::env::vars_os().collect(),
        );
        let (stdout, _, result) = collect(events).await;
        assert!(stdout.is_empty());
        match result {
            Err(ProcessTermination::Spawn(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected a spawn failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn passes_environment_verbatim() {
        let events = TokioProcessReactor.spawn_process(
            "/bin/sh",
            sh("printf %s \"$SNAPSHOT_TEST_VAR\""),
            vec![("SNAPSHOT_TEST_VAR".into(), "hello".into())],
        );
        let (stdout, _, result) = collect(events).await;
        assert!(result.is_ok());
        assert_eq!(stdout, b"hello");
    }
}
