use std::{future::Future, io, iter};

use bytes::{Bytes, BytesMut};

use crate::{
    command_error::CommandError,
    process_reactor::{ProcessEvent, ProcessEvents, ProcessReactor, ProcessTermination, STDERR, STDOUT},
    zfs_logger::{ZfsErrorRecord, ZfsLogger},
};

pub const ZFS_EXECUTABLE: &str = "zfs";

/// `argv` as a human would type it.
pub fn render_command(executable: &str, args: &[String]) -> String {
    iter::once(executable)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Starts `executable` with `args` right away, inheriting this process's environment.
///
/// The returned future resolves to everything the process wrote to stdout once it has exited
/// with status 0. Exit status 1 is [`CommandError::CommandFailed`], 2 is
/// [`CommandError::BadArguments`] and anything else, including failing to start, is passed
/// through as [`CommandError::Process`].
pub fn run_command<R: ProcessReactor + ?Sized>(
    reactor: &R,
    executable: &str,
    args: Vec<String>,
) -> impl Future<Output = Result<Bytes, CommandError>> + Send + 'static {
    tracing::debug!(command = %render_command(executable, &args), "spawning");
    let argv = iter::once(executable.to_owned()).chain(args).collect();
    let events = reactor.spawn_process(executable, argv, std::env::vars_os().collect());
    collect_output(events)
}

async fn collect_output(mut events: ProcessEvents) -> Result<Bytes, CommandError> {
    let mut stdout = BytesMut::new();
    let mut stderr = BytesMut::new();
    while let Some(event) = events.recv().await {
        match event {
            ProcessEvent::ChildData { fd: STDOUT, data } => stdout.extend_from_slice(&data),
            ProcessEvent::ChildData { fd: STDERR, data } => stderr.extend_from_slice(&data),
            ProcessEvent::ChildData { .. } => {}
            ProcessEvent::Ended(Ok(())) => return Ok(stdout.freeze()),
            ProcessEvent::Ended(Err(termination)) => {
                return Err(CommandError::classify(
                    termination,
                    stdout.freeze(),
                    stderr.freeze(),
                ))
            }
        }
    }
    Err(ProcessTermination::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "process reactor stopped reporting before the process ended",
    ))
    .into())
}

/// The `zfs` tool, run through a [`ProcessReactor`].
#[derive(Debug, Clone)]
pub struct Zfs<R> {
    reactor: R,
    executable: String,
}

impl<R: ProcessReactor> Zfs<R> {
    pub fn new(reactor: R) -> Self {
        Self::with_executable(reactor, ZFS_EXECUTABLE)
    }

    pub fn with_executable(reactor: R, executable: impl Into<String>) -> Self {
        Self {
            reactor,
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    /// See [`run_command`].
    pub fn command(
        &self,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> impl Future<Output = Result<Bytes, CommandError>> + Send + 'static {
        run_command(
            &self.reactor,
            &self.executable,
            args.into_iter().map(Into::into).collect(),
        )
    }

    /// Runs a command whose failure the caller doesn't care about.
    ///
    /// Never fails. Output is discarded. Any failure, including not being able to start `zfs`
    /// at all, is reported to `logger` as exactly one `filesystem:zfs:error` record.
    ///
    /// The command starts immediately and its outcome is logged from a tokio task, so dropping
    /// the returned future does not lose the record. Awaiting it waits for the command to end.
    /// Must be called from within a tokio runtime.
    pub fn command_squashed<L: ZfsLogger + Send + 'static>(
        &self,
        args: impl IntoIterator<Item = impl Into<String>>,
        logger: L,
    ) -> impl Future<Output = ()> + Send + 'static {
        let args = args.into_iter().map(Into::into).collect::<Vec<String>>();
        let zfs_command = render_command(&self.executable, &args);
        let result = run_command(&self.reactor, &self.executable, args);
        let logged = tokio::spawn(async move {
            if let Err(error) = result.await {
                logger.zfs_error(ZfsErrorRecord::new(zfs_command, &error));
            }
        });
        async move {
            // Fails only if the logger panicked
            let _ = logged.await;
        }
    }
}
