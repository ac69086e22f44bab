use std::{
    ffi::OsString,
    sync::{Arc, Mutex},
};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::process_reactor::{
    ProcessEvent, ProcessEvents, ProcessReactor, ProcessTermination, STDOUT,
};

/// A process "spawned" by [`FakeProcessReactor`]. Tests play the part of the process by feeding
/// it events.
#[derive(Debug, Clone)]
pub struct FakeProcess {
    pub executable: String,
    pub args: Vec<String>,
    pub env: Vec<(OsString, OsString)>,
    sender: mpsc::UnboundedSender<ProcessEvent>,
}

impl FakeProcess {
    pub fn child_data_received(&self, fd: u32, data: impl Into<Bytes>) {
        let _ = self.sender.send(ProcessEvent::ChildData {
            fd,
            data: data.into(),
        });
    }

    pub fn stdout(&self, data: impl Into<Bytes>) {
        self.child_data_received(STDOUT, data);
    }

    pub fn process_ended(&self, result: Result<(), ProcessTermination>) {
        let _ = self.sender.send(ProcessEvent::Ended(result));
    }
}

/// Records spawn requests instead of running anything.
#[derive(Debug, Default, Clone)]
pub struct FakeProcessReactor {
    processes: Arc<Mutex<Vec<FakeProcess>>>,
}

impl FakeProcessReactor {
    pub fn processes(&self) -> Vec<FakeProcess> {
        self.processes.lock().unwrap().clone()
    }

    pub fn process(&self, index: usize) -> FakeProcess {
        self.processes()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no process was spawned at index {index}"))
    }
}

impl ProcessReactor for FakeProcessReactor {
    fn spawn_process(
        &self,
        executable: &str,
        args: Vec<String>,
        env: Vec<(OsString, OsString)>,
    ) -> ProcessEvents {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.processes.lock().unwrap().push(FakeProcess {
            executable: executable.to_owned(),
            args,
            env,
            sender,
        });
        receiver
    }
}
