//! In-memory `AssistantService` for tests. Records every call.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ais::{
    AssistantService, AsstId, AsstRequest, FileId, Message, RemoteAssistant, RemoteFile, Role,
    Run, RunId, RunStatus, ThreadId,
};
use crate::error::ServiceError;
use crate::utils::files::XFile;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListAssistants,
    CreateAssistant(AsstRequest),
    UpdateAssistant(AsstId, AsstRequest),
    DeleteAssistant(AsstId),
    ListFiles,
    UploadFile(String),
    DeleteFile(FileId),
    CreateThread,
    CreateMessage(ThreadId, String),
    ListMessages(ThreadId),
    CreateRun(ThreadId, AsstId),
    RetrieveRun(RunId),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreateAssistant(..)
                | Call::UpdateAssistant(..)
                | Call::DeleteAssistant(..)
                | Call::UploadFile(..)
                | Call::DeleteFile(..)
        )
    }
}

#[derive(Default)]
struct State {
    next_id: u32,
    assistants: Vec<RemoteAssistant>,
    files: Vec<RemoteFile>,
    /// Per thread, newest first.
    messages: HashMap<ThreadId, Vec<Message>>,
    run_statuses: VecDeque<RunStatus>,
    reply: Option<String>,
    fail_on: Option<&'static str>,
    calls: Vec<Call>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn record(&mut self, op: &'static str, call: Call) -> Result<()> {
        self.calls.push(call);
        match self.fail_on {
            Some(fail_op) if fail_op == op => Err(ServiceError::new(op, "simulated failure").into()),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeService {
    state: Mutex<State>,
}

// region: --- Setup

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake state poisoned")
    }

    pub fn seed_assistant(&self, name: &str) -> AsstId {
        let mut state = self.state();
        let id = AsstId::from(state.next_id("asst"));
        state.assistants.push(RemoteAssistant {
            id: id.clone(),
            name: Some(name.to_string()),
            instructions: None,
            model: "gpt-3.5-turbo-1106".to_string(),
            file_ids: Vec::new(),
        });
        id
    }

    pub fn seed_file(&self, filename: &str) -> FileId {
        let mut state = self.state();
        let id = FileId::from(state.next_id("file"));
        state.files.push(RemoteFile {
            id: id.clone(),
            filename: filename.to_string(),
            purpose: "assistants".to_string(),
        });
        id
    }

    /// First status is returned by `create_run`, the following ones by each
    /// `retrieve_run`. Once drained, runs report `Completed`.
    pub fn script_run(&self, statuses: &[RunStatus]) {
        self.state().run_statuses = statuses.iter().copied().collect();
    }

    /// Assistant message appended to the thread on every run.
    pub fn reply_with(&self, text: &str) {
        self.state().reply = Some(text.to_string());
    }

    pub fn fail_on(&self, op: &'static str) {
        self.state().fail_on = Some(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn assistants(&self) -> Vec<RemoteAssistant> {
        self.state().assistants.clone()
    }

    pub fn files(&self) -> Vec<RemoteFile> {
        self.state().files.clone()
    }
}

// endregion: --- Setup

#[async_trait]
impl AssistantService for FakeService {
    async fn list_assistants(&self) -> Result<Vec<RemoteAssistant>> {
        let mut state = self.state();
        state.record("listing assistants", Call::ListAssistants)?;
        Ok(state.assistants.clone())
    }

    async fn create_assistant(&self, req: AsstRequest) -> Result<RemoteAssistant> {
        let mut state = self.state();
        state.record("creating assistant", Call::CreateAssistant(req.clone()))?;
        let asst = RemoteAssistant {
            id: state.next_id("asst").into(),
            name: Some(req.name),
            instructions: Some(req.instructions),
            model: req.model,
            file_ids: req.file_ids,
        };
        state.assistants.push(asst.clone());
        Ok(asst)
    }

    async fn update_assistant(&self, asst_id: &AsstId, req: AsstRequest) -> Result<RemoteAssistant> {
        let mut state = self.state();
        state.record(
            "modifying assistant",
            Call::UpdateAssistant(asst_id.clone(), req.clone()),
        )?;
        let asst = state
            .assistants
            .iter_mut()
            .find(|a| &a.id == asst_id)
            .ok_or_else(|| ServiceError::new("modifying assistant", "No assistant found"))?;
        asst.name = Some(req.name);
        asst.instructions = Some(req.instructions);
        asst.model = req.model;
        asst.file_ids = req.file_ids;
        Ok(asst.clone())
    }

    async fn delete_assistant(&self, asst_id: &AsstId) -> Result<()> {
        let mut state = self.state();
        state.record("deleting assistant", Call::DeleteAssistant(asst_id.clone()))?;
        state.assistants.retain(|a| &a.id != asst_id);
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        let mut state = self.state();
        state.record("listing files", Call::ListFiles)?;
        Ok(state.files.clone())
    }

    async fn upload_file(&self, file: &Path) -> Result<RemoteFile> {
        let filename = file.x_file_name().to_string();
        let mut state = self.state();
        state.record("uploading file", Call::UploadFile(filename.clone()))?;
        let remote = RemoteFile {
            id: state.next_id("file").into(),
            filename,
            purpose: "assistants".to_string(),
        };
        state.files.push(remote.clone());
        Ok(remote)
    }

    async fn delete_file(&self, file_id: &FileId) -> Result<()> {
        let mut state = self.state();
        state.record("deleting file", Call::DeleteFile(file_id.clone()))?;
        state.files.retain(|f| &f.id != file_id);
        Ok(())
    }

    async fn create_thread(&self) -> Result<ThreadId> {
        let mut state = self.state();
        state.record("creating thread", Call::CreateThread)?;
        let thread_id = ThreadId::from(state.next_id("thread"));
        state.messages.insert(thread_id.clone(), Vec::new());
        Ok(thread_id)
    }

    async fn create_message(&self, thread_id: &ThreadId, text: &str) -> Result<()> {
        let mut state = self.state();
        state.record(
            "sending message",
            Call::CreateMessage(thread_id.clone(), text.to_string()),
        )?;
        let msg = Message {
            id: state.next_id("msg"),
            role: Role::User,
            text: Some(text.to_string()),
        };
        state.messages.entry(thread_id.clone()).or_default().insert(0, msg);
        Ok(())
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        let mut state = self.state();
        state.record("retrieving messages", Call::ListMessages(thread_id.clone()))?;
        Ok(state.messages.get(thread_id).cloned().unwrap_or_default())
    }

    async fn create_run(&self, thread_id: &ThreadId, asst_id: &AsstId) -> Result<Run> {
        let mut state = self.state();
        state.record("creating run", Call::CreateRun(thread_id.clone(), asst_id.clone()))?;
        if let Some(reply) = state.reply.clone() {
            let msg = Message {
                id: state.next_id("msg"),
                role: Role::Assistant,
                text: Some(reply),
            };
            state.messages.entry(thread_id.clone()).or_default().insert(0, msg);
        }
        let status = state.run_statuses.pop_front().unwrap_or(RunStatus::Queued);
        Ok(Run {
            id: state.next_id("run").into(),
            status,
        })
    }

    async fn retrieve_run(&self, _thread_id: &ThreadId, run_id: &RunId) -> Result<Run> {
        let mut state = self.state();
        state.record("run retrieval", Call::RetrieveRun(run_id.clone()))?;
        let status = state.run_statuses.pop_front().unwrap_or(RunStatus::Completed);
        Ok(Run {
            id: run_id.clone(),
            status,
        })
    }
}
