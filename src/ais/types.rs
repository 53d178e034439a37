use derive_more::{Deref, Display, From};

// region: --- Ids

#[derive(Debug, Clone, PartialEq, Eq, Hash, From, Deref, Display)]
pub struct AsstId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, From, Deref, Display)]
pub struct ThreadId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, From, Deref, Display)]
pub struct FileId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, From, Deref, Display)]
pub struct RunId(String);

// endregion: --- Ids

// region: --- Assistants

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAssistant {
    pub id: AsstId,
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub model: String,
    pub file_ids: Vec<FileId>,
}

impl RemoteAssistant {
    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// Full desired state of an assistant, used for both create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct AsstRequest {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub file_ids: Vec<FileId>,
}

impl AsstRequest {
    /// Retrieval is only turned on when there is something to retrieve from.
    pub fn retrieval(&self) -> bool {
        !self.file_ids.is_empty()
    }
}

// endregion: --- Assistants

// region: --- Files

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub id: FileId,
    pub filename: String,
    pub purpose: String,
}

// endregion: --- Files

// region: --- Runs

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
}

impl RunStatus {
    /// Statuses the poller keeps waiting on.
    pub fn is_pending(self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: RunId,
    pub status: RunStatus,
}

// endregion: --- Runs

// region: --- Messages

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    /// Text of the first content item, `None` when it is not text.
    pub text: Option<String>,
}

// endregion: --- Messages
