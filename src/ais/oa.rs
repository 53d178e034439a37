//! `AssistantService` over the OpenAI assistants (v1) API.

use std::future::Future;
use std::path::Path;

use async_openai::error::OpenAIError;
use async_openai::types::{
    AssistantObject, AssistantToolsRetrieval, CreateAssistantRequest, CreateFileRequest,
    CreateRunRequest, CreateThreadRequest, ListAssistantsResponse, MessageObject, MessageRole,
    ModifyAssistantRequest, OpenAIFile, OpenAIFilePurpose, RunObject, RunStatus as OaRunStatus,
};
use async_trait::async_trait;
use tracing::{debug, error};

use crate::ais::msg::{text_content, user_msg};
use crate::ais::{
    AssistantService, AsstId, AsstRequest, FileId, Message, OaClient, RemoteAssistant,
    RemoteFile, Role, Run, RunId, RunStatus, ThreadId,
};
use crate::error::ServiceError;
use crate::{Error, Result};

// region: --- Constants
const PAGE_LIMIT: &str = "100";
const FILE_PURPOSE: &str = "assistants";
// endregion: --- Constants

/// Logs the failure with its operation and turns it into a service error.
fn svc_err(op: &'static str) -> impl FnOnce(OpenAIError) -> Error {
    move |err| {
        let err = ServiceError::new(op, err.to_string());
        error!("{err}");
        Error::Service(err)
    }
}

#[async_trait]
impl AssistantService for OaClient {
    // region: --- Assistants

    async fn list_assistants(&self) -> Result<Vec<RemoteAssistant>> {
        debug!("listing assistants");
        let oa_assts = &self.assistants();

        let objs = list_all_pages(move |after| {
            let mut query = vec![("limit", PAGE_LIMIT.to_string())];
            if let Some(after) = after {
                query.push(("after", after));
            }
            async move {
                let page = oa_assts.list(&query).await.map_err(svc_err("listing assistants"))?;
                Ok::<_, Error>(Page::<AssistantObject>::from(page))
            }
        })
        .await?;

        Ok(objs.into_iter().map(RemoteAssistant::from).collect())
    }

    async fn create_assistant(&self, req: AsstRequest) -> Result<RemoteAssistant> {
        debug!(name = %req.name, files = req.file_ids.len(), "creating assistant");
        let tools = retrieval_tools(&req);

        let asst_obj = self
            .assistants()
            .create(CreateAssistantRequest {
                model: req.model,
                name: Some(req.name),
                instructions: Some(req.instructions),
                tools: Some(tools),
                file_ids: Some(req.file_ids.iter().map(|id| id.to_string()).collect()),
                ..Default::default()
            })
            .await
            .map_err(svc_err("creating assistant"))?;

        Ok(asst_obj.into())
    }

    async fn update_assistant(&self, asst_id: &AsstId, req: AsstRequest) -> Result<RemoteAssistant> {
        debug!(%asst_id, files = req.file_ids.len(), "modifying assistant");

        let asst_obj = self
            .assistants()
            .update(asst_id, modify_request(req))
            .await
            .map_err(svc_err("modifying assistant"))?;

        Ok(asst_obj.into())
    }

    async fn delete_assistant(&self, asst_id: &AsstId) -> Result<()> {
        debug!(%asst_id, "deleting assistant");
        self.assistants()
            .delete(asst_id)
            .await
            .map_err(svc_err("deleting assistant"))?;

        Ok(())
    }

    // endregion: --- Assistants

    // region: --- Files

    async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        debug!("listing files");
        let org_files = self.files().list().await.map_err(svc_err("listing files"))?.data;

        Ok(org_files.into_iter().map(RemoteFile::from).collect())
    }

    async fn upload_file(&self, file: &Path) -> Result<RemoteFile> {
        debug!(file = %file.display(), "uploading file");
        let oa_file = self
            .files()
            .create(CreateFileRequest {
                file: file.into(),
                purpose: FILE_PURPOSE.into(),
            })
            .await
            .map_err(svc_err("uploading file"))?;

        Ok(oa_file.into())
    }

    async fn delete_file(&self, file_id: &FileId) -> Result<()> {
        debug!(%file_id, "deleting file");
        self.files()
            .delete(file_id)
            .await
            .map_err(svc_err("deleting file"))?;

        Ok(())
    }

    // endregion: --- Files

    // region: --- Threads

    async fn create_thread(&self) -> Result<ThreadId> {
        debug!("creating thread");
        let thread_obj = self
            .threads()
            .create(CreateThreadRequest {
                ..Default::default()
            })
            .await
            .map_err(svc_err("creating thread"))?;

        Ok(thread_obj.id.into())
    }

    async fn create_message(&self, thread_id: &ThreadId, text: &str) -> Result<()> {
        debug!(%thread_id, "sending message");
        let _message_obj = self
            .threads()
            .messages(thread_id)
            .create(user_msg(text))
            .await
            .map_err(svc_err("sending message"))?;

        Ok(())
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        static QUERY: [(&str, &str); 2] = [("limit", PAGE_LIMIT), ("order", "desc")];

        debug!(%thread_id, "listing messages");
        let messages = self
            .threads()
            .messages(thread_id)
            .list(&QUERY)
            .await
            .map_err(svc_err("retrieving messages"))?;

        Ok(messages.data.into_iter().map(Message::from).collect())
    }

    // endregion: --- Threads

    // region: --- Runs

    async fn create_run(&self, thread_id: &ThreadId, asst_id: &AsstId) -> Result<Run> {
        debug!(%thread_id, %asst_id, "creating run");
        let run_request = CreateRunRequest {
            assistant_id: asst_id.to_string(),
            ..Default::default()
        };

        let run = self
            .threads()
            .runs(thread_id)
            .create(run_request)
            .await
            .map_err(svc_err("creating run"))?;

        Ok(run.into())
    }

    async fn retrieve_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run> {
        let run = self
            .threads()
            .runs(thread_id)
            .retrieve(run_id)
            .await
            .map_err(svc_err("run retrieval"))?;
        debug!(%run_id, status = ?run.status, "run retrieved");

        Ok(run.into())
    }

    // endregion: --- Runs
}

fn modify_request(req: AsstRequest) -> ModifyAssistantRequest {
    let tools = retrieval_tools(&req);

    ModifyAssistantRequest {
        model: req.model,
        name: Some(req.name),
        instructions: Some(req.instructions),
        tools: Some(tools),
        file_ids: Some(req.file_ids.iter().map(|id| id.to_string()).collect()),
        ..Default::default()
    }
}

fn retrieval_tools(req: &AsstRequest) -> Vec<async_openai::types::AssistantTools> {
    if req.retrieval() {
        vec![AssistantToolsRetrieval::default().into()]
    } else {
        Vec::new()
    }
}

// region: --- Pagination

/// One page of a cursor-paginated listing.
struct Page<T> {
    data: Vec<T>,
    has_more: bool,
    last_id: Option<String>,
}

impl From<ListAssistantsResponse> for Page<AssistantObject> {
    fn from(res: ListAssistantsResponse) -> Self {
        Self {
            data: res.data,
            has_more: res.has_more,
            last_id: res.last_id,
        }
    }
}

/// Fetches pages, passing the previous page's `last_id` as cursor, until a
/// page reports no more items or carries no `last_id`.
async fn list_all_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut after = None;

    loop {
        let page = fetch_page(after.take()).await?;
        items.extend(page.data);

        match (page.has_more, page.last_id) {
            (true, Some(last_id)) => after = Some(last_id),
            _ => break,
        }
    }

    Ok(items)
}

// endregion: --- Pagination

// region: --- Froms

impl From<AssistantObject> for RemoteAssistant {
    fn from(obj: AssistantObject) -> Self {
        Self {
            id: obj.id.into(),
            name: obj.name,
            instructions: obj.instructions,
            model: obj.model,
            file_ids: obj.file_ids.into_iter().map(FileId::from).collect(),
        }
    }
}

impl From<OpenAIFile> for RemoteFile {
    fn from(file: OpenAIFile) -> Self {
        Self {
            id: file.id.into(),
            filename: file.filename,
            purpose: purpose_name(&file.purpose).to_string(),
        }
    }
}

fn purpose_name(purpose: &OpenAIFilePurpose) -> &'static str {
    match purpose {
        OpenAIFilePurpose::FineTune => "fine-tune",
        OpenAIFilePurpose::FineTuneResults => "fine-tune-results",
        OpenAIFilePurpose::Assistants => "assistants",
        OpenAIFilePurpose::AssistantsOutput => "assistants_output",
    }
}

impl From<RunObject> for Run {
    fn from(run: RunObject) -> Self {
        let status = match run.status {
            OaRunStatus::Queued => RunStatus::Queued,
            OaRunStatus::InProgress => RunStatus::InProgress,
            OaRunStatus::RequiresAction => RunStatus::RequiresAction,
            OaRunStatus::Cancelling => RunStatus::Cancelling,
            OaRunStatus::Cancelled => RunStatus::Cancelled,
            OaRunStatus::Failed => RunStatus::Failed,
            OaRunStatus::Completed => RunStatus::Completed,
            OaRunStatus::Expired => RunStatus::Expired,
        };

        Self {
            id: run.id.into(),
            status,
        }
    }
}

impl From<MessageObject> for Message {
    fn from(msg: MessageObject) -> Self {
        let role = match msg.role {
            MessageRole::User => Role::User,
            MessageRole::Assistant => Role::Assistant,
        };

        Self {
            id: msg.id,
            role,
            text: text_content(msg.content),
        }
    }
}

// endregion: --- Froms
