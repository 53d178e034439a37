// region: --- Modules

pub mod asst;
pub mod conv;
pub mod file;
pub mod msg;
mod oa;
pub mod run;
mod types;

#[cfg(test)]
pub mod fake;

pub use self::types::*;

use crate::{Error, Result};
use async_openai::config::OpenAIConfig;
use async_openai::Client;
use async_trait::async_trait;
use std::path::Path;

// endregion: --- Modules

// region: --- Client

const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

pub type OaClient = Client<OpenAIConfig>;

pub fn new_oa_client() -> Result<OaClient> {
    match dotenv::var(ENV_OPENAI_API_KEY) {
        Ok(api_key) => Ok(Client::with_config(
            OpenAIConfig::new().with_api_key(api_key),
        )),
        Err(_) => {
            println!("No {ENV_OPENAI_API_KEY} env variable. Please set it.");
            Err(Error::MissingApiKey)
        }
    }
}

// endregion: --- Client

// region: --- Service

/// The remote assistant service, as seen by the reconciler and the
/// conversation driver.
///
/// Every method is one request/response against the remote store. Failures
/// come back as `Error::Service`, already logged at the call site.
#[async_trait]
pub trait AssistantService: Send + Sync {
    // -- Assistants
    async fn list_assistants(&self) -> Result<Vec<RemoteAssistant>>;
    async fn create_assistant(&self, req: AsstRequest) -> Result<RemoteAssistant>;
    async fn update_assistant(&self, asst_id: &AsstId, req: AsstRequest) -> Result<RemoteAssistant>;
    async fn delete_assistant(&self, asst_id: &AsstId) -> Result<()>;

    // -- Files
    async fn list_files(&self) -> Result<Vec<RemoteFile>>;
    async fn upload_file(&self, file: &Path) -> Result<RemoteFile>;
    async fn delete_file(&self, file_id: &FileId) -> Result<()>;

    // -- Threads
    async fn create_thread(&self) -> Result<ThreadId>;
    async fn create_message(&self, thread_id: &ThreadId, text: &str) -> Result<()>;
    /// Messages of the thread, newest first.
    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>>;

    // -- Runs
    async fn create_run(&self, thread_id: &ThreadId, asst_id: &AsstId) -> Result<Run>;
    async fn retrieve_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<Run>;
}

// endregion: --- Service
