// region --- Modules
mod config;

pub use self::config::Config;

use std::path::Path;
use std::sync::Arc;

use derive_more::From;
use tokio::sync::watch;

use crate::ais::run::PollConfig;
use crate::ais::{asst, conv, file, AssistantService, AsstId, ThreadId};
use crate::utils::cli::{approve, ico_check, Confirm};
use crate::Result;

// endregion --- Modules

pub struct Assistant {
    svc: Arc<dyn AssistantService>,
    asst_id: AsstId,
    name: String,
    poll: PollConfig,
}

#[derive(Debug, From)]
pub struct Conv {
    thread_id: ThreadId,
}

/// Public functions
impl Assistant {
    /// Runs the configured maintenance, then reconciles the remote assistant
    /// with `config`.
    ///
    /// `None` when an assistant with the configured name exists and
    /// modifying it was declined.
    pub async fn init(
        svc: Arc<dyn AssistantService>,
        dir: &Path,
        config: Config,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<Self>> {
        let poll = PollConfig::try_from(&config.poll)?;
        run_maintenance(svc.as_ref(), &config, confirm).await?;

        let spec = config.to_spec(dir)?;
        let Some(asst_id) = asst::reconcile(svc.as_ref(), &spec, confirm).await? else {
            return Ok(None);
        };

        Ok(Some(Assistant {
            svc,
            asst_id,
            name: config.name,
            poll,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asst_id(&self) -> &AsstId {
        &self.asst_id
    }

    pub async fn load_conv(&self) -> Result<Conv> {
        let thread_id = self.svc.create_thread().await?;
        println!("{} Conversation created", ico_check());

        Ok(thread_id.into())
    }

    pub async fn chat(
        &self,
        conv: &Conv,
        msg: &str,
        cancel: Option<&mut watch::Receiver<bool>>,
    ) -> Result<Option<String>> {
        conv::run_turn(
            self.svc.as_ref(),
            &self.asst_id,
            &conv.thread_id,
            msg,
            &self.poll,
            cancel,
        )
        .await
    }
}

/// Private functions
async fn run_maintenance(
    svc: &dyn AssistantService,
    config: &Config,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let maintenance = &config.maintenance;

    if !maintenance.delete_assistants.is_empty() {
        let question = format!(
            "Delete every assistant named {:?}?",
            maintenance.delete_assistants
        );
        if approve(config.auto_approve, confirm, &question)? {
            asst::delete_by_name(svc, &maintenance.delete_assistants).await?;
        }
    }

    if maintenance.delete_all_files && approve(config.auto_approve, confirm, "Delete all files?")? {
        file::delete_all_files(svc).await?;
    }

    Ok(())
}
