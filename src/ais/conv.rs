use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::ais::msg::latest_assistant_msg;
use crate::ais::run::{wait_on_run, PollConfig};
use crate::ais::{AssistantService, AsstId, RunStatus, ThreadId};
use crate::Result;

/// One user turn: send `msg`, run the assistant on the thread, wait for the
/// run to settle and return the newest assistant reply.
///
/// A run that ends in any non-completed state is not an error; the reply may
/// then be missing.
pub async fn run_turn(
    svc: &dyn AssistantService,
    asst_id: &AsstId,
    thread_id: &ThreadId,
    msg: &str,
    poll: &PollConfig,
    cancel: Option<&mut watch::Receiver<bool>>,
) -> Result<Option<String>> {
    // -- Attach message to thread
    svc.create_message(thread_id, msg).await?;

    // -- Create a run for the thread
    let run = svc.create_run(thread_id, asst_id).await?;
    info!(run_id = %run.id, status = %run.status, "run created");

    // -- Wait for the run to leave queued/in-progress
    let run = wait_on_run(svc, thread_id, run, poll, cancel).await?;
    if run.status != RunStatus::Completed {
        warn!(run_id = %run.id, status = %run.status, "run did not complete");
    }

    latest_reply(svc, thread_id).await
}

/// Text of the newest assistant-authored message, if any.
pub async fn latest_reply(svc: &dyn AssistantService, thread_id: &ThreadId) -> Result<Option<String>> {
    let messages = svc.list_messages(thread_id).await?;

    let Some(msg) = latest_assistant_msg(&messages) else {
        return Ok(None);
    };
    debug!(msg_id = %msg.id, "latest assistant message");

    Ok(msg.text.clone())
}
