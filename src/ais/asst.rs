use std::path::PathBuf;

use tracing::info;

use crate::ais::file::resolve_file;
use crate::ais::{AssistantService, AsstId, AsstRequest, FileId, RemoteAssistant};
use crate::utils::cli::{approve, ico_check, ico_deleted_ok, Confirm};
use crate::Result;

// region: --- Types

/// Desired state of one assistant. `name` is the key the remote store is
/// searched by.
#[derive(Debug, Clone)]
pub struct AsstSpec {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub knowledge_files: Vec<PathBuf>,
    pub auto_approve: bool,
}

impl AsstSpec {
    fn to_request(&self, file_ids: Vec<FileId>) -> AsstRequest {
        AsstRequest {
            name: self.name.clone(),
            instructions: self.instructions.clone(),
            model: self.model.clone(),
            file_ids,
        }
    }
}

// endregion: --- Types

// region: --- Reconcile

/// Converges the remote store to `spec`.
///
/// Returns `None` when an assistant with that name exists and the user declined
/// to modify it. Nothing is mutated in that case.
pub async fn reconcile(
    svc: &dyn AssistantService,
    spec: &AsstSpec,
    confirm: &mut dyn Confirm,
) -> Result<Option<AsstId>> {
    let assts = svc.list_assistants().await?;

    let Some(existing) = first_by_name(&assts, &spec.name) else {
        let file_ids = resolve_files(svc, spec, confirm).await?;
        let asst = svc.create_assistant(spec.to_request(file_ids)).await?;
        info!(asst_id = %asst.id, name = %spec.name, "assistant created");
        println!("{} Created a new assistant '{}' ({})", ico_check(), spec.name, asst.id);
        return Ok(Some(asst.id));
    };

    let question = format!("An assistant named '{}' exists. Modify it?", spec.name);
    if !approve(spec.auto_approve, confirm, &question)? {
        info!(name = %spec.name, "modification declined");
        println!(
            "Please choose a new name for the assistant that doesn't conflict with an existing assistant's name. These are your existing assistants:\n"
        );
        print_assistants(&assts);
        return Ok(None);
    }

    let asst_id = existing.id.clone();
    let file_ids = resolve_files(svc, spec, confirm).await?;
    svc.update_assistant(&asst_id, spec.to_request(file_ids)).await?;
    info!(
        %asst_id,
        name = %spec.name,
        previous_model = %existing.model,
        previous_files = existing.file_ids.len(),
        had_instructions = existing.instructions.is_some(),
        "assistant updated"
    );
    println!("{} Assistant '{}' updated", ico_check(), spec.name);

    Ok(Some(asst_id))
}

async fn resolve_files(
    svc: &dyn AssistantService,
    spec: &AsstSpec,
    confirm: &mut dyn Confirm,
) -> Result<Vec<FileId>> {
    let mut file_ids = Vec::with_capacity(spec.knowledge_files.len());
    for file in spec.knowledge_files.iter() {
        file_ids.push(resolve_file(svc, file, spec.auto_approve, confirm).await?);
    }
    Ok(file_ids)
}

/// Duplicates are possible remotely; only the first match is acted upon.
pub fn first_by_name<'a>(assts: &'a [RemoteAssistant], name: &str) -> Option<&'a RemoteAssistant> {
    assts.iter().find(|a| a.has_name(name))
}

// endregion: --- Reconcile

// region: --- Asst Maintenance

/// Deletes every assistant whose name is in `names`. Returns how many were deleted.
pub async fn delete_by_name(svc: &dyn AssistantService, names: &[String]) -> Result<usize> {
    let mut deleted = 0;

    for asst in svc.list_assistants().await? {
        let Some(name) = asst.name.as_deref() else {
            continue;
        };
        if names.iter().any(|n| n == name) {
            svc.delete_assistant(&asst.id).await?;
            println!("{} Deleted assistant: {name} (ID: {})", ico_deleted_ok(), asst.id);
            deleted += 1;
        }
    }

    Ok(deleted)
}

fn print_assistants(assts: &[RemoteAssistant]) {
    for asst in assts {
        println!(
            "Assistant name: {}, Assistant ID: {}, Model: {}",
            asst.name.as_deref().unwrap_or("<unnamed>"),
            asst.id,
            asst.model
        );
    }
}

// endregion: --- Asst Maintenance

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ais::fake::{Call, FakeService};

    fn spec(name: &str, files: &[&str], auto_approve: bool) -> AsstSpec {
        AsstSpec {
            name: name.to_string(),
            instructions: "You are a helpful assistant.".to_string(),
            model: "gpt-4-1106-preview".to_string(),
            knowledge_files: files.iter().map(PathBuf::from).collect(),
            auto_approve,
        }
    }

    fn no_prompt() -> impl FnMut(&str) -> bool {
        |q: &str| -> bool { panic!("unexpected prompt: {q}") }
    }

    #[tokio::test]
    async fn test_reconcile_creates_when_missing() -> Result<()> {
        let svc = FakeService::new();
        svc.seed_assistant("Math Tutor");

        let asst_id = reconcile(&svc, &spec("Document Helper", &[], false), &mut no_prompt()).await?;

        let asst_id = asst_id.ok_or("should create")?;
        let created: Vec<_> = svc
            .assistants()
            .into_iter()
            .filter(|a| a.has_name("Document Helper"))
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, asst_id);
        assert_eq!(svc.count(|c| matches!(c, Call::CreateAssistant(_))), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_create_attaches_files_with_retrieval() -> Result<()> {
        let svc = FakeService::new();

        reconcile(&svc, &spec("Document Helper", &["kb/a.txt", "kb/b.md"], false), &mut no_prompt())
            .await?;

        let reqs: Vec<AsstRequest> = svc
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateAssistant(req) => Some(req),
                _ => None,
            })
            .collect();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].file_ids.len(), 2);
        assert!(reqs[0].retrieval());

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_auto_approve_updates_same_id() -> Result<()> {
        let svc = FakeService::new();
        let existing = svc.seed_assistant("Document Helper");

        let first = reconcile(&svc, &spec("Document Helper", &["kb/a.txt"], true), &mut no_prompt()).await?;
        let second = reconcile(&svc, &spec("Document Helper", &["kb/a.txt"], true), &mut no_prompt()).await?;

        assert_eq!(first, Some(existing.clone()));
        assert_eq!(second, Some(existing.clone()));
        assert_eq!(svc.count(|c| matches!(c, Call::CreateAssistant(_))), 0);
        assert_eq!(svc.count(|c| matches!(c, Call::UpdateAssistant(id, _) if *id == existing)), 2);
        assert_eq!(svc.assistants().len(), 1);

        let assts = svc.assistants();
        let asst = &assts[0];
        assert_eq!(asst.instructions.as_deref(), Some("You are a helpful assistant."));
        assert_eq!(asst.file_ids.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_decline_mutates_nothing() -> Result<()> {
        let svc = FakeService::new();
        svc.seed_assistant("Document Helper");
        svc.seed_file("a.txt");

        let res = reconcile(&svc, &spec("Document Helper", &["kb/a.txt"], false), &mut |_: &str| false).await?;

        assert_eq!(res, None);
        assert!(svc.mutations().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_confirmed_update_keeps_declined_file() -> Result<()> {
        let svc = FakeService::new();
        let asst_id = svc.seed_assistant("Document Helper");
        let file_id = svc.seed_file("a.txt");
        // Yes to modifying the assistant, no to replacing the file.
        let mut answers = vec![true, false].into_iter();
        let mut scripted = move |_: &str| answers.next().unwrap_or(false);

        let res = reconcile(&svc, &spec("Document Helper", &["kb/a.txt"], false), &mut scripted).await?;

        assert_eq!(res, Some(asst_id.clone()));
        let updates: Vec<Call> = svc.mutations();
        assert_eq!(updates.len(), 1);
        assert!(matches!(&updates[0], Call::UpdateAssistant(id, req) if *id == asst_id && req.file_ids == vec![file_id.clone()]));

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_first_duplicate_wins() -> Result<()> {
        let svc = FakeService::new();
        let first = svc.seed_assistant("Document Helper");
        let _second = svc.seed_assistant("Document Helper");

        let res = reconcile(&svc, &spec("Document Helper", &[], true), &mut no_prompt()).await?;

        assert_eq!(res, Some(first));
        assert_eq!(svc.assistants().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_failure_aborts() {
        let svc = FakeService::new();
        svc.fail_on("listing files");

        let res = reconcile(&svc, &spec("Document Helper", &["kb/a.txt"], true), &mut no_prompt()).await;

        assert!(res.is_err());
        assert_eq!(svc.count(|c| matches!(c, Call::CreateAssistant(_))), 0);
    }

    #[tokio::test]
    async fn test_delete_by_name() -> Result<()> {
        let svc = FakeService::new();
        svc.seed_assistant("Math Tutor");
        svc.seed_assistant("Math Tutor");
        let keep = svc.seed_assistant("Document Helper");

        let deleted = delete_by_name(&svc, &["Math Tutor".to_string(), "Nobody".to_string()]).await?;

        assert_eq!(deleted, 2);
        let remaining: Vec<AsstId> = svc.assistants().into_iter().map(|a| a.id).collect();
        assert_eq!(remaining, vec![keep]);

        Ok(())
    }
}
