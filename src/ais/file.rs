//! Knowledge files: name-keyed reconciliation of local paths against the
//! remote file store.

use std::path::Path;

use console::Term;
use tracing::{debug, info};

use crate::ais::{AssistantService, FileId, RemoteFile};
use crate::utils::cli::{approve, ico_deleted_ok, ico_uploaded, ico_uploading, Confirm};
use crate::utils::files::XFile;
use crate::Result;

/// Returns the remote id to attach for this local file.
///
/// Files are matched by base filename only. An existing match is replaced
/// (every same-named remote file deleted, then one fresh upload) when approved,
/// and reused untouched otherwise.
pub async fn resolve_file(
    svc: &dyn AssistantService,
    file: &Path,
    auto_approve: bool,
    confirm: &mut dyn Confirm,
) -> Result<FileId> {
    let file_name = file.x_file_name();
    let existing: Vec<RemoteFile> = svc
        .list_files()
        .await?
        .into_iter()
        .filter(|f| f.filename == file_name)
        .collect();

    if let Some(first) = existing.first() {
        let ids: Vec<String> = existing.iter().map(|f| f.id.to_string()).collect();
        let question = format!(
            "A file named '{file_name}' already exists ({}). Replace it?",
            ids.join(", ")
        );
        if !approve(auto_approve, confirm, &question)? {
            info!(file_name, file_id = %first.id, "reusing existing file");
            println!("{} Using existing file '{file_name}'", ico_uploaded());
            return Ok(first.id.clone());
        }

        for old in existing.iter() {
            svc.delete_file(&old.id).await?;
            println!("{} Replaced file '{file_name}' ({})", ico_deleted_ok(), old.id);
        }
    }

    upload(svc, file).await
}

async fn upload(svc: &dyn AssistantService, file: &Path) -> Result<FileId> {
    let term = Term::stdout();

    term.write_line(&format!(
        "{} Uploading file '{}'",
        ico_uploading(),
        file.x_file_name()
    ))?;

    let remote = svc.upload_file(file).await?;
    debug!(file_id = %remote.id, purpose = %remote.purpose, "file uploaded");

    term.clear_last_lines(1)?;
    term.write_line(&format!(
        "{} Uploaded file '{}'",
        ico_uploaded(),
        file.x_file_name()
    ))?;

    Ok(remote.id)
}

/// Deletes every remote file. Returns how many were deleted.
pub async fn delete_all_files(svc: &dyn AssistantService) -> Result<usize> {
    let files = svc.list_files().await?;

    for file in files.iter() {
        svc.delete_file(&file.id).await?;
        println!("{} Deleted file: {}", ico_deleted_ok(), file.id);
    }

    Ok(files.len())
}
