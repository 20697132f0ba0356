//! Project ownership transition.

use vitrine_model::{Project, ProjectDraft, User};
use vitrine_store::Store;

use crate::error::EngineError;

/// Create (or resubmit) a user's project, enforcing the one-project-per-user
/// rule.
///
/// If the user already owns a project, the old row is deleted before the
/// replacement is created and linked. The old project's ratings are NOT
/// cascaded: they remain as rows referencing the dead project id, and field
/// resolution tolerates the dangling reference. The replacement gets a fresh
/// id, so nothing may hold project ids across a resubmission.
pub async fn replace_project(
    store: &dyn Store,
    owner: &User,
    draft: &ProjectDraft,
) -> Result<Project, EngineError> {
    if let Some(old_id) = owner.project_id {
        tracing::info!(owner = %owner.id, project = %old_id, "deleting previous project before resubmission");
        store.delete_project(old_id).await?;
    }

    let project = store.create_project(&owner.id, draft).await?;

    let mut linked = owner.clone();
    linked.project_id = Some(project.id);
    store.update_user(&linked).await?;

    tracing::info!(owner = %owner.id, project = %project.id, "project created");
    Ok(project)
}
