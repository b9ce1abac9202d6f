//! Pointer change detection and the parent commit

use crate::error::Result;
use crate::registry::LinkRegistry;
use crate::repo::{GitRepository, RepositoryProvider};
use crate::types::{PointerChange, PointerChangeSet};
use std::fmt::Write as _;
use tracing::{debug, warn};

/// Abbreviated revision for display
pub fn short_revision(revision: &str) -> &str {
    revision.get(..7).unwrap_or(revision)
}

/// Compare the parent's recorded pointers with each linked repository's HEAD
///
/// Linked repositories that cannot be opened (e.g. not initialized) are
/// logged and left out; they have no HEAD to record.
pub fn compute_pointer_changes(
    registry: &LinkRegistry,
    parent: &dyn GitRepository,
    provider: &dyn RepositoryProvider,
) -> Result<PointerChangeSet> {
    let mut entries = Vec::new();

    for repository in registry.repositories() {
        let recorded = parent.recorded_pointer(&repository.path)?;

        let head = match provider
            .open(&registry.absolute_path(repository))
            .and_then(|repo| repo.head_commit())
        {
            Ok(head) => head,
            Err(e) => {
                warn!(repository = %repository.name, error = %e, "cannot read HEAD, leaving pointer as is");
                continue;
            }
        };

        if recorded.as_deref() == Some(head.as_str()) {
            continue;
        }

        debug!(repository = %repository.name, old = ?recorded, new = %head, "pointer moved");
        entries.push(PointerChange {
            repository: repository.name.clone(),
            path: repository.path.clone(),
            old_revision: recorded,
            new_revision: head,
        });
    }

    Ok(PointerChangeSet { entries })
}

/// Pointer updates already committed on HEAD but not recorded at `base`
pub fn committed_pointer_changes(
    registry: &LinkRegistry,
    parent: &dyn GitRepository,
    base: &str,
) -> Result<PointerChangeSet> {
    let mut entries = Vec::new();

    for repository in registry.repositories() {
        let Some(head) = parent.recorded_pointer(&repository.path)? else {
            continue;
        };
        let recorded = parent.recorded_pointer_at(base, &repository.path)?;
        if recorded.as_deref() == Some(head.as_str()) {
            continue;
        }
        entries.push(PointerChange {
            repository: repository.name.clone(),
            path: repository.path.clone(),
            old_revision: recorded,
            new_revision: head,
        });
    }

    Ok(PointerChangeSet { entries })
}

/// Commit message enumerating every pointer update
///
/// ```text
/// Update linked repositories: api, web
///
/// - api: 1a2b3c4 -> 5d6e7f8
/// - web: (new) -> 9a8b7c6
/// ```
pub fn pointer_commit_message(changes: &PointerChangeSet, feature_hint: Option<&str>) -> String {
    let names = changes.repository_names().join(", ");
    let mut message = match feature_hint {
        Some(hint) => format!("Update linked repositories for {hint}: {names}\n\n"),
        None => format!("Update linked repositories: {names}\n\n"),
    };

    for change in &changes.entries {
        let old = change
            .old_revision
            .as_deref()
            .map_or("(new)", short_revision);
        let _ = writeln!(
            message,
            "- {}: {old} -> {}",
            change.repository,
            short_revision(&change.new_revision)
        );
    }
    message
}

/// Stage and commit exactly the changed pointer paths in the parent
///
/// Anything else already staged in the parent stays out of this commit.
pub fn commit_pointer_changes(
    parent: &dyn GitRepository,
    changes: &PointerChangeSet,
    message: &str,
) -> Result<()> {
    let paths = changes.paths();
    parent.add(&paths)?;
    parent.commit(message, &paths)
}
