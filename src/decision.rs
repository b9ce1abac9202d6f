//! Decision points where a human (or a policy standing in for one) chooses
//!
//! The engine never prompts. It asks a [`DecisionPolicy`] at three points:
//! a dirty working tree during sync, an existing local feature branch, and
//! committing pointer updates in the parent.

use crate::types::{LinkedRepository, PointerChangeSet};

/// What to do with a dirty working tree during sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyTreeAction {
    /// Stash the changes and continue
    Stash,
    /// Leave the repository untouched
    Skip,
}

/// Answers the engine's decision points
pub trait DecisionPolicy {
    /// A linked repository has uncommitted changes and stashing was not forced
    fn on_dirty_tree(&self, repository: &LinkedRepository) -> DirtyTreeAction;

    /// `branch` already exists locally in `repository`; switch onto it?
    fn confirm_branch_switch(&self, repository: &str, branch: &str) -> bool;

    /// Commit these pointer updates in the parent?
    fn confirm_parent_commit(&self, changes: &PointerChangeSet) -> bool;
}

/// Say yes to everything, stashing dirty trees included
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysProceed;

impl DecisionPolicy for AlwaysProceed {
    fn on_dirty_tree(&self, _repository: &LinkedRepository) -> DirtyTreeAction {
        DirtyTreeAction::Stash
    }

    fn confirm_branch_switch(&self, _repository: &str, _branch: &str) -> bool {
        true
    }

    fn confirm_parent_commit(&self, _changes: &PointerChangeSet) -> bool {
        true
    }
}

/// Answers for `--yes`: confirm every prompt but keep uncommitted work
///
/// A dirty tree is skipped rather than stashed; stashing only happens when
/// asked for explicitly (`sync --force`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl DecisionPolicy for AssumeYes {
    fn on_dirty_tree(&self, _repository: &LinkedRepository) -> DirtyTreeAction {
        DirtyTreeAction::Skip
    }

    fn confirm_branch_switch(&self, _repository: &str, _branch: &str) -> bool {
        true
    }

    fn confirm_parent_commit(&self, _changes: &PointerChangeSet) -> bool {
        true
    }
}

/// Say no to everything; never stashes, never switches, never commits
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAbort;

impl DecisionPolicy for AlwaysAbort {
    fn on_dirty_tree(&self, _repository: &LinkedRepository) -> DirtyTreeAction {
        DirtyTreeAction::Skip
    }

    fn confirm_branch_switch(&self, _repository: &str, _branch: &str) -> bool {
        false
    }

    fn confirm_parent_commit(&self, _changes: &PointerChangeSet) -> bool {
        false
    }
}
