//! PR aggregation
//!
//! Two stages: a PR against a linked repository for the feature branch, then
//! a PR against the parent that advances its recorded pointers. The parent
//! side follows the same gather/commit/publish order as sync: compute the
//! pointer changes (read-only), commit exactly those paths, then push and
//! open or reuse the PR.

mod changes;
mod link;
mod parent;

pub use changes::{
    commit_pointer_changes, compute_pointer_changes, pointer_commit_message, short_revision,
};
pub use link::{LinkPrOutcome, create_link_pr, link_pr_body, link_pr_title};
pub use parent::{
    ParentPrOptions, ParentPrOutcome, create_parent_pr, parent_branch_name, parent_pr_body,
    parent_pr_title,
};
