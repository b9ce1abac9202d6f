//! subflow - feature branches and two-stage PRs for git submodule workspaces
//!
//! A parent repository pins a set of linked repositories (git submodules) at
//! specific revisions. This crate keeps those linked repositories reconciled
//! with their remotes, manages feature branches inside them, and drives the
//! PR flow: one PR against the linked repository, then one PR against the
//! parent that advances its recorded pointers.
//!
//! Module map:
//! - [`repo`] - git primitives against an explicit working directory
//! - [`platform`] / [`auth`] - hosting platform PR operations and credentials
//! - [`registry`] - linked repositories declared in `.gitmodules`
//! - [`sync`] - reconciliation engine
//! - [`feature`] - feature branch lifecycle
//! - [`pr`] - link PRs and parent pointer aggregation

pub mod auth;
pub mod config;
pub mod decision;
pub mod error;
pub mod feature;
pub mod platform;
pub mod pr;
pub mod progress;
pub mod registry;
pub mod repo;
pub mod sync;
pub mod types;
