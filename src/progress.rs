//! Progress reporting for multi-repository runs

use crate::types::{LinkedRepository, ReconciliationResult};

/// Receives progress while the engine walks the linked repositories
///
/// All methods default to no-ops so callers implement only what they show.
pub trait ProgressCallback {
    /// About to reconcile a repository
    fn on_repository_start(&self, _repository: &LinkedRepository) {}

    /// A repository finished
    fn on_result(&self, _result: &ReconciliationResult) {}
}

/// Progress sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {}
